use std::path::PathBuf;

use anyhow::Context;
use chrono::{Days, Months, NaiveDate};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Write a synthetic tree-planting CSV for trying out the dashboard.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output path.
    #[arg(default_value = "data/merged_data.csv")]
    out: PathBuf,

    /// Plots per species/system combination.
    #[arg(long, default_value_t = 4)]
    plots: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Serialize)]
struct Row {
    plot_id: String,
    species: &'static str,
    system: &'static str,
    date: NaiveDate,
    tree_count: u32,
}

const SPECIES: [(&str, u32); 4] = [("Oak", 120), ("Pine", 200), ("Teak", 80), ("Mahogany", 60)];
const SYSTEMS: [&str; 3] = ["Agroforestry", "Woodlot", "Boundary"];
/// Six-monthly visits over three years.
const VISITS: u32 = 6;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let start = NaiveDate::from_ymd_opt(2019, 3, 1).context("invalid start date")?;

    if let Some(dir) = args.out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut writer = csv::Writer::from_path(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let mut rows = 0usize;
    let mut plot_no = 0usize;
    for &(species, planted) in &SPECIES {
        for &system in &SYSTEMS {
            for _ in 0..args.plots {
                plot_no += 1;
                let plot_id = format!("P{plot_no:03}");
                let mut count = rng.gen_range(planted / 2..=planted);
                let offset = rng.gen_range(0..60);

                for visit in 0..VISITS {
                    let date = start
                        .checked_add_months(Months::new(visit * 6))
                        .and_then(|d| d.checked_add_days(Days::new(offset)))
                        .context("date out of range")?;

                    // Occasional abandoned plots record zero trees.
                    if visit > 0 && rng.gen_bool(0.03) {
                        count = 0;
                    }

                    writer.serialize(Row {
                        plot_id: plot_id.clone(),
                        species,
                        system,
                        date,
                        tree_count: count,
                    })?;
                    rows += 1;

                    let losses = rng.gen_range(0..=count / 8);
                    count -= losses;
                }
            }
        }
    }

    writer.flush()?;
    println!(
        "Wrote {rows} records ({plot_no} plots, first visit {}) to {}",
        start,
        args.out.display()
    );
    Ok(())
}
