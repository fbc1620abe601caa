use std::io::Write;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tree_dashboard::data::{
    self, loader, metrics, FilterSelection, LoadError, PlantingRow, SeededSurvival,
};
use tree_dashboard::report::Report;

const OAK_CSV: &str = "\
plot_id,species,system,date,tree_count
1,Oak,A,2020-01-01,10
2,Oak,A,2021-01-01,0
";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn zero_tree_record_is_defined_for_counts_but_not_rates() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "oak.csv", OAK_CSV);
    let dataset = data::load_dataset(&path, 0).unwrap();

    let view = data::filter(&dataset, &FilterSelection::new("Oak", 2021, "A"));
    assert_eq!(view.len(), 1);
    let rec = view.records().next().unwrap();
    assert_eq!(rec.tree_count, 0);
    assert_eq!(rec.survival_rate, None);

    let stats = data::aggregate(&view);
    assert_eq!(stats.total_trees, 0);
    assert_eq!(stats.avg_trees_per_plot, Some(0.0));
    assert_eq!(stats.num_plots, 1);
    assert_eq!(stats.avg_survival_rate, None);
}

#[test]
fn time_series_ignores_selected_year() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "oak.csv", OAK_CSV);
    let dataset = data::load_dataset(&path, 0).unwrap();

    let series = data::time_series(&dataset, "Oak", "A");
    let dates: Vec<_> = series.iter().map(|p| p.date.to_string()).collect();
    assert_eq!(dates, vec!["2020-01-01", "2021-01-01"]);
    let counts: Vec<_> = series.iter().map(|p| p.tree_count).collect();
    assert_eq!(counts, vec![10, 0]);
}

#[test]
fn unmatched_selection_aggregates_to_empty_stats() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "oak.csv", OAK_CSV);
    let dataset = data::load_dataset(&path, 0).unwrap();

    let view = data::filter(&dataset, &FilterSelection::new("Oak", 2019, "A"));
    assert!(view.is_empty());
    let stats = data::aggregate(&view);
    assert_eq!(stats.total_trees, 0);
    assert_eq!(stats.avg_trees_per_plot, None);
    assert_eq!(stats.num_plots, 0);
    assert_eq!(stats.total_survived_trees, 0);
    assert_eq!(stats.avg_survival_rate, None);
    assert!(data::plot_series(&view).is_empty());
}

#[test]
fn derived_metrics_hold_for_a_larger_file() {
    let mut csv = String::from("plot_id,species,system,date,tree_count\n");
    for i in 0..300 {
        let species = ["Oak", "Pine", "Teak"][i % 3];
        let system = ["A", "B"][i % 2];
        csv.push_str(&format!(
            "P{},{species},{system},{}-0{}-15,{}\n",
            i % 40,
            2018 + i % 4,
            1 + i % 9,
            (i * 7) % 53
        ));
    }
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "plots.csv", &csv);
    let dataset = data::load_dataset(&path, 11).unwrap();

    let mut grand_total = 0u64;
    for rec in dataset.records() {
        assert!(rec.survived_count <= rec.tree_count);
        assert_eq!(rec.year, rec.date.year());
        if rec.tree_count > 0 {
            let expected = rec.survived_count as f64 / rec.tree_count as f64 * 100.0;
            assert!((rec.survival_rate.unwrap() - expected).abs() < 1e-9);
        } else {
            assert_eq!(rec.survival_rate, None);
        }
        grand_total += u64::from(rec.tree_count);
    }

    let distribution = data::species_distribution(&dataset);
    assert_eq!(distribution.values().sum::<u64>(), grand_total);
    assert_eq!(
        data::aggregate(&dataset.full_view()).total_trees,
        grand_total
    );

    let sel = FilterSelection::new("Pine", 2019, "B");
    let a = data::filter(&dataset, &sel);
    let b = data::filter(&dataset, &sel);
    assert_eq!(a.indices(), b.indices());

    let again = data::load_dataset(&path, 11).unwrap();
    assert_eq!(dataset.records(), again.records());
}

#[test]
fn schema_error_lists_missing_columns() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.csv", "plot_id,species,tree_count\n1,Oak,3\n");
    let err = data::load_dataset(&path, 0).unwrap_err();
    assert!(matches!(&err, LoadError::Schema { missing } if missing == &["system", "date"]));
    assert_eq!(err.to_string(), "Missing required column(s): system, date");
}

#[test]
fn parse_error_points_at_the_row() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "bad.csv",
        "plot_id,species,system,date,tree_count\n1,Oak,A,2020-01-01,3\n7,Oak,A,31/31/2020,3\n",
    );
    let err = data::load_dataset(&path, 0).unwrap_err();
    assert!(matches!(err, LoadError::Parse { row: 2, ref column, .. } if column == "date"));
}

#[test]
fn recorded_survivors_replace_synthetic_values() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "measured.csv",
        "plot_id,species,system,date,tree_count,survived_count\n1,Oak,A,2020-01-01,10,4\n",
    );
    let dataset = data::load_dataset(&path, 99).unwrap();
    assert_eq!(dataset.records()[0].survived_count, 4);
    assert_eq!(dataset.records()[0].survival_rate, Some(40.0));
}

#[test]
fn json_source_loads_like_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "oak.json",
        r#"[
            {"plot_id": 1, "species": "Oak", "system": "A", "date": "2020-01-01", "tree_count": 10},
            {"plot_id": 2, "species": "Oak", "system": "A", "date": "2021-01-01", "tree_count": 0}
        ]"#,
    );
    let from_json = loader::load_file(&path).unwrap();
    let from_csv = loader::read_csv(OAK_CSV.as_bytes()).unwrap();
    assert_eq!(from_json, from_csv);
}

/// Write the two Oak rows as Parquet with `dates` as the `date` column.
fn write_oak_parquet(dir: &TempDir, name: &str, dates: arrow::array::ArrayRef) -> PathBuf {
    use std::sync::Arc;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    let schema = Arc::new(Schema::new(vec![
        Field::new("plot_id", DataType::Int64, false),
        Field::new("species", DataType::Utf8, false),
        Field::new("system", DataType::Utf8, false),
        Field::new("date", dates.data_type().clone(), false),
        Field::new("tree_count", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec!["Oak", "Oak"])),
            Arc::new(StringArray::from(vec!["A", "A"])),
            dates,
            Arc::new(Int64Array::from(vec![10, 0])),
        ],
    )
    .unwrap();

    let path = dir.path().join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    path
}

fn oak_dates() -> [NaiveDate; 2] {
    [
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
    ]
}

#[test]
fn parquet_source_with_native_dates() {
    use std::sync::Arc;

    use arrow::array::Date32Array;

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let days = oak_dates().map(|d| (d - epoch).num_days() as i32);

    let dir = TempDir::new().unwrap();
    let path = write_oak_parquet(&dir, "oak.parquet", Arc::new(Date32Array::from(days.to_vec())));

    let rows = loader::load_file(&path).unwrap();
    assert_eq!(rows, loader::read_csv(OAK_CSV.as_bytes()).unwrap());
}

#[test]
fn parquet_date64_and_zoned_timestamp_dates() {
    use std::sync::Arc;

    use arrow::array::{Date64Array, TimestampNanosecondArray};

    let expected = loader::read_csv(OAK_CSV.as_bytes()).unwrap();
    let dir = TempDir::new().unwrap();

    let millis = oak_dates().map(|d| d.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis());
    let path = write_oak_parquet(&dir, "date64.parquet", Arc::new(Date64Array::from(millis.to_vec())));
    assert_eq!(loader::load_file(&path).unwrap(), expected);

    // Late evening UTC, as pandas writes tz-aware datetimes.
    let nanos = oak_dates().map(|d| {
        d.and_hms_opt(23, 30, 0)
            .unwrap()
            .and_utc()
            .timestamp_nanos_opt()
            .unwrap()
    });
    let stamps = TimestampNanosecondArray::from(nanos.to_vec()).with_timezone("UTC");
    let path = write_oak_parquet(&dir, "utc.parquet", Arc::new(stamps));
    assert_eq!(loader::load_file(&path).unwrap(), expected);
}

#[test]
fn injected_source_makes_derivation_deterministic() {
    let rows = loader::read_csv(OAK_CSV.as_bytes()).unwrap();
    let mut half = |row: &PlantingRow| row.tree_count / 2;
    let dataset = metrics::derive_metrics(rows.clone(), &mut half);
    assert_eq!(dataset.records()[0].survived_count, 5);
    assert_eq!(dataset.records()[0].survival_rate, Some(50.0));

    let a = metrics::derive_metrics(rows.clone(), &mut SeededSurvival::new(3));
    let b = metrics::derive_metrics(rows, &mut SeededSurvival::new(3));
    assert_eq!(a.records(), b.records());
}

#[test]
fn report_serializes_undefined_means_as_null() {
    let rows = loader::read_csv(OAK_CSV.as_bytes()).unwrap();
    let dataset = metrics::derive_metrics(rows, &mut |_: &PlantingRow| 0u32);
    let report = Report::build(&dataset, FilterSelection::new("Oak", 2021, "A"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["records"], 1);
    assert_eq!(json["summary"]["avg_trees_per_plot"], 0.0);
    assert!(json["summary"]["avg_survival_rate"].is_null());
    assert_eq!(json["species_distribution"]["Oak"], 10);
    assert_eq!(json["time_series"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["selection"]["year"], 2021);
}
