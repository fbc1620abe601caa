//! Tree-planting records: loading, survival metrics, filtering and
//! aggregation behind the dashboard.
//!
//! The [`data`] layer has no dependency on the UI and can be used on its own:
//!
//! ```no_run
//! use std::path::Path;
//! use tree_dashboard::data::{self, FilterSelection};
//!
//! let dataset = data::load_dataset(Path::new("data/merged_data.csv"), 0)?;
//! if let Some(selection) = FilterSelection::first(&dataset) {
//!     let view = data::filter(&dataset, &selection);
//!     println!("{}", data::aggregate(&view));
//! }
//! # Ok::<(), tree_dashboard::data::LoadError>(())
//! ```

pub mod config;
pub mod data;
pub mod report;
