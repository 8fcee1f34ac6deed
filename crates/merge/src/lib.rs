//! Class-roster consolidation for rollbook
//!
//! Reads a set of roster workbooks, keeps the newest version of each file,
//! normalizes every sheet (banner rows, header, cancelled rows), enriches the
//! active rows and writes one consolidated workbook with a sheet per class
//! session. Cancelled students are kept at the bottom of each sheet, struck
//! through.
//!
//! # Example
//!
//! ```no_run
//! use rollbook_merge::{consolidate_dir, MergeOptions};
//! use std::path::Path;
//!
//! let report = consolidate_dir(Path::new("rosters"), &MergeOptions::default());
//! if report.success {
//!     println!("{} sheets written", report.sheets_written);
//! }
//! for item in &report.skipped {
//!     println!("skipped {}: {}", item.name, item.reason);
//! }
//! ```

pub mod columns;
mod consolidate;
pub mod enrich;
mod error;
mod lookup;
mod metadata;
mod naming;
mod normalize;
mod options;
mod report;
mod version;

pub use consolidate::{
    consolidate, consolidate_dir, discover_inputs, Consolidator, InputSet, OutputUnit,
};
pub use error::{MergeError, MergeResult};
pub use lookup::LookupTable;
pub use metadata::{extract_metadata, SheetMetadata};
pub use naming::{base_sheet_name, clean_sheet_name};
pub use normalize::{is_cancelled, normalize, NormalizedSheet};
pub use options::{MergeOptions, DEFAULT_OUTPUT_NAME};
pub use report::{ConsolidationReport, SkipReason, SkippedItem};
pub use version::{parse_version, select_latest, VersionSelection, VersionedFile};
