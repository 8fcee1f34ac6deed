//! The consolidation run: discovery, version selection, per-sheet processing
//! and the final write.

use crate::enrich::enrich;
use crate::error::{MergeError, MergeResult};
use crate::lookup::LookupTable;
use crate::metadata::{extract_metadata, SheetMetadata};
use crate::naming::{base_sheet_name, clean_sheet_name};
use crate::normalize::normalize;
use crate::options::MergeOptions;
use crate::report::{ConsolidationReport, SkipReason};
use crate::version::{select_latest, VersionedFile};
use indexmap::IndexMap;
use rollbook_sheet::{Book, Sheet, SheetError};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// One processed roster sheet, ready to be placed in the output book.
#[derive(Debug, Clone)]
pub struct OutputUnit {
    pub sheet_name: String,
    pub metadata: SheetMetadata,
    /// Enriched active rows
    pub data: Sheet,
    pub cancelled: Sheet,
    /// `file.xlsx:Sheet`
    pub source: String,
    /// Discovery order, assigned by [`Consolidator::push`]
    pub order: usize,
}

impl OutputUnit {
    #[must_use]
    pub fn new(metadata: SheetMetadata, data: Sheet, cancelled: Sheet, source: &str) -> Self {
        Self {
            sheet_name: base_sheet_name(&metadata),
            metadata,
            data,
            cancelled,
            source: source.to_string(),
            order: 0,
        }
    }

    /// Active rows followed by the cancelled rows, the latter struck through
    ///
    /// # Errors
    ///
    /// Returns error if a struck row is out of range.
    pub fn into_sheet(self) -> rollbook_sheet::Result<Sheet> {
        let mut sheet = self.data;
        let start = sheet.append_rows(&self.cancelled);
        for row in start..sheet.row_count() {
            sheet.strike_row(row)?;
        }
        Ok(sheet)
    }
}

/// Collects output units grouped by title, then date.
#[derive(Debug, Default)]
pub struct Consolidator {
    groups: IndexMap<String, IndexMap<String, Vec<OutputUnit>>>,
    next_order: usize,
}

impl Consolidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mut unit: OutputUnit) {
        unit.order = self.next_order;
        self.next_order += 1;
        self.groups
            .entry(unit.metadata.title.clone())
            .or_default()
            .entry(unit.metadata.date_key().to_string())
            .or_default()
            .push(unit);
    }

    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.next_order
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next_order == 0
    }

    /// Lay every unit out as a sheet of a new book.
    ///
    /// Units sharing a title and date are numbered `_1`, `_2`, ... after the
    /// first, and any remaining name clash is resolved by the book.
    ///
    /// # Errors
    ///
    /// Returns error if a sheet cannot be assembled.
    pub fn finish(self) -> rollbook_sheet::Result<Book> {
        let mut book = Book::new();
        for (_, dates) in self.groups {
            for (_, mut units) in dates {
                units.sort_by_key(|u| u.order);
                for (i, unit) in units.into_iter().enumerate() {
                    let wanted = if i == 0 {
                        unit.sheet_name.clone()
                    } else {
                        clean_sheet_name(&format!("{}*{i}", unit.sheet_name))
                    };
                    let name = book.unique_sheet_name(&wanted);
                    tracing::info!("{} -> {}", unit.source, name);
                    book.add_sheet(&name, unit.into_sheet()?)?;
                }
            }
        }
        Ok(book)
    }
}

/// Files found in an input directory.
#[derive(Debug, Clone, Default)]
pub struct InputSet {
    pub inputs: Vec<PathBuf>,
    pub lookup: Option<PathBuf>,
    pub output: PathBuf,
}

impl InputSet {
    /// Use an explicitly chosen lookup workbook instead of the discovered one.
    ///
    /// A discovered class-info file stays out of `inputs`: it is never a
    /// roster, so replacing it means it is not read at all.
    pub fn override_lookup(&mut self, lookup: PathBuf) {
        if let Some(found) = self.lookup.take() {
            if !same_file(&found, &lookup) {
                tracing::warn!(
                    "Lookup file {} not used; {} was given instead",
                    file_name_of(&found),
                    lookup.display()
                );
            }
        }
        self.lookup = Some(lookup);
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Find roster workbooks, the lookup workbook and the output path in `dir`.
///
/// # Errors
///
/// Returns error if the directory cannot be listed.
pub fn discover_inputs(dir: &Path, options: &MergeOptions) -> MergeResult<InputSet> {
    let entries = fs::read_dir(dir).map_err(|source| MergeError::InputDirectory {
        path: dir.display().to_string(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| options.accepts_extension(e))
        })
        // Excel owner files for documents open elsewhere
        .filter(|p| !file_name_of(p).starts_with("~$"))
        .collect();
    files.sort_by_key(|p| file_name_of(p));

    let output = dir.join(&options.output_name);
    files.retain(|p| !same_file(p, &output));

    let lookup = files
        .iter()
        .position(|p| {
            let is_xlsx = p
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
            is_xlsx && file_name_of(p).contains(&options.lookup_marker)
        })
        .map(|i| files.remove(i));

    match &lookup {
        Some(path) => tracing::info!("Lookup file: {}", file_name_of(path)),
        None => tracing::info!(
            "No lookup file (an .xlsx whose name contains '{}')",
            options.lookup_marker
        ),
    }

    Ok(InputSet {
        inputs: files,
        lookup,
        output,
    })
}

/// Turn every sheet of one input file into output units.
///
/// Returns `true` if at least one unit was produced.
fn process_file(
    file: &VersionedFile,
    lookup: Option<&LookupTable>,
    options: &MergeOptions,
    consolidator: &mut Consolidator,
    report: &mut ConsolidationReport,
) -> bool {
    if File::open(&file.path).is_err() {
        report.skip(&file.file_name, &SkipReason::Unreadable);
        return false;
    }

    let book = match Book::from_xlsx(&file.path) {
        Ok(book) => book,
        Err(SheetError::EmptyWorkbook { .. }) => {
            report.skip(&file.file_name, &SkipReason::NoData);
            return false;
        }
        Err(e) => {
            report.skip(&file.file_name, &SkipReason::ReadFailed(e.to_string()));
            return false;
        }
    };

    tracing::info!("Processing {} ({} sheets)", book.name(), book.sheet_count());
    let mut produced = false;
    for (sheet_name, raw) in book.sheets() {
        let source = format!("{}:{}", file.file_name, sheet_name);

        let Some(metadata) = extract_metadata(raw) else {
            report.skip(&source, &SkipReason::NoTitle);
            continue;
        };
        let normalized = match normalize(raw, &options.cancel_marker) {
            Ok(n) => n,
            Err(reason) => {
                report.skip(&source, &reason);
                continue;
            }
        };
        if normalized.active.is_empty() {
            report.skip(&source, &SkipReason::NoActiveRows);
            continue;
        }

        let mut active = normalized.active;
        if let Err(e) = enrich(&mut active, &metadata.title, lookup, options) {
            report.skip(&source, &SkipReason::EnrichFailed(e.to_string()));
            continue;
        }

        let unit = OutputUnit::new(metadata, active, normalized.cancelled, &source);
        tracing::info!(
            "{} -> {} ({} active, {} cancelled)",
            source,
            unit.sheet_name,
            unit.data.row_count(),
            unit.cancelled.row_count()
        );
        consolidator.push(unit);
        produced = true;
    }
    produced
}

fn load_lookup(path: &Path) -> Option<LookupTable> {
    match LookupTable::load(path) {
        Ok(Some(table)) => {
            tracing::info!("Loaded {} lookup rows from {}", table.row_count(), path.display());
            Some(table)
        }
        Ok(None) => {
            tracing::warn!("Lookup file {} has no rows", path.display());
            None
        }
        Err(e) => {
            tracing::warn!("Lookup file {} ignored: {}", path.display(), e);
            None
        }
    }
}

fn output_in_use(path: &Path) -> bool {
    path.exists() && OpenOptions::new().append(true).open(path).is_err()
}

/// Consolidate roster workbooks into a single workbook at `output_path`.
///
/// Never panics or returns early on a bad input: unusable files and sheets
/// are listed in [`ConsolidationReport::skipped`]. The run fails, and
/// nothing is written, only when there are no inputs, the output file is in
/// use, or no sheet survives processing.
#[must_use]
pub fn consolidate(
    input_files: &[PathBuf],
    lookup_file: Option<&Path>,
    output_path: &Path,
    options: &MergeOptions,
) -> ConsolidationReport {
    let mut report = ConsolidationReport::default();

    let mut inputs: Vec<PathBuf> = input_files
        .iter()
        .filter(|p| !same_file(p, output_path))
        .filter(|p| !lookup_file.is_some_and(|l| same_file(p, l)))
        .cloned()
        .collect();
    if inputs.is_empty() {
        report.fail(MergeError::NoInputFiles);
        return report;
    }
    if output_in_use(output_path) {
        report.fail(MergeError::OutputInUse {
            path: output_path.display().to_string(),
        });
        return report;
    }
    inputs.sort_by_key(|p| file_name_of(p));
    tracing::info!("Found {} input files", inputs.len());

    let selection = select_latest(&inputs);
    report.excluded_versions = selection
        .excluded
        .iter()
        .map(|f| f.file_name.clone())
        .collect();
    for dup in &selection.duplicates {
        let kept = selection
            .winner_for(dup)
            .map(|w| w.file_name.clone())
            .unwrap_or_default();
        report.skip(&dup.file_name, &SkipReason::DuplicateBaseName { kept });
    }

    let lookup = lookup_file.and_then(load_lookup);

    let mut consolidator = Consolidator::new();
    for file in &selection.selected {
        if process_file(file, lookup.as_ref(), options, &mut consolidator, &mut report) {
            report.files_processed += 1;
        }
    }

    if consolidator.is_empty() {
        report.fail(MergeError::NoValidSheets {
            skipped: report.skipped.len(),
        });
        return report;
    }

    let written = consolidator
        .finish()
        .and_then(|book| book.save_as_xlsx(output_path));
    match written {
        Ok(write_report) => {
            for (name, reason) in &write_report.rejected {
                report.skip(name, &SkipReason::WriteRejected(reason.clone()));
            }
            report.sheets_written = write_report.written.len();
            report.success = true;
            tracing::info!(
                "Wrote {} sheets from {} files to {}",
                report.sheets_written,
                report.files_processed,
                output_path.display()
            );
        }
        Err(e) => report.fail(MergeError::from(e)),
    }
    report
}

/// Consolidate every roster workbook in `dir` into `dir/<output_name>`.
#[must_use]
pub fn consolidate_dir(dir: &Path, options: &MergeOptions) -> ConsolidationReport {
    match discover_inputs(dir, options) {
        Ok(set) => consolidate(&set.inputs, set.lookup.as_deref(), &set.output, options),
        Err(e) => {
            let mut report = ConsolidationReport::default();
            report.fail(e);
            report
        }
    }
}
