use rollbook_merge::{consolidate, consolidate_dir, ConsolidationReport, MergeOptions};
use rollbook_sheet::{Book, CellValue, Sheet};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn s(text: &str) -> CellValue {
    CellValue::from(text)
}

fn n(value: i64) -> CellValue {
    CellValue::Int(value)
}

fn student(number: i64, name: &str, status: &str) -> Vec<CellValue> {
    vec![s("가람초"), n(3), n(2), n(number), s(name), s(status)]
}

/// Banner, spacer, header, then five active students and one cancellation.
fn english_roster() -> Vec<Vec<CellValue>> {
    vec![
        vec![s("영어교육")],
        vec![s("담당 교사 확인")],
        vec![s("학교명"), s("학년"), s("반"), s("번호"), s("이름"), s("상태")],
        student(5, "김민수", "신청"),
        student(3, "이서연", "신청"),
        student(2, "박지훈", "취소"),
        student(6, "최유진", "대기1"),
        student(1, "정하늘", "신청"),
        student(4, "한도윤", "신청"),
    ]
}

fn write_book(path: &Path, sheets: Vec<(&str, Vec<Vec<CellValue>>)>) {
    let mut book = Book::new();
    for (name, rows) in sheets {
        book.add_sheet(name, Sheet::from_data(rows)).unwrap();
    }
    book.save_as_xlsx(path).unwrap();
}

fn write_lookup(dir: &Path) -> PathBuf {
    let path = dir.join("수업정보.xlsx");
    write_book(
        &path,
        vec![(
            "Sheet1",
            vec![
                vec![s("교육명"), s("날짜"), s("시작"), s("종료"), s("강사"), s("장소")],
                vec![s("수학교육"), s("06-01"), s("10:00"), s("11:00"), s("박강사"), s("101호")],
                vec![s("영어교육"), s("06-15"), s("14:00"), s("15:30"), s("김강사"), s("202호")],
            ],
        )],
    );
    path
}

/// The English roster with its date and time stored as real Excel date
/// cells, the way a spreadsheet user types them into the banner.
fn write_dated_roster(path: &Path) {
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let rows = english_roster();
    for (r, row) in rows.iter().enumerate().skip(1) {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            let written = match cell {
                CellValue::Int(i) => worksheet.write_number(r, c, *i as f64),
                other => worksheet.write_string(r, c, other.as_str()),
            };
            written.unwrap();
        }
    }
    worksheet.write_string(0, 0, "영어교육").unwrap();
    worksheet
        .write_datetime_with_format(
            0,
            1,
            ExcelDateTime::from_ymd(2024, 6, 15).unwrap(),
            &Format::new().set_num_format("mm-dd"),
        )
        .unwrap();
    worksheet
        .write_datetime_with_format(
            0,
            2,
            ExcelDateTime::from_hms(14, 0, 0).unwrap(),
            &Format::new().set_num_format("hh:mm"),
        )
        .unwrap();
    workbook.save(path).unwrap();
}

fn column(sheet: &Sheet, name: &str) -> Vec<String> {
    let index = sheet
        .row(0)
        .unwrap()
        .iter()
        .position(|c| c.as_str() == name)
        .unwrap();
    sheet
        .rows()
        .skip(1)
        .map(|row| row.get(index).map(CellValue::as_str).unwrap_or_default())
        .collect()
}

fn assert_success(report: &ConsolidationReport) {
    assert!(report.success, "run failed: {:?}", report.error);
    assert!(report.error.is_none());
}

#[test]
fn test_latest_version_consolidated_with_cancellations_last() {
    let dir = tempdir().unwrap();
    let mut stale = english_roster();
    stale.truncate(4);
    write_book(&dir.path().join("반A.xlsx"), vec![("Sheet1", stale)]);
    write_book(
        &dir.path().join("반A-1.xlsx"),
        vec![
            ("Sheet1", english_roster()),
            ("메모", vec![vec![s("memo")], vec![s("")], vec![s("x")]]),
        ],
    );

    let report = consolidate_dir(dir.path(), &MergeOptions::default());
    assert_success(&report);
    assert_eq!(report.sheets_written, 1);
    assert_eq!(report.files_processed, 1);
    assert_eq!(report.excluded_versions, vec!["반A.xlsx"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "반A-1.xlsx:메모");

    let output = Book::from_xlsx(dir.path().join("통합파일_고급.xlsx")).unwrap();
    assert_eq!(output.sheet_names(), vec!["영어교육"]);
    let sheet = output.get_sheet("영어교육").unwrap();

    // Header plus 5 active and 1 cancelled row
    assert_eq!(sheet.row_count(), 7);
    assert_eq!(
        column(sheet, "이름"),
        vec!["정하늘", "이서연", "한도윤", "김민수", "최유진", "박지훈"]
    );
    assert_eq!(column(sheet, "상태")[4], "Applied (대기1)");
    assert_eq!(column(sheet, "상태")[5], "취소");
    assert_eq!(column(sheet, "학년-반-번호")[0], "3-2-1");
    // Enriched columns stay empty on the cancelled row
    assert_eq!(column(sheet, "학년-반-번호")[5], "");
}

#[test]
fn test_lookup_columns_joined_by_title() {
    let dir = tempdir().unwrap();
    write_book(&dir.path().join("반A.xlsx"), vec![("Sheet1", english_roster())]);
    write_lookup(dir.path());

    let report = consolidate_dir(dir.path(), &MergeOptions::default());
    assert_success(&report);
    // The lookup workbook is not treated as a roster
    assert_eq!(report.files_processed, 1);

    let output = Book::from_xlsx(dir.path().join("통합파일_고급.xlsx")).unwrap();
    let sheet = output.get_sheet("영어교육").unwrap();
    assert_eq!(column(sheet, "수업일")[0], "06-15");
    assert_eq!(column(sheet, "종료")[0], "15:30");
    assert_eq!(column(sheet, "주강사")[0], "김강사");
    assert_eq!(column(sheet, "장소")[4], "202호");
    assert_eq!(column(sheet, "보조강사")[0], "");
}

#[test]
fn test_same_session_in_two_files_gets_numbered() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("1반.xlsx");
    let b = dir.path().join("2반.xlsx");
    write_book(&a, vec![("Sheet1", english_roster())]);
    write_book(&b, vec![("Sheet1", english_roster())]);
    let output = dir.path().join("out.xlsx");

    // Order of the arguments does not matter
    let report = consolidate(&[b, a], None, &output, &MergeOptions::default());
    assert_success(&report);

    let book = Book::from_xlsx(&output).unwrap();
    assert_eq!(book.sheet_names(), vec!["영어교육", "영어교육_1"]);
}

#[test]
fn test_rerun_produces_identical_contents() {
    let dir = tempdir().unwrap();
    let inputs = vec![
        dir.path().join("반A.xlsx"),
        dir.path().join("반B.xlsx"),
    ];
    write_book(&inputs[0], vec![("Sheet1", english_roster())]);
    let mut math = english_roster();
    math[0] = vec![s("수학교육"), s("7월 3일"), s("9:00")];
    write_book(&inputs[1], vec![("Sheet1", math)]);
    let lookup = write_lookup(dir.path());

    let first = dir.path().join("first.xlsx");
    let second = dir.path().join("second.xlsx");
    let options = MergeOptions::default();
    assert_success(&consolidate(&inputs, Some(lookup.as_path()), &first, &options));
    assert_success(&consolidate(&inputs, Some(lookup.as_path()), &second, &options));

    let first = Book::from_xlsx(&first).unwrap();
    let second = Book::from_xlsx(&second).unwrap();
    assert_eq!(first.sheet_names(), vec!["영어교육", "수학교육_07-03_09-00"]);
    assert_eq!(first.sheet_names(), second.sheet_names());
    for (name, sheet) in first.sheets() {
        assert_eq!(sheet.data(), second.get_sheet(name).unwrap().data());
    }
}

#[test]
fn test_no_valid_sheets_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("memo.xlsx");
    write_book(&input, vec![("Sheet1", vec![vec![s("notes")], vec![s("a")], vec![s("b")]])]);
    let output = dir.path().join("out.xlsx");

    let report = consolidate(&[input], None, &output, &MergeOptions::default());
    assert!(!report.success);
    assert!(report.error.unwrap().starts_with("No valid sheets"));
    assert_eq!(report.skipped[0].reason, "no title found in first row");
    assert!(!output.exists());
}

#[test]
fn test_corrupt_file_is_skipped() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("반A.xlsx");
    let bad = dir.path().join("반B.xlsx");
    write_book(&good, vec![("Sheet1", english_roster())]);
    std::fs::write(&bad, b"not a workbook").unwrap();

    let report = consolidate(
        &[good, bad],
        None,
        &dir.path().join("out.xlsx"),
        &MergeOptions::default(),
    );
    assert_success(&report);
    assert_eq!(report.files_processed, 1);
    assert_eq!(report.skipped[0].name, "반B.xlsx");
    assert!(report.skipped[0].reason.starts_with("read failed"));
}

#[test]
fn test_banner_date_cells_name_the_sheet() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("반A.xlsx");
    write_dated_roster(&input);
    let output = dir.path().join("out.xlsx");

    let report = consolidate(&[input], None, &output, &MergeOptions::default());
    assert_success(&report);

    let book = Book::from_xlsx(&output).unwrap();
    assert_eq!(book.sheet_names(), vec!["영어교육_06-15_14-00"]);
    let sheet = book.get_sheet("영어교육_06-15_14-00").unwrap();
    assert_eq!(column(sheet, "이름")[0], "정하늘");
}

#[test]
fn test_missing_input_is_skipped_as_unreadable() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("반A.xlsx");
    let missing = dir.path().join("반B.xlsx");
    write_book(&good, vec![("Sheet1", english_roster())]);

    let report = consolidate(
        &[good, missing],
        None,
        &dir.path().join("out.xlsx"),
        &MergeOptions::default(),
    );
    assert_success(&report);
    assert_eq!(report.files_processed, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "반B.xlsx");
    assert_eq!(report.skipped[0].reason, "file is locked or unreadable");
}

#[test]
fn test_duplicate_base_names_are_reported() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("반A_2.xlsx");
    let b = dir.path().join("반A-2.xlsx");
    write_book(&a, vec![("Sheet1", english_roster())]);
    write_book(&b, vec![("Sheet1", english_roster())]);

    let report = consolidate(&[a, b], None, &dir.path().join("out.xlsx"), &MergeOptions::default());
    assert_success(&report);
    assert_eq!(report.files_processed, 1);
    assert_eq!(report.skipped[0].name, "반A_2.xlsx");
    assert!(report.skipped[0].reason.contains("duplicate base name"));
}

#[test]
fn test_output_in_use_is_fatal() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("반A.xlsx");
    write_book(&input, vec![("Sheet1", english_roster())]);
    // A directory in the output's place cannot be opened for writing
    let output = dir.path().join("out.xlsx");
    std::fs::create_dir(&output).unwrap();

    let report = consolidate(&[input], None, &output, &MergeOptions::default());
    assert!(!report.success);
    assert!(report.error.unwrap().starts_with("Output file is in use"));
}

#[test]
fn test_empty_directory_is_fatal() {
    let dir = tempdir().unwrap();
    let report = consolidate_dir(dir.path(), &MergeOptions::default());
    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some("No input spreadsheet files found"));
}
