// Excel import (xlsx, xlsm, xls, xlsb, ods) and styled report export

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use jeongsan_recon::model::{MatchRow, ReportRow};
use jeongsan_recon::report::COLUMNS;
use jeongsan_recon::{Report, StyleIntent};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook, Worksheet, XlsxError};

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Read the first sheet of a workbook into a grid of display strings.
pub fn read_grid(path: &Path) -> Result<Vec<Vec<String>>, String> {
    let workbook = open_workbook_auto(path).map_err(|e| format!("failed to open workbook: {}", e))?;
    first_sheet_grid(workbook)
}

pub fn grid_from_bytes(bytes: Vec<u8>) -> Result<Vec<Vec<String>>, String> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| format!("failed to open workbook: {}", e))?;
    first_sheet_grid(workbook)
}

fn first_sheet_grid<RS: Read + Seek>(mut workbook: Sheets<RS>) -> Result<Vec<Vec<String>>, String> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "workbook contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("failed to read sheet '{}': {}", sheet_name, e))?;
    log::debug!("reading sheet '{}' ({:?})", sheet_name, range.get_size());

    // calamine trims leading empty rows/columns; restore them so line numbers
    // and positional column rules match what the user sees in Excel.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut grid: Vec<Vec<String>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![String::new(); col_offset];
        cells.extend(row.iter().map(cell_text));
        grid.push(cells);
    }

    Ok(grid)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => format_number(*n),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Integers without decimals: amounts stored as floats come back as "15000".
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Column widths for the six report columns, in Excel character units.
const COLUMN_WIDTHS: [f64; 6] = [14.0, 16.0, 16.0, 14.0, 14.0, 12.0];

const AMOUNT_FORMAT: &str = "#,##0";
const ALERT_RED: u32 = 0xFF0000;

/// Formats shared by every sheet, built once per workbook.
struct ReportFormats {
    header: Format,
    amount: Format,
    buyer_highlight: Format,
    buyer_alert: Format,
    difference_highlight: Format,
    difference_alert: Format,
}

impl ReportFormats {
    fn new() -> Self {
        let amount = Format::new().set_num_format(AMOUNT_FORMAT);
        Self {
            header: Format::new().set_bold(),
            buyer_highlight: Format::new().set_bold(),
            buyer_alert: Format::new().set_bold().set_font_color(Color::RGB(ALERT_RED)),
            difference_highlight: amount
                .clone()
                .set_bold()
                .set_background_color(Color::Yellow),
            difference_alert: amount.clone().set_bold().set_font_color(Color::RGB(ALERT_RED)),
            amount,
        }
    }

    fn buyer(&self, intent: StyleIntent) -> Option<&Format> {
        match intent {
            StyleIntent::None => None,
            StyleIntent::HighlightPositive => Some(&self.buyer_highlight),
            StyleIntent::AlertNegative => Some(&self.buyer_alert),
        }
    }

    fn difference(&self, intent: StyleIntent) -> &Format {
        match intent {
            StyleIntent::None => &self.amount,
            StyleIntent::HighlightPositive => &self.difference_highlight,
            StyleIntent::AlertNegative => &self.difference_alert,
        }
    }
}

/// Write the report as a styled workbook, one worksheet per sheet.
pub fn export_report(report: &Report<'_>, path: &Path) -> Result<(), String> {
    let mut workbook = build_workbook(report).map_err(|e| format!("failed to build workbook: {}", e))?;
    workbook
        .save(path)
        .map_err(|e| format!("failed to save XLSX file: {}", e))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

pub fn report_to_buffer(report: &Report<'_>) -> Result<Vec<u8>, String> {
    let mut workbook = build_workbook(report).map_err(|e| format!("failed to build workbook: {}", e))?;
    workbook
        .save_to_buffer()
        .map_err(|e| format!("failed to serialize XLSX: {}", e))
}

fn build_workbook(report: &Report<'_>) -> Result<XlsxWorkbook, XlsxError> {
    let formats = ReportFormats::new();
    let mut workbook = XlsxWorkbook::new();

    for sheet in &report.sheets {
        let worksheet = workbook.add_worksheet().set_name(sheet.name())?;

        for (col, header) in COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &formats.header)?;
            worksheet.set_column_width(col as u16, COLUMN_WIDTHS[col])?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        for (i, report_row) in sheet.rows.iter().enumerate() {
            write_row(worksheet, i as u32 + 1, report_row, &formats)?;
        }
    }

    Ok(workbook)
}

fn write_row(
    worksheet: &mut Worksheet,
    row: u32,
    report_row: &ReportRow<'_>,
    formats: &ReportFormats,
) -> Result<(), XlsxError> {
    let MatchRow {
        buyer_name,
        site_payer_name,
        actual_payer_name,
        total_paid,
        total_deposited,
        difference,
        ..
    } = report_row.row;

    match formats.buyer(report_row.buyer_style) {
        Some(format) => worksheet.write_string_with_format(row, 0, buyer_name, format)?,
        None => worksheet.write_string(row, 0, buyer_name)?,
    };
    worksheet.write_string(row, 1, site_payer_name)?;
    worksheet.write_string(row, 2, actual_payer_name)?;
    worksheet.write_number_with_format(row, 3, to_f64(*total_paid), &formats.amount)?;
    worksheet.write_number_with_format(row, 4, to_f64(*total_deposited), &formats.amount)?;
    worksheet.write_number_with_format(
        row,
        5,
        to_f64(*difference),
        formats.difference(report_row.difference_style),
    )?;

    Ok(())
}

fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jeongsan_recon::model::{Source, Table};
    use jeongsan_recon::{reconcile, ReconConfig};
    use tempfile::tempdir;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn sample_result() -> jeongsan_recon::ReconResult {
        let orders = Table::from_grid(
            Source::Orders,
            grid(&[
                &["주문자", "입금자", "총 결제 금액"],
                &["김민지", "김민지", "10000"],
                &["이호", "이호", "8000"],
                &["박서준", "박서준", "3000"],
            ]),
            0,
        )
        .unwrap();
        let deposits = Table::from_grid(
            Source::Deposits,
            grid(&[
                &["내용", "입금액"],
                &["김민지", "12000"],
                &["이호준", "7000"],
                &["최유리", "500"],
            ]),
            0,
        )
        .unwrap();
        reconcile(&orders, &deposits, &ReconConfig::default()).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(15000.0), "15000");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(1.5), "1.5");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Float(10000.0)), "10000");
        assert_eq!(cell_text(&Data::String("김민지".into())), "김민지");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
    }

    #[test]
    fn test_export_sheet_names_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("정산결과.xlsx");

        let result = sample_result();
        export_report(&result.report(), &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(
            workbook.sheet_names().to_vec(),
            vec!["B2B", "B2B 이외", "B2B_더 입금된 건들", "B2B_덜 입금된 건들"]
        );

        let b2b = workbook.worksheet_range("B2B").unwrap();
        let header: Vec<String> = b2b.rows().next().unwrap().iter().map(cell_text).collect();
        assert_eq!(header, COLUMNS.to_vec());
        // 3 orders + header
        assert_eq!(b2b.height(), 4);

        let non_b2b = workbook.worksheet_range("B2B 이외").unwrap();
        let orphan: Vec<String> = non_b2b.rows().nth(1).unwrap().iter().map(cell_text).collect();
        assert_eq!(orphan, vec!["", "", "최유리", "0", "500", "500"]);

        let over = workbook.worksheet_range("B2B_더 입금된 건들").unwrap();
        assert_eq!(cell_text(&over.get_value((1, 0)).cloned().unwrap()), "김민지");
        assert_eq!(cell_text(&over.get_value((1, 5)).cloned().unwrap()), "2000");

        let under = workbook.worksheet_range("B2B_덜 입금된 건들").unwrap();
        // 박서준 (-3000) sorts before 이호 (-1000)
        assert_eq!(under.height(), 3);
        assert_eq!(cell_text(&under.get_value((1, 0)).cloned().unwrap()), "박서준");
    }

    #[test]
    fn test_empty_sheets_keep_header() {
        let orders = Table::from_grid(Source::Orders, grid(&[&["주문자", "입금자", "총 결제 금액"]]), 0).unwrap();
        let deposits = Table::from_grid(Source::Deposits, grid(&[&["내용", "입금액"]]), 0).unwrap();
        let result = reconcile(&orders, &deposits, &ReconConfig::default()).unwrap();

        let bytes = report_to_buffer(&result.report()).unwrap();
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        for name in workbook.sheet_names().to_vec() {
            let range = workbook.worksheet_range(&name).unwrap();
            assert_eq!(range.height(), 1, "sheet {name}");
        }
    }

    #[test]
    fn test_read_grid_keeps_leading_offset() {
        let mut book = XlsxWorkbook::new();
        let sheet = book.add_worksheet();
        sheet.write_string(2, 1, "내용").unwrap();
        sheet.write_string(2, 2, "입금액").unwrap();
        sheet.write_string(3, 1, "김민지").unwrap();
        sheet.write_number(3, 2, 15000.0).unwrap();
        let bytes = book.save_to_buffer().unwrap();

        let grid = grid_from_bytes(bytes).unwrap();
        assert_eq!(grid.len(), 4);
        assert!(grid[0].is_empty());
        assert_eq!(grid[2], vec!["", "내용", "입금액"]);
        assert_eq!(grid[3], vec!["", "김민지", "15000"]);
    }
}
