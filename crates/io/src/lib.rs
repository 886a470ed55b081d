// File I/O operations

pub mod csv;
pub mod json;
pub mod xlsx;

use std::path::Path;

use jeongsan_recon::{ReconConfig, ReconError, Report, ReconResult, Source, Table};

/// Input formats recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Tsv,
    Workbook,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }
}

/// Read a file into a grid of cells without locating the header.
pub fn read_grid(path: &Path, source: Source) -> Result<Vec<Vec<String>>, ReconError> {
    let format = InputFormat::from_path(path).ok_or_else(|| {
        ReconError::parse(
            source,
            format!("unsupported file type: {}", path.display()),
        )
    })?;
    log::debug!("reading {} as {:?}", path.display(), format);

    let grid = match format {
        InputFormat::Csv => csv::read_grid(path),
        InputFormat::Tsv => csv::read_grid_tsv(path),
        InputFormat::Workbook => xlsx::read_grid(path),
    };
    grid.map_err(|e| ReconError::parse(source, format!("{}: {}", path.display(), e)))
}

/// Read a file into a `Table`, headers taken from `header_row` (zero-based).
pub fn read_table(path: &Path, source: Source, header_row: usize) -> Result<Table, ReconError> {
    let grid = read_grid(path, source)?;
    let table = Table::from_grid(source, grid, header_row)?;
    log::info!("{}: {} data row(s) from {}", source, table.len(), path.display());
    Ok(table)
}

/// Read an in-memory file (e.g. an upload) into a `Table`.
pub fn read_table_from_bytes(
    bytes: Vec<u8>,
    format: InputFormat,
    source: Source,
    header_row: usize,
) -> Result<Table, ReconError> {
    let grid = match format {
        InputFormat::Csv | InputFormat::Tsv => csv::grid_from_bytes(bytes),
        InputFormat::Workbook => xlsx::grid_from_bytes(bytes),
    }
    .map_err(|e| ReconError::parse(source, e))?;
    Table::from_grid(source, grid, header_row)
}

/// Load both inputs using the config's header rows.
pub fn read_inputs(
    orders: &Path,
    deposits: &Path,
    config: &ReconConfig,
) -> Result<(Table, Table), ReconError> {
    let orders = read_table(orders, Source::Orders, config.header_row(Source::Orders))?;
    let deposits = read_table(deposits, Source::Deposits, config.header_row(Source::Deposits))?;
    Ok((orders, deposits))
}

pub fn write_report(report: &Report<'_>, path: &Path) -> Result<(), ReconError> {
    xlsx::export_report(report, path).map_err(ReconError::Write)
}

pub fn write_json(result: &ReconResult, path: &Path) -> Result<(), ReconError> {
    json::export(result, path).map_err(|e| ReconError::Io(format!("{}: {}", path.display(), e)))
}
