use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::config::{ColumnSpec, ReconConfig};
use crate::error::ReconError;
use crate::model::{
    CoercionReason, CoercionWarning, ComparisonKey, DepositRecord, Field, OrderRecord, Source,
    Table, TableRow,
};

// ---------------------------------------------------------------------------
// Column detection
// ---------------------------------------------------------------------------

/// One predicate that may locate a canonical field among the headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRule {
    /// Header equals the name (both trimmed).
    Header(String),
    /// Header contains the keyword, case-insensitive.
    Contains(String),
    /// Column at a fixed zero-based index.
    Position(usize),
}

impl ColumnRule {
    pub fn resolve(&self, headers: &[String]) -> Option<usize> {
        match self {
            Self::Header(name) => headers.iter().position(|h| h.trim() == name.trim()),
            Self::Contains(keyword) => {
                let needle = keyword.to_lowercase();
                headers.iter().position(|h| h.to_lowercase().contains(&needle))
            }
            Self::Position(idx) => (*idx < headers.len()).then_some(*idx),
        }
    }
}

impl fmt::Display for ColumnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(name) => write!(f, "header \"{name}\""),
            Self::Contains(keyword) => write!(f, "keyword \"{keyword}\""),
            Self::Position(idx) => write!(f, "position {idx}"),
        }
    }
}

/// Expand a spec into its prioritized rule list.
pub fn rules_for(spec: &ColumnSpec) -> Vec<ColumnRule> {
    spec.headers
        .iter()
        .map(|h| ColumnRule::Header(h.clone()))
        .chain(spec.keywords.iter().map(|k| ColumnRule::Contains(k.clone())))
        .chain(spec.position.map(ColumnRule::Position))
        .collect()
}

/// First rule of `spec` that locates a column, with the index it found.
pub fn resolve_spec(spec: &ColumnSpec, headers: &[String]) -> Option<(usize, ColumnRule)> {
    rules_for(spec)
        .into_iter()
        .find_map(|rule| rule.resolve(headers).map(|idx| (idx, rule)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnResolution {
    pub field: Field,
    pub index: usize,
    pub header: String,
    pub rule: ColumnRule,
}

/// Resolve every required field of `source` against the table headers.
pub fn resolve_columns(
    source: Source,
    table: &Table,
    config: &ReconConfig,
) -> Result<Vec<ColumnResolution>, ReconError> {
    config
        .column_specs(source)
        .into_iter()
        .map(|(field, spec)| {
            match resolve_spec(spec, &table.headers) {
                Some((index, rule)) => {
                    log::debug!(
                        "{source}.{field}: column {index} \"{}\" via {rule}",
                        table.headers[index]
                    );
                    Ok(ColumnResolution {
                        field,
                        index,
                        header: table.headers[index].clone(),
                        rule,
                    })
                }
                None => Err(ReconError::Schema {
                    source,
                    field,
                    headers: table.headers.clone(),
                }),
            }
        })
        .collect()
}

fn column_of<'a>(
    source: Source,
    table: &Table,
    columns: &'a [ColumnResolution],
    field: Field,
) -> Result<&'a ColumnResolution, ReconError> {
    columns
        .iter()
        .find(|c| c.field == field)
        .ok_or_else(|| ReconError::Schema {
            source,
            field,
            headers: table.headers.clone(),
        })
}

// ---------------------------------------------------------------------------
// Amount coercion
// ---------------------------------------------------------------------------

/// Largest amount a single cell may carry. Keeps every group sum and
/// difference far below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Parse an amount cell. Grouping commas, a leading `₩` and a trailing `원`
/// are accepted.
pub fn coerce_amount(raw: &str) -> Result<Decimal, CoercionReason> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('₩').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('원').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return Err(CoercionReason::Missing);
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    let value = Decimal::from_str(&cleaned).map_err(|_| CoercionReason::NotNumeric)?;
    if value < Decimal::ZERO {
        return Err(CoercionReason::Negative);
    }
    if value > MAX_AMOUNT {
        return Err(CoercionReason::TooLarge);
    }
    Ok(value.normalize())
}

fn amount_or_zero(
    source: Source,
    row: &TableRow,
    column: &ColumnResolution,
    warnings: &mut Vec<CoercionWarning>,
) -> Decimal {
    let raw = cell(row, column.index);
    match coerce_amount(raw) {
        Ok(value) => value,
        Err(reason) => {
            let warning = CoercionWarning {
                source,
                row: row.line,
                column: column.header.clone(),
                value: raw.to_string(),
                reason,
            };
            log::warn!("{warning}");
            warnings.push(warning);
            Decimal::ZERO
        }
    }
}

fn cell(row: &TableRow, idx: usize) -> &str {
    row.cells.get(idx).map(String::as_str).unwrap_or("")
}

fn name(row: &TableRow, idx: usize) -> String {
    cell(row, idx).trim().to_string()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub warnings: Vec<CoercionWarning>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

pub fn normalize_orders(
    table: &Table,
    config: &ReconConfig,
) -> Result<Normalized<OrderRecord>, ReconError> {
    let columns = resolve_columns(Source::Orders, table, config)?;
    let buyer = column_of(Source::Orders, table, &columns, Field::Buyer)?;
    let payer = column_of(Source::Orders, table, &columns, Field::Payer)?;
    let amount = column_of(Source::Orders, table, &columns, Field::Amount)?;

    let mut out = Normalized::default();
    for row in &table.rows {
        let site_payer_name = name(row, payer.index);
        out.records.push(OrderRecord {
            buyer_name: name(row, buyer.index),
            key: ComparisonKey::from_name(&site_payer_name),
            site_payer_name,
            paid: amount_or_zero(Source::Orders, row, amount, &mut out.warnings),
            source_row: row.line,
        });
    }
    Ok(out)
}

pub fn normalize_deposits(
    table: &Table,
    config: &ReconConfig,
) -> Result<Normalized<DepositRecord>, ReconError> {
    let columns = resolve_columns(Source::Deposits, table, config)?;
    let payer = column_of(Source::Deposits, table, &columns, Field::Payer)?;
    let amount = column_of(Source::Deposits, table, &columns, Field::Amount)?;

    let mut out = Normalized::default();
    for row in &table.rows {
        let payer_name = name(row, payer.index);
        out.records.push(DepositRecord {
            key: ComparisonKey::from_name(&payer_name),
            payer_name,
            deposited: amount_or_zero(Source::Deposits, row, amount, &mut out.warnings),
            source_row: row.line,
        });
    }
    Ok(out)
}
