use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{EmptyKeyPolicy, MatchingConfig};
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Sources + fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Orders,
    Deposits,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orders => write!(f, "orders"),
            Self::Deposits => write!(f, "deposits"),
        }
    }
}

/// Canonical fields a source table must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Buyer,
    Payer,
    Amount,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyer => f.pad("buyer"),
            Self::Payer => f.pad("payer"),
            Self::Amount => f.pad("amount"),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// One data row of a source table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// 1-based row number in the original sheet.
    pub line: usize,
    pub cells: Vec<String>,
}

/// Header list plus string rows, as produced by the tabular reader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Build a table from a raw cell grid, taking headers from `header_row`
    /// (zero-based). Blank rows below the header are dropped and short rows
    /// are padded to the header width.
    pub fn from_grid(
        source: Source,
        grid: Vec<Vec<String>>,
        header_row: usize,
    ) -> Result<Self, ReconError> {
        let mut lines = grid.into_iter().enumerate().skip(header_row);

        let headers: Vec<String> = match lines.next() {
            Some((_, cells)) => cells.into_iter().map(|h| h.trim().to_string()).collect(),
            None => {
                return Err(ReconError::parse(
                    source,
                    format!("no header row at row {}", header_row + 1),
                ))
            }
        };

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ReconError::parse(
                source,
                format!("header row {} is empty", header_row + 1),
            ));
        }

        let width = headers.len();
        let rows = lines
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(idx, mut cells)| {
                cells.resize(width.max(cells.len()), String::new());
                TableRow { line: idx + 1, cells }
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Comparison key
// ---------------------------------------------------------------------------

/// Whitespace-free identity derived from a display name. Used for grouping
/// and matching only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ComparisonKey(String);

impl ComparisonKey {
    pub fn from_name(name: &str) -> Self {
        Self(name.chars().filter(|c| !c.is_whitespace()).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One key is a substring of the other (equality included).
    pub fn is_compatible(&self, other: &ComparisonKey, empty_keys: EmptyKeyPolicy) -> bool {
        if (self.is_empty() || other.is_empty()) && empty_keys == EmptyKeyPolicy::Exclude {
            return false;
        }
        self.0.contains(other.as_str()) || other.0.contains(self.as_str())
    }
}

impl fmt::Display for ComparisonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub buyer_name: String,
    pub site_payer_name: String,
    pub key: ComparisonKey,
    pub paid: Decimal,
    pub source_row: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepositRecord {
    pub payer_name: String,
    pub key: ComparisonKey,
    pub deposited: Decimal,
    pub source_row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionReason {
    Missing,
    NotNumeric,
    Negative,
    TooLarge,
}

/// An amount cell that was defaulted to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionWarning {
    pub source: Source,
    pub row: usize,
    pub column: String,
    pub value: String,
    pub reason: CoercionReason,
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            CoercionReason::Missing => "missing amount",
            CoercionReason::NotNumeric => "non-numeric amount",
            CoercionReason::Negative => "negative amount",
            CoercionReason::TooLarge => "out-of-range amount",
        };
        write!(
            f,
            "{}, row {}, column '{}': {reason} '{}' counted as 0",
            self.source, self.row, self.column, self.value
        )
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedOrder {
    pub key: ComparisonKey,
    pub buyer_name: String,
    pub site_payer_name: String,
    pub total_paid: Decimal,
    pub source_rows: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedDeposit {
    pub key: ComparisonKey,
    pub payer_name: String,
    pub total_deposited: Decimal,
    pub source_rows: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Order and deposit keys are identical.
    Exact,
    /// One key is a proper substring of the other.
    Partial,
    /// Order with no compatible deposit.
    Unmatched,
    /// Deposit no order consumed.
    Orphan,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Partial => write!(f, "partial"),
            Self::Unmatched => write!(f, "unmatched"),
            Self::Orphan => write!(f, "orphan"),
        }
    }
}

/// Pairing decision for one aggregated order, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderMatch {
    pub order: usize,
    pub deposit: Option<usize>,
    pub kind: MatchKind,
}

#[derive(Debug, Default)]
pub struct MatchOutput {
    /// One entry per aggregated order, in order insertion order.
    pub pairs: Vec<OrderMatch>,
    /// Unconsumed deposit indices, in aggregation order.
    pub orphans: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Rows + views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRow {
    pub buyer_name: String,
    pub site_payer_name: String,
    pub actual_payer_name: String,
    pub total_paid: Decimal,
    pub total_deposited: Decimal,
    pub difference: Decimal,
    pub match_kind: MatchKind,
    #[serde(skip)]
    pub order_key: Option<ComparisonKey>,
    #[serde(skip)]
    pub deposit_key: Option<ComparisonKey>,
}

impl MatchRow {
    /// Row originated from an order (matched or not).
    pub fn is_b2b(&self) -> bool {
        !self.buyer_name.is_empty() || !self.site_payer_name.is_empty()
    }
}

/// Index views over `ReconResult::rows`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconViews {
    pub b2b: Vec<usize>,
    pub non_b2b: Vec<usize>,
    pub overpaid: Vec<usize>,
    pub underpaid: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleIntent {
    None,
    HighlightPositive,
    AlertNegative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    B2b,
    NonB2b,
    Overpaid,
    Underpaid,
}

impl SheetKind {
    pub const ALL: [SheetKind; 4] = [Self::B2b, Self::NonB2b, Self::Overpaid, Self::Underpaid];

    /// Fixed sheet name in the output workbook.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Self::B2b => "B2B",
            Self::NonB2b => "B2B 이외",
            Self::Overpaid => "B2B_더 입금된 건들",
            Self::Underpaid => "B2B_덜 입금된 건들",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportRow<'a> {
    pub row: &'a MatchRow,
    pub buyer_style: StyleIntent,
    pub difference_style: StyleIntent,
}

#[derive(Debug, Clone)]
pub struct ReportSheet<'a> {
    pub kind: SheetKind,
    pub rows: Vec<ReportRow<'a>>,
}

impl ReportSheet<'_> {
    pub fn name(&self) -> &'static str {
        self.kind.sheet_name()
    }
}

#[derive(Debug, Clone)]
pub struct Report<'a> {
    pub sheets: Vec<ReportSheet<'a>>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub order_records: usize,
    pub deposit_records: usize,
    pub order_groups: usize,
    pub deposit_groups: usize,
    pub matched_exact: usize,
    pub matched_partial: usize,
    pub unmatched_orders: usize,
    pub orphan_deposits: usize,
    pub b2b: usize,
    pub non_b2b: usize,
    pub overpaid: usize,
    pub underpaid: usize,
    pub total_paid: Decimal,
    pub total_deposited: Decimal,
    pub total_difference: Decimal,
    pub coercion_warnings: usize,
}

impl ReconSummary {
    pub fn matched(&self) -> usize {
        self.matched_exact + self.matched_partial
    }

    /// Any order row with a non-zero difference, or any orphan deposit.
    pub fn has_discrepancies(&self) -> bool {
        self.overpaid > 0 || self.underpaid > 0 || self.non_b2b > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub prefer_exact: bool,
    pub empty_keys: EmptyKeyPolicy,
}

impl ReconMeta {
    pub fn new(config_name: &str, matching: &MatchingConfig) -> Self {
        Self {
            config_name: config_name.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            prefer_exact: matching.prefer_exact,
            empty_keys: matching.empty_keys,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    /// All rows, sorted by buyer name.
    pub rows: Vec<MatchRow>,
    pub views: ReconViews,
    pub warnings: Vec<CoercionWarning>,
}
