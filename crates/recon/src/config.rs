use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{Field, Source};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation settings. Every section is optional; omitted sections fall
/// back to the built-in site-export / bank-statement layout.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub orders: OrdersConfig,
    #[serde(default)]
    pub deposits: DepositsConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            orders: OrdersConfig::default(),
            deposits: DepositsConfig::default(),
            matching: MatchingConfig::default(),
        }
    }
}

fn default_name() -> String {
    "정산".into()
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersConfig {
    /// Zero-based row holding the column headers.
    #[serde(default)]
    pub header_row: usize,
    #[serde(default)]
    pub columns: OrderColumns,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepositsConfig {
    #[serde(default)]
    pub header_row: usize,
    #[serde(default)]
    pub columns: DepositColumns,
}

/// A spec given in TOML replaces the default for that field entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderColumns {
    #[serde(default = "default_order_buyer")]
    pub buyer: ColumnSpec,
    #[serde(default = "default_order_payer")]
    pub payer: ColumnSpec,
    #[serde(default = "default_order_amount")]
    pub amount: ColumnSpec,
}

impl Default for OrderColumns {
    fn default() -> Self {
        Self {
            buyer: default_order_buyer(),
            payer: default_order_payer(),
            amount: default_order_amount(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepositColumns {
    #[serde(default = "default_deposit_payer")]
    pub payer: ColumnSpec,
    #[serde(default = "default_deposit_amount")]
    pub amount: ColumnSpec,
}

impl Default for DepositColumns {
    fn default() -> Self {
        Self {
            payer: default_deposit_payer(),
            amount: default_deposit_amount(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column spec
// ---------------------------------------------------------------------------

/// How to find one canonical field among a table's headers.
///
/// Resolution order: exact header names, then case-insensitive keyword
/// substrings, then the positional index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ColumnSpec {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub position: Option<usize>,
}

impl ColumnSpec {
    fn new(headers: &[&str], keywords: &[&str], position: Option<usize>) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.keywords.is_empty() && self.position.is_none()
    }
}

fn default_order_buyer() -> ColumnSpec {
    ColumnSpec::new(&["주문자"], &["주문자", "buyer", "orderer"], Some(1))
}

fn default_order_payer() -> ColumnSpec {
    ColumnSpec::new(&["입금자"], &["입금자", "payer", "depositor"], None)
}

fn default_order_amount() -> ColumnSpec {
    ColumnSpec::new(
        &["총 결제 금액"],
        &["결제 금액", "결제금액", "amount", "paid"],
        Some(5),
    )
}

fn default_deposit_payer() -> ColumnSpec {
    ColumnSpec::new(
        &["내용"],
        &["입금자", "보낸분", "내용", "적요", "payer", "name"],
        None,
    )
}

fn default_deposit_amount() -> ColumnSpec {
    ColumnSpec::new(
        &["입금액"],
        &["입금액", "입금금액", "맡기신", "deposit", "amount"],
        None,
    )
}

// ---------------------------------------------------------------------------
// Matching policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingConfig {
    /// Run an exact-key pass over all orders before the substring pass.
    #[serde(default)]
    pub prefer_exact: bool,
    #[serde(default)]
    pub empty_keys: EmptyKeyPolicy,
}

/// Whether an empty comparison key takes part in substring matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyKeyPolicy {
    /// Empty keys never match.
    #[default]
    Exclude,
    /// Empty keys match everything (vacuous substring).
    MatchAny,
}

impl std::fmt::Display for EmptyKeyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exclude => write!(f, "exclude"),
            Self::MatchAny => write!(f, "match_any"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Column specs per source, in the order fields are resolved.
    pub fn column_specs(&self, source: Source) -> Vec<(Field, &ColumnSpec)> {
        match source {
            Source::Orders => vec![
                (Field::Buyer, &self.orders.columns.buyer),
                (Field::Payer, &self.orders.columns.payer),
                (Field::Amount, &self.orders.columns.amount),
            ],
            Source::Deposits => vec![
                (Field::Payer, &self.deposits.columns.payer),
                (Field::Amount, &self.deposits.columns.amount),
            ],
        }
    }

    pub fn header_row(&self, source: Source) -> usize {
        match source {
            Source::Orders => self.orders.header_row,
            Source::Deposits => self.deposits.header_row,
        }
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        for source in [Source::Orders, Source::Deposits] {
            for (field, spec) in self.column_specs(source) {
                if spec.is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "{source}.columns.{field}: at least one of headers, keywords or position is required"
                    )));
                }
                if spec.headers.iter().any(|h| h.trim().is_empty()) {
                    return Err(ReconError::ConfigValidation(format!(
                        "{source}.columns.{field}: header names must not be blank"
                    )));
                }
                if spec.keywords.iter().any(|k| k.trim().is_empty()) {
                    return Err(ReconError::ConfigValidation(format!(
                        "{source}.columns.{field}: keywords must not be blank"
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name = "5월 정산"

[orders]
header_row = 2

[orders.columns.buyer]
headers = ["Buyer"]
position = 0

[orders.columns.payer]
keywords = ["depositor"]

[deposits.columns.payer]
headers = ["보낸분"]

[matching]
prefer_exact = true
empty_keys = "match_any"
"#;

    #[test]
    fn parse_full() {
        let config = ReconConfig::from_toml(FULL).unwrap();
        assert_eq!(config.name, "5월 정산");
        assert_eq!(config.header_row(Source::Orders), 2);
        assert_eq!(config.header_row(Source::Deposits), 0);
        assert_eq!(config.orders.columns.buyer.headers, vec!["Buyer"]);
        assert_eq!(config.orders.columns.buyer.position, Some(0));
        assert!(config.orders.columns.buyer.keywords.is_empty());
        assert_eq!(config.orders.columns.payer.keywords, vec!["depositor"]);
        assert!(config.matching.prefer_exact);
        assert_eq!(config.matching.empty_keys, EmptyKeyPolicy::MatchAny);
    }

    #[test]
    fn omitted_fields_keep_defaults() {
        let config = ReconConfig::from_toml(FULL).unwrap();
        // amount was not overridden
        assert_eq!(config.orders.columns.amount, default_order_amount());
        assert_eq!(config.deposits.columns.amount, default_deposit_amount());
    }

    #[test]
    fn empty_document_is_default() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.name, "정산");
        assert!(!config.matching.prefer_exact);
        assert_eq!(config.matching.empty_keys, EmptyKeyPolicy::Exclude);
        assert_eq!(config.orders.columns.buyer.position, Some(1));
        assert_eq!(config.orders.columns.amount.position, Some(5));
        assert_eq!(config.column_specs(Source::Orders).len(), 3);
        assert_eq!(config.column_specs(Source::Deposits).len(), 2);
    }

    #[test]
    fn reject_empty_spec() {
        let input = r#"
[deposits.columns.amount]
headers = []
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("deposits.columns.amount"));
    }

    #[test]
    fn reject_blank_keyword() {
        let input = r#"
[orders.columns.payer]
keywords = ["입금자", " "]
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("keywords must not be blank"));
    }

    #[test]
    fn reject_unknown_empty_key_policy() {
        let input = r#"
[matching]
empty_keys = "sometimes"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
