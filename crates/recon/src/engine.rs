use crate::aggregate::{aggregate_deposits, aggregate_orders};
use crate::classify::{build_rows, classify};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::{compute_summary, deposits_conserved, RecordCounts};
use crate::matcher::match_greedy;
use crate::model::{CoercionWarning, DepositRecord, OrderRecord, ReconMeta, ReconResult, Table};
use crate::normalize::{normalize_deposits, normalize_orders};
use crate::report::sort_rows;

/// Canonical records for one run.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub orders: Vec<OrderRecord>,
    pub deposits: Vec<DepositRecord>,
    pub warnings: Vec<CoercionWarning>,
}

impl ReconInput {
    /// Normalize both tables. Fails on the first unresolvable column.
    pub fn from_tables(
        orders: &Table,
        deposits: &Table,
        config: &ReconConfig,
    ) -> Result<Self, ReconError> {
        let orders = normalize_orders(orders, config)?;
        let deposits = normalize_deposits(deposits, config)?;

        let mut warnings = orders.warnings;
        warnings.extend(deposits.warnings);

        Ok(Self {
            orders: orders.records,
            deposits: deposits.records,
            warnings,
        })
    }
}

/// Reconcile raw order and deposit tables.
pub fn reconcile(
    orders: &Table,
    deposits: &Table,
    config: &ReconConfig,
) -> Result<ReconResult, ReconError> {
    let input = ReconInput::from_tables(orders, deposits, config)?;
    Ok(run(config, &input))
}

/// Run aggregation, matching and classification over canonical records.
pub fn run(config: &ReconConfig, input: &ReconInput) -> ReconResult {
    let orders = aggregate_orders(&input.orders);
    let deposits = aggregate_deposits(&input.deposits);

    let output = match_greedy(&orders, &deposits, &config.matching);

    let mut rows = build_rows(&orders, &deposits, &output);
    debug_assert!(deposits_conserved(&deposits, &rows));
    sort_rows(&mut rows);

    let views = classify(&rows);

    let counts = RecordCounts {
        order_records: input.orders.len(),
        deposit_records: input.deposits.len(),
        order_groups: orders.len(),
        deposit_groups: deposits.len(),
    };
    let summary = compute_summary(counts, &rows, &views, input.warnings.len());

    log::info!(
        "'{}': {} order group(s), {} deposit group(s): {} matched, {} unmatched, {} orphan",
        config.name,
        summary.order_groups,
        summary.deposit_groups,
        summary.matched(),
        summary.unmatched_orders,
        summary.orphan_deposits,
    );

    ReconResult {
        meta: ReconMeta::new(&config.name, &config.matching),
        summary,
        rows,
        views,
        warnings: input.warnings.clone(),
    }
}
