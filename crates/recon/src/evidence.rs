use rust_decimal::Decimal;

use crate::model::{AggregatedDeposit, MatchKind, MatchRow, ReconSummary, ReconViews};

/// Input and aggregate sizes for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCounts {
    pub order_records: usize,
    pub deposit_records: usize,
    pub order_groups: usize,
    pub deposit_groups: usize,
}

/// Compute summary statistics from classified rows.
pub fn compute_summary(
    counts: RecordCounts,
    rows: &[MatchRow],
    views: &ReconViews,
    coercion_warnings: usize,
) -> ReconSummary {
    let mut summary = ReconSummary {
        order_records: counts.order_records,
        deposit_records: counts.deposit_records,
        order_groups: counts.order_groups,
        deposit_groups: counts.deposit_groups,
        b2b: views.b2b.len(),
        non_b2b: views.non_b2b.len(),
        overpaid: views.overpaid.len(),
        underpaid: views.underpaid.len(),
        coercion_warnings,
        ..ReconSummary::default()
    };

    for row in rows {
        match row.match_kind {
            MatchKind::Exact => summary.matched_exact += 1,
            MatchKind::Partial => summary.matched_partial += 1,
            MatchKind::Unmatched => summary.unmatched_orders += 1,
            MatchKind::Orphan => summary.orphan_deposits += 1,
        }
        summary.total_paid += row.total_paid;
        summary.total_deposited += row.total_deposited;
        summary.total_difference += row.difference;
    }

    summary
}

/// Every aggregated deposit amount shows up in the rows exactly once.
pub fn deposits_conserved(deposits: &[AggregatedDeposit], rows: &[MatchRow]) -> bool {
    let expected: Decimal = deposits.iter().map(|d| d.total_deposited).sum();
    let actual: Decimal = rows.iter().map(|r| r.total_deposited).sum();
    let keyed = rows.iter().filter(|r| r.deposit_key.is_some()).count();
    expected == actual && keyed == deposits.len()
}
