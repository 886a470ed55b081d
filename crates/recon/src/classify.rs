use rust_decimal::Decimal;

use crate::model::{
    AggregatedDeposit, AggregatedOrder, MatchKind, MatchOutput, MatchRow, ReconViews,
};

/// Signed discrepancy: positive when the bank received more than was ordered.
pub fn difference(total_deposited: Decimal, total_paid: Decimal) -> Decimal {
    total_deposited - total_paid
}

/// Turn a pairing into rows: one per aggregated order (matched or not), then
/// one per orphan deposit.
pub fn build_rows(
    orders: &[AggregatedOrder],
    deposits: &[AggregatedDeposit],
    output: &MatchOutput,
) -> Vec<MatchRow> {
    let mut rows = Vec::with_capacity(output.pairs.len() + output.orphans.len());

    for m in &output.pairs {
        let order = &orders[m.order];
        let deposit = m.deposit.map(|di| &deposits[di]);
        let total_deposited = deposit.map(|d| d.total_deposited).unwrap_or(Decimal::ZERO);

        rows.push(MatchRow {
            buyer_name: order.buyer_name.clone(),
            site_payer_name: order.site_payer_name.clone(),
            actual_payer_name: deposit.map(|d| d.payer_name.clone()).unwrap_or_default(),
            total_paid: order.total_paid,
            total_deposited,
            difference: difference(total_deposited, order.total_paid),
            match_kind: m.kind,
            order_key: Some(order.key.clone()),
            deposit_key: deposit.map(|d| d.key.clone()),
        });
    }

    for &di in &output.orphans {
        let deposit = &deposits[di];
        rows.push(MatchRow {
            buyer_name: String::new(),
            site_payer_name: String::new(),
            actual_payer_name: deposit.payer_name.clone(),
            total_paid: Decimal::ZERO,
            total_deposited: deposit.total_deposited,
            difference: difference(deposit.total_deposited, Decimal::ZERO),
            match_kind: MatchKind::Orphan,
            order_key: None,
            deposit_key: Some(deposit.key.clone()),
        });
    }

    rows
}

/// Partition rows into B2B / non-B2B and pick the over- and underpaid B2B rows.
pub fn classify(rows: &[MatchRow]) -> ReconViews {
    let mut views = ReconViews::default();

    for (i, row) in rows.iter().enumerate() {
        if !row.is_b2b() {
            views.non_b2b.push(i);
            continue;
        }
        views.b2b.push(i);
        if row.difference > Decimal::ZERO {
            views.overpaid.push(i);
        } else if row.difference < Decimal::ZERO {
            views.underpaid.push(i);
        }
    }

    views
}
