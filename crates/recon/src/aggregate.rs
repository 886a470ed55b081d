use std::collections::HashMap;

use crate::model::{AggregatedDeposit, AggregatedOrder, ComparisonKey, DepositRecord, OrderRecord};

/// Group records by comparison key, preserving the order in which keys first
/// appear. `start` builds the entity from a key's first record; `add` folds
/// every later record into it.
fn group_by_key<T, A>(
    records: &[T],
    key: impl Fn(&T) -> &ComparisonKey,
    start: impl Fn(&T) -> A,
    add: impl Fn(&mut A, &T),
) -> Vec<A> {
    let mut index: HashMap<&ComparisonKey, usize> = HashMap::new();
    let mut groups: Vec<A> = Vec::new();

    for record in records {
        match index.get(key(record)).copied() {
            Some(i) => add(&mut groups[i], record),
            None => {
                index.insert(key(record), groups.len());
                groups.push(start(record));
            }
        }
    }

    groups
}

/// One entity per distinct key: first-seen labels, summed amounts.
pub fn aggregate_orders(records: &[OrderRecord]) -> Vec<AggregatedOrder> {
    group_by_key(
        records,
        |r| &r.key,
        |r| AggregatedOrder {
            key: r.key.clone(),
            buyer_name: r.buyer_name.clone(),
            site_payer_name: r.site_payer_name.clone(),
            total_paid: r.paid,
            source_rows: vec![r.source_row],
        },
        |agg, r| {
            agg.total_paid += r.paid;
            agg.source_rows.push(r.source_row);
        },
    )
}

pub fn aggregate_deposits(records: &[DepositRecord]) -> Vec<AggregatedDeposit> {
    group_by_key(
        records,
        |r| &r.key,
        |r| AggregatedDeposit {
            key: r.key.clone(),
            payer_name: r.payer_name.clone(),
            total_deposited: r.deposited,
            source_rows: vec![r.source_row],
        },
        |agg, r| {
            agg.total_deposited += r.deposited;
            agg.source_rows.push(r.source_row);
        },
    )
}
