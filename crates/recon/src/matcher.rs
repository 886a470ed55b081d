use crate::config::MatchingConfig;
use crate::model::{AggregatedDeposit, AggregatedOrder, MatchKind, MatchOutput, OrderMatch};

/// Aggregated deposits plus a consumed marker per entry. Each deposit can be
/// taken at most once.
#[derive(Debug)]
pub struct DepositPool<'a> {
    deposits: &'a [AggregatedDeposit],
    consumed: Vec<bool>,
}

impl<'a> DepositPool<'a> {
    pub fn new(deposits: &'a [AggregatedDeposit]) -> Self {
        Self {
            deposits,
            consumed: vec![false; deposits.len()],
        }
    }

    /// Consume the first available deposit, in aggregation order, that
    /// `accept` admits.
    pub fn take_first(&mut self, accept: impl Fn(&AggregatedDeposit) -> bool) -> Option<usize> {
        let idx = self
            .deposits
            .iter()
            .enumerate()
            .position(|(i, d)| !self.consumed[i] && accept(d))?;
        self.consumed[idx] = true;
        Some(idx)
    }

    pub fn is_consumed(&self, idx: usize) -> bool {
        self.consumed[idx]
    }

    pub fn available(&self) -> usize {
        self.consumed.iter().filter(|c| !**c).count()
    }

    /// Indices never taken, in aggregation order.
    pub fn into_remaining(self) -> Vec<usize> {
        self.consumed
            .iter()
            .enumerate()
            .filter(|(_, consumed)| !**consumed)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Pair each order with at most one deposit from `pool`, orders in the given
/// order. First compatible deposit wins; with `prefer_exact` an exact-key pass
/// over every order runs before the substring pass.
pub fn match_orders(
    orders: &[AggregatedOrder],
    pool: &mut DepositPool<'_>,
    matching: &MatchingConfig,
) -> Vec<OrderMatch> {
    let policy = matching.empty_keys;
    let mut taken: Vec<Option<usize>> = vec![None; orders.len()];

    if matching.prefer_exact {
        for (oi, order) in orders.iter().enumerate() {
            taken[oi] = pool.take_first(|d| d.key == order.key && order.key.is_compatible(&d.key, policy));
        }
    }

    for (oi, order) in orders.iter().enumerate() {
        if taken[oi].is_none() {
            taken[oi] = pool.take_first(|d| order.key.is_compatible(&d.key, policy));
        }
    }

    taken
        .into_iter()
        .enumerate()
        .map(|(oi, deposit)| {
            let kind = match deposit {
                Some(di) if pool.deposits[di].key == orders[oi].key => MatchKind::Exact,
                Some(_) => MatchKind::Partial,
                None => MatchKind::Unmatched,
            };
            match deposit {
                Some(di) => log::debug!(
                    "order '{}' -> deposit '{}' ({kind})",
                    orders[oi].key,
                    pool.deposits[di].key
                ),
                None => log::debug!("order '{}' unmatched", orders[oi].key),
            }
            OrderMatch { order: oi, deposit, kind }
        })
        .collect()
}

/// Greedy substring matching with at-most-once deposit consumption.
pub fn match_greedy(
    orders: &[AggregatedOrder],
    deposits: &[AggregatedDeposit],
    matching: &MatchingConfig,
) -> MatchOutput {
    let mut pool = DepositPool::new(deposits);
    let pairs = match_orders(orders, &mut pool, matching);
    log::debug!("{} deposit(s) left unconsumed", pool.available());
    MatchOutput {
        pairs,
        orphans: pool.into_remaining(),
    }
}
