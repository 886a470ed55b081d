use rust_decimal::Decimal;

use crate::model::{MatchRow, ReconResult, ReconViews, Report, ReportRow, ReportSheet, SheetKind, StyleIntent};

/// Output column headers, in order.
pub const COLUMNS: [&str; 6] = ["주문자", "입금자(사이트)", "입금자(실제)", "총 구매금액", "통장입금", "차이"];

/// Stable byte-wise sort by buyer name. Empty names (orphan deposits) sort
/// first; ties keep their matcher order.
pub fn sort_rows(rows: &mut [MatchRow]) {
    rows.sort_by(|a, b| a.buyer_name.cmp(&b.buyer_name));
}

/// Style of the difference cell, identical in every sheet.
pub fn difference_style(difference: Decimal) -> StyleIntent {
    if difference > Decimal::ZERO {
        StyleIntent::HighlightPositive
    } else if difference < Decimal::ZERO {
        StyleIntent::AlertNegative
    } else {
        StyleIntent::None
    }
}

/// Style of the buyer cell: only the over/underpaid sheets call out the buyer.
pub fn buyer_style(kind: SheetKind, difference: Decimal) -> StyleIntent {
    match kind {
        SheetKind::Overpaid if difference > Decimal::ZERO => StyleIntent::HighlightPositive,
        SheetKind::Underpaid if difference < Decimal::ZERO => StyleIntent::AlertNegative,
        _ => StyleIntent::None,
    }
}

fn view(views: &ReconViews, kind: SheetKind) -> &[usize] {
    match kind {
        SheetKind::B2b => &views.b2b,
        SheetKind::NonB2b => &views.non_b2b,
        SheetKind::Overpaid => &views.overpaid,
        SheetKind::Underpaid => &views.underpaid,
    }
}

/// Shape the four sheets, in fixed order, with per-cell style intents.
pub fn assemble<'a>(rows: &'a [MatchRow], views: &ReconViews) -> Report<'a> {
    let sheets = SheetKind::ALL
        .iter()
        .map(|&kind| ReportSheet {
            kind,
            rows: view(views, kind)
                .iter()
                .map(|&i| {
                    let row = &rows[i];
                    ReportRow {
                        row,
                        buyer_style: buyer_style(kind, row.difference),
                        difference_style: difference_style(row.difference),
                    }
                })
                .collect(),
        })
        .collect();

    Report { sheets }
}

impl ReconResult {
    pub fn report(&self) -> Report<'_> {
        assemble(&self.rows, &self.views)
    }

    /// Rows of one view, in sorted order.
    pub fn view_rows(&self, kind: SheetKind) -> impl Iterator<Item = &MatchRow> + '_ {
        view(&self.views, kind).iter().map(move |&i| &self.rows[i])
    }
}
