use jeongsan_recon::config::ReconConfig;
use jeongsan_recon::engine::reconcile;
use jeongsan_recon::evidence::deposits_conserved;
use jeongsan_recon::model::{CoercionReason, MatchKind, SheetKind, Source, StyleIntent, Table};
use jeongsan_recon::ReconResult;
use rust_decimal::Decimal;

fn orders(rows: &[(&str, &str, &str)]) -> Table {
    let mut grid = vec![vec!["buyer".to_string(), "payer".to_string(), "paid".to_string()]];
    grid.extend(
        rows.iter()
            .map(|(b, p, a)| vec![b.to_string(), p.to_string(), a.to_string()]),
    );
    Table::from_grid(Source::Orders, grid, 0).unwrap()
}

fn deposits(rows: &[(&str, &str)]) -> Table {
    let mut grid = vec![vec!["name".to_string(), "amount".to_string()]];
    grid.extend(rows.iter().map(|(n, a)| vec![n.to_string(), a.to_string()]));
    Table::from_grid(Source::Deposits, grid, 0).unwrap()
}

fn run(o: &[(&str, &str, &str)], d: &[(&str, &str)]) -> ReconResult {
    reconcile(&orders(o), &deposits(d), &ReconConfig::default()).unwrap()
}

fn in_view(result: &ReconResult, kind: SheetKind, buyer: &str) -> bool {
    result.view_rows(kind).any(|r| r.buyer_name == buyer)
}

// -------------------------------------------------------------------------
// Scenarios
// -------------------------------------------------------------------------

#[test]
fn exact_match_balanced() {
    let result = run(&[("Kim Minji", "kimminji", "10000")], &[("kimminji", "10000")]);

    assert_eq!(result.rows.len(), 1);
    let row = &result.rows[0];
    assert_eq!(row.match_kind, MatchKind::Exact);
    assert_eq!(row.actual_payer_name, "kimminji");
    assert_eq!(row.difference, Decimal::ZERO);

    assert!(in_view(&result, SheetKind::B2b, "Kim Minji"));
    assert!(!in_view(&result, SheetKind::Overpaid, "Kim Minji"));
    assert!(!in_view(&result, SheetKind::Underpaid, "Kim Minji"));
    assert!(result.views.non_b2b.is_empty());
}

#[test]
fn substring_match_balanced() {
    let result = run(&[("이호", "leeho", "5000")], &[("leehojoon", "5000")]);

    let row = &result.rows[0];
    assert_eq!(row.match_kind, MatchKind::Partial);
    assert_eq!(row.actual_payer_name, "leehojoon");
    assert_eq!(row.difference, Decimal::ZERO);
    assert_eq!(result.summary.matched(), 1);
}

#[test]
fn order_without_deposit_is_underpaid() {
    let result = run(&[("", "park", "3000")], &[]);

    let row = &result.rows[0];
    assert_eq!(row.match_kind, MatchKind::Unmatched);
    assert_eq!(row.actual_payer_name, "");
    assert_eq!(row.total_deposited, Decimal::ZERO);
    assert_eq!(row.difference, Decimal::from(-3000));

    assert_eq!(result.views.b2b, vec![0]);
    assert_eq!(result.views.underpaid, vec![0]);
}

#[test]
fn deposit_without_order_is_non_b2b() {
    let result = run(&[], &[("choi", "7000")]);

    let row = &result.rows[0];
    assert_eq!(row.match_kind, MatchKind::Orphan);
    assert_eq!(row.buyer_name, "");
    assert_eq!(row.site_payer_name, "");
    assert_eq!(row.total_paid, Decimal::ZERO);
    assert_eq!(row.difference, Decimal::from(7000));

    assert_eq!(result.views.non_b2b, vec![0]);
    assert!(result.views.b2b.is_empty());
    assert!(result.views.overpaid.is_empty());

    let report = result.report();
    let non_b2b = &report.sheets[1];
    assert_eq!(non_b2b.kind, SheetKind::NonB2b);
    assert_eq!(non_b2b.rows[0].difference_style, StyleIntent::HighlightPositive);
}

#[test]
fn split_orders_sum_before_matching() {
    let result = run(
        &[("홍길동", "hong", "1000"), ("홍길동", "hong", "2000")],
        &[("hong", "3000")],
    );

    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0].total_paid, Decimal::from(3000));
    assert_eq!(result.rows[0].difference, Decimal::ZERO);
    assert_eq!(result.summary.order_records, 2);
    assert_eq!(result.summary.order_groups, 1);
}

// -------------------------------------------------------------------------
// Policies
// -------------------------------------------------------------------------

#[test]
fn blank_payer_is_not_matched_by_default() {
    let result = run(&[("무명", "", "1000")], &[("kim", "1000")]);
    assert_eq!(result.summary.unmatched_orders, 1);
    assert_eq!(result.summary.orphan_deposits, 1);
}

#[test]
fn blank_payer_matches_anything_when_allowed() {
    let config = ReconConfig::from_toml("[matching]\nempty_keys = \"match_any\"\n").unwrap();
    let result = reconcile(
        &orders(&[("무명", "", "1000")]),
        &deposits(&[("kim", "1000")]),
        &config,
    )
    .unwrap();
    assert_eq!(result.summary.matched_partial, 1);
    assert_eq!(result.summary.orphan_deposits, 0);
    assert!(result.meta.empty_keys == jeongsan_recon::EmptyKeyPolicy::MatchAny);
}

#[test]
fn prefer_exact_changes_pairing() {
    let o = [("A", "kim", "100"), ("B", "kimminji", "200")];
    let d = [("kimminji", "200"), ("kimsoo", "100")];

    let greedy = run(&o, &d);
    assert_eq!(greedy.summary.unmatched_orders, 1);
    assert_eq!(greedy.summary.orphan_deposits, 1);

    let config = ReconConfig::from_toml("[matching]\nprefer_exact = true\n").unwrap();
    let exact_first = reconcile(&orders(&o), &deposits(&d), &config).unwrap();
    assert_eq!(exact_first.summary.matched_exact, 1);
    assert_eq!(exact_first.summary.matched_partial, 1);
    assert_eq!(exact_first.summary.orphan_deposits, 0);
    assert!(exact_first.views.overpaid.is_empty());
    assert!(exact_first.views.underpaid.is_empty());
}

// -------------------------------------------------------------------------
// Whole-table behaviour
// -------------------------------------------------------------------------

#[test]
fn mixed_ledger() {
    let result = run(
        &[
            ("최민수", "최민수", "50000"),
            ("김하나", "김 하나", "12000"),
            ("김하나", "김하나", "8000"),
            ("정우성", "정우성", "30000"),
            ("오지은", "오지은", "not a number"),
        ],
        &[
            ("김하나", "25000"),
            ("최민수(주)", "50000"),
            ("정우성", "10000"),
            ("정우성", "10,000"),
            ("알수없음", "1234"),
        ],
    );

    let s = &result.summary;
    assert_eq!(s.order_groups, 4);
    assert_eq!(s.deposit_groups, 4);
    assert_eq!(s.matched_exact, 2);
    assert_eq!(s.matched_partial, 1);
    assert_eq!(s.unmatched_orders, 1);
    assert_eq!(s.orphan_deposits, 1);
    assert_eq!(s.coercion_warnings, 1);

    let kim = result.rows.iter().find(|r| r.buyer_name == "김하나").unwrap();
    assert_eq!(kim.difference, Decimal::from(5000));
    assert!(in_view(&result, SheetKind::Overpaid, "김하나"));

    let jung = result.rows.iter().find(|r| r.buyer_name == "정우성").unwrap();
    assert_eq!(jung.total_deposited, Decimal::from(20000));
    assert!(in_view(&result, SheetKind::Underpaid, "정우성"));

    // zero-amount order with no deposit: difference 0, in neither subset
    let oh = result.rows.iter().find(|r| r.buyer_name == "오지은").unwrap();
    assert_eq!(oh.difference, Decimal::ZERO);
    assert!(!in_view(&result, SheetKind::Overpaid, "오지은"));
    assert!(!in_view(&result, SheetKind::Underpaid, "오지은"));

    assert_eq!(s.total_deposited, Decimal::from(25000 + 50000 + 20000 + 1234));
}

#[test]
fn rows_sorted_by_buyer() {
    let result = run(
        &[("다", "c", "1"), ("가", "a", "1"), ("나", "b", "1")],
        &[("zz", "5")],
    );
    let buyers: Vec<&str> = result.rows.iter().map(|r| r.buyer_name.as_str()).collect();
    assert_eq!(buyers, vec!["", "가", "나", "다"]);
}

#[test]
fn result_serializes_without_keys() {
    let result = run(&[("Kim", "kim", "100")], &[("kim", "100")]);
    let json = serde_json::to_value(&result).unwrap();
    let row = &json["rows"][0];
    assert_eq!(row["buyer_name"], "Kim");
    assert_eq!(row["match_kind"], "exact");
    assert!(row.get("order_key").is_none());
    assert_eq!(json["summary"]["matched_exact"], 1);
    assert_eq!(json["meta"]["empty_keys"], "exclude");
}

#[test]
fn deposit_amounts_conserved() {
    let o = [("a", "kim", "1"), ("b", "lee", "2")];
    let d = [("kim", "10"), ("kimlee", "20"), ("park", "30")];
    let config = ReconConfig::default();
    let input = jeongsan_recon::ReconInput::from_tables(&orders(&o), &deposits(&d), &config).unwrap();
    let deposits_agg = jeongsan_recon::aggregate::aggregate_deposits(&input.deposits);
    let result = jeongsan_recon::run(&config, &input);
    assert!(deposits_conserved(&deposits_agg, &result.rows));
}

#[test]
fn oversized_amounts_count_as_zero() {
    let huge = "79228162514264337593543950335";
    let result = run(
        &[("a", "kim", huge), ("a", "kim", huge), ("b", "lee", "1,000,000,000,000,000")],
        &[("kim", "5000"), ("lee", "1000000000000000"), ("lee", "1000000000000000")],
    );

    assert_eq!(result.summary.coercion_warnings, 2);
    assert!(result
        .warnings
        .iter()
        .all(|w| w.source == Source::Orders && w.reason == CoercionReason::TooLarge));

    let a = result.rows.iter().find(|r| r.buyer_name == "a").unwrap();
    assert_eq!(a.total_paid, Decimal::ZERO);
    assert_eq!(a.total_deposited, Decimal::from(5000));

    let b = result.rows.iter().find(|r| r.buyer_name == "b").unwrap();
    assert_eq!(b.total_deposited, Decimal::from(2_000_000_000_000_000i64));
    assert_eq!(b.difference, Decimal::from(1_000_000_000_000_000i64));
}
