//! Property tests for the universally-quantified invariants: `ts_mean`'s
//! windowed average, `rank`'s range and multiset preservation, `delay`'s
//! identity/composition laws, `sdiv`'s totality, the parser's pretty-print
//! round-trip, and scalar/vectorized parity.

use std::sync::Once;

use chrono::NaiveDate;
use proptest::prelude::*;

use alpha_eval::test_support::SyntheticBundle;
use alpha_eval::value::{FieldBundle, PanelValue, ScalarValue};
use alpha_eval::{eval_panel, eval_scalar};
use alpha_parse::{parse, pretty_print};

static INIT: Once = Once::new();

fn bundle_with_returns(seed: u64, n_days: usize) -> FieldBundle {
    INIT.call_once(alpha_eval::function_registry::init);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    SyntheticBundle::new(seed, start, n_days, &["A", "B", "C"])
        .with_gaussian_field("returns", 0.0, 0.01)
        .build()
}

proptest! {
    /// `ts_mean(returns, n)` at any valid date equals the manual average of
    /// the last `min(n, date_idx + 1)` samples.
    #[test]
    fn ts_mean_matches_windowed_average(seed in 0u64..50, n in 1usize..8, date_offset in 0usize..20) {
        let bundle = bundle_with_returns(seed, 25);
        let date_idx = date_offset % bundle.dates.len();
        let ast = parse(&format!("ts_mean(returns, {n})")).unwrap();
        let returns = bundle.field("returns").unwrap();

        let values = match eval_scalar(&bundle, date_idx, &ast).unwrap() {
            ScalarValue::CrossSection(cs) => cs.values,
            ScalarValue::Scalar(_) => unreachable!(),
        };
        for (sym, value) in values.iter().enumerate() {
            let lo = date_idx.saturating_sub(n - 1);
            let expected: f64 = (lo..=date_idx).map(|t| returns.row(t)[sym]).sum::<f64>()
                / (date_idx - lo + 1) as f64;
            prop_assert!((value - expected).abs() < 1e-9);
        }
    }

    /// `rank` never leaves `[0, 1]` and preserves the set of input symbols.
    #[test]
    fn rank_stays_in_unit_interval(seed in 0u64..50, date_offset in 0usize..20) {
        let bundle = bundle_with_returns(seed, 20);
        let date_idx = date_offset % bundle.dates.len();
        let ast = parse("rank(returns)").unwrap();
        let before = match eval_scalar(&bundle, date_idx, &parse("returns").unwrap()).unwrap() {
            ScalarValue::CrossSection(cs) => cs.symbols,
            ScalarValue::Scalar(_) => unreachable!(),
        };
        let ranked = match eval_scalar(&bundle, date_idx, &ast).unwrap() {
            ScalarValue::CrossSection(cs) => cs,
            ScalarValue::Scalar(_) => unreachable!(),
        };
        prop_assert_eq!(ranked.symbols.as_ref(), before.as_ref());
        for v in &ranked.values {
            prop_assert!(*v >= 0.0 - 1e-12 && *v <= 1.0 + 1e-12);
        }
    }

    /// `delay(returns, 0)` is the identity, and delaying twice composes:
    /// `delay(delay(returns, a), b) == delay(returns, a + b)` wherever both
    /// sides have enough history to be defined.
    #[test]
    fn delay_identity_and_composition(seed in 0u64..50, a in 0usize..5, b in 0usize..5) {
        let bundle = bundle_with_returns(seed, 25);
        let identity = parse("delay(returns, 0)").unwrap();
        let plain = parse("returns").unwrap();

        for date_idx in 0..bundle.dates.len() {
            let id_val = match eval_scalar(&bundle, date_idx, &identity).unwrap() {
                ScalarValue::CrossSection(cs) => cs.values,
                ScalarValue::Scalar(_) => unreachable!(),
            };
            let plain_val = match eval_scalar(&bundle, date_idx, &plain).unwrap() {
                ScalarValue::CrossSection(cs) => cs.values,
                ScalarValue::Scalar(_) => unreachable!(),
            };
            for (x, y) in id_val.iter().zip(plain_val.iter()) {
                prop_assert!((x - y).abs() < 1e-12);
            }
        }

        let composed = parse(&format!("delay(delay(returns, {a}), {b})")).unwrap();
        let direct = parse(&format!("delay(returns, {})", a + b)).unwrap();
        for date_idx in 0..bundle.dates.len() {
            let composed_val = match eval_scalar(&bundle, date_idx, &composed) {
                Ok(ScalarValue::CrossSection(cs)) => cs.values,
                Ok(ScalarValue::Scalar(_)) => unreachable!(),
                Err(_) => continue,
            };
            let direct_val = match eval_scalar(&bundle, date_idx, &direct) {
                Ok(ScalarValue::CrossSection(cs)) => cs.values,
                Ok(ScalarValue::Scalar(_)) => unreachable!(),
                Err(_) => continue,
            };
            for (x, y) in composed_val.iter().zip(direct_val.iter()) {
                if x.is_nan() && y.is_nan() {
                    continue;
                }
                prop_assert!((x - y).abs() < 1e-9);
            }
        }
    }

    /// `sdiv` is total: it never panics and never produces NaN/inf from a
    /// zero or NaN denominator.
    #[test]
    fn sdiv_is_total(a in -1e6f64..1e6, b in -1e6f64..1e6) {
        let bundle = bundle_with_returns(0, 5);
        let ast = parse(&format!("sdiv({a}, {b})")).unwrap();
        let result = match eval_scalar(&bundle, 0, &ast).unwrap() {
            ScalarValue::Scalar(x) => x,
            ScalarValue::CrossSection(_) => unreachable!(),
        };
        if b == 0.0 {
            prop_assert_eq!(result, 0.0);
        } else {
            prop_assert!(result.is_finite());
        }
    }

    /// Pretty-printing an AST and re-parsing it yields an AST whose
    /// pretty-print is a fixed point (idempotent round trip through the
    /// fully-parenthesized printer).
    #[test]
    fn pretty_print_round_trips(a in -100.0f64..100.0, b in -100.0f64..100.0, n in 1usize..10) {
        let expr = format!("ts_mean(returns, {n}) + {a} * {b}");
        let ast = parse(&expr).unwrap();
        let printed_once = pretty_print(&ast);
        let reparsed = parse(&printed_once).unwrap();
        let printed_twice = pretty_print(&reparsed);
        prop_assert_eq!(printed_once, printed_twice);
    }

    /// The scalar and vectorized evaluators agree at every date, within
    /// floating-point tolerance, for a representative composed expression.
    #[test]
    fn scalar_vectorized_parity(seed in 0u64..30) {
        let bundle = bundle_with_returns(seed, 25);
        let ast = parse("zscore(ts_std(returns, 5))").unwrap();
        let panel = match eval_panel(&bundle, &ast).unwrap() {
            PanelValue::Panel(p) => p,
            PanelValue::Scalar(_) => unreachable!(),
        };
        for date_idx in 0..bundle.dates.len() {
            let scalar_row = match eval_scalar(&bundle, date_idx, &ast).unwrap() {
                ScalarValue::CrossSection(cs) => cs.values,
                ScalarValue::Scalar(x) => vec![x; bundle.symbols.len()],
            };
            for (x, y) in scalar_row.iter().zip(panel.row(date_idx).iter()) {
                if x.is_nan() && y.is_nan() {
                    continue;
                }
                prop_assert!((x - y).abs() < 1e-6);
            }
        }
    }
}
