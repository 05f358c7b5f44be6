//! Concrete end-to-end scenarios against one fixed synthetic bundle: 30
//! business days starting 2024-01-01, symbols A/B/C, seed 0, a Gaussian
//! `returns` field with mean 0.0 / std 0.01. Manual epsilon assertions, in
//! the teacher's own test style.

use std::sync::Once;

use chrono::NaiveDate;

use alpha_eval::test_support::SyntheticBundle;
use alpha_eval::value::{FieldBundle, PanelValue, ScalarValue};
use alpha_eval::{eval_panel, eval_scalar};
use alpha_parse::parse;

static INIT: Once = Once::new();

fn fixture() -> FieldBundle {
    INIT.call_once(alpha_eval::function_registry::init);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    SyntheticBundle::new(0, start, 30, &["A", "B", "C"])
        .with_gaussian_field("returns", 0.0, 0.01)
        .build()
}

fn close_enough(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn bundle_has_expected_shape() {
    let bundle = fixture();
    assert_eq!(bundle.dates.len(), 30);
    assert_eq!(bundle.symbols.len(), 3);
    assert!(bundle.field("returns").is_some());
}

#[test]
fn scalar_eval_of_bare_field_returns_cross_section() {
    let bundle = fixture();
    let ast = parse("returns").unwrap();
    match eval_scalar(&bundle, 10, &ast).unwrap() {
        ScalarValue::CrossSection(cs) => {
            assert_eq!(cs.symbols.len(), 3);
            assert_eq!(cs.field.as_deref(), Some("returns"));
        }
        ScalarValue::Scalar(_) => panic!("expected a cross-section"),
    }
}

#[test]
fn ts_mean_window_matches_manual_average() {
    let bundle = fixture();
    let ast = parse("ts_mean(returns, 5)").unwrap();
    let returns = bundle.field("returns").unwrap();

    for date_idx in [4usize, 10, 29] {
        let scalar_result = match eval_scalar(&bundle, date_idx, &ast).unwrap() {
            ScalarValue::CrossSection(cs) => cs.values,
            ScalarValue::Scalar(_) => panic!("expected a cross-section"),
        };
        for (sym, value) in scalar_result.iter().enumerate() {
            let lo = date_idx.saturating_sub(4);
            let expected: f64 = (lo..=date_idx).map(|t| returns.row(t)[sym]).sum::<f64>()
                / (date_idx - lo + 1) as f64;
            assert!(close_enough(*value, expected), "{value} != {expected}");
        }
    }
}

#[test]
fn scalar_and_vectorized_paths_agree_within_tolerance() {
    let bundle = fixture();
    let ast = parse("rank(ts_mean(returns, 5))").unwrap();

    let panel = match eval_panel(&bundle, &ast).unwrap() {
        PanelValue::Panel(p) => p,
        PanelValue::Scalar(_) => panic!("expected a panel"),
    };

    for date_idx in 0..bundle.dates.len() {
        let scalar_row = match eval_scalar(&bundle, date_idx, &ast).unwrap() {
            ScalarValue::CrossSection(cs) => cs.values,
            ScalarValue::Scalar(x) => vec![x; bundle.symbols.len()],
        };
        for (a, b) in scalar_row.iter().zip(panel.row(date_idx).iter()) {
            if a.is_nan() && b.is_nan() {
                continue;
            }
            assert!((a - b).abs() < 1e-6, "{a} != {b} at date {date_idx}");
        }
    }
}

#[test]
fn sdiv_is_total_including_zero_denominator() {
    let bundle = fixture();
    let ast = parse("sdiv(returns, returns - returns)").unwrap();
    match eval_scalar(&bundle, 5, &ast).unwrap() {
        ScalarValue::CrossSection(cs) => {
            assert!(cs.values.iter().all(|v| *v == 0.0));
        }
        ScalarValue::Scalar(_) => panic!("expected a cross-section"),
    }
}

#[test]
fn comparison_chain_folds_left() {
    let bundle = fixture();
    let ast = parse("1 < 2 < 0").unwrap();
    match eval_scalar(&bundle, 0, &ast).unwrap() {
        ScalarValue::Scalar(x) => assert_eq!(x, 0.0),
        ScalarValue::CrossSection(_) => panic!("expected a scalar"),
    }
}

#[test]
fn panel_eval_broadcasts_a_top_level_scalar() {
    let bundle = fixture();
    let ast = parse("1 + 2").unwrap();
    let panel = match eval_panel(&bundle, &ast).unwrap() {
        PanelValue::Panel(p) => p,
        PanelValue::Scalar(_) => panic!("top-level scalar must be broadcast to a panel"),
    };
    assert_eq!(panel.n_dates(), bundle.dates.len());
    assert_eq!(panel.n_symbols(), bundle.symbols.len());
    for row in panel.rows() {
        assert!(row.iter().all(|v| *v == 3.0));
    }
}

#[test]
fn unknown_field_is_an_error() {
    let bundle = fixture();
    let ast = parse("nonexistent_field").unwrap();
    assert!(eval_scalar(&bundle, 0, &ast).is_err());
}
