//! Exercises the `UnsupportedVectorized` fallback contract with a synthetic
//! built-in that has no closed-form panel kernel, so the vectorized
//! evaluator has to drive the per-date scalar path and stitch the results.

use std::sync::Once;

use alpha_common::{AlphaError, Arity, FuncKind, FuncSpec};
use alpha_eval::engine::scalar::ScalarCtx;
use alpha_eval::function::{FuncEntry, PanelArg, ScalarFn, VectorizedFn};
use alpha_eval::value::{Panel, ScalarValue};
use chrono::NaiveDate;

static INIT: Once = Once::new();

struct DoubleScalar;
impl ScalarFn for DoubleScalar {
    fn eval_scalar(
        &self,
        _ctx: &ScalarCtx,
        args: &[ScalarValue],
    ) -> Result<ScalarValue, AlphaError> {
        match &args[0] {
            ScalarValue::Scalar(x) => Ok(ScalarValue::Scalar(x * 2.0)),
            ScalarValue::CrossSection(cs) => {
                let mut out = cs.clone();
                for v in out.values.iter_mut() {
                    *v *= 2.0;
                }
                Ok(ScalarValue::CrossSection(out))
            }
        }
    }
}

/// Has no closed-form panel kernel — always defers to the scalar fallback.
struct DoubleVectorizedStub;
impl VectorizedFn for DoubleVectorizedStub {
    fn eval_panel(&self, _args: &[PanelArg]) -> Result<Panel, AlphaError> {
        Err(AlphaError::UnsupportedVectorized {
            name: "double_field".to_string(),
        })
    }
}

fn init() {
    INIT.call_once(|| {
        alpha_eval::function_registry::init();
        alpha_eval::function_registry::register(FuncEntry {
            spec: FuncSpec::new(
                "double_field",
                Arity::Exact(1),
                FuncKind::Scalar,
                "test-only: doubles its argument, no vectorized kernel",
            ),
            scalar: Box::new(DoubleScalar),
            vectorized: Box::new(DoubleVectorizedStub),
        });
    });
}

fn bundle() -> alpha_eval::value::FieldBundle {
    let dates: Vec<NaiveDate> = (0..5)
        .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i))
        .collect();
    let symbols = vec!["A".to_string(), "B".to_string(), "C".to_string()];
    let mut b = alpha_eval::value::FieldBundle::new(dates, symbols);
    let rows: Vec<Vec<f64>> = (0..5)
        .map(|i| vec![i as f64, (i * 2) as f64, (i * 3) as f64])
        .collect();
    b.insert_field("returns", rows);
    b
}

#[test]
fn no_kernel_function_falls_back_to_scalar_loop() {
    init();
    let bundle = bundle();
    let ast = alpha_parse::parse("double_field(returns)").unwrap();

    let panel = match alpha_eval::eval_panel(&bundle, &ast).unwrap() {
        alpha_eval::value::PanelValue::Panel(p) => p,
        other => panic!("expected a panel, got {other:?}"),
    };

    for (i, row) in panel.rows().iter().enumerate() {
        let expected: Vec<f64> = bundle.field("returns").unwrap().row(i).iter().map(|x| x * 2.0).collect();
        assert_eq!(row, &expected);
    }
}

#[test]
fn no_kernel_function_still_works_through_scalar_entrypoint_directly() {
    init();
    let bundle = bundle();
    let ast = alpha_parse::parse("double_field(returns)").unwrap();

    match alpha_eval::eval_scalar(&bundle, 2, &ast).unwrap() {
        ScalarValue::CrossSection(cs) => assert_eq!(cs.values, vec![4.0, 8.0, 12.0]),
        other => panic!("expected a cross section, got {other:?}"),
    }
}
