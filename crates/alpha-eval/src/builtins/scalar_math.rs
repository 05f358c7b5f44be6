//! Elementwise scalar-math built-ins with an explicit NaN/zero override
//! policy (every other numeric edge case propagates NaN/inf per IEEE-754
//! without a function needing to special-case it).

use alpha_common::{AlphaError, Arity, FuncKind, FuncSpec};

use crate::engine::scalar::ScalarCtx;
use crate::function::{FuncEntry, PanelArg, ScalarFn, VectorizedFn};
use crate::function_registry::register;
use crate::value::{CrossSection, Panel, ScalarValue};

fn sdiv(a: f64, b: f64) -> f64 {
    if b == 0.0 || b.is_nan() {
        0.0
    } else {
        a / b
    }
}

struct SdivScalar;
impl ScalarFn for SdivScalar {
    fn eval_scalar(&self, _ctx: &ScalarCtx, args: &[ScalarValue]) -> Result<ScalarValue, AlphaError> {
        match (&args[0], &args[1]) {
            (ScalarValue::Scalar(a), ScalarValue::Scalar(b)) => Ok(ScalarValue::Scalar(sdiv(*a, *b))),
            (ScalarValue::CrossSection(a), ScalarValue::Scalar(b)) => {
                let values = a.values.iter().map(|x| sdiv(*x, *b)).collect();
                Ok(ScalarValue::CrossSection(CrossSection::new(
                    a.symbols.clone(),
                    values,
                )))
            }
            (ScalarValue::Scalar(a), ScalarValue::CrossSection(b)) => {
                let values = b.values.iter().map(|y| sdiv(*a, *y)).collect();
                Ok(ScalarValue::CrossSection(CrossSection::new(
                    b.symbols.clone(),
                    values,
                )))
            }
            (ScalarValue::CrossSection(a), ScalarValue::CrossSection(b)) => {
                let values = a
                    .values
                    .iter()
                    .zip(b.values.iter())
                    .map(|(x, y)| sdiv(*x, *y))
                    .collect();
                Ok(ScalarValue::CrossSection(CrossSection::new(
                    a.symbols.clone(),
                    values,
                )))
            }
        }
    }
}

struct SdivVectorized;
impl VectorizedFn for SdivVectorized {
    fn eval_panel(&self, args: &[PanelArg]) -> Result<Panel, AlphaError> {
        match (&args[0], &args[1]) {
            (PanelArg::Panel(a, _), PanelArg::Panel(b, _)) => {
                let rows = a
                    .rows()
                    .iter()
                    .zip(b.rows().iter())
                    .map(|(ra, rb)| ra.iter().zip(rb.iter()).map(|(x, y)| sdiv(*x, *y)).collect())
                    .collect();
                Ok(Panel::new(a.dates.clone(), a.symbols.clone(), rows))
            }
            (PanelArg::Panel(a, _), PanelArg::Scalar(b)) => {
                let rows = a
                    .rows()
                    .iter()
                    .map(|r| r.iter().map(|x| sdiv(*x, *b)).collect())
                    .collect();
                Ok(Panel::new(a.dates.clone(), a.symbols.clone(), rows))
            }
            (PanelArg::Scalar(a), PanelArg::Panel(b, _)) => {
                let rows = b
                    .rows()
                    .iter()
                    .map(|r| r.iter().map(|y| sdiv(*a, *y)).collect())
                    .collect();
                Ok(Panel::new(b.dates.clone(), b.symbols.clone(), rows))
            }
            (PanelArg::Scalar(_), PanelArg::Scalar(_)) => Err(AlphaError::UnsupportedVectorized {
                name: "sdiv".to_string(),
            }),
        }
    }
}

pub fn register_builtins() {
    register(FuncEntry {
        spec: FuncSpec::new(
            "sdiv",
            Arity::Exact(2),
            FuncKind::Scalar,
            "division with zero/NaN denominator returning 0.0",
        ),
        scalar: Box::new(SdivScalar),
        vectorized: Box::new(SdivVectorized),
    });
}
