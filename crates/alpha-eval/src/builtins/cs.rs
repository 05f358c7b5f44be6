//! Cross-sectional kernels: operate row-wise, across symbols at one date.

use alpha_common::{AlphaError, Arity, FuncKind, FuncSpec};

use crate::engine::scalar::ScalarCtx;
use crate::function::{FuncEntry, PanelArg, ScalarFn, VectorizedFn};
use crate::function_registry::register;
use crate::value::{CrossSection, Panel, ScalarValue};

fn cross_section_arg(args: &[ScalarValue], idx: usize, name: &str) -> Result<Vec<f64>, AlphaError> {
    match args.get(idx) {
        Some(ScalarValue::CrossSection(cs)) => Ok(cs.values.clone()),
        Some(ScalarValue::Scalar(_)) => Err(AlphaError::TypeMismatchError {
            message: format!("{name} expects a per-symbol value, got a scalar"),
        }),
        None => Err(AlphaError::TypeMismatchError {
            message: format!("{name} missing argument {idx}"),
        }),
    }
}

/// pandas-style `rank(pct=True)` with average ties: `pct = avg_rank / count`.
fn rank_row(row: &[f64]) -> Vec<f64> {
    let count = row.iter().filter(|x| !x.is_nan()).count() as f64;
    row.iter()
        .map(|x| {
            if x.is_nan() {
                return f64::NAN;
            }
            let less = row.iter().filter(|y| !y.is_nan() && **y < *x).count() as f64;
            let equal = row.iter().filter(|y| !y.is_nan() && **y == *x).count() as f64;
            let avg_rank = less + (equal + 1.0) / 2.0;
            avg_rank / count
        })
        .collect()
}

fn zscore_row(row: &[f64]) -> Vec<f64> {
    let present: Vec<f64> = row.iter().copied().filter(|x| !x.is_nan()).collect();
    if present.len() < 2 {
        return row.iter().map(|_| f64::NAN).collect();
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    let var =
        present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (present.len() as f64 - 1.0);
    let std = var.sqrt();
    row.iter()
        .map(|x| {
            if x.is_nan() {
                f64::NAN
            } else if std == 0.0 {
                f64::NAN
            } else {
                (x - mean) / std
            }
        })
        .collect()
}

fn scale_row(row: &[f64], a: f64) -> Vec<f64> {
    let denom: f64 = row.iter().filter(|x| !x.is_nan()).map(|x| x.abs()).sum();
    row.iter()
        .map(|x| {
            if x.is_nan() {
                f64::NAN
            } else if denom == 0.0 {
                f64::NAN
            } else {
                x * (a / denom)
            }
        })
        .collect()
}

macro_rules! cs_kernel {
    ($scalar_ty:ident, $vec_ty:ident, $name:literal, $row_fn:expr) => {
        struct $scalar_ty;
        impl ScalarFn for $scalar_ty {
            fn eval_scalar(
                &self,
                _ctx: &ScalarCtx,
                args: &[ScalarValue],
            ) -> Result<ScalarValue, AlphaError> {
                let row = cross_section_arg(args, 0, $name)?;
                let symbols = match &args[0] {
                    ScalarValue::CrossSection(cs) => cs.symbols.clone(),
                    _ => unreachable!(),
                };
                let f: fn(&[f64]) -> Vec<f64> = $row_fn;
                Ok(ScalarValue::CrossSection(CrossSection::new(
                    symbols,
                    f(&row),
                )))
            }
        }

        struct $vec_ty;
        impl VectorizedFn for $vec_ty {
            fn eval_panel(&self, args: &[PanelArg]) -> Result<Panel, AlphaError> {
                let panel = match args.first() {
                    Some(PanelArg::Panel(p, _)) => *p,
                    _ => {
                        return Err(AlphaError::TypeMismatchError {
                            message: format!("{} expects a panel argument", $name),
                        });
                    }
                };
                let f: fn(&[f64]) -> Vec<f64> = $row_fn;
                let rows = panel.rows().iter().map(|row| f(row)).collect();
                Ok(Panel::new(panel.dates.clone(), panel.symbols.clone(), rows))
            }
        }
    };
}

cs_kernel!(RankScalar, RankVectorized, "rank", rank_row);
cs_kernel!(ZscoreScalar, ZscoreVectorized, "zscore", zscore_row);

struct ScaleScalar;
impl ScalarFn for ScaleScalar {
    fn eval_scalar(&self, _ctx: &ScalarCtx, args: &[ScalarValue]) -> Result<ScalarValue, AlphaError> {
        let row = cross_section_arg(args, 0, "scale")?;
        let symbols = match &args[0] {
            ScalarValue::CrossSection(cs) => cs.symbols.clone(),
            _ => unreachable!(),
        };
        let a = match args.get(1) {
            Some(ScalarValue::Scalar(v)) => *v,
            None => 1.0,
            _ => {
                return Err(AlphaError::TypeMismatchError {
                    message: "scale's target argument must be a scalar".into(),
                });
            }
        };
        Ok(ScalarValue::CrossSection(CrossSection::new(
            symbols,
            scale_row(&row, a),
        )))
    }
}

struct ScaleVectorized;
impl VectorizedFn for ScaleVectorized {
    fn eval_panel(&self, args: &[PanelArg]) -> Result<Panel, AlphaError> {
        let panel = match args.first() {
            Some(PanelArg::Panel(p, _)) => *p,
            _ => {
                return Err(AlphaError::TypeMismatchError {
                    message: "scale expects a panel argument".into(),
                });
            }
        };
        let a = match args.get(1) {
            Some(PanelArg::Scalar(v)) => *v,
            None => 1.0,
            _ => {
                return Err(AlphaError::TypeMismatchError {
                    message: "scale's target argument must be a scalar".into(),
                });
            }
        };
        let rows = panel.rows().iter().map(|row| scale_row(row, a)).collect();
        Ok(Panel::new(panel.dates.clone(), panel.symbols.clone(), rows))
    }
}

pub fn register_builtins() {
    register(FuncEntry {
        spec: FuncSpec::new("rank", Arity::Exact(1), FuncKind::Cs, "cross-sectional percentile rank"),
        scalar: Box::new(RankScalar),
        vectorized: Box::new(RankVectorized),
    });
    register(FuncEntry {
        spec: FuncSpec::new("zscore", Arity::Exact(1), FuncKind::Cs, "cross-sectional z-score"),
        scalar: Box::new(ZscoreScalar),
        vectorized: Box::new(ZscoreVectorized),
    });
    register(FuncEntry {
        spec: FuncSpec::new(
            "scale",
            Arity::Range(1, 2),
            FuncKind::Cs,
            "scale to target L1 norm",
        ),
        scalar: Box::new(ScaleScalar),
        vectorized: Box::new(ScaleVectorized),
    });
}
