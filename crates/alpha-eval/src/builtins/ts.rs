//! Rolling/trailing-window kernels. Windows are trailing and inclusive of
//! the current row; `min_periods` is documented per-function and enforced
//! explicitly rather than left to an underlying library's rolling-window
//! default.

use alpha_common::{AlphaError, Arity, FuncKind, FuncSpec};

use crate::engine::scalar::ScalarCtx;
use crate::function::{FuncEntry, PanelArg, ScalarFn, VectorizedFn};
use crate::function_registry::register;
use crate::value::{CrossSection, Panel, ScalarValue};

fn n_arg(args: &[ScalarValue], idx: usize, name: &str) -> Result<usize, AlphaError> {
    match args.get(idx) {
        Some(ScalarValue::Scalar(v)) if *v >= 1.0 && v.fract() == 0.0 => Ok(*v as usize),
        _ => Err(AlphaError::TypeMismatchError {
            message: format!("{name} expects a positive integer window argument"),
        }),
    }
}

/// Like `n_arg`, but accepts 0 — only `delay` allows a zero lag, per its
/// identity law `delay(x, 0) == x`.
fn lag_arg(args: &[ScalarValue], idx: usize, name: &str) -> Result<usize, AlphaError> {
    match args.get(idx) {
        Some(ScalarValue::Scalar(v)) if *v >= 0.0 && v.fract() == 0.0 => Ok(*v as usize),
        _ => Err(AlphaError::TypeMismatchError {
            message: format!("{name} expects a non-negative integer lag argument"),
        }),
    }
}

fn field_of(args: &[ScalarValue], idx: usize) -> Result<&str, AlphaError> {
    match args.get(idx) {
        Some(ScalarValue::CrossSection(cs)) => {
            cs.field.as_deref().ok_or(AlphaError::MissingFieldTagError)
        }
        _ => Err(AlphaError::MissingFieldTagError),
    }
}

fn column_window(panel: &Panel, sym: usize, date_idx: usize, n: usize) -> Vec<f64> {
    let lo = date_idx.saturating_sub(n - 1);
    (lo..=date_idx).map(|r| panel.row(r)[sym]).collect()
}

/* ───────────────────────────── delay ───────────────────────────── */

struct DelayScalar;
impl ScalarFn for DelayScalar {
    fn eval_scalar(&self, ctx: &ScalarCtx, args: &[ScalarValue]) -> Result<ScalarValue, AlphaError> {
        let field = field_of(args, 0)?;
        let n = lag_arg(args, 1, "delay")?;
        let panel = ctx.bundle.field(field).expect("field resolved by Name eval");
        let values: Vec<f64> = (0..panel.n_symbols())
            .map(|sym| {
                if ctx.date_idx >= n {
                    panel.row(ctx.date_idx - n)[sym]
                } else {
                    f64::NAN
                }
            })
            .collect();
        Ok(ScalarValue::CrossSection(CrossSection::new(
            panel.symbols.clone(),
            values,
        )))
    }
}

struct DelayVectorized;
impl VectorizedFn for DelayVectorized {
    fn eval_panel(&self, args: &[PanelArg]) -> Result<Panel, AlphaError> {
        let (panel, n) = panel_and_lag(args, "delay")?;
        let rows = (0..panel.n_dates())
            .map(|t| {
                (0..panel.n_symbols())
                    .map(|sym| {
                        if t >= n {
                            panel.row(t - n)[sym]
                        } else {
                            f64::NAN
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(Panel::new(panel.dates.clone(), panel.symbols.clone(), rows))
    }
}

fn ts_panel_and_n<'a>(args: &'a [PanelArg], name: &str) -> Result<(&'a Panel, usize), AlphaError> {
    let panel = match args.first() {
        Some(PanelArg::Panel(p, _)) => *p,
        _ => {
            return Err(AlphaError::TypeMismatchError {
                message: format!("{name} expects a panel as its first argument"),
            });
        }
    };
    let n = match args.get(1) {
        Some(PanelArg::Scalar(v)) if *v >= 1.0 && v.fract() == 0.0 => *v as usize,
        _ => {
            return Err(AlphaError::TypeMismatchError {
                message: format!("{name} expects a positive integer window argument"),
            });
        }
    };
    Ok((panel, n))
}

/// Like `ts_panel_and_n`, but accepts a 0 lag (only `delay` allows this).
fn panel_and_lag<'a>(args: &'a [PanelArg], name: &str) -> Result<(&'a Panel, usize), AlphaError> {
    let panel = match args.first() {
        Some(PanelArg::Panel(p, _)) => *p,
        _ => {
            return Err(AlphaError::TypeMismatchError {
                message: format!("{name} expects a panel as its first argument"),
            });
        }
    };
    let n = match args.get(1) {
        Some(PanelArg::Scalar(v)) if *v >= 0.0 && v.fract() == 0.0 => *v as usize,
        _ => {
            return Err(AlphaError::TypeMismatchError {
                message: format!("{name} expects a non-negative integer lag argument"),
            });
        }
    };
    Ok((panel, n))
}

fn mean_of(samples: &[f64]) -> f64 {
    let present: Vec<f64> = samples.iter().copied().filter(|x| !x.is_nan()).collect();
    if present.is_empty() {
        f64::NAN
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    }
}

fn sum_of(samples: &[f64]) -> f64 {
    let present: Vec<f64> = samples.iter().copied().filter(|x| !x.is_nan()).collect();
    if present.is_empty() {
        f64::NAN
    } else {
        present.iter().sum()
    }
}

fn sample_std(samples: &[f64]) -> f64 {
    let present: Vec<f64> = samples.iter().copied().filter(|x| !x.is_nan()).collect();
    if present.len() < 2 {
        return f64::NAN;
    }
    let m = present.iter().sum::<f64>() / present.len() as f64;
    let var = present.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (present.len() as f64 - 1.0);
    var.sqrt()
}

fn rank_frac(samples: &[f64]) -> f64 {
    let present: Vec<f64> = samples.iter().copied().filter(|x| !x.is_nan()).collect();
    if present.is_empty() {
        return f64::NAN;
    }
    let current = *samples.last().unwrap();
    if current.is_nan() {
        return f64::NAN;
    }
    let count_le = present.iter().filter(|x| **x <= current).count();
    count_le as f64 / present.len() as f64
}

macro_rules! ts_reduce_kernel {
    ($scalar_ty:ident, $vec_ty:ident, $name:literal, $reduce:expr) => {
        struct $scalar_ty;
        impl ScalarFn for $scalar_ty {
            fn eval_scalar(
                &self,
                ctx: &ScalarCtx,
                args: &[ScalarValue],
            ) -> Result<ScalarValue, AlphaError> {
                let field = field_of(args, 0)?;
                let n = n_arg(args, 1, $name)?;
                let panel = ctx.bundle.field(field).expect("field resolved by Name eval");
                let values: Vec<f64> = (0..panel.n_symbols())
                    .map(|sym| {
                        let window = column_window(panel, sym, ctx.date_idx, n);
                        let f: fn(&[f64]) -> f64 = $reduce;
                        f(&window)
                    })
                    .collect();
                Ok(ScalarValue::CrossSection(CrossSection::new(
                    panel.symbols.clone(),
                    values,
                )))
            }
        }

        struct $vec_ty;
        impl VectorizedFn for $vec_ty {
            fn eval_panel(&self, args: &[PanelArg]) -> Result<Panel, AlphaError> {
                let (panel, n) = ts_panel_and_n(args, $name)?;
                let rows = (0..panel.n_dates())
                    .map(|t| {
                        (0..panel.n_symbols())
                            .map(|sym| {
                                let window = column_window(panel, sym, t, n);
                                let f: fn(&[f64]) -> f64 = $reduce;
                                f(&window)
                            })
                            .collect()
                    })
                    .collect();
                Ok(Panel::new(panel.dates.clone(), panel.symbols.clone(), rows))
            }
        }
    };
}

ts_reduce_kernel!(TsMeanScalar, TsMeanVectorized, "ts_mean", mean_of);
ts_reduce_kernel!(TsSumScalar, TsSumVectorized, "ts_sum", sum_of);
ts_reduce_kernel!(TsStdScalar, TsStdVectorized, "ts_std", sample_std);
ts_reduce_kernel!(TsRankScalar, TsRankVectorized, "ts_rank", rank_frac);

/* ──────────────────────────── ts_corr ──────────────────────────── */

fn corr_of(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .collect();
    let m = pairs.len() as f64;
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let (sx, sy, sxx, syy, sxy) = pairs.iter().fold(
        (0.0, 0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxx, syy, sxy), (x, y)| (sx + x, sy + y, sxx + x * x, syy + y * y, sxy + x * y),
    );
    let cov = sxy - sx * sy / m;
    let var_x = sxx - sx * sx / m;
    let var_y = syy - sy * sy / m;
    if var_x <= 0.0 || var_y <= 0.0 {
        f64::NAN
    } else {
        cov / (var_x * var_y).sqrt()
    }
}

struct TsCorrScalar;
impl ScalarFn for TsCorrScalar {
    fn eval_scalar(&self, ctx: &ScalarCtx, args: &[ScalarValue]) -> Result<ScalarValue, AlphaError> {
        let fx = field_of(args, 0)?.to_string();
        let fy = field_of(args, 1)?.to_string();
        let n = n_arg(args, 2, "ts_corr")?;
        let px = ctx.bundle.field(&fx).expect("field resolved by Name eval");
        let py = ctx.bundle.field(&fy).expect("field resolved by Name eval");
        let values: Vec<f64> = (0..px.n_symbols())
            .map(|sym| {
                let wx = column_window(px, sym, ctx.date_idx, n);
                let wy = column_window(py, sym, ctx.date_idx, n);
                corr_of(&wx, &wy)
            })
            .collect();
        Ok(ScalarValue::CrossSection(CrossSection::new(
            px.symbols.clone(),
            values,
        )))
    }
}

struct TsCorrVectorized;
impl VectorizedFn for TsCorrVectorized {
    fn eval_panel(&self, args: &[PanelArg]) -> Result<Panel, AlphaError> {
        let px = match args.first() {
            Some(PanelArg::Panel(p, _)) => *p,
            _ => {
                return Err(AlphaError::TypeMismatchError {
                    message: "ts_corr expects panels".into(),
                });
            }
        };
        let py = match args.get(1) {
            Some(PanelArg::Panel(p, _)) => *p,
            _ => {
                return Err(AlphaError::TypeMismatchError {
                    message: "ts_corr expects panels".into(),
                });
            }
        };
        let n = match args.get(2) {
            Some(PanelArg::Scalar(v)) if *v >= 1.0 && v.fract() == 0.0 => *v as usize,
            _ => {
                return Err(AlphaError::TypeMismatchError {
                    message: "ts_corr expects a positive integer window argument".into(),
                });
            }
        };
        let rows = (0..px.n_dates())
            .map(|t| {
                (0..px.n_symbols())
                    .map(|sym| {
                        let wx = column_window(px, sym, t, n);
                        let wy = column_window(py, sym, t, n);
                        corr_of(&wx, &wy)
                    })
                    .collect()
            })
            .collect();
        Ok(Panel::new(px.dates.clone(), px.symbols.clone(), rows))
    }
}

/* ────────────────────────── decay_linear ───────────────────────── */

fn decay_weights(n: usize, m: usize) -> Vec<f64> {
    let s_full = (n * (n + 1)) as f64 / 2.0;
    let w_full: Vec<f64> = (1..=n).map(|i| i as f64 / s_full).collect();
    let w_last_m = &w_full[n - m..];
    let sum_m: f64 = w_last_m.iter().sum();
    w_last_m.iter().map(|w| w / sum_m).collect()
}

fn decay_of(window: &[f64], n: usize) -> f64 {
    let m = window.len().min(n);
    let weights = decay_weights(n, m);
    window
        .iter()
        .rev()
        .take(m)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .zip(weights.iter())
        .map(|(x, w)| if !x.is_nan() { *x * w } else { 0.0 })
        .sum()
}

struct DecayLinearScalar;
impl ScalarFn for DecayLinearScalar {
    fn eval_scalar(&self, ctx: &ScalarCtx, args: &[ScalarValue]) -> Result<ScalarValue, AlphaError> {
        let field = field_of(args, 0)?;
        let n = n_arg(args, 1, "decay_linear")?;
        let panel = ctx.bundle.field(field).expect("field resolved by Name eval");
        let values: Vec<f64> = (0..panel.n_symbols())
            .map(|sym| {
                let window = column_window(panel, sym, ctx.date_idx, n);
                decay_of(&window, n)
            })
            .collect();
        Ok(ScalarValue::CrossSection(CrossSection::new(
            panel.symbols.clone(),
            values,
        )))
    }
}

struct DecayLinearVectorized;
impl VectorizedFn for DecayLinearVectorized {
    fn eval_panel(&self, args: &[PanelArg]) -> Result<Panel, AlphaError> {
        let (panel, n) = ts_panel_and_n(args, "decay_linear")?;
        let rows = (0..panel.n_dates())
            .map(|t| {
                (0..panel.n_symbols())
                    .map(|sym| {
                        let window = column_window(panel, sym, t, n);
                        decay_of(&window, n)
                    })
                    .collect()
            })
            .collect();
        Ok(Panel::new(panel.dates.clone(), panel.symbols.clone(), rows))
    }
}

pub fn register_builtins() {
    register(FuncEntry {
        spec: FuncSpec::new("delay", Arity::Exact(2), FuncKind::Ts, "value n rows back"),
        scalar: Box::new(DelayScalar),
        vectorized: Box::new(DelayVectorized),
    });
    register(FuncEntry {
        spec: FuncSpec::new("ts_mean", Arity::Exact(2), FuncKind::Ts, "trailing mean"),
        scalar: Box::new(TsMeanScalar),
        vectorized: Box::new(TsMeanVectorized),
    });
    register(FuncEntry {
        spec: FuncSpec::new("ts_sum", Arity::Exact(2), FuncKind::Ts, "trailing sum"),
        scalar: Box::new(TsSumScalar),
        vectorized: Box::new(TsSumVectorized),
    });
    register(FuncEntry {
        spec: FuncSpec::new(
            "ts_std",
            Arity::Exact(2),
            FuncKind::Ts,
            "trailing sample stddev",
        ),
        scalar: Box::new(TsStdScalar),
        vectorized: Box::new(TsStdVectorized),
    });
    register(FuncEntry {
        spec: FuncSpec::new(
            "ts_rank",
            Arity::Exact(2),
            FuncKind::Ts,
            "trailing rank fraction",
        ),
        scalar: Box::new(TsRankScalar),
        vectorized: Box::new(TsRankVectorized),
    });
    register(FuncEntry {
        spec: FuncSpec::new(
            "ts_corr",
            Arity::Exact(3),
            FuncKind::Ts,
            "trailing Pearson correlation",
        ),
        scalar: Box::new(TsCorrScalar),
        vectorized: Box::new(TsCorrVectorized),
    });
    register(FuncEntry {
        spec: FuncSpec::new(
            "decay_linear",
            Arity::Exact(2),
            FuncKind::Ts,
            "linear-weighted trailing average",
        ),
        scalar: Box::new(DecayLinearScalar),
        vectorized: Box::new(DecayLinearVectorized),
    });
}
