//! Per-date evaluator: given an AST, a field bundle, and a target date, walks
//! the tree bottom-up producing a `Scalar` or `CrossSection` (per-symbol
//! vector) result. Results are memoized by the sub-AST's structural key for
//! the lifetime of one call — the cache never survives across dates.

use std::collections::HashMap;

use alpha_common::AlphaError;
use alpha_parse::{ASTNode, ASTNodeType, BinaryOperator, UnaryOperator, structural_key};

use crate::function_registry;
use crate::value::{CrossSection, FieldBundle, ScalarValue};

pub struct ScalarCtx<'a> {
    pub bundle: &'a FieldBundle,
    pub date_idx: usize,
    memo: HashMap<u64, ScalarValue>,
}

impl<'a> ScalarCtx<'a> {
    pub fn new(bundle: &'a FieldBundle, date_idx: usize) -> Self {
        Self {
            bundle,
            date_idx,
            memo: HashMap::new(),
        }
    }
}

pub fn eval(ctx: &mut ScalarCtx, node: &ASTNode) -> Result<ScalarValue, AlphaError> {
    let key = structural_key(node);
    if let Some(cached) = ctx.memo.get(&key) {
        return Ok(cached.clone());
    }
    let value = eval_uncached(ctx, node)?;
    ctx.memo.insert(key, value.clone());
    Ok(value)
}

fn eval_uncached(ctx: &mut ScalarCtx, node: &ASTNode) -> Result<ScalarValue, AlphaError> {
    match &node.node_type {
        ASTNodeType::Number(v) => Ok(ScalarValue::Scalar(*v)),
        ASTNodeType::Name(field) => eval_name(ctx, field),
        ASTNodeType::UnaryOp { op, operand } => {
            let v = eval(ctx, operand)?;
            Ok(eval_unary(*op, v))
        }
        ASTNodeType::BinOp { op, left, right } => {
            let l = eval(ctx, left)?;
            let r = eval(ctx, right)?;
            Ok(eval_binop(*op, l, r))
        }
        ASTNodeType::Call { name, args } => {
            let entry = function_registry::get(name)?;
            if !entry.spec.accepts_arity(args.len()) {
                return Err(AlphaError::ArityError {
                    name: name.clone(),
                    got: args.len(),
                    allowed: entry.spec.arity.clone(),
                });
            }
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(eval(ctx, arg)?);
            }
            entry.scalar.eval_scalar(ctx, &evaluated)
        }
    }
}

fn eval_name(ctx: &ScalarCtx, field: &str) -> Result<ScalarValue, AlphaError> {
    let panel = ctx
        .bundle
        .field(field)
        .ok_or_else(|| AlphaError::UnknownFieldError {
            name: field.to_string(),
        })?;
    if ctx.date_idx >= panel.n_dates() {
        return Err(AlphaError::UnknownDateError {
            date: ctx
                .bundle
                .dates
                .get(ctx.date_idx)
                .map(|d| d.to_string())
                .unwrap_or_default(),
            field: field.to_string(),
        });
    }
    let row = panel.row(ctx.date_idx).to_vec();
    Ok(ScalarValue::CrossSection(
        CrossSection::new(panel.symbols.clone(), row).with_field(field),
    ))
}

pub fn truthy(x: f64) -> bool {
    !x.is_nan() && x != 0.0
}

fn eval_unary(op: UnaryOperator, v: ScalarValue) -> ScalarValue {
    map_elementwise(v, |x| match op {
        UnaryOperator::Plus => x,
        UnaryOperator::Neg => -x,
        UnaryOperator::Not => {
            if truthy(x) {
                0.0
            } else {
                1.0
            }
        }
    })
}

fn map_elementwise(v: ScalarValue, f: impl Fn(f64) -> f64) -> ScalarValue {
    match v {
        ScalarValue::Scalar(x) => ScalarValue::Scalar(f(x)),
        ScalarValue::CrossSection(cs) => {
            let values = cs.values.iter().map(|x| f(*x)).collect();
            ScalarValue::CrossSection(CrossSection::new(cs.symbols, values))
        }
    }
}

/// Aligns two operands per spec §4.3: two cross-sections outer-join on
/// symbol labels (missing side → NaN), a cross-section and a scalar
/// broadcast the scalar, two scalars stay scalar.
fn eval_binop(op: BinaryOperator, left: ScalarValue, right: ScalarValue) -> ScalarValue {
    let apply = |op: BinaryOperator, a: f64, b: f64| -> f64 {
        match op {
            BinaryOperator::Add => a + b,
            BinaryOperator::Sub => a - b,
            BinaryOperator::Mul => a * b,
            BinaryOperator::Div => a / b,
            BinaryOperator::Mod => a % b,
            BinaryOperator::Pow => a.powf(b),
            BinaryOperator::Eq => bool_f(a == b),
            BinaryOperator::Ne => bool_f(a != b),
            BinaryOperator::Gt => bool_f(a > b),
            BinaryOperator::Ge => bool_f(a >= b),
            BinaryOperator::Lt => bool_f(a < b),
            BinaryOperator::Le => bool_f(a <= b),
            BinaryOperator::And => bool_f(truthy(a) && truthy(b)),
            BinaryOperator::Or => bool_f(truthy(a) || truthy(b)),
        }
    };

    match (left, right) {
        (ScalarValue::Scalar(a), ScalarValue::Scalar(b)) => ScalarValue::Scalar(apply(op, a, b)),
        (ScalarValue::Scalar(a), ScalarValue::CrossSection(cs)) => {
            let values = cs.values.iter().map(|b| apply(op, a, *b)).collect();
            ScalarValue::CrossSection(CrossSection::new(cs.symbols, values))
        }
        (ScalarValue::CrossSection(cs), ScalarValue::Scalar(b)) => {
            let values = cs.values.iter().map(|a| apply(op, *a, b)).collect();
            ScalarValue::CrossSection(CrossSection::new(cs.symbols, values))
        }
        (ScalarValue::CrossSection(l), ScalarValue::CrossSection(r)) => {
            outer_join(op, l, r, apply)
        }
    }
}

fn bool_f(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn outer_join(
    op: BinaryOperator,
    l: CrossSection,
    r: CrossSection,
    apply: impl Fn(BinaryOperator, f64, f64) -> f64,
) -> ScalarValue {
    let mut symbols: Vec<String> = l.symbols.iter().cloned().collect();
    for s in r.symbols.iter() {
        if !symbols.contains(s) {
            symbols.push(s.clone());
        }
    }
    let values = symbols
        .iter()
        .map(|s| {
            let a = l
                .symbols
                .iter()
                .position(|x| x == s)
                .map(|i| l.values[i])
                .unwrap_or(f64::NAN);
            let b = r
                .symbols
                .iter()
                .position(|x| x == s)
                .map(|i| r.values[i])
                .unwrap_or(f64::NAN);
            apply(op, a, b)
        })
        .collect();
    ScalarValue::CrossSection(CrossSection::new(
        std::sync::Arc::from(symbols.into_boxed_slice()),
        values,
    ))
}
