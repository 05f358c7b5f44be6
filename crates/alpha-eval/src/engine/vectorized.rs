//! Full-panel evaluator: composes named kernels bottom-up over the whole
//! dates×symbols grid in one pass. Falls back to the per-date scalar
//! evaluator, date by date, whenever a `Call` has no vectorized kernel
//! (`AlphaError::UnsupportedVectorized`).

use alpha_common::AlphaError;
use alpha_parse::{ASTNode, ASTNodeType, BinaryOperator, UnaryOperator};

use crate::engine::scalar::{self, ScalarCtx};
use crate::function_registry;
use crate::value::{FieldBundle, Panel, PanelValue, ScalarValue};
use crate::function::PanelArg;

pub fn eval(bundle: &FieldBundle, node: &ASTNode) -> Result<PanelValue, AlphaError> {
    match &node.node_type {
        ASTNodeType::Number(v) => Ok(PanelValue::Scalar(*v)),
        ASTNodeType::Name(field) => {
            let panel = bundle
                .field(field)
                .ok_or_else(|| AlphaError::UnknownFieldError {
                    name: field.clone(),
                })?;
            Ok(PanelValue::Panel(panel.clone()))
        }
        ASTNodeType::UnaryOp { op, operand } => {
            let v = eval(bundle, operand)?;
            Ok(eval_unary(*op, v))
        }
        ASTNodeType::BinOp { op, left, right } => {
            let l = eval(bundle, left)?;
            let r = eval(bundle, right)?;
            Ok(eval_binop(*op, l, r))
        }
        ASTNodeType::Call { name, args } => eval_call(bundle, node, name, args),
    }
}

fn eval_call(
    bundle: &FieldBundle,
    node: &ASTNode,
    name: &str,
    args: &[ASTNode],
) -> Result<PanelValue, AlphaError> {
    let entry = function_registry::get(name)?;
    if !entry.spec.accepts_arity(args.len()) {
        return Err(AlphaError::ArityError {
            name: name.to_string(),
            got: args.len(),
            allowed: entry.spec.arity.clone(),
        });
    }
    let evaluated: Vec<PanelValue> = args
        .iter()
        .map(|a| eval(bundle, a))
        .collect::<Result<_, _>>()?;

    let field_tags: Vec<Option<String>> = args
        .iter()
        .map(|a| match &a.node_type {
            ASTNodeType::Name(f) => Some(f.clone()),
            _ => None,
        })
        .collect();

    let panel_args: Vec<PanelArg> = evaluated
        .iter()
        .zip(field_tags.iter())
        .map(|(v, tag)| match v {
            PanelValue::Scalar(x) => PanelArg::Scalar(*x),
            PanelValue::Panel(p) => PanelArg::Panel(p, tag.as_deref()),
        })
        .collect();

    match entry.vectorized.eval_panel(&panel_args) {
        Ok(panel) => Ok(PanelValue::Panel(panel)),
        Err(AlphaError::UnsupportedVectorized { .. }) => fallback_to_scalar(bundle, node),
        Err(e) => Err(e),
    }
}

/// Drives the per-date scalar evaluator across every date and stitches the
/// per-date cross-sections into a full panel. Used only when a function has
/// no closed-form vectorized kernel.
fn fallback_to_scalar(bundle: &FieldBundle, node: &ASTNode) -> Result<PanelValue, AlphaError> {
    let mut rows = Vec::with_capacity(bundle.dates.len());
    for t in 0..bundle.dates.len() {
        let mut ctx = ScalarCtx::new(bundle, t);
        match scalar::eval(&mut ctx, node)? {
            ScalarValue::Scalar(x) => rows.push(vec![x; bundle.symbols.len()]),
            ScalarValue::CrossSection(cs) => rows.push(cs.values),
        }
    }
    Ok(PanelValue::Panel(Panel::new(
        bundle.dates.clone(),
        bundle.symbols.clone(),
        rows,
    )))
}

fn eval_unary(op: UnaryOperator, v: PanelValue) -> PanelValue {
    map_elementwise(v, |x| match op {
        UnaryOperator::Plus => x,
        UnaryOperator::Neg => -x,
        UnaryOperator::Not => {
            if scalar::truthy(x) {
                0.0
            } else {
                1.0
            }
        }
    })
}

fn map_elementwise(v: PanelValue, f: impl Fn(f64) -> f64) -> PanelValue {
    match v {
        PanelValue::Scalar(x) => PanelValue::Scalar(f(x)),
        PanelValue::Panel(p) => {
            let rows = p.rows().iter().map(|r| r.iter().map(|x| f(*x)).collect()).collect();
            PanelValue::Panel(Panel::new(p.dates.clone(), p.symbols.clone(), rows))
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

fn apply_op(op: BinaryOperator, a: f64, b: f64) -> f64 {
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
        BinaryOperator::And => bool_f(scalar::truthy(a) && scalar::truthy(b)),
        BinaryOperator::Or => bool_f(scalar::truthy(a) || scalar::truthy(b)),
    }
}

/// Panels reaching a binary op always share one bundle's dates/symbols (the
/// dense shared-index precondition from spec §9), so alignment is a plain
/// elementwise zip — no outer join is needed here the way the scalar
/// evaluator needs one for its arbitrary-symbol-set cross-sections.
fn eval_binop(op: BinaryOperator, left: PanelValue, right: PanelValue) -> PanelValue {
    match (left, right) {
        (PanelValue::Scalar(a), PanelValue::Scalar(b)) => PanelValue::Scalar(apply_op(op, a, b)),
        (PanelValue::Scalar(a), PanelValue::Panel(p)) => {
            let rows = p
                .rows()
                .iter()
                .map(|r| r.iter().map(|b| apply_op(op, a, *b)).collect())
                .collect();
            PanelValue::Panel(Panel::new(p.dates.clone(), p.symbols.clone(), rows))
        }
        (PanelValue::Panel(p), PanelValue::Scalar(b)) => {
            let rows = p
                .rows()
                .iter()
                .map(|r| r.iter().map(|a| apply_op(op, *a, b)).collect())
                .collect();
            PanelValue::Panel(Panel::new(p.dates.clone(), p.symbols.clone(), rows))
        }
        (PanelValue::Panel(l), PanelValue::Panel(r)) => {
            let rows = l
                .rows()
                .iter()
                .zip(r.rows().iter())
                .map(|(lr, rr)| lr.iter().zip(rr.iter()).map(|(a, b)| apply_op(op, *a, *b)).collect())
                .collect();
            PanelValue::Panel(Panel::new(l.dates.clone(), l.symbols.clone(), rows))
        }
    }
}
