//! Evaluation engine: the function registry, the scalar and vectorized
//! evaluators, and the built-in kernels they dispatch to.

pub mod builtins;
pub mod engine;
pub mod error;
pub mod function;
pub mod function_registry;
pub mod value;

pub mod test_support;

pub use alpha_common::{AlphaError, Arity, FuncKind, FuncSpec};
pub use error::*;
pub use function::{FuncEntry, PanelArg, ScalarFn, VectorizedFn};
pub use value::*;

use alpha_parse::ASTNode;
use engine::scalar::ScalarCtx;

/// Evaluates `node` against `bundle` at `date_idx`, producing a `Scalar` or
/// per-symbol `CrossSection`. Entry point for the per-date path; see
/// `engine::scalar` for the walk itself.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(bundle, node)))]
pub fn eval_scalar(
    bundle: &value::FieldBundle,
    date_idx: usize,
    node: &ASTNode,
) -> Result<value::ScalarValue, AlphaError> {
    let mut ctx = ScalarCtx::new(bundle, date_idx);
    engine::scalar::eval(&mut ctx, node)
}

/// Evaluates `node` against the full `bundle`, always producing a full
/// dates×symbols `Panel`. Entry point for the vectorized path; see
/// `engine::vectorized` for the walk itself. A top-level node that evaluates
/// to a bare `Scalar` (e.g. `"1 + 2"`) is broadcast over the bundle's indices
/// before returning, per the vectorized evaluator's result contract —
/// internal sub-expressions still carry `PanelValue::Scalar` unbroadcast for
/// cheap elementwise ops.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(bundle, node)))]
pub fn eval_panel(
    bundle: &value::FieldBundle,
    node: &ASTNode,
) -> Result<value::PanelValue, AlphaError> {
    match engine::vectorized::eval(bundle, node)? {
        value::PanelValue::Scalar(x) => {
            let rows = vec![vec![x; bundle.symbols.len()]; bundle.dates.len()];
            Ok(value::PanelValue::Panel(value::Panel::new(
                bundle.dates.clone(),
                bundle.symbols.clone(),
                rows,
            )))
        }
        panel @ value::PanelValue::Panel(_) => Ok(panel),
    }
}
