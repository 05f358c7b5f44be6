//! The callable surface every built-in registers under. Each function has
//! exactly one `FuncKind` (ts/cs/scalar) and supplies the evaluation path
//! that kind needs — there is no capability-negotiation layer here, unlike
//! a general-purpose spreadsheet engine with many interchangeable fast
//! paths: the scalar and vectorized evaluators each call a fixed method by
//! name, known statically from the node being evaluated.

use alpha_common::{AlphaError, FuncSpec};

use crate::engine::scalar::ScalarCtx;
use crate::value::{Panel, ScalarValue};

/// Per-date evaluation: a `Call` node's already-evaluated arguments, the
/// bundle/date they were evaluated against, producing one `ScalarValue`.
/// Time-series kernels need `ctx` to look up the originating panel's history
/// beyond the single date `args` carries.
pub trait ScalarFn: Send + Sync + 'static {
    fn eval_scalar(&self, ctx: &ScalarCtx, args: &[ScalarValue]) -> Result<ScalarValue, AlphaError>;
}

/// Full-panel evaluation: a `Call` node's already-evaluated panel arguments,
/// producing one `PanelValue`-shaped `Panel`. Returns
/// `AlphaError::UnsupportedVectorized` when this function has no closed-form
/// kernel, signalling the driver to fall back to the per-date scalar path.
pub trait VectorizedFn: Send + Sync + 'static {
    fn eval_panel(&self, args: &[PanelArg]) -> Result<Panel, AlphaError>;
}

/// A vectorized argument: either a broadcast scalar or a full panel (with
/// its field tag, when it originated from a bare `Name`).
pub enum PanelArg<'a> {
    Scalar(f64),
    Panel(&'a Panel, Option<&'a str>),
}

/// One registry entry: metadata plus both evaluation paths. A function with
/// no closed-form panel kernel still supplies a `vectorized` impl — one whose
/// `eval_panel` always returns `UnsupportedVectorized`, so the driver falls
/// back to looping the scalar path over every date.
pub struct FuncEntry {
    pub spec: FuncSpec,
    pub scalar: Box<dyn ScalarFn>,
    pub vectorized: Box<dyn VectorizedFn>,
}
