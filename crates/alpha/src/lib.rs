//! Facade crate: re-exports the alpha expression engine's building blocks
//! behind one dependency, the way downstream users are expected to consume
//! it. `alpha-common`/`alpha-parse`/`alpha-eval` remain independently
//! usable for callers that only need, say, the parser.

pub use alpha_common as common;
pub use alpha_eval as eval;
pub use alpha_parse as parse;

pub use alpha_common::{AlphaError, Arity, FuncKind, FuncSpec};
pub use alpha_eval::{eval_panel, eval_scalar};
pub use alpha_eval::value::{CrossSection, FieldBundle, Panel, PanelValue, ScalarValue};
pub use alpha_parse::{ASTNode, ASTNodeType, parse};
