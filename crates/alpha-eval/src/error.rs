pub use alpha_common::{AlphaError, Arity};
