use crate::error::Arity;
use std::fmt;

/// Which evaluator shape a built-in function operates on: a rolling window
/// over one symbol's history (`Ts`), a slice across symbols at one date
/// (`Cs`), or a pure elementwise scalar op (`Scalar`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FuncKind {
    Ts,
    Cs,
    Scalar,
}

impl fmt::Display for FuncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ts => "ts",
            Self::Cs => "cs",
            Self::Scalar => "scalar",
        })
    }
}

/// Registry metadata for one built-in function. The registry stores these
/// behind `Arc`, keyed by the uppercased function name; `impl` fields live
/// on the concrete scalar/vectorized kernel structs, not here — `FuncSpec`
/// is pure description used for arity checks, listing, and doc display.
// Only `Serialize`, not `Deserialize`: `name`/`doc` are `&'static str`, and
// serde's derive can only deserialize a `&str` borrowed from the input, not
// conjure a `'static` one out of it.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FuncSpec {
    pub name: &'static str,
    pub arity: Arity,
    pub kind: FuncKind,
    pub doc: &'static str,
}

impl FuncSpec {
    pub const fn new(name: &'static str, arity: Arity, kind: FuncKind, doc: &'static str) -> Self {
        Self {
            name,
            arity,
            kind,
            doc,
        }
    }

    pub fn accepts_arity(&self, got: usize) -> bool {
        match &self.arity {
            Arity::Exact(n) => got == *n,
            Arity::Range(lo, hi) => got >= *lo && got <= *hi,
            Arity::AtLeast(n) => got >= *n,
        }
    }
}
