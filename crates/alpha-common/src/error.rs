//! Evaluation-time error taxonomy shared by the scalar and vectorized
//! evaluators.
//!
//! Parse-time failures (`alpha_parse::ParseError`) are a separate type —
//! they are produced before any evaluator runs and never need field/date/
//! arity context. This type is produced only once evaluation starts.

use std::fmt;

/// Allowed-arity description attached to `ArityError`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Range(lo, hi) => write!(f, "{lo}..={hi}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlphaError {
    /// A `Name` node referenced a field not present in the bundle.
    UnknownFieldError { name: String },
    /// A `Call` node referenced a function not present in the registry.
    UnknownFunctionError { name: String },
    /// A `Call` node supplied an argument count outside the function's
    /// declared arity.
    ArityError {
        name: String,
        got: usize,
        allowed: Arity,
    },
    /// The scalar evaluator was asked to evaluate at a date absent from a
    /// referenced field's index.
    UnknownDateError { date: String, field: String },
    /// A cross-sectional or time-series function received a `CrossSection`
    /// with no field tag (spec §3's side-channel requirement).
    MissingFieldTagError,
    /// The vectorized evaluator has no closed-form panel kernel for this
    /// function; callers fall back to the per-date scalar evaluator.
    UnsupportedVectorized { name: String },
    /// An operator or function received a value kind it cannot operate on
    /// (e.g. a cross-sectional function applied to a bare `Scalar`).
    TypeMismatchError { message: String },
}

impl fmt::Display for AlphaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFieldError { name } => write!(f, "unknown field '{name}'"),
            Self::UnknownFunctionError { name } => write!(f, "unknown function '{name}'"),
            Self::ArityError { name, got, allowed } => write!(
                f,
                "'{name}' expects {allowed} argument(s), got {got}"
            ),
            Self::UnknownDateError { date, field } => {
                write!(f, "date '{date}' not present in field '{field}'")
            }
            Self::MissingFieldTagError => {
                write!(f, "cross-section carries no field tag")
            }
            Self::UnsupportedVectorized { name } => {
                write!(f, "'{name}' has no vectorized kernel")
            }
            Self::TypeMismatchError { message } => write!(f, "type mismatch: {message}"),
        }
    }
}

impl std::error::Error for AlphaError {}
