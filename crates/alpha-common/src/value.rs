//! Panel-data value kinds shared by the scalar and vectorized evaluators.
//!
//! A `FieldBundle` is the one piece of external input the engine ever reads:
//! a set of named panels (date × symbol grids) that all share one date axis
//! and one symbol axis. Evaluation never mutates a bundle — evaluators only
//! read fields out of it and hand back fresh values.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A dense date × symbol grid. Row `i` corresponds to `dates[i]`, column `j`
/// to `symbols[j]` of the owning `FieldBundle`.
#[derive(Debug, Clone)]
pub struct Panel {
    pub dates: Arc<[NaiveDate]>,
    pub symbols: Arc<[String]>,
    rows: Vec<Vec<f64>>,
}

impl Panel {
    pub fn new(dates: Arc<[NaiveDate]>, symbols: Arc<[String]>, rows: Vec<Vec<f64>>) -> Self {
        assert_eq!(rows.len(), dates.len(), "panel row count must match date axis length");
        assert!(
            rows.iter().all(|r| r.len() == symbols.len()),
            "every panel row must match the symbol axis length"
        );
        Self {
            dates,
            symbols,
            rows,
        }
    }

    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }

    pub fn row(&self, date_idx: usize) -> &[f64] {
        &self.rows[date_idx]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.iter().position(|d| *d == date)
    }

    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

/// One cross-sectional slice (all symbols, one date) of a named field, per
/// the side-channel field-tag requirement: time-series kernels need to know
/// which field a bare `Name` resolved to even after it has been wrapped in a
/// `CrossSection`.
#[derive(Debug, Clone)]
pub struct CrossSection {
    pub symbols: Arc<[String]>,
    pub values: Vec<f64>,
    pub field: Option<String>,
}

impl CrossSection {
    pub fn new(symbols: Arc<[String]>, values: Vec<f64>) -> Self {
        debug_assert_eq!(symbols.len(), values.len());
        Self {
            symbols,
            values,
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Value produced while evaluating a node against a single date in the
/// scalar evaluator: either a plain number or a tagged per-symbol slice.
#[derive(Debug, Clone)]
pub enum ScalarValue {
    Scalar(f64),
    CrossSection(CrossSection),
}

impl ScalarValue {
    pub fn as_cross_section(&self, n_symbols: usize) -> CrossSection {
        match self {
            Self::CrossSection(cs) => cs.clone(),
            Self::Scalar(x) => CrossSection {
                symbols: Arc::from(Vec::new().into_boxed_slice()) as Arc<[String]>,
                values: vec![*x; n_symbols],
                field: None,
            },
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Self::CrossSection(cs) => cs.field.as_deref(),
            Self::Scalar(_) => None,
        }
    }
}

/// Value produced while evaluating a node in the vectorized evaluator:
/// either a broadcastable scalar or a full panel.
#[derive(Debug, Clone)]
pub enum PanelValue {
    Scalar(f64),
    Panel(Panel),
}

impl PanelValue {
    pub fn field(&self) -> Option<&str> {
        None
    }
}

/// The full set of named panels an expression may reference, plus the
/// shared date/symbol axes every panel in the bundle is aligned to.
#[derive(Debug, Clone)]
pub struct FieldBundle {
    pub dates: Arc<[NaiveDate]>,
    pub symbols: Arc<[String]>,
    fields: FxHashMap<String, Panel>,
}

impl FieldBundle {
    pub fn new(dates: Vec<NaiveDate>, symbols: Vec<String>) -> Self {
        Self {
            dates: Arc::from(dates.into_boxed_slice()),
            symbols: Arc::from(symbols.into_boxed_slice()),
            fields: FxHashMap::default(),
        }
    }

    /// Inserts a field, validating that its shape matches the bundle's
    /// shared axes. Misaligned panels would silently corrupt every rolling
    /// computation downstream, so this is checked eagerly rather than left
    /// as an implicit assumption.
    pub fn insert_field(&mut self, name: impl Into<String>, rows: Vec<Vec<f64>>) {
        let panel = Panel::new(self.dates.clone(), self.symbols.clone(), rows);
        self.fields.insert(name.into(), panel);
    }

    pub fn field(&self, name: &str) -> Option<&Panel> {
        self.fields.get(name)
    }

    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.iter().position(|d| *d == date)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
