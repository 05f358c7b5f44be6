//! Deterministic in-memory field bundle for tests, the proptest properties,
//! and the CLI's demo mode. Mirrors the fluent `with_*` builder shape used
//! throughout this codebase's test fixtures, fixed to one synthetic
//! Gaussian-returns scenario rather than an arbitrary workbook.

use chrono::{Duration, NaiveDate, Weekday};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::value::FieldBundle;

/// 30 successive business days starting at `start`, skipping weekends —
/// the shape every end-to-end scenario in this codebase's test suite is
/// built against.
pub fn business_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut d = start;
    while dates.len() < count {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(d);
        }
        d += Duration::days(1);
    }
    dates
}

/// Box–Muller transform over a seeded `SmallRng` — avoids pulling in
/// `rand_distr` for a single Gaussian source.
fn gaussian(rng: &mut SmallRng, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + std * z
}

pub struct SyntheticBundle {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    rng: SmallRng,
    fields: Vec<(String, Vec<Vec<f64>>)>,
}

impl SyntheticBundle {
    pub fn new(seed: u64, start: NaiveDate, n_days: usize, symbols: &[&str]) -> Self {
        Self {
            dates: business_days(start, n_days),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            rng: SmallRng::seed_from_u64(seed),
            fields: Vec::new(),
        }
    }

    /// Inserts a field of i.i.d. `N(mean, std)` samples.
    pub fn with_gaussian_field(mut self, name: &str, mean: f64, std: f64) -> Self {
        let rows = (0..self.dates.len())
            .map(|_| {
                (0..self.symbols.len())
                    .map(|_| gaussian(&mut self.rng, mean, std))
                    .collect()
            })
            .collect();
        self.fields.push((name.to_string(), rows));
        self
    }

    /// Inserts a field from explicit data, bypassing the RNG (for tests
    /// that need exact, hand-written values).
    pub fn with_field(mut self, name: &str, rows: Vec<Vec<f64>>) -> Self {
        self.fields.push((name.to_string(), rows));
        self
    }

    pub fn build(self) -> FieldBundle {
        let mut bundle = FieldBundle::new(self.dates.clone(), self.symbols.clone());
        for (name, rows) in self.fields {
            bundle.insert_field(name, rows);
        }
        bundle
    }
}
