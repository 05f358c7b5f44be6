use alpha_common::{AlphaError, FuncSpec};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::function::FuncEntry;

/// Case-insensitive, process-wide function table. Both evaluators resolve
/// `Call` names through this one map — the earlier case-sensitive/
/// case-insensitive split between the two evaluators is resolved by routing
/// every lookup through the same normalized key.
static REGISTRY: Lazy<DashMap<String, Arc<FuncEntry>>> = Lazy::new(DashMap::new);

#[inline]
fn norm(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// Registers one function. Duplicate registration overwrites the previous
/// entry (last-writer-wins at init), matching the registry contract.
pub fn register(entry: FuncEntry) {
    REGISTRY.insert(norm(entry.spec.name), Arc::new(entry));
}

pub fn get(name: &str) -> Result<Arc<FuncEntry>, AlphaError> {
    REGISTRY
        .get(&norm(name))
        .map(|e| Arc::clone(e.value()))
        .ok_or_else(|| AlphaError::UnknownFunctionError {
            name: name.to_string(),
        })
}

/// Sorted snapshot of every registered function's metadata.
pub fn list() -> Vec<FuncSpec> {
    let mut specs: Vec<FuncSpec> = REGISTRY.iter().map(|e| e.spec.clone()).collect();
    specs.sort_by(|a, b| a.name.cmp(b.name));
    specs
}

/// Populates the registry with every built-in. Idempotent and cheap to call
/// repeatedly (e.g. once per test, guarded by `std::sync::Once` in callers
/// that need it on a hot path); registration itself is just overwriting
/// DashMap entries.
pub fn init() {
    crate::builtins::load_builtins();
}
