//! Python bindings via PyO3
//!
//! This module provides the Python interface for rapid_textattack.

pub mod json;
pub mod native;

use pyo3::prelude::*;

/// Register all Python classes and functions
pub fn register_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    // Native interface
    m.add_class::<native::PyAttackResult>()?;
    m.add_class::<native::PyWordSwapAttack>()?;
    m.add_function(wrap_pyfunction!(native::build_recipe, m)?)?;
    m.add_function(wrap_pyfunction!(native::get_stopwords, m)?)?;

    // JSON interface
    m.add_function(wrap_pyfunction!(json::attack_batch_from_json, m)?)?;

    Ok(())
}
