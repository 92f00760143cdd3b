//! Python bindings for the duel engine.
//!
//! # Quick Start
//!
//! ```python
//! import duel_engine
//!
//! duel = duel_engine.Duel(config_json)
//! command_id = duel.exec_json("Draw", '{"player": 0, "count": 5}')
//! print(duel.logs_json())
//!
//! duel.undo()
//! replay = duel.replay_json()
//! ```

use pyo3::prelude::*;

mod py_duel;

pub use py_duel::*;

/// duel_engine: reversible duel state for replay tools and simulators.
#[pymodule]
fn duel_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDuel>()?;
    Ok(())
}
