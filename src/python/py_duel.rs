//! Duel bindings for Python.
//!
//! Commands, logs and replays cross the boundary as JSON strings, in the
//! same shapes the engine serializes them to.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::cards::{CardData, CardDatabase};
use crate::commands::CommandKind;
use crate::core::{CommandId, DuelConfig, DuelError, PlayerId};
use crate::engine::{Duel, ReplayData};

impl From<DuelError> for PyErr {
    fn from(err: DuelError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

fn player(id: u8) -> PyResult<PlayerId> {
    let player = PlayerId::new(id);
    if player.is_valid() {
        Ok(player)
    } else {
        Err(DuelError::UnknownPlayer(player).into())
    }
}

/// Python wrapper for Duel.
///
/// Log subscribers hold Rust closures, so a duel stays on the thread that
/// created it.
#[pyclass(name = "Duel", unsendable)]
pub struct PyDuel {
    duel: Duel,
}

#[pymethods]
impl PyDuel {
    /// Create a duel from a JSON `DuelConfig`.
    #[new]
    fn new(config_json: &str) -> PyResult<Self> {
        let config = DuelConfig::from_json(config_json)?;
        Ok(Self { duel: Duel::new(config)? })
    }

    /// Rebuild a duel from replay JSON and a JSON list of card data.
    #[staticmethod]
    fn from_replay(replay_json: &str, cards_json: &str) -> PyResult<Self> {
        let replay = ReplayData::from_json(replay_json)?;
        let cards: Vec<CardData> = serde_json::from_str(cards_json).map_err(DuelError::from)?;
        let database: CardDatabase = cards.into_iter().collect();
        Ok(Self { duel: Duel::from_replay(&replay, &database)? })
    }

    /// Execute a command given its type name and JSON data. Returns the
    /// command id.
    fn exec_json(&mut self, command_type: &str, data_json: &str) -> PyResult<u32> {
        let data = serde_json::from_str(data_json).map_err(DuelError::from)?;
        let kind = CommandKind::decode(command_type, data)?;
        Ok(self.duel.exec(kind)?.raw())
    }

    fn undo(&mut self) -> PyResult<bool> {
        Ok(self.duel.undo()?)
    }

    fn redo(&mut self) -> PyResult<bool> {
        Ok(self.duel.redo()?)
    }

    fn go_to_command(&mut self, id: u32) -> PyResult<()> {
        Ok(self.duel.go_to_command(CommandId(id))?)
    }

    fn go_to_start(&mut self) -> PyResult<()> {
        Ok(self.duel.go_to_start()?)
    }

    fn go_to_end(&mut self) -> PyResult<()> {
        Ok(self.duel.go_to_end()?)
    }

    /// Id of the last applied command.
    #[getter]
    fn cursor(&self) -> Option<u32> {
        self.duel.cursor().map(CommandId::raw)
    }

    fn can_undo(&self) -> bool {
        self.duel.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.duel.can_redo()
    }

    fn life_points(&self, player_id: u8) -> PyResult<i64> {
        Ok(self.duel.field().life_points(player(player_id)?)?)
    }

    /// All log entries as a JSON array.
    fn logs_json(&self) -> PyResult<String> {
        Ok(serde_json::to_string(self.duel.entries()).map_err(DuelError::from)?)
    }

    /// Occupied positions of one side as a JSON array.
    fn field_json(&self, player_id: u8) -> PyResult<String> {
        let snapshot = self.duel.snapshot(player(player_id)?)?;
        Ok(serde_json::to_string(&snapshot).map_err(DuelError::from)?)
    }

    /// Replay JSON. Redoes any undone commands first.
    fn replay_json(&mut self) -> PyResult<String> {
        Ok(self.duel.replay_data()?.to_json()?)
    }

    fn __repr__(&self) -> String {
        format!(
            "Duel(turn={}, commands={}, logs={})",
            self.duel.field().turn(),
            self.duel.applied().len(),
            self.duel.log().len()
        )
    }
}
