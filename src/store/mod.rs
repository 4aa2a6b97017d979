//! Persistence boundary for simulation results.
//!
//! Results are stored together with the input that produced them, keyed by
//! an opaque scenario identifier. Real backends live outside this crate; the
//! in-memory store here backs the CLI and tests.

use crate::analysis::statistics::MonteCarloResult;
use crate::core::input::SimulationInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Opaque identifier of a stored scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(Uuid);

impl ScenarioId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ScenarioId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A result plus the assumptions that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSimulation {
    pub scenario_id: ScenarioId,
    pub input: SimulationInput,
    pub result: MonteCarloResult,
    pub created_at: DateTime<Utc>,
}

impl StoredSimulation {
    pub fn new(scenario_id: ScenarioId, input: SimulationInput, result: MonteCarloResult) -> Self {
        Self {
            scenario_id,
            input,
            result,
            created_at: Utc::now(),
        }
    }

    /// Override the creation time (useful when importing older records).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no stored simulation for scenario {0}")]
    NotFound(ScenarioId),
    #[error("failed to serialize stored simulations: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for simulation results.
pub trait SimulationStore {
    /// Insert or replace the record for its scenario.
    fn save(&mut self, record: StoredSimulation) -> Result<(), StoreError>;

    fn load(&self, id: &ScenarioId) -> Result<&StoredSimulation, StoreError>;

    fn delete(&mut self, id: &ScenarioId) -> Result<StoredSimulation, StoreError>;

    /// Remove every record created before `cutoff`; returns how many went.
    fn purge_older_than(&mut self, cutoff: DateTime<Utc>) -> usize;
}

/// Map-backed store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: HashMap<ScenarioId, StoredSimulation>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records as pretty JSON, oldest first.
    pub fn to_json(&self) -> Result<String, StoreError> {
        let mut records: Vec<&StoredSimulation> = self.records.values().collect();
        records.sort_by_key(|r| (r.created_at, r.scenario_id));
        Ok(serde_json::to_string_pretty(&records)?)
    }
}

impl SimulationStore for InMemoryStore {
    fn save(&mut self, record: StoredSimulation) -> Result<(), StoreError> {
        self.records.insert(record.scenario_id, record);
        Ok(())
    }

    fn load(&self, id: &ScenarioId) -> Result<&StoredSimulation, StoreError> {
        self.records.get(id).ok_or(StoreError::NotFound(*id))
    }

    fn delete(&mut self, id: &ScenarioId) -> Result<StoredSimulation, StoreError> {
        self.records.remove(id).ok_or(StoreError::NotFound(*id))
    }

    fn purge_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| r.created_at >= cutoff);
        before - self.records.len()
    }
}
