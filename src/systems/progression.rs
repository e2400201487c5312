//! Progression store.
//!
//! One aggregate ([`ProgressionState`]) mutated only through [`Action`]s by a
//! pure reducer, and a thin owner ([`ProgressionStore`]) that persists the
//! whole aggregate after every change once the initial load is done.
//!
//! Invariants:
//! - `points` never underflows: spending clamps at zero.
//! - table membership is idempotent, but the award of a completion is priced
//!   against the set as it was *before* the insert, in the same transition.
//! - no evolution record is appended twice for the same character and target,
//!   and an evolution is paid for only when its record is appended.

use std::collections::{BTreeMap, BTreeSet};
use std::mem;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::config::TrainerConfig;
use crate::systems::catalog::{self, EvolutionRecord};
use crate::systems::sdk::KeyValueStore;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionState {
    #[serde(deserialize_with = "lenient")]
    pub selected_character_id: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub current_table: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub completed_tables_by_character: BTreeMap<u32, BTreeSet<u32>>,
    #[serde(deserialize_with = "lenient_records")]
    pub evolution_history: Vec<EvolutionRecord>,
    #[serde(deserialize_with = "lenient")]
    pub points: u32,
    #[serde(deserialize_with = "lenient")]
    pub owned_character_ids: BTreeSet<u32>,
}

impl ProgressionState {
    /// First-run state: nothing completed, the default-owned set owned.
    pub fn seeded(cfg: &TrainerConfig) -> Self {
        Self {
            owned_character_ids: cfg.default_owned.clone(),
            ..Self::default()
        }
    }

    pub fn completed_tables(&self, character_id: u32) -> Option<&BTreeSet<u32>> {
        self.completed_tables_by_character.get(&character_id)
    }

    pub fn is_completed(&self, character_id: u32, table: u32) -> bool {
        self.completed_tables(character_id)
            .is_some_and(|set| set.contains(&table))
    }

    pub fn owns(&self, character_id: u32) -> bool {
        self.owned_character_ids.contains(&character_id)
    }

    pub fn history_for(&self, character_id: u32) -> impl Iterator<Item = &EvolutionRecord> {
        catalog::history_for(&self.evolution_history, character_id)
    }

    /// Whether the history already holds `record`'s target for its character.
    pub fn has_evolution(&self, record: &EvolutionRecord) -> bool {
        self.history_for(record.character_id)
            .any(|r| r.to.name == record.to.name)
    }

    /// Decode a persisted blob. Malformed fields fall back to their defaults;
    /// an unreadable blob falls back to the seeded state.
    pub fn decode(blob: &str, cfg: &TrainerConfig) -> Self {
        let mut state = match serde_json::from_str::<ProgressionState>(blob) {
            Ok(state) => state,
            Err(err) => {
                warn!(%err, "persisted progression is unreadable; starting fresh");
                return Self::seeded(cfg);
            }
        };
        if state.owned_character_ids.is_empty() {
            debug!("persisted progression owns nothing; re-seeding default characters");
            state.owned_character_ids = cfg.default_owned.clone();
        }
        state
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Deserialize through `serde_json::Value` and swallow type errors.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        warn!(%err, "discarding malformed persisted field");
        T::default()
    }))
}

/// Like [`lenient`], but keeps every well-formed record of a list.
fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<EvolutionRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<serde_json::Value> = lenient(deserializer)?;
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(index, %err, "dropping malformed evolution record");
                None
            }
        })
        .collect())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    SelectCharacter(u32),
    SetCurrentTable(u32),
    /// Award points for `table` and mark it completed for `character_id`.
    CompleteTable {
        character_id: u32,
        table: u32,
        perfect: bool,
    },
    AddEvolution(EvolutionRecord),
    /// Pay `cost` and append `record`, or do neither.
    Evolve { record: EvolutionRecord, cost: u32 },
    AddPoints(u32),
    /// Clamps at zero.
    SpendPoints(u32),
    AddOwnedCharacter(u32),
    Reset,
    Restore(ProgressionState),
}

/// Points granted by one table completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Award {
    pub table: u32,
    pub points: u32,
    pub first_time: bool,
    pub perfect: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Changed,
    Awarded(Award),
}

impl Transition {
    pub fn changed(&self) -> bool {
        !matches!(self, Transition::Unchanged)
    }

    pub fn award(&self) -> Option<Award> {
        match self {
            Transition::Awarded(a) => Some(*a),
            _ => None,
        }
    }
}

/// Next state for `action`. Never fails.
pub fn reduce(
    mut state: ProgressionState,
    action: Action,
    cfg: &TrainerConfig,
) -> (ProgressionState, Transition) {
    let transition = match action {
        Action::SelectCharacter(id) => set_if_new(&mut state.selected_character_id, Some(id)),
        Action::SetCurrentTable(table) => set_if_new(&mut state.current_table, Some(table)),
        Action::CompleteTable { character_id, table, perfect } => {
            let first_time = !state.is_completed(character_id, table);
            let points = cfg.rewards.reward(table, perfect, first_time);
            state.points = state.points.saturating_add(points);
            state
                .completed_tables_by_character
                .entry(character_id)
                .or_default()
                .insert(table);
            Transition::Awarded(Award { table, points, first_time, perfect })
        }
        Action::AddEvolution(record) => {
            if state.has_evolution(&record) {
                debug!(character = record.character_id, to = %record.to.name, "evolution already recorded");
                Transition::Unchanged
            } else {
                state.evolution_history.push(record);
                Transition::Changed
            }
        }
        Action::Evolve { record, cost } => {
            if state.has_evolution(&record) || state.points < cost {
                debug!(
                    character = record.character_id,
                    to = %record.to.name,
                    cost,
                    points = state.points,
                    "evolution refused"
                );
                Transition::Unchanged
            } else {
                state.points -= cost;
                state.evolution_history.push(record);
                Transition::Changed
            }
        }
        Action::AddPoints(amount) => {
            let before = state.points;
            state.points = state.points.saturating_add(amount);
            changed_if(state.points != before)
        }
        Action::SpendPoints(amount) => {
            let before = state.points;
            state.points = state.points.saturating_sub(amount);
            changed_if(state.points != before)
        }
        Action::AddOwnedCharacter(id) => changed_if(state.owned_character_ids.insert(id)),
        Action::Reset => {
            state = ProgressionState::seeded(cfg);
            Transition::Changed
        }
        Action::Restore(restored) => {
            state = restored;
            Transition::Changed
        }
    };
    (state, transition)
}

fn set_if_new<T: PartialEq>(slot: &mut T, value: T) -> Transition {
    if *slot == value {
        Transition::Unchanged
    } else {
        *slot = value;
        Transition::Changed
    }
}

#[inline]
fn changed_if(changed: bool) -> Transition {
    if changed { Transition::Changed } else { Transition::Unchanged }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored aggregate was found and restored.
    Restored,
    /// Nothing stored yet; the in-memory state was kept.
    Fresh,
    /// Storage could not be read; the in-memory state was kept.
    Unreadable,
}

/// Owner of the live aggregate and its storage.
///
/// Until [`load`](Self::load) runs, dispatches only touch memory, so an early
/// default-state write can never clobber the stored aggregate.
pub struct ProgressionStore<S> {
    state: ProgressionState,
    storage: S,
    config: TrainerConfig,
    loading: bool,
}

impl<S: KeyValueStore> ProgressionStore<S> {
    pub fn new(storage: S, config: TrainerConfig) -> Self {
        Self {
            state: ProgressionState::seeded(&config),
            storage,
            config,
            loading: true,
        }
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Restore from storage and open the persistence gate.
    pub fn load(&mut self) -> LoadOutcome {
        let outcome = match self.storage.get(&self.config.storage_key) {
            Ok(Some(blob)) => {
                let restored = ProgressionState::decode(&blob, &self.config);
                self.apply(Action::Restore(restored));
                info!(
                    points = self.state.points,
                    evolutions = self.state.evolution_history.len(),
                    "progression restored"
                );
                LoadOutcome::Restored
            }
            Ok(None) => LoadOutcome::Fresh,
            Err(err) => {
                warn!(%err, "failed to read progression; continuing with in-memory state");
                LoadOutcome::Unreadable
            }
        };
        self.loading = false;
        if outcome != LoadOutcome::Unreadable {
            self.persist();
        }
        outcome
    }

    pub fn dispatch(&mut self, action: Action) -> Transition {
        let transition = self.apply(action);
        if transition.changed() && !self.loading {
            self.persist();
        }
        transition
    }

    fn apply(&mut self, action: Action) -> Transition {
        let current = mem::take(&mut self.state);
        let (next, transition) = reduce(current, action, &self.config);
        self.state = next;
        debug!(?transition, points = self.state.points, "progression transition");
        transition
    }

    fn persist(&mut self) {
        let blob = match self.state.encode() {
            Ok(blob) => blob,
            Err(err) => {
                warn!(%err, "failed to encode progression");
                return;
            }
        };
        if let Err(err) = self.storage.set(&self.config.storage_key, blob) {
            warn!(%err, "failed to save progression");
        }
    }
}
