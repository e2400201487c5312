// src/game/trainer.rs

//! Trainer orchestrator.
//!
//! Owns the progression store, the evolution catalog and the shared RNG, and
//! turns user intents into store actions:
//! - select character / choose table → plain setters, validated here
//! - finish a practice session       → one atomic `CompleteTable`
//! - evolve                          → catalog lookup, balance check, one atomic `Evolve`
//! - purchase                        → shop flow (feature `system-shop`)
//!
//! Refusals come back as [`TrainerError`]; the store itself never fails.

use std::cell::RefCell;
use std::rc::Rc;

use bevy_prng::WyRand;
use rand_core::SeedableRng;
use thiserror::Error;
use tracing::info;

use crate::config::TrainerConfig;
use crate::systems::catalog::{Catalog, Character, EvolutionRecord, NextEvolution, StageInfo};
use crate::systems::progression::{
    Action, Award, LoadOutcome, ProgressionState, ProgressionStore,
};
use crate::systems::sdk::{ChainSource, CharacterSource, KeyValueStore};
use crate::systems::session::{PracticeSession, SessionReport};
#[cfg(feature = "system-shop")]
use crate::systems::shop::{self, Offer, Purchase, ShopError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrainerError {
    #[error("no character selected")]
    NoCharacterSelected,
    #[error("no table chosen")]
    NoTableChosen,
    #[error("character {0} is not owned")]
    NotOwned(u32),
    #[error("table {0} is not available")]
    UnknownTable(u32),
    #[error("{needed} points needed but only {available} are available")]
    InsufficientPoints { needed: u32, available: u32 },
    #[error("character {0} has no evolution")]
    NoEvolution(u32),
    #[error("character {0} is fully evolved")]
    MaxEvolution(u32),
    #[error("character {0} is already owned")]
    AlreadyOwned(u32),
}

#[cfg(feature = "system-shop")]
impl From<ShopError> for TrainerError {
    fn from(err: ShopError) -> Self {
        match err {
            ShopError::AlreadyOwned(id) => TrainerError::AlreadyOwned(id),
            ShopError::InsufficientPoints { price, available } => {
                TrainerError::InsufficientPoints { needed: price, available }
            }
        }
    }
}

/// Progress overview for the selected character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressSummary {
    pub points: u32,
    pub selected: Option<u32>,
    pub completed_tables: Vec<u32>,
    /// Rounded share of available tables completed, 0..=100.
    pub completion_percent: u32,
    pub evolutions: usize,
    pub owned: usize,
}

pub struct Trainer<S> {
    store: ProgressionStore<S>,
    catalog: Catalog,
    rng: Rc<RefCell<WyRand>>,
}

impl<S: KeyValueStore> Trainer<S> {
    /// Trainer over the built-in catalog. Call [`load`](Self::load) before use.
    pub fn new(storage: S, config: TrainerConfig, seed: u64) -> Self {
        let catalog = Catalog::builtin().with_branching_character(config.branching_character);
        Self {
            store: ProgressionStore::new(storage, config),
            catalog,
            rng: Rc::new(RefCell::new(WyRand::from_seed(seed.to_le_bytes()))),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog.with_branching_character(self.store.config().branching_character);
        self
    }

    pub fn load(&mut self) -> LoadOutcome {
        self.store.load()
    }

    pub fn state(&self) -> &ProgressionState {
        self.store.state()
    }

    pub fn store(&self) -> &ProgressionStore<S> {
        &self.store
    }

    pub fn config(&self) -> &TrainerConfig {
        self.store.config()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Shared generator, for callers that build their own sessions.
    pub fn rng(&self) -> Rc<RefCell<WyRand>> {
        Rc::clone(&self.rng)
    }

    /// Selectable characters from `source`, or the built-in starters.
    pub fn characters(&self, source: &dyn CharacterSource) -> Vec<Character> {
        self.catalog.load_characters(source)
    }

    /// Fetch remote chains for `characters`; returns how many were installed.
    pub fn resolve_chains(&mut self, characters: &[Character], source: &dyn ChainSource) -> usize {
        characters
            .iter()
            .filter(|c| self.catalog.resolve_chain(c, source))
            .count()
    }

    pub fn select_character(&mut self, character_id: u32) -> Result<(), TrainerError> {
        if !self.state().owns(character_id) {
            return Err(TrainerError::NotOwned(character_id));
        }
        self.store.dispatch(Action::SelectCharacter(character_id));
        Ok(())
    }

    pub fn choose_table(&mut self, table: u32) -> Result<(), TrainerError> {
        if !self.config().is_available(table) {
            return Err(TrainerError::UnknownTable(table));
        }
        self.store.dispatch(Action::SetCurrentTable(table));
        Ok(())
    }

    /// Shuffled session for the chosen table.
    pub fn start_session(&self) -> Result<PracticeSession, TrainerError> {
        self.state()
            .selected_character_id
            .ok_or(TrainerError::NoCharacterSelected)?;
        let table = self.state().current_table.ok_or(TrainerError::NoTableChosen)?;
        Ok(PracticeSession::new(table, &self.rng))
    }

    /// Award the session and mark its table completed, in one transition.
    pub fn complete_session(&mut self, report: &SessionReport) -> Result<Award, TrainerError> {
        let character_id = self
            .state()
            .selected_character_id
            .ok_or(TrainerError::NoCharacterSelected)?;
        let award = self
            .store
            .dispatch(Action::CompleteTable {
                character_id,
                table: report.table,
                perfect: report.perfect,
            })
            .award()
            .unwrap_or_default();
        info!(
            character = character_id,
            table = award.table,
            points = award.points,
            first_time = award.first_time,
            perfect = award.perfect,
            "table completed"
        );
        Ok(award)
    }

    pub fn evolution_status(&self, character_id: u32) -> StageInfo<'_> {
        self.catalog
            .stage_info(character_id, &self.state().evolution_history)
    }

    /// Evolve the selected character one step, paying the evolution cost.
    pub fn evolve(&mut self) -> Result<EvolutionRecord, TrainerError> {
        let state = self.store.state();
        let character_id = state
            .selected_character_id
            .ok_or(TrainerError::NoCharacterSelected)?;
        let table = state.current_table.ok_or(TrainerError::NoTableChosen)?;
        let cost = self.store.config().evolution_cost;

        let (from, to) = match self
            .catalog
            .next_evolution(character_id, &state.evolution_history, &self.rng)
        {
            NextEvolution::Ready { from, to } => (from, to),
            NextEvolution::MaxReached => return Err(TrainerError::MaxEvolution(character_id)),
            NextEvolution::Unavailable => return Err(TrainerError::NoEvolution(character_id)),
        };
        let record = EvolutionRecord::new(character_id, from, to, table);

        // A history naming an unknown stage resolves back to the base, whose
        // next stage may already be recorded.
        if state.has_evolution(&record) {
            return Err(TrainerError::MaxEvolution(character_id));
        }
        if state.points < cost {
            return Err(TrainerError::InsufficientPoints { needed: cost, available: state.points });
        }

        let transition = self.store.dispatch(Action::Evolve { record: record.clone(), cost });
        if !transition.changed() {
            let available = self.state().points;
            return Err(TrainerError::InsufficientPoints { needed: cost, available });
        }
        info!(
            character = character_id,
            from = %record.from.name,
            to = %record.to.name,
            "character evolved"
        );
        Ok(record)
    }

    #[cfg(feature = "system-shop")]
    pub fn shop(&self, source: &dyn CharacterSource) -> Vec<Offer> {
        shop::listing(&self.config().shop, source, self.state())
    }

    #[cfg(feature = "system-shop")]
    pub fn purchase(&mut self, character_id: u32) -> Result<Purchase, TrainerError> {
        let price = self.config().shop.price(character_id);
        Ok(shop::purchase(&mut self.store, character_id, price)?)
    }

    pub fn summary(&self) -> ProgressSummary {
        let state = self.state();
        let tables = &self.config().available_tables;
        let completed: Vec<u32> = state
            .selected_character_id
            .and_then(|id| state.completed_tables(id))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        let done = completed.iter().filter(|t| tables.contains(t)).count();
        let completion_percent = if tables.is_empty() {
            0
        } else {
            ((done as f64 / tables.len() as f64) * 100.0).round() as u32
        };
        ProgressSummary {
            points: state.points,
            selected: state.selected_character_id,
            completed_tables: completed,
            completion_percent,
            evolutions: state.evolution_history.len(),
            owned: state.owned_character_ids.len(),
        }
    }

    pub fn reset(&mut self) {
        self.store.dispatch(Action::Reset);
        info!("progression reset");
    }
}
