//! Evolution catalog.
//!
//! Built-in starter characters and their evolution chains, plus the lookups
//! the rest of the game needs: which stage a character is displayed at given
//! the evolution history, and what (if anything) it evolves into next.
//!
//! Chains come in two shapes:
//! - **Linear**: stage `i` evolves into stage `i + 1`.
//! - **Branching**: stage 0 is the base, every later stage is an alternative
//!   final form. The next target is drawn uniformly among the finals that do
//!   not yet appear in the history.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use bevy_prng::WyRand;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::mechanics::stoch;
use crate::systems::sdk::{ChainSource, CharacterSource};

/// Built-in starters, in display order.
pub const STARTER_IDS: [u32; 5] = [1, 4, 7, 25, 133];
pub const BRANCHING_CHARACTER_ID: u32 = 133;

const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

const BUILTIN_CHAINS: &[(u32, &[(u32, &str)])] = &[
    (1, &[(1, "Bulbasaur"), (2, "Ivysaur"), (3, "Venusaur")]),
    (4, &[(4, "Charmander"), (5, "Charmeleon"), (6, "Charizard")]),
    (7, &[(7, "Squirtle"), (8, "Wartortle"), (9, "Blastoise")]),
    (25, &[(25, "Pikachu"), (26, "Raichu")]),
    (133, &[(133, "Eevee"), (134, "Vaporeon"), (135, "Jolteon"), (136, "Flareon")]),
];

/// Official artwork URL for a catalogue id.
pub fn artwork_url(id: u32) -> String {
    format!("{ARTWORK_BASE}/{id}.png")
}

/// `"eevee"` -> `"Eevee"`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: u32,
    pub name: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution_chain_ref: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionStage {
    pub id: u32,
    pub name: String,
    pub image_url: String,
}

impl EvolutionStage {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), image_url: artwork_url(id) }
    }
}

/// Name and artwork of a stage, as captured in an evolution record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRef {
    pub name: String,
    pub image_url: String,
}

impl From<&EvolutionStage> for StageRef {
    fn from(stage: &EvolutionStage) -> Self {
        Self { name: stage.name.clone(), image_url: stage.image_url.clone() }
    }
}

/// One evolution event. The history of these is append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionRecord {
    pub character_id: u32,
    pub from: StageRef,
    pub to: StageRef,
    pub table_completed: u32,
}

impl EvolutionRecord {
    pub fn new(
        character_id: u32,
        from: &EvolutionStage,
        to: &EvolutionStage,
        table_completed: u32,
    ) -> Self {
        Self { character_id, from: from.into(), to: to.into(), table_completed }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainShape {
    Linear,
    Branching,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvolutionChain {
    pub shape: ChainShape,
    stages: Vec<EvolutionStage>,
}

impl EvolutionChain {
    pub fn linear(stages: Vec<EvolutionStage>) -> Self {
        Self { shape: ChainShape::Linear, stages }
    }

    pub fn branching(stages: Vec<EvolutionStage>) -> Self {
        Self { shape: ChainShape::Branching, stages }
    }

    pub fn stages(&self) -> &[EvolutionStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name == name)
    }

    /// Chains with fewer than two stages never evolve.
    pub fn can_evolve(&self) -> bool {
        self.stages.len() > 1
    }
}

/// Evolution-chain tree as served by a [`ChainSource`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainLink {
    pub species: EvolutionStage,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

impl ChainLink {
    /// Base, then the first `evolves_to` link at every level.
    pub fn flatten_linear(&self) -> Vec<EvolutionStage> {
        let mut out = Vec::new();
        let mut link = Some(self);
        while let Some(l) = link {
            out.push(normalized(&l.species));
            link = l.evolves_to.first();
        }
        out
    }

    /// Base, then every direct child as an alternative final.
    pub fn flatten_branching(&self) -> Vec<EvolutionStage> {
        std::iter::once(&self.species)
            .chain(self.evolves_to.iter().map(|l| &l.species))
            .map(normalized)
            .collect()
    }
}

fn normalized(stage: &EvolutionStage) -> EvolutionStage {
    EvolutionStage { name: capitalize(&stage.name), ..stage.clone() }
}

/// Displayed stage of one character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageInfo<'a> {
    pub current: Option<&'a EvolutionStage>,
    /// Deterministic next stage (linear chains only).
    pub next: Option<&'a EvolutionStage>,
    /// 1-based stage number.
    pub stage: usize,
    /// Chain length (0 with no chain).
    pub max_stage: usize,
    /// Evolutions still obtainable.
    pub remaining: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextEvolution<'a> {
    Ready {
        from: &'a EvolutionStage,
        to: &'a EvolutionStage,
    },
    /// Every obtainable stage is already in the history.
    MaxReached,
    /// No chain, or a single-stage chain.
    Unavailable,
}

impl NextEvolution<'_> {
    pub fn is_ready(&self) -> bool {
        matches!(self, NextEvolution::Ready { .. })
    }
}

/// Records of `character_id`, oldest first.
pub fn history_for(
    history: &[EvolutionRecord],
    character_id: u32,
) -> impl Iterator<Item = &EvolutionRecord> {
    history.iter().filter(move |r| r.character_id == character_id)
}

#[derive(Clone, Debug)]
pub struct Catalog {
    characters: Vec<Character>,
    chains: BTreeMap<u32, EvolutionChain>,
    branching_id: u32,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Starters and chains shipped with the game.
    pub fn builtin() -> Self {
        let mut characters = Vec::with_capacity(BUILTIN_CHAINS.len());
        let mut chains = BTreeMap::new();
        for &(id, stages) in BUILTIN_CHAINS {
            let stages: Vec<_> = stages
                .iter()
                .map(|&(sid, name)| EvolutionStage::new(sid, name))
                .collect();
            if let Some(base) = stages.first() {
                characters.push(Character {
                    id,
                    name: base.name.clone(),
                    image_url: base.image_url.clone(),
                    evolution_chain_ref: None,
                });
            }
            let chain = if id == BRANCHING_CHARACTER_ID {
                EvolutionChain::branching(stages)
            } else {
                EvolutionChain::linear(stages)
            };
            chains.insert(id, chain);
        }
        Self { characters, chains, branching_id: BRANCHING_CHARACTER_ID }
    }

    /// Re-designate the branching character; every other chain becomes linear.
    pub fn with_branching_character(mut self, id: u32) -> Self {
        self.branching_id = id;
        for (cid, chain) in self.chains.iter_mut() {
            chain.shape = if *cid == id { ChainShape::Branching } else { ChainShape::Linear };
        }
        self
    }

    pub fn branching_character(&self) -> u32 {
        self.branching_id
    }

    pub fn starters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, id: u32) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn chain(&self, id: u32) -> Option<&EvolutionChain> {
        self.chains.get(&id)
    }

    /// Install or replace a chain. Its shape follows the branching designation.
    pub fn insert_chain(&mut self, id: u32, stages: Vec<EvolutionStage>) {
        let chain = if id == self.branching_id {
            EvolutionChain::branching(stages)
        } else {
            EvolutionChain::linear(stages)
        };
        self.chains.insert(id, chain);
    }

    /// Characters from `source`, or the built-in starters if it fails or is empty.
    pub fn load_characters(&self, source: &dyn CharacterSource) -> Vec<Character> {
        match source.fetch_characters() {
            Ok(list) if !list.is_empty() => list
                .into_iter()
                .map(|c| Character { name: capitalize(&c.name), ..c })
                .collect(),
            Ok(_) => {
                warn!("character source returned nothing; using built-in starters");
                self.characters.clone()
            }
            Err(err) => {
                warn!(%err, "character source failed; using built-in starters");
                self.characters.clone()
            }
        }
    }

    /// Replace the chain of `character` with the one its reference points at.
    /// Keeps the built-in chain unless the fetched one has more than one stage.
    /// Returns whether the remote chain was installed.
    pub fn resolve_chain(&mut self, character: &Character, source: &dyn ChainSource) -> bool {
        let Some(reference) = character.evolution_chain_ref.as_deref() else {
            return false;
        };
        let tree = match source.fetch_chain(reference) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(character = character.id, %err, "chain source failed; keeping built-in chain");
                return false;
            }
        };
        let stages = if character.id == self.branching_id {
            tree.flatten_branching()
        } else {
            tree.flatten_linear()
        };
        if stages.len() < 2 {
            debug!(character = character.id, "fetched chain has a single stage; keeping built-in chain");
            return false;
        }
        self.insert_chain(character.id, stages);
        true
    }

    /// Chain index of the displayed stage: the `to` of the latest record,
    /// or 0 with no record or an unknown name.
    pub fn current_index(&self, character_id: u32, history: &[EvolutionRecord]) -> usize {
        let Some(chain) = self.chains.get(&character_id) else {
            return 0;
        };
        history_for(history, character_id)
            .last()
            .and_then(|r| chain.position(&r.to.name))
            .unwrap_or(0)
    }

    pub fn stage_info(&self, character_id: u32, history: &[EvolutionRecord]) -> StageInfo<'_> {
        let Some(chain) = self.chains.get(&character_id) else {
            return StageInfo { current: None, next: None, stage: 1, max_stage: 0, remaining: 0 };
        };
        let idx = self.current_index(character_id, history);
        let (next, remaining) = match chain.shape {
            ChainShape::Linear => (
                chain.stages.get(idx + 1),
                chain.len().saturating_sub(idx + 1),
            ),
            ChainShape::Branching => (None, self.unobtained_finals(chain, character_id, history).len()),
        };
        StageInfo {
            current: chain.stages.get(idx),
            next,
            stage: idx + 1,
            max_stage: chain.len(),
            remaining,
        }
    }

    /// What `character_id` evolves into next. Draws from `rng` only for the
    /// branching character.
    pub fn next_evolution(
        &self,
        character_id: u32,
        history: &[EvolutionRecord],
        rng: &RefCell<WyRand>,
    ) -> NextEvolution<'_> {
        let Some(chain) = self.chains.get(&character_id).filter(|c| c.can_evolve()) else {
            return NextEvolution::Unavailable;
        };
        match chain.shape {
            ChainShape::Linear => {
                let idx = self.current_index(character_id, history);
                match (chain.stages.get(idx), chain.stages.get(idx + 1)) {
                    (Some(from), Some(to)) => NextEvolution::Ready { from, to },
                    _ => NextEvolution::MaxReached,
                }
            }
            ChainShape::Branching => {
                let remaining = self.unobtained_finals(chain, character_id, history);
                match stoch::choose(rng, &remaining).copied() {
                    Some(to) => NextEvolution::Ready { from: &chain.stages[0], to },
                    None => NextEvolution::MaxReached,
                }
            }
        }
    }

    fn unobtained_finals<'c>(
        &self,
        chain: &'c EvolutionChain,
        character_id: u32,
        history: &[EvolutionRecord],
    ) -> Vec<&'c EvolutionStage> {
        let obtained: HashSet<&str> = history_for(history, character_id)
            .map(|r| r.to.name.as_str())
            .collect();
        chain
            .stages
            .iter()
            .skip(1)
            .filter(|s| !obtained.contains(s.name.as_str()))
            .collect()
    }
}
