//! Trainer configuration.
//!
//! Every constant the progression rules depend on lives here with its
//! reference value as the `Default`. A JSON document can override any subset
//! of fields; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::mechanics::reward::RewardTable;
use crate::systems::catalog::{BRANCHING_CHARACTER_ID, STARTER_IDS};

/// Storage key of the persisted progression aggregate.
pub const DEFAULT_STORAGE_KEY: &str = "gameState";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub storage_key: String,
    /// Points charged per evolution step.
    pub evolution_cost: u32,
    pub rewards: RewardTable,
    /// Tables a user may choose to practice.
    pub available_tables: Vec<u32>,
    /// Characters owned on first run and after a reset.
    pub default_owned: BTreeSet<u32>,
    /// The one character whose later stages are alternative final forms.
    pub branching_character: u32,
    pub shop: ShopConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            evolution_cost: 20,
            rewards: RewardTable::default(),
            available_tables: (1..=10).collect(),
            default_owned: STARTER_IDS.into_iter().collect(),
            branching_character: BRANCHING_CHARACTER_ID,
            shop: ShopConfig::default(),
        }
    }
}

impl TrainerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TrainerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn is_available(&self, table: u32) -> bool {
        self.available_tables.contains(&table)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if self.evolution_cost == 0 {
            return Err(ConfigError::ZeroEvolutionCost);
        }
        if self.available_tables.is_empty() {
            return Err(ConfigError::NoTables);
        }
        if let Some(&table) = self
            .rewards
            .easy_tables
            .intersection(&self.rewards.hard_tables)
            .next()
        {
            return Err(ConfigError::OverlappingDifficulty { table });
        }
        if let Some(&table) = self
            .available_tables
            .iter()
            .find(|t| self.rewards.classify(**t).is_none())
        {
            return Err(ConfigError::UnclassifiedTable { table });
        }
        if self.shop.price_buckets == 0 {
            return Err(ConfigError::ZeroPriceBuckets);
        }
        Ok(())
    }
}

/// Shop listing size and the price curve `base + (id % buckets) * step`,
/// saturating at `u32::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub catalogue_size: u32,
    pub base_price: u32,
    pub price_step: u32,
    pub price_buckets: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            catalogue_size: 50,
            base_price: 100,
            price_step: 20,
            price_buckets: 5,
        }
    }
}

impl ShopConfig {
    #[inline]
    pub fn price(&self, character_id: u32) -> u32 {
        let bucket = character_id % self.price_buckets.max(1);
        self.base_price
            .saturating_add(bucket.saturating_mul(self.price_step))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse trainer config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read trainer config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("storage key must not be empty")]
    EmptyStorageKey,
    #[error("evolution cost must be positive")]
    ZeroEvolutionCost,
    #[error("at least one table must be available")]
    NoTables,
    #[error("table {table} is listed as both easy and hard")]
    OverlappingDifficulty { table: u32 },
    #[error("available table {table} has no difficulty class")]
    UnclassifiedTable { table: u32 },
    #[error("shop price buckets must be positive")]
    ZeroPriceBuckets,
}
