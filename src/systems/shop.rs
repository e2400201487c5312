// src/systems/shop.rs
#![cfg(feature = "system-shop")]

//! Character shop: a priced listing and the purchase flow.
//!
//! The purchase checks ownership and balance *before* dispatching, so the
//! store's clamping spend is never relied on to block a sale.

use thiserror::Error;
use tracing::info;

use crate::config::ShopConfig;
use crate::systems::catalog::{Character, artwork_url, capitalize};
use crate::systems::progression::{Action, ProgressionState, ProgressionStore};
use crate::systems::sdk::{CharacterSource, KeyValueStore};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Offer {
    pub character: Character,
    pub price: u32,
    pub owned: bool,
}

impl Offer {
    pub fn affordable(&self, points: u32) -> bool {
        points >= self.price
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Purchase {
    pub character_id: u32,
    pub price: u32,
    pub points_left: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShopError {
    #[error("character {0} is already owned")]
    AlreadyOwned(u32),
    #[error("character costs {price} points but only {available} are available")]
    InsufficientPoints { price: u32, available: u32 },
}

/// Catalogue ids `1..=catalogue_size`, named by `source` when it can.
pub fn listing(
    cfg: &ShopConfig,
    source: &dyn CharacterSource,
    state: &ProgressionState,
) -> Vec<Offer> {
    (1..=cfg.catalogue_size)
        .map(|id| {
            let character = match source.fetch_character(id) {
                Ok(c) => Character { name: capitalize(&c.name), ..c },
                Err(_) => Character {
                    id,
                    name: format!("Character #{id}"),
                    image_url: artwork_url(id),
                    evolution_chain_ref: None,
                },
            };
            Offer { character, price: cfg.price(id), owned: state.owns(id) }
        })
        .collect()
}

/// Spend `price` and add `character_id` to the owned set.
pub fn purchase<S: KeyValueStore>(
    store: &mut ProgressionStore<S>,
    character_id: u32,
    price: u32,
) -> Result<Purchase, ShopError> {
    let state = store.state();
    if state.owns(character_id) {
        return Err(ShopError::AlreadyOwned(character_id));
    }
    if state.points < price {
        return Err(ShopError::InsufficientPoints { price, available: state.points });
    }
    store.dispatch(Action::SpendPoints(price));
    store.dispatch(Action::AddOwnedCharacter(character_id));
    let points_left = store.state().points;
    info!(character = character_id, price, points_left, "character purchased");
    Ok(Purchase { character_id, price, points_left })
}
