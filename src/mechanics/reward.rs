//! Reward mechanics: difficulty classes and the point table.
//!
//! Award = table[difficulty][perfect][first_time]. Tables outside both
//! difficulty sets earn nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Hard,
}

/// Points for one difficulty class, per (perfect, first-time) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRow {
    pub perfect_first: u32,
    pub perfect_repeat: u32,
    pub imperfect_first: u32,
    pub imperfect_repeat: u32,
}

impl RewardRow {
    #[inline]
    pub fn pick(&self, perfect: bool, first_time: bool) -> u32 {
        match (perfect, first_time) {
            (true, true) => self.perfect_first,
            (true, false) => self.perfect_repeat,
            (false, true) => self.imperfect_first,
            (false, false) => self.imperfect_repeat,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTable {
    pub easy: RewardRow,
    pub hard: RewardRow,
    pub easy_tables: BTreeSet<u32>,
    pub hard_tables: BTreeSet<u32>,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            easy: RewardRow {
                perfect_first: 10,
                perfect_repeat: 3,
                imperfect_first: 3,
                imperfect_repeat: 1,
            },
            hard: RewardRow {
                perfect_first: 25,
                perfect_repeat: 7,
                imperfect_first: 7,
                imperfect_repeat: 2,
            },
            easy_tables: [1, 2, 3, 10].into_iter().collect(),
            hard_tables: (4..=9).collect(),
        }
    }
}

impl RewardTable {
    /// Difficulty class of `table`; easy wins if both sets claim it.
    pub fn classify(&self, table: u32) -> Option<Difficulty> {
        if self.easy_tables.contains(&table) {
            Some(Difficulty::Easy)
        } else if self.hard_tables.contains(&table) {
            Some(Difficulty::Hard)
        } else {
            None
        }
    }

    pub fn row(&self, difficulty: Difficulty) -> &RewardRow {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Points for finishing `table`.
    pub fn reward(&self, table: u32, perfect: bool, first_time: bool) -> u32 {
        self.classify(table)
            .map(|d| self.row(d).pick(perfect, first_time))
            .unwrap_or(0)
    }
}

/// Points under the reference table.
#[inline]
pub fn reward(table: u32, perfect: bool, first_time: bool) -> u32 {
    RewardTable::default().reward(table, perfect, first_time)
}
