/// Task mechanics: the ordered fact set of one table and its shuffle.
use bevy_prng::WyRand;
use std::cell::RefCell;

use crate::mechanics::stoch;

/// Facts per table run from `1 × table` to `MAX_MULTIPLIER × table`.
pub const MAX_MULTIPLIER: u32 = 10;

/// One multiplication fact, optionally carrying the graded answer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Task {
    pub id: String,
    pub multiplicand: u32,
    pub multiplier: u32,
    pub answer: u32,
    pub user_answer: Option<u32>,
    pub is_correct: Option<bool>,
}

impl Task {
    pub fn new(table: u32, multiplier: u32) -> Self {
        Self {
            id: format!("{table}x{multiplier}"),
            multiplicand: table,
            multiplier,
            answer: table.saturating_mul(multiplier),
            user_answer: None,
            is_correct: None,
        }
    }

    /// Whether an answer has been graded onto this task.
    #[inline]
    pub fn is_graded(&self) -> bool {
        self.is_correct.is_some()
    }
}

/// Facts `table × 1 ..= table × 10`, in multiplier order.
pub fn generate(table: u32) -> Vec<Task> {
    (1..=MAX_MULTIPLIER).map(|m| Task::new(table, m)).collect()
}

/// Fresh uniform permutation of `tasks`; the input is left untouched.
pub fn shuffle(rng: &RefCell<WyRand>, tasks: &[Task]) -> Vec<Task> {
    let mut out = tasks.to_vec();
    stoch::shuffle_in_place(rng, &mut out);
    out
}
