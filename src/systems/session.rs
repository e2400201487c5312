//! Practice session over one table.
//!
//! The shuffled fact set is consumed as a queue: a correct answer retires the
//! head, a wrong answer sends it to the back to be asked again. The session
//! never fails; it only ends once every fact has been answered correctly or
//! the caller stops early.

use std::cell::RefCell;
use std::collections::VecDeque;

use bevy_prng::WyRand;

use crate::mechanics::{answer, tasks};
use crate::mechanics::tasks::Task;

#[derive(Clone, Debug)]
pub struct PracticeSession {
    table: u32,
    tasks: Vec<Task>,
    remaining: VecDeque<Task>,
    completed: Vec<Task>,
    mistakes: u32,
}

/// Summary handed to the trainer when a session ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionReport {
    pub table: u32,
    /// Every fact of the full set ended up answered correctly.
    pub perfect: bool,
    pub answered: usize,
    pub total: usize,
    pub mistakes: u32,
}

impl PracticeSession {
    /// Fresh shuffled session for `table`.
    pub fn new(table: u32, rng: &RefCell<WyRand>) -> Self {
        let ordered = tasks::generate(table);
        Self::from_tasks(table, tasks::shuffle(rng, &ordered))
    }

    /// Session over `tasks` in the given order.
    pub fn from_tasks(table: u32, tasks: Vec<Task>) -> Self {
        Self {
            table,
            remaining: tasks.iter().cloned().collect(),
            tasks,
            completed: Vec::new(),
            mistakes: 0,
        }
    }

    pub fn table(&self) -> u32 {
        self.table
    }

    /// The full fact set, in presentation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The fact being asked.
    pub fn current(&self) -> Option<&Task> {
        self.remaining.front()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &Task> {
        self.remaining.iter()
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    /// Grade `submitted` against the current fact. `None` once the queue is empty.
    pub fn submit(&mut self, submitted: u32) -> Option<Task> {
        let head = self.remaining.pop_front()?;
        let graded = answer::check(&head, submitted);
        if graded.is_correct == Some(true) {
            self.completed.push(graded.clone());
        } else {
            self.mistakes += 1;
            self.remaining.push_back(head);
        }
        Some(graded)
    }

    /// Share of the fact set answered correctly, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.completed.len() as f64 / self.tasks.len() as f64
    }

    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn report(&self) -> SessionReport {
        let perfect = !self.tasks.is_empty()
            && self.completed.len() == self.tasks.len()
            && answer::all_correct(&self.completed);
        SessionReport {
            table: self.table,
            perfect,
            answered: self.completed.len(),
            total: self.tasks.len(),
            mistakes: self.mistakes,
        }
    }
}
