// src/game/mod.rs

// Top-level orchestration: wires the systems into the operations a front end
// calls. Front ends own a `Trainer` and pass it by reference.

pub mod trainer;
pub use trainer::*;
