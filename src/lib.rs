/*!
`times_tables` — the progression and reward engine of a mascot-driven
multiplication-table trainer.

What it does
- Generates the ten facts of a table and shuffles them (`mechanics::tasks`).
- Grades answers and runs a practice session with a retry queue
  (`mechanics::answer`, `systems::session`).
- Prices a finished table by difficulty × first-time × perfect
  (`mechanics::reward`).
- Tracks per-character completions, points, owned characters and the
  evolution history in one aggregate mutated by a pure reducer, persisted
  through a caller-supplied key-value store (`systems::progression`).
- Resolves evolution chains, including one character whose finals are drawn
  at random among those not obtained yet (`systems::catalog`).
- Sells characters for points (`systems::shop`, feature `system-shop`).

How to use (call surface only)
- Build a `Trainer` over any `KeyValueStore` with a `TrainerConfig` and a seed.
- Call `load()` once; then `select_character`, `choose_table`,
  `start_session`, feed answers to the session, `complete_session`, `evolve`,
  `purchase`, `summary`.

What it does NOT do
- No rendering, navigation, networking or storage backend of its own; those
  are collaborators behind the traits in `systems::sdk`.
*/

pub mod config;
pub mod game;
pub mod mechanics;
pub mod systems;

pub use config::{ConfigError, ShopConfig, TrainerConfig};
pub use game::{ProgressSummary, Trainer, TrainerError};
pub use mechanics::reward::{Difficulty, RewardTable, reward};
pub use mechanics::tasks::Task;
pub use systems::catalog::{Catalog, Character, EvolutionRecord, EvolutionStage, NextEvolution};
pub use systems::progression::{Action, Award, ProgressionState, ProgressionStore, Transition, reduce};
pub use systems::sdk::{KeyValueStore, MemoryStore, Offline};
pub use systems::session::{PracticeSession, SessionReport};
