pub mod answer;
pub mod reward;
pub mod stoch;
pub mod tasks;

pub use answer::*;
pub use reward::*;
pub use stoch::*;
pub use tasks::*;
