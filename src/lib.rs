// Songo training core - module organization
//
// Rules engine, PUCT search and the self-play training stack for Songo
// (Akong), a 14-pit mancala variant.

pub mod enums;
pub mod errors;
pub mod players;
pub mod state;

// Re-export common types for convenient access
pub use crate::enums::{GameResult, GameStatus, Player};
pub use crate::errors::{SongoError, SongoResult};
pub use crate::players::nn::{
    NetworkSize, PolicyValueNet, ReplayBuffer, SelfPlayEngine, SongoNet, TrainingExample,
    UniformNet,
};
pub use crate::players::{AlphaZeroPlayer, BotPlayer, RandomPlayer};
pub use crate::state::{
    GameState, INITIAL_SEEDS, PITS_PER_PLAYER, TOTAL_PITS, TOTAL_SEEDS, WINNING_SCORE,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
