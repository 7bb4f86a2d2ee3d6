// Players module - bot implementations driving the Songo rules engine

use crate::errors::SongoResult;
use crate::state::GameState;

/// A bot that picks one of the valid pits for the current player.
pub trait BotPlayer {
    fn decide(&self, state: &GameState, valid_moves: &[usize]) -> SongoResult<usize>;
}

pub mod nn;
pub mod random;
pub mod zero;

pub use self::random::RandomPlayer;
pub use self::zero::AlphaZeroPlayer;
