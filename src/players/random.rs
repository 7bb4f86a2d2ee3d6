use std::cell::RefCell;

use rand::prelude::*;

use super::BotPlayer;
use crate::errors::SongoResult;
use crate::state::GameState;

/// Picks uniformly among the valid moves. Seeded so simulations replay.
pub struct RandomPlayer {
    rng: RefCell<StdRng>,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        RandomPlayer {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl BotPlayer for RandomPlayer {
    fn decide(&self, _state: &GameState, valid_moves: &[usize]) -> SongoResult<usize> {
        let mut rng = self.rng.borrow_mut();
        Ok(*valid_moves
            .choose(&mut *rng)
            .expect("there should always be at least one valid move"))
    }
}
