use rand::prelude::*;

use super::types::PolicyValueNet;
use crate::enums::{GameStatus, Player};
use crate::errors::SongoResult;
use crate::players::zero::{select_from_policy, Mcts, DEFAULT_C_PUCT};
use crate::state::GameState;

// Same safety cap as self-play; a capped game scores as a draw.
const MAX_GAME_PLIES: usize = 10_000;

/// Plays side-alternating games of greedy MCTS against uniform-random move
/// selection and tallies `(wins, draws, losses)` from the network's
/// perspective.
pub fn evaluate_vs_random(
    net: &dyn PolicyValueNet,
    num_games: usize,
    simulations: usize,
    seed: u64,
) -> SongoResult<(usize, usize, usize)> {
    let mcts = Mcts::new(net, DEFAULT_C_PUCT, simulations);
    let mut rng = StdRng::seed_from_u64(seed);
    let (mut wins, mut draws, mut losses) = (0, 0, 0);

    for game in 0..num_games {
        let net_player = if game % 2 == 0 { Player::One } else { Player::Two };
        let mut state = GameState::new();

        let mut plies = 0usize;
        while state.status() == GameStatus::Playing && plies < MAX_GAME_PLIES {
            let action = if state.current_player() == net_player {
                let pi = mcts.search(&state)?;
                select_from_policy(&pi, &state, 0.0, &mut rng)
                    .expect("a playing state has at least one valid move")
            } else {
                *state
                    .valid_moves()
                    .choose(&mut rng)
                    .expect("a playing state has at least one valid move")
            };
            state = state.execute_move(action);
            plies += 1;
        }

        match state.winner() {
            None => draws += 1,
            Some(winner) if winner == net_player => wins += 1,
            Some(_) => losses += 1,
        }
    }

    Ok((wins, draws, losses))
}
