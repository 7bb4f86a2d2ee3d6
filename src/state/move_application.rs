use std::cmp::Ordering;

use super::{GameState, PITS_PER_PLAYER, TOTAL_PITS, WINNING_SCORE};
use crate::enums::{GameStatus, Player, PLAYERS};

impl GameState {
    /// Executes a move for the current player and returns the resulting
    /// state. Pure: `self` is never modified.
    ///
    /// Callers must pre-check with `is_valid_move`; feeding an invalid pit in
    /// here is a bug.
    pub fn execute_move(&self, pit: usize) -> GameState {
        debug_assert!(
            self.is_valid_move(pit),
            "execute_move called with invalid pit {pit}"
        );

        let mut next = *self;
        let player = next.current_player;
        let opponent = player.opponent();
        let seeds = next.board[pit];
        next.board[pit] = 0;

        // Desperate auto-capture: the lone seed on the whole side sits in the
        // rightmost pit. It scores directly and the opponent must feed next.
        if seeds == 1 && pit == Self::rightmost_pit(player) && next.side_total(player) == 0 {
            next.scores[player.index()] += 1;
            next.solidarity = Some(player);
            next.current_player = opponent;
            return next.check_game_over();
        }

        let landing = if seeds as usize >= TOTAL_PITS {
            // First lap: 13 seeds cover every pit once, skipping the origin.
            let mut idx = pit;
            for _ in 0..TOTAL_PITS - 1 {
                idx = (idx + 1) % TOTAL_PITS;
                next.board[idx] += 1;
            }
            let remainder = seeds - (TOTAL_PITS as u8 - 1);

            if remainder % PITS_PER_PLAYER as u8 == 1 {
                // Auto-capture: the remainder goes straight to the score.
                next.scores[player.index()] += remainder;
                next.solidarity = None;
                next.current_player = opponent;
                return next.check_game_over();
            }

            // Second pass walks the opponent's pits only.
            let first_opponent_pit = Self::player_pits(opponent).start;
            for k in 0..remainder as usize {
                next.board[first_opponent_pit + k % PITS_PER_PLAYER] += 1;
            }
            first_opponent_pit + (remainder as usize - 1) % PITS_PER_PLAYER
        } else {
            let mut idx = pit;
            for _ in 0..seeds {
                idx = (idx + 1) % TOTAL_PITS;
                next.board[idx] += 1;
            }
            idx
        };

        if Self::pit_owner(landing) == opponent {
            next.capture_from(landing, player);
        }

        next.solidarity = None;
        next.current_player = opponent;
        next.check_game_over()
    }

    /// Backward capture walk from the landing pit through contiguous opponent
    /// pits holding 2..=4 seeds, with the drought-prevention rollback.
    fn capture_from(&mut self, landing: usize, player: Player) {
        let opponent = player.opponent();
        let mut taken: Vec<(usize, u8)> = Vec::new();
        let mut idx = landing;
        while Self::pit_owner(idx) == opponent {
            let count = self.board[idx];
            if !(2..=4).contains(&count) {
                break;
            }
            taken.push((idx, count));
            self.board[idx] = 0;
            idx = (idx + TOTAL_PITS - 1) % TOTAL_PITS;
        }
        if taken.is_empty() {
            return;
        }

        if self.side_total(opponent) == 0 {
            // The capture would starve the opponent: restore every pit to
            // exactly what was taken from it and award nothing.
            for &(restore_idx, count) in &taken {
                self.board[restore_idx] = count;
            }
        } else {
            let captured: u8 = taken.iter().map(|&(_, count)| count).sum();
            self.scores[player.index()] += captured;
        }
    }

    /// Applies terminal detection: win by score, or a stalemate sweep when
    /// the player to move has no valid move left.
    fn check_game_over(mut self) -> GameState {
        if self.scores[Player::One.index()] >= WINNING_SCORE {
            self.status = GameStatus::Finished;
            self.winner = Some(Player::One);
            return self;
        }
        if self.scores[Player::Two.index()] >= WINNING_SCORE {
            self.status = GameStatus::Finished;
            self.winner = Some(Player::Two);
            return self;
        }

        if self.valid_moves().is_empty() {
            // Stalemate: each side sweeps its own remaining seeds.
            for player in PLAYERS {
                self.scores[player.index()] += self.side_total(player);
            }
            self.board = [0; TOTAL_PITS];
            self.status = GameStatus::Finished;
            self.winner = match self.scores[0].cmp(&self.scores[1]) {
                Ordering::Greater => Some(Player::One),
                Ordering::Less => Some(Player::Two),
                Ordering::Equal => None,
            };
        }

        self
    }

    /// Environment-style step used by monitoring tools, never by the search.
    /// Returns `(next_state, reward, done)` with the reward from the mover's
    /// perspective; an invalid action ends the episode with a -1 sentinel.
    pub fn step(&self, action: usize) -> (GameState, f32, bool) {
        if self.status != GameStatus::Playing {
            return (*self, 0.0, true);
        }
        if !self.is_valid_move(action) {
            return (*self, -1.0, true);
        }

        let mover = self.current_player;
        let next = self.execute_move(action);
        let done = next.status == GameStatus::Finished;
        let reward = if done {
            match next.winner {
                Some(winner) if winner == mover => 1.0,
                Some(_) => -1.0,
                None => 0.0,
            }
        } else {
            let diff =
                f32::from(next.score(mover)) - f32::from(next.score(mover.opponent()));
            diff / f32::from(super::TOTAL_SEEDS)
        };
        (next, reward, done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{INITIAL_SEEDS, TOTAL_SEEDS};
    use rand::prelude::*;

    fn total_seeds(state: &GameState) -> u32 {
        state.board().iter().map(|&seeds| u32::from(seeds)).sum::<u32>()
            + u32::from(state.score(Player::One))
            + u32::from(state.score(Player::Two))
    }

    #[test]
    fn test_simple_distribution() {
        let state = GameState::new().execute_move(2);

        assert_eq!(
            state.board(),
            &[5, 5, 0, 6, 6, 6, 6, 6, 5, 5, 5, 5, 5, 5]
        );
        assert_eq!(state.scores(), [0, 0]);
        assert_eq!(state.current_player(), Player::Two);
        assert_eq!(state.status(), GameStatus::Playing);
    }

    #[test]
    fn test_capture_rolls_back_when_it_would_starve_opponent() {
        // P1 sows pit 6 into pits 7 and 8, making 3 and 4: both capturable,
        // but taking them would empty P2's side entirely.
        let state = GameState::from_parts(
            [0, 0, 0, 0, 0, 0, 2, 2, 3, 0, 0, 0, 0, 0],
            [30, 33],
            Player::One,
            None,
        );

        let next = state.execute_move(6);

        assert_eq!(
            next.board(),
            &[0, 0, 0, 0, 0, 0, 0, 3, 4, 0, 0, 0, 0, 0]
        );
        assert_eq!(next.scores(), [30, 33]);
        assert_eq!(next.current_player(), Player::Two);
        assert_eq!(next.status(), GameStatus::Playing);
    }

    #[test]
    fn test_cascading_capture() {
        // Landing on pit 9 with the chain 9, 8, 7 all in range captures all
        // three; pits 10..13 keep P2 alive so the capture stands.
        let state = GameState::from_parts(
            [16, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [20, 21],
            Player::One,
            None,
        );

        let next = state.execute_move(0);

        assert_eq!(
            next.board(),
            &[0, 2, 2, 2, 2, 2, 2, 0, 0, 0, 2, 2, 2, 2]
        );
        assert_eq!(next.scores(), [29, 21]);
        assert_eq!(next.current_player(), Player::Two);
        assert_eq!(total_seeds(&next), u32::from(TOTAL_SEEDS));
    }

    #[test]
    fn test_overflow_auto_capture() {
        // 14 seeds: a full lap leaves a remainder of 1, and r % 7 == 1 sends
        // the remainder straight to the mover's score.
        let state = GameState::from_parts(
            [14, 1, 1, 1, 1, 1, 1, 5, 5, 5, 5, 5, 5, 5],
            [10, 5],
            Player::One,
            None,
        );

        let next = state.execute_move(0);

        assert_eq!(
            next.board(),
            &[0, 2, 2, 2, 2, 2, 2, 6, 6, 6, 6, 6, 6, 6]
        );
        assert_eq!(next.scores(), [11, 5]);
        assert_eq!(next.current_player(), Player::Two);
        assert_eq!(next.solidarity(), None);
        assert_eq!(total_seeds(&next), u32::from(TOTAL_SEEDS));
    }

    #[test]
    fn test_desperate_auto_capture() {
        let state = GameState::from_parts(
            [0, 0, 0, 0, 0, 0, 1, 5, 5, 5, 5, 5, 5, 5],
            [17, 17],
            Player::One,
            None,
        );

        let next = state.execute_move(6);

        assert_eq!(next.board()[6], 0);
        assert_eq!(next.scores(), [18, 17]);
        assert_eq!(next.solidarity(), Some(Player::One));
        assert_eq!(next.current_player(), Player::Two);
        assert_eq!(next.status(), GameStatus::Playing);
    }

    #[test]
    fn test_desperate_auto_capture_can_win() {
        let state = GameState::from_parts(
            [0, 0, 0, 0, 0, 0, 1, 5, 5, 5, 5, 5, 4, 5],
            [35, 0],
            Player::One,
            None,
        );

        let next = state.execute_move(6);

        assert_eq!(next.score(Player::One), 36);
        assert_eq!(next.status(), GameStatus::Finished);
        assert_eq!(next.winner(), Some(Player::One));
    }

    #[test]
    fn test_stalemate_sweeps_remaining_seeds() {
        // P2 cannot feed P1's empty side and plays pit 7 short; the terminal
        // check then finds P1 without a move and sweeps both sides.
        let state = GameState::from_parts(
            [0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0],
            [33, 35],
            Player::Two,
            None,
        );

        let next = state.execute_move(7);

        assert_eq!(next.board(), &[0; TOTAL_PITS]);
        assert_eq!(next.scores(), [33, 37]);
        assert_eq!(next.status(), GameStatus::Finished);
        assert_eq!(next.winner(), Some(Player::Two));
    }

    #[test]
    fn test_stalemate_sweep_can_draw() {
        let state = GameState::from_parts(
            [0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0],
            [35, 33],
            Player::Two,
            None,
        );

        let next = state.execute_move(7);

        assert_eq!(next.scores(), [35, 35]);
        assert_eq!(next.status(), GameStatus::Finished);
        assert_eq!(next.winner(), None);
    }

    #[test]
    fn test_step_rejects_invalid_action() {
        let state = GameState::new();

        let (next, reward, done) = state.step(9);

        assert_eq!(next, state);
        assert_eq!(reward, -1.0);
        assert!(done);
    }

    #[test]
    fn test_step_reward_tracks_score_differential() {
        let state = GameState::from_parts(
            [16, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [20, 21],
            Player::One,
            None,
        );

        let (next, reward, done) = state.step(0);

        assert!(!done);
        assert_eq!(next.score(Player::One), 29);
        assert!((reward - (29.0 - 21.0) / 70.0).abs() < 1e-6);
    }

    #[test]
    fn test_invariants_over_random_play() {
        let mut rng = StdRng::seed_from_u64(0xAC0DE);

        for _ in 0..200 {
            let mut state = GameState::new();
            let mut plies = 0usize;
            while state.status() == GameStatus::Playing && plies < 2_000 {
                let moves = state.valid_moves();
                assert!(!moves.is_empty(), "playing state must have a move");
                let pit = *moves.choose(&mut rng).unwrap();

                let mover = state.current_player();
                let opponent = mover.opponent();
                let opponent_had_seeds = state.side_total(opponent) > 0;
                let scores_before = state.scores();

                let next = state.execute_move(pit);

                // Seed conservation.
                assert_eq!(total_seeds(&next), u32::from(TOTAL_SEEDS));
                // Score monotonicity.
                assert!(next.score(Player::One) >= scores_before[0]);
                assert!(next.score(Player::Two) >= scores_before[1]);
                // Turn alternation.
                assert_eq!(next.current_player(), opponent);
                // Drought prevention, modulo the stalemate sweep.
                if opponent_had_seeds && next.status() == GameStatus::Playing {
                    assert!(next.side_total(opponent) > 0, "opponent was starved");
                }

                state = next;
                plies += 1;
            }
        }
    }

    #[test]
    fn test_feeding_obligation_is_honored_in_play() {
        let mut rng = StdRng::seed_from_u64(0xFEED);

        for _ in 0..100 {
            let mut state = GameState::new();
            let mut plies = 0usize;
            while state.status() == GameStatus::Playing && plies < 2_000 {
                let target = state
                    .solidarity()
                    .unwrap_or_else(|| state.current_player().opponent());
                let enforced = state.solidarity().is_some()
                    || state.side_total(state.current_player().opponent()) == 0;
                let target_before = state.side_total(target);
                let target_score_before = state.score(target);

                let moves = state.valid_moves();
                if moves.is_empty() {
                    break;
                }
                let pit = *moves.choose(&mut rng).unwrap();
                let fed_by_count = state.board()[pit] as usize >= TOTAL_PITS
                    || (1..=state.board()[pit] as usize).any(|k| {
                        GameState::player_pits(target).contains(&((pit + k) % TOTAL_PITS))
                    });

                let next = state.execute_move(pit);

                // When feeding was enforced and some move could feed, the
                // chosen move must have been a feeding one.
                if enforced && !fed_by_count {
                    let any_feeds = GameState::player_pits(state.current_player()).any(|p| {
                        state.board()[p] as usize >= TOTAL_PITS
                            || (1..=state.board()[p] as usize).any(|k| {
                                GameState::player_pits(target)
                                    .contains(&((p + k) % TOTAL_PITS))
                            })
                    });
                    assert!(
                        !any_feeds,
                        "non-feeding move played while a feeding move existed"
                    );
                    // Unfed target keeps whatever it had, unless swept.
                    if next.status() == GameStatus::Playing {
                        assert!(next.side_total(target) <= target_before);
                        assert_eq!(next.score(target), target_score_before);
                    }
                }

                state = next;
                plies += 1;
            }
        }
    }

    #[test]
    fn test_mirror_commutes_with_execute() {
        let mut rng = StdRng::seed_from_u64(0x3144);

        for _ in 0..50 {
            let mut state = GameState::new();
            let mut plies = 0usize;
            while state.status() == GameStatus::Playing && plies < 500 {
                let mirror = state.mirrored();
                let mut mirrored_moves: Vec<usize> = state
                    .valid_moves()
                    .iter()
                    .map(|&pit| TOTAL_PITS - 1 - pit)
                    .collect();
                mirrored_moves.sort_unstable();
                assert_eq!(mirror.valid_moves(), mirrored_moves);

                let pit = *state.valid_moves().choose(&mut rng).unwrap();
                let next = state.execute_move(pit);
                assert_eq!(mirror.execute_move(TOTAL_PITS - 1 - pit), next.mirrored());

                state = next;
                plies += 1;
            }
        }
    }

    #[test]
    fn test_initial_seed_count_matches_total() {
        assert_eq!(
            u32::from(INITIAL_SEEDS) * TOTAL_PITS as u32,
            u32::from(TOTAL_SEEDS)
        );
    }
}
