use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use itertools::Itertools;
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::encoder::{encode_state, FEATURE_LEN};
use super::types::PolicyValueNet;
use crate::enums::{GameResult, GameStatus, Player};
use crate::errors::SongoResult;
use crate::players::zero::{select_from_policy, Mcts, DEFAULT_C_PUCT};
use crate::state::{GameState, TOTAL_PITS};

/// Plies played under the exploration temperature before going greedy.
pub const EXPLORATION_MOVES: usize = 30;
// Safety cap so a pathological shuffle cannot spin forever.
const MAX_GAME_PLIES: usize = 10_000;

/// One replay record: the encoded state a move was chosen from, the MCTS
/// visit distribution at that state, and the final game outcome from the
/// perspective of the player who was to move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: [f32; FEATURE_LEN],
    pub policy: [f32; TOTAL_PITS],
    pub outcome: f32,
}

/// Generates training data by playing the evaluator against itself.
pub struct SelfPlayEngine<'a> {
    net: &'a dyn PolicyValueNet,
    simulations: usize,
    temperature: f64,
    base_seed: u64,
}

impl<'a> SelfPlayEngine<'a> {
    pub fn new(
        net: &'a dyn PolicyValueNet,
        simulations: usize,
        temperature: f64,
        base_seed: u64,
    ) -> Self {
        Self {
            net,
            simulations,
            temperature,
            base_seed,
        }
    }

    /// Plays one full game. Every ply records the pre-move encoding and the
    /// search's visit distribution; outcomes are assigned once the game ends.
    pub fn play_game(&self, seed: u64) -> SongoResult<(Vec<TrainingExample>, GameResult)> {
        let mcts = Mcts::new(self.net, DEFAULT_C_PUCT, self.simulations);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = GameState::new();
        let mut steps: Vec<([f32; FEATURE_LEN], [f32; TOTAL_PITS], Player)> = Vec::new();

        let mut move_count = 0usize;
        while state.status() == GameStatus::Playing && move_count < MAX_GAME_PLIES {
            let features = encode_state(&state);
            let pi = mcts.search(&state)?;
            steps.push((features, pi, state.current_player()));

            let temperature = if move_count < EXPLORATION_MOVES {
                self.temperature
            } else {
                0.0
            };
            let action = select_from_policy(&pi, &state, temperature, &mut rng)
                .expect("a playing state has at least one valid move");
            state = state.execute_move(action);
            move_count += 1;
        }
        if move_count >= MAX_GAME_PLIES {
            log::warn!("self-play game hit the {MAX_GAME_PLIES}-ply cap, scoring as draw");
        }

        let winner = state.winner();
        let result = GameResult::from_winner(winner);
        log::debug!("self-play game finished {result} after {move_count} plies");

        let examples = steps
            .into_iter()
            .map(|(features, policy, player)| TrainingExample {
                features,
                policy,
                outcome: match winner {
                    None => 0.0,
                    Some(w) if w == player => 1.0,
                    Some(_) => -1.0,
                },
            })
            .collect();
        Ok((examples, result))
    }

    /// Plays games one after another. A game that dies on an evaluator error
    /// is dropped with a warning; the other games' examples survive.
    pub fn generate_games(&self, num_games: usize) -> (Vec<TrainingExample>, Vec<GameResult>) {
        collect_games((0..num_games).map(|game| self.play_game(self.seed_for(game))))
    }

    /// Game-level parallelism: each game owns its tree and RNG, the
    /// evaluator is shared read-only.
    pub fn generate_games_parallel(
        &self,
        num_games: usize,
    ) -> (Vec<TrainingExample>, Vec<GameResult>) {
        let outcomes: Vec<_> = (0..num_games)
            .into_par_iter()
            .map(|game| self.play_game(self.seed_for(game)))
            .collect();
        collect_games(outcomes)
    }

    fn seed_for(&self, game: usize) -> u64 {
        self.base_seed.wrapping_add(game as u64)
    }
}

fn collect_games(
    outcomes: impl IntoIterator<Item = SongoResult<(Vec<TrainingExample>, GameResult)>>,
) -> (Vec<TrainingExample>, Vec<GameResult>) {
    let mut examples = Vec::new();
    let mut results = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok((game_examples, result)) => {
                examples.extend(game_examples);
                results.push(result);
            }
            Err(e) => log::warn!("self-play game aborted: {e}"),
        }
    }
    (examples, results)
}

/// "3 1-0, 2 0-1, 1 1/2-1/2"-style summary of a batch of results.
pub fn tally(results: &[GameResult]) -> String {
    let counts = results.iter().copied().counts();
    [GameResult::P1Win, GameResult::P2Win, GameResult::Draw]
        .iter()
        .map(|result| format!("{} {result}", counts.get(result).copied().unwrap_or(0)))
        .join(", ")
}

/// The mirror twin of an example: board and policy reflected about the
/// P1/P2 axis, scores swapped, side-to-move flag flipped. The outcome stays,
/// being stored relative to the (swapped) side to move.
pub fn mirror_example(example: &TrainingExample) -> TrainingExample {
    let mut features = [0f32; FEATURE_LEN];
    let mut policy = [0f32; TOTAL_PITS];
    for pit in 0..TOTAL_PITS {
        features[pit] = example.features[TOTAL_PITS - 1 - pit];
        policy[pit] = example.policy[TOTAL_PITS - 1 - pit];
    }
    features[TOTAL_PITS] = example.features[TOTAL_PITS + 1];
    features[TOTAL_PITS + 1] = example.features[TOTAL_PITS];
    features[TOTAL_PITS + 2] = 1.0 - example.features[TOTAL_PITS + 2];
    TrainingExample {
        features,
        policy,
        outcome: example.outcome,
    }
}

/// Doubles the example set with the mirror twin of each entry.
pub fn augment_examples(examples: Vec<TrainingExample>) -> Vec<TrainingExample> {
    let mut out = Vec::with_capacity(examples.len() * 2);
    for example in examples {
        let mirrored = mirror_example(&example);
        out.push(example);
        out.push(mirrored);
    }
    out
}

/// Opaque example buffer; no cross-version stability promised.
pub fn save_examples(examples: &[TrainingExample], path: &Path) -> SongoResult<()> {
    let file = BufWriter::new(File::create(path)?);
    bincode::serialize_into(file, examples)?;
    Ok(())
}

pub fn load_examples(path: &Path) -> SongoResult<Vec<TrainingExample>> {
    let file = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(file)?)
}
