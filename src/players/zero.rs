use rand::distributions::WeightedIndex;
use rand::prelude::*;

use super::nn::encoder::encode_state;
use super::nn::types::PolicyValueNet;
use super::BotPlayer;
use crate::enums::GameStatus;
use crate::errors::SongoResult;
use crate::state::{GameState, TOTAL_PITS};

// Hyperparameters
pub const DEFAULT_SIMULATIONS: usize = 100;
pub const DEFAULT_C_PUCT: f64 = 1.0;

struct MctsNode {
    state: GameState,
    parent: Option<usize>,
    action_in: Option<usize>,
    prior: f64,
    visit_count: u32,
    value_sum: f64,
    children: Vec<usize>, // arena indices, in insertion order
}

impl MctsNode {
    fn new(state: GameState, parent: Option<usize>, action_in: Option<usize>, prior: f64) -> Self {
        Self {
            state,
            parent,
            action_in,
            prior,
            visit_count: 0,
            value_sum: 0.0,
            children: Vec::new(),
        }
    }

    /// Mean value; 0 while unvisited.
    fn q(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / f64::from(self.visit_count)
        }
    }

    fn is_terminal(&self) -> bool {
        self.state.status() == GameStatus::Finished
    }
}

/// AlphaZero-style PUCT search. The tree is arena-allocated, rooted fresh
/// per `search` call and dropped afterwards; the evaluator captured at
/// construction is read-only for the whole search.
pub struct Mcts<'a> {
    net: &'a dyn PolicyValueNet,
    c_puct: f64,
    simulations: usize,
}

impl<'a> Mcts<'a> {
    pub fn new(net: &'a dyn PolicyValueNet, c_puct: f64, simulations: usize) -> Self {
        Self {
            net,
            c_puct,
            simulations,
        }
    }

    /// Runs the configured number of simulations from `state` and returns
    /// the visit-count distribution over all 14 pits. Actions without a
    /// child stay at zero; the distribution sums to 1 whenever the root has
    /// at least one valid move.
    pub fn search(&self, state: &GameState) -> SongoResult<[f32; TOTAL_PITS]> {
        let mut nodes = vec![MctsNode::new(*state, None, None, 1.0)];
        for _ in 0..self.simulations {
            self.simulate(&mut nodes)?;
        }

        let mut pi = [0f32; TOTAL_PITS];
        let root = &nodes[0];
        let total: u32 = root
            .children
            .iter()
            .map(|&child| nodes[child].visit_count)
            .sum();
        if total > 0 {
            for &child in &root.children {
                let action = nodes[child]
                    .action_in
                    .expect("non-root node records its action");
                pi[action] = nodes[child].visit_count as f32 / total as f32;
            }
        }
        log::debug!(
            "search done: {} nodes, {} root visits",
            nodes.len(),
            nodes[0].visit_count
        );
        Ok(pi)
    }

    /// Convenience wrapper: search, then pick a move under `temperature`.
    pub fn get_action_with_temp<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        temperature: f64,
        rng: &mut R,
    ) -> SongoResult<Option<usize>> {
        let pi = self.search(state)?;
        Ok(select_from_policy(&pi, state, temperature, rng))
    }

    fn simulate(&self, nodes: &mut Vec<MctsNode>) -> SongoResult<()> {
        // Selection: descend while the node has children.
        let mut idx = 0;
        while !nodes[idx].children.is_empty() {
            idx = self.select_child(nodes, idx);
        }

        if nodes[idx].is_terminal() {
            // Score from the perspective of the player whose move produced
            // this state.
            let value = match nodes[idx].parent {
                Some(parent) => {
                    let mover = nodes[parent].state.current_player();
                    match nodes[idx].state.winner() {
                        Some(winner) if winner == mover => 1.0,
                        Some(_) => -1.0,
                        None => 0.0,
                    }
                }
                None => 0.0,
            };
            backup(nodes, idx, value);
            return Ok(());
        }

        // Expansion: one child per valid move, priors renormalized over them.
        let features = encode_state(&nodes[idx].state);
        let (policy, value) = self.net.evaluate(&features)?;
        let valid_moves = nodes[idx].state.valid_moves();
        if !valid_moves.is_empty() {
            let mass: f32 = valid_moves.iter().map(|&action| policy[action]).sum();
            for &action in &valid_moves {
                let prior = if mass > 0.0 {
                    f64::from(policy[action] / mass)
                } else {
                    1.0 / valid_moves.len() as f64
                };
                let child_state = nodes[idx].state.execute_move(action);
                let child = MctsNode::new(child_state, Some(idx), Some(action), prior);
                let child_idx = nodes.len();
                nodes.push(child);
                nodes[idx].children.push(child_idx);
            }
        }

        // The evaluator speaks for the side to move at the leaf; back-up
        // credits the player who moved into it, hence the sign flip.
        backup(nodes, idx, -f64::from(value));
        Ok(())
    }

    fn select_child(&self, nodes: &[MctsNode], parent: usize) -> usize {
        let total_visits: u32 = nodes[parent]
            .children
            .iter()
            .map(|&child| nodes[child].visit_count)
            .sum();
        let sqrt_total = f64::from(total_visits).sqrt();

        let mut best = nodes[parent].children[0];
        let mut best_score = f64::NEG_INFINITY;
        for &child_idx in &nodes[parent].children {
            let child = &nodes[child_idx];
            // Children hold the opponent's to-move state, hence -Q.
            let score = -child.q()
                + self.c_puct * child.prior * sqrt_total / (1.0 + f64::from(child.visit_count));
            if score > best_score {
                best_score = score;
                best = child_idx;
            }
        }
        best
    }
}

fn backup(nodes: &mut [MctsNode], leaf: usize, mut value: f64) {
    let mut current = Some(leaf);
    while let Some(idx) = current {
        let node = &mut nodes[idx];
        node.visit_count += 1;
        node.value_sum += value;
        value = -value;
        current = node.parent;
    }
}

/// Picks a move from a visit-count distribution under temperature `tau`.
///
/// `tau == 0` is greedy with smallest-index tie-breaking; otherwise the
/// distribution is raised to `1/tau` and sampled over the valid moves, with
/// a uniform fallback when the whole mass sits on zero.
pub fn select_from_policy<R: Rng + ?Sized>(
    pi: &[f32; TOTAL_PITS],
    state: &GameState,
    temperature: f64,
    rng: &mut R,
) -> Option<usize> {
    let valid_moves = state.valid_moves();
    if valid_moves.is_empty() {
        return None;
    }

    if temperature == 0.0 {
        let mut best = valid_moves[0];
        let mut best_prob = pi[best];
        for &action in &valid_moves[1..] {
            if pi[action] > best_prob {
                best_prob = pi[action];
                best = action;
            }
        }
        return Some(best);
    }

    let weights: Vec<f64> = valid_moves
        .iter()
        .map(|&action| f64::from(pi[action]).powf(1.0 / temperature))
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return valid_moves.choose(rng).copied();
    }
    let dist = WeightedIndex::new(&weights).expect("weights are non-negative with positive sum");
    Some(valid_moves[dist.sample(rng)])
}

/// Plays greedy full-strength searches; used for evaluation games.
pub struct AlphaZeroPlayer<'a> {
    net: &'a dyn PolicyValueNet,
    simulations: usize,
    c_puct: f64,
}

impl<'a> AlphaZeroPlayer<'a> {
    pub fn new(net: &'a dyn PolicyValueNet, simulations: usize) -> Self {
        Self {
            net,
            simulations,
            c_puct: DEFAULT_C_PUCT,
        }
    }
}

impl BotPlayer for AlphaZeroPlayer<'_> {
    fn decide(&self, state: &GameState, valid_moves: &[usize]) -> SongoResult<usize> {
        if valid_moves.len() == 1 {
            return Ok(valid_moves[0]);
        }
        let mcts = Mcts::new(self.net, self.c_puct, self.simulations);
        let pi = mcts.search(state)?;
        Ok(select_from_policy(&pi, state, 0.0, &mut rand::thread_rng())
            .expect("decide called on a state with valid moves"))
    }
}
