use candle_core::{Device, Result as CandleResult, Tensor};

use crate::enums::Player;
use crate::state::{GameState, TOTAL_PITS, TOTAL_SEEDS};

/// board(14) + scores(2) + side-to-move flag(1)
pub const FEATURE_LEN: usize = TOTAL_PITS + 3;

/// Fixed-size network input for one state. Seed counts and scores are
/// normalized by the 70-seed conservation constant; the flag is 0 for P1 to
/// move and 1 for P2. Bit-identical for equal states.
pub fn encode_state(state: &GameState) -> [f32; FEATURE_LEN] {
    let mut features = [0f32; FEATURE_LEN];
    let scale = f32::from(TOTAL_SEEDS);
    for (pit, &seeds) in state.board().iter().enumerate() {
        features[pit] = f32::from(seeds) / scale;
    }
    features[TOTAL_PITS] = f32::from(state.score(Player::One)) / scale;
    features[TOTAL_PITS + 1] = f32::from(state.score(Player::Two)) / scale;
    features[TOTAL_PITS + 2] = match state.current_player() {
        Player::One => 0.0,
        Player::Two => 1.0,
    };
    features
}

/// Stacks encoded states into a `[B, 17]` tensor.
pub fn features_tensor(batch: &[[f32; FEATURE_LEN]], device: &Device) -> CandleResult<Tensor> {
    let flat: Vec<f32> = batch.iter().flatten().copied().collect();
    Tensor::from_vec(flat, (batch.len(), FEATURE_LEN), device)
}

/// Stacks policy targets into a `[B, 14]` tensor.
pub fn policy_tensor(batch: &[[f32; TOTAL_PITS]], device: &Device) -> CandleResult<Tensor> {
    let flat: Vec<f32> = batch.iter().flatten().copied().collect();
    Tensor::from_vec(flat, (batch.len(), TOTAL_PITS), device)
}

/// Game outcomes as a `[B]` tensor.
pub fn outcome_tensor(outcomes: &[f32], device: &Device) -> CandleResult<Tensor> {
    Tensor::from_vec(outcomes.to_vec(), outcomes.len(), device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::INITIAL_SEEDS;

    #[test]
    fn test_initial_state_encoding() {
        let features = encode_state(&GameState::new());

        let seed_fraction = f32::from(INITIAL_SEEDS) / f32::from(TOTAL_SEEDS);
        for pit in 0..TOTAL_PITS {
            assert_eq!(features[pit], seed_fraction);
        }
        assert_eq!(features[14], 0.0);
        assert_eq!(features[15], 0.0);
        assert_eq!(features[16], 0.0);
    }

    #[test]
    fn test_encoding_is_pure() {
        let state = GameState::new().execute_move(2);

        assert_eq!(encode_state(&state), encode_state(&state));
    }

    #[test]
    fn test_side_to_move_flag() {
        let state = GameState::new().execute_move(0);

        assert_eq!(state.current_player(), Player::Two);
        assert_eq!(encode_state(&state)[16], 1.0);
    }

    #[test]
    fn test_scores_are_normalized() {
        let state = GameState::from_parts(
            [16, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [20, 21],
            Player::One,
            None,
        )
        .execute_move(0);

        let features = encode_state(&state);
        assert!((features[14] - 29.0 / 70.0).abs() < 1e-6);
        assert!((features[15] - 21.0 / 70.0).abs() < 1e-6);
    }

    #[test]
    fn test_batch_tensor_shapes() {
        let device = Device::Cpu;
        let features = [encode_state(&GameState::new()); 3];

        let xs = features_tensor(&features, &device).unwrap();
        assert_eq!(xs.dims(), &[3, FEATURE_LEN]);

        let pi = policy_tensor(&[[0.0; TOTAL_PITS]; 3], &device).unwrap();
        assert_eq!(pi.dims(), &[3, TOTAL_PITS]);

        let outcomes = outcome_tensor(&[1.0, 0.0, -1.0], &device).unwrap();
        assert_eq!(outcomes.dims(), &[3]);
    }
}
