use super::encoder::FEATURE_LEN;
use super::types::PolicyValueNet;
use crate::errors::SongoResult;
use crate::state::TOTAL_PITS;

/// Uniform priors, neutral value. Stands in when no weights are available
/// and doubles as the search test evaluator.
pub struct UniformNet;

impl PolicyValueNet for UniformNet {
    fn evaluate(&self, _features: &[f32; FEATURE_LEN]) -> SongoResult<([f32; TOTAL_PITS], f32)> {
        Ok(([1.0 / TOTAL_PITS as f32; TOTAL_PITS], 0.0))
    }
}
