use super::encoder::FEATURE_LEN;
use crate::errors::SongoResult;
use crate::state::TOTAL_PITS;

/// Contract between the search and whatever produces policy priors and
/// state values.
///
/// The policy covers all 14 pits; masking invalid moves is the caller's job
/// (the search renormalizes over legal actions). The value is in [-1, 1]
/// from the perspective of the encoded side to move. Implementations must be
/// stateless per call and safe to share read-only across self-play games.
pub trait PolicyValueNet: Send + Sync {
    fn evaluate(&self, features: &[f32; FEATURE_LEN]) -> SongoResult<([f32; TOTAL_PITS], f32)>;
}
