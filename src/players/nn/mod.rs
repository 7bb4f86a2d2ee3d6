// Neural-network side of the trainer: evaluator contract, candle model,
// encoding, self-play, replay and persistence.

pub mod encoder;
pub mod evaluate;
pub mod export;
pub mod loader;
pub mod model;
pub mod noop_impl;
pub mod replay;
pub mod self_play;
pub mod types;

pub use self::model::{NetworkSize, SongoNet};
pub use self::noop_impl::UniformNet;
pub use self::replay::ReplayBuffer;
pub use self::self_play::{SelfPlayEngine, TrainingExample};
pub use self::types::PolicyValueNet;
