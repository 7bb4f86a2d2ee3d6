use std::collections::VecDeque;

use rand::seq::index;
use rand::Rng;

use super::self_play::TrainingExample;

/// Bounded FIFO of training examples with uniform sampling. Written by the
/// self-play phase and read by the gradient steps, strictly in turn, so no
/// locking is involved.
pub struct ReplayBuffer {
    data: VecDeque<TrainingExample>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Appends a batch, then evicts from the front down to capacity.
    pub fn add(&mut self, examples: Vec<TrainingExample>) {
        for example in examples {
            self.data.push_back(example);
        }
        while self.data.len() > self.capacity {
            self.data.pop_front();
        }
    }

    /// Uniform sample without replacement; returns fewer than `k` when the
    /// buffer is smaller.
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<TrainingExample> {
        let amount = k.min(self.data.len());
        index::sample(rng, self.data.len(), amount)
            .into_iter()
            .map(|i| self.data[i].clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::nn::encoder::FEATURE_LEN;
    use crate::state::TOTAL_PITS;
    use rand::prelude::*;

    fn example_with_outcome(outcome: f32) -> TrainingExample {
        TrainingExample {
            features: [0.0; FEATURE_LEN],
            policy: [0.0; TOTAL_PITS],
            outcome,
        }
    }

    #[test]
    fn test_eviction_drops_oldest_first() {
        let mut buffer = ReplayBuffer::new(3);

        buffer.add((0..5).map(|i| example_with_outcome(i as f32)).collect());

        assert_eq!(buffer.len(), 3);
        let mut rng = StdRng::seed_from_u64(0);
        let outcomes: Vec<f32> = buffer.sample(3, &mut rng).iter().map(|e| e.outcome).collect();
        assert!(outcomes.contains(&2.0));
        assert!(outcomes.contains(&3.0));
        assert!(outcomes.contains(&4.0));
    }

    #[test]
    fn test_sample_is_without_replacement() {
        let mut buffer = ReplayBuffer::new(10);
        buffer.add((0..10).map(|i| example_with_outcome(i as f32)).collect());
        let mut rng = StdRng::seed_from_u64(1);

        let mut outcomes: Vec<f32> = buffer.sample(10, &mut rng).iter().map(|e| e.outcome).collect();
        outcomes.sort_by(f32::total_cmp);
        outcomes.dedup();

        assert_eq!(outcomes.len(), 10);
    }

    #[test]
    fn test_sample_shrinks_to_buffer_size() {
        let mut buffer = ReplayBuffer::new(10);
        buffer.add(vec![example_with_outcome(1.0)]);
        let mut rng = StdRng::seed_from_u64(2);

        assert_eq!(buffer.sample(64, &mut rng).len(), 1);
        assert!(buffer.sample(0, &mut rng).is_empty());
    }

    #[test]
    fn test_empty_buffer_samples_nothing() {
        let buffer = ReplayBuffer::new(4);
        let mut rng = StdRng::seed_from_u64(3);

        assert!(buffer.is_empty());
        assert!(buffer.sample(8, &mut rng).is_empty());
    }
}
