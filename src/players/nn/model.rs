use candle_core::{DType, Device, Result, Tensor};
use candle_nn as nn;
use candle_nn::{Linear, Module, VarBuilder, VarMap};
use clap::ValueEnum;

use super::encoder::FEATURE_LEN;
use super::types::PolicyValueNet;
use crate::errors::SongoResult;
use crate::state::TOTAL_PITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NetworkSize {
    Small,
    Standard,
}

impl NetworkSize {
    /// Identifier stored in checkpoints and the exported weight document.
    pub fn architecture(self) -> &'static str {
        match self {
            NetworkSize::Small => "SongoNetSmall",
            NetworkSize::Standard => "SongoNet",
        }
    }

    pub fn from_architecture(name: &str) -> Option<Self> {
        match name {
            "SongoNetSmall" => Some(NetworkSize::Small),
            "SongoNet" => Some(NetworkSize::Standard),
            _ => None,
        }
    }

    pub fn default_hidden(self) -> usize {
        match self {
            NetworkSize::Small => 128,
            NetworkSize::Standard => 256,
        }
    }
}

impl std::fmt::Display for NetworkSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkSize::Small => write!(f, "small"),
            NetworkSize::Standard => write!(f, "standard"),
        }
    }
}

/// Policy/value MLP over the 17-feature encoding.
///
/// The standard variant runs three hidden layers with a residual add and
/// two-layer heads; the small variant is two hidden layers with direct
/// heads. Parameter names follow the browser client's expectations
/// (`fc1.weight`, `policy_fc.bias`, ...).
pub struct SongoNet {
    pub device: Device,
    pub varmap: VarMap,
    size: NetworkSize,
    hidden_size: usize,
    fc1: Linear,
    fc2: Linear,
    fc3: Option<Linear>,
    policy_hidden: Option<Linear>,
    policy_out: Linear,
    value_hidden: Option<Linear>,
    value_out: Linear,
}

impl SongoNet {
    pub fn new(size: NetworkSize, hidden_size: usize, device: Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let fc1 = nn::linear(FEATURE_LEN, hidden_size, vb.pp("fc1"))?;
        let fc2 = nn::linear(hidden_size, hidden_size, vb.pp("fc2"))?;

        let (fc3, policy_hidden, policy_out, value_hidden, value_out) = match size {
            NetworkSize::Standard => {
                let fc3 = nn::linear(hidden_size, hidden_size, vb.pp("fc3"))?;
                let policy_hidden = nn::linear(hidden_size, hidden_size / 2, vb.pp("policy_fc1"))?;
                let policy_out = nn::linear(hidden_size / 2, TOTAL_PITS, vb.pp("policy_fc2"))?;
                let value_hidden = nn::linear(hidden_size, hidden_size / 4, vb.pp("value_fc1"))?;
                let value_out = nn::linear(hidden_size / 4, 1, vb.pp("value_fc2"))?;
                (
                    Some(fc3),
                    Some(policy_hidden),
                    policy_out,
                    Some(value_hidden),
                    value_out,
                )
            }
            NetworkSize::Small => {
                let policy_out = nn::linear(hidden_size, TOTAL_PITS, vb.pp("policy_fc"))?;
                let value_out = nn::linear(hidden_size, 1, vb.pp("value_fc"))?;
                (None, None, policy_out, None, value_out)
            }
        };

        Ok(Self {
            device,
            varmap,
            size,
            hidden_size,
            fc1,
            fc2,
            fc3,
            policy_hidden,
            policy_out,
            value_hidden,
            value_out,
        })
    }

    pub fn size(&self) -> NetworkSize {
        self.size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Forward pass over a `[B, 17]` batch.
    /// Returns `(policy_logits [B, 14], values [B, 1])`, values in [-1, 1].
    pub fn forward(&self, xs: &Tensor) -> Result<(Tensor, Tensor)> {
        let x1 = self.fc1.forward(xs)?.relu()?;
        let x2 = self.fc2.forward(&x1)?.relu()?;
        let trunk = match &self.fc3 {
            Some(fc3) => (fc3.forward(&x2)?.relu()? + &x1)?,
            None => x2,
        };

        let policy = match &self.policy_hidden {
            Some(fc) => fc.forward(&trunk)?.relu()?,
            None => trunk.clone(),
        };
        let policy_logits = self.policy_out.forward(&policy)?;

        let value = match &self.value_hidden {
            Some(fc) => fc.forward(&trunk)?.relu()?,
            None => trunk,
        };
        let values = self.value_out.forward(&value)?.tanh()?;

        Ok((policy_logits, values))
    }
}

impl PolicyValueNet for SongoNet {
    fn evaluate(&self, features: &[f32; FEATURE_LEN]) -> SongoResult<([f32; TOTAL_PITS], f32)> {
        let xs = Tensor::from_vec(features.to_vec(), (1, FEATURE_LEN), &self.device)?;
        let (logits, values) = self.forward(&xs)?;
        let logits: Vec<f32> = logits.flatten_all()?.to_vec1()?;
        let value = values.flatten_all()?.to_vec1::<f32>()?[0];

        let mut policy = [0f32; TOTAL_PITS];
        policy.copy_from_slice(&softmax(&logits));
        Ok((policy, value))
    }
}

/// Host-side softmax with the all-zero guard: degenerate logits fall back to
/// a uniform distribution rather than NaNs.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut exps: Vec<f32> = logits.iter().map(|&logit| (logit - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    if total > 0.0 {
        for e in exps.iter_mut() {
            *e /= total;
        }
    } else {
        let uniform = 1.0 / logits.len() as f32;
        for e in exps.iter_mut() {
            *e = uniform;
        }
    }
    exps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::nn::encoder::encode_state;
    use crate::state::GameState;

    #[test]
    fn test_forward_shapes() {
        let net = SongoNet::new(NetworkSize::Standard, 32, Device::Cpu).unwrap();
        let xs = Tensor::zeros((4, FEATURE_LEN), DType::F32, &Device::Cpu).unwrap();

        let (logits, values) = net.forward(&xs).unwrap();

        assert_eq!(logits.dims(), &[4, TOTAL_PITS]);
        assert_eq!(values.dims(), &[4, 1]);
    }

    #[test]
    fn test_evaluate_satisfies_the_contract() {
        for size in [NetworkSize::Small, NetworkSize::Standard] {
            let net = SongoNet::new(size, 16, Device::Cpu).unwrap();
            let features = encode_state(&GameState::new());

            let (policy, value) = net.evaluate(&features).unwrap();

            let sum: f32 = policy.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
            assert!(policy.iter().all(|&p| p >= 0.0));
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_softmax_all_zero_guard() {
        let probs = softmax(&[f32::NEG_INFINITY, f32::NEG_INFINITY]);

        assert_eq!(probs, vec![0.5, 0.5]);
    }
}
