use std::path::PathBuf;
use std::time::Instant;

use candle_core::{Device, D};
use candle_nn::{AdamW, Optimizer, ParamsAdamW};
use clap::Parser;
use rand::prelude::*;

use songo::errors::{SongoError, SongoResult};
use songo::players::nn::evaluate::evaluate_vs_random;
use songo::players::nn::self_play::{augment_examples, tally, SelfPlayEngine, TrainingExample};
use songo::players::nn::{encoder, loader, NetworkSize, ReplayBuffer, SongoNet};
use songo::state::TOTAL_PITS;

/// AlphaZero-style self-play training for Songo.
#[derive(Parser, Debug)]
#[command(name = "train")]
struct TrainConfig {
    /// Network architecture variant
    #[arg(long, value_enum, default_value_t = NetworkSize::Standard)]
    network_size: NetworkSize,

    /// Hidden layer width
    #[arg(long, default_value_t = 256)]
    hidden_size: usize,

    /// Number of training iterations
    #[arg(long, default_value_t = 100)]
    num_iterations: usize,

    /// Self-play games per iteration
    #[arg(long, default_value_t = 50)]
    games_per_iteration: usize,

    /// MCTS simulations per move
    #[arg(long, default_value_t = 100)]
    mcts_simulations: usize,

    /// Exploration temperature for the opening plies of self-play
    #[arg(long, default_value_t = 1.0)]
    temperature: f64,

    /// Training batch size
    #[arg(long, default_value_t = 128)]
    batch_size: usize,

    /// Gradient steps per iteration
    #[arg(long, default_value_t = 100)]
    train_steps_per_iteration: usize,

    /// AdamW learning rate
    #[arg(long, default_value_t = 1e-3)]
    learning_rate: f64,

    /// Replay buffer capacity
    #[arg(long, default_value_t = 50_000)]
    replay_buffer_size: usize,

    /// Mirror-augment self-play examples
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    use_augmentation: bool,

    /// Evaluate against the random player every N iterations
    #[arg(long, default_value_t = 5)]
    eval_frequency: usize,

    /// Games per evaluation
    #[arg(long, default_value_t = 20)]
    eval_games: usize,

    /// Persist an iter_<N> checkpoint every N iterations
    #[arg(long, default_value_t = 10)]
    checkpoint_frequency: usize,

    /// Resume from a checkpoint (.safetensors/.json stem)
    #[arg(long)]
    resume_from: Option<PathBuf>,

    /// Checkpoint directory
    #[arg(long, default_value = loader::DEFAULT_CHECKPOINT_DIR)]
    checkpoint_dir: PathBuf,

    /// Base RNG seed for self-play and evaluation
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,
}

impl TrainConfig {
    fn validate(&self) -> SongoResult<()> {
        if self.hidden_size < 4 {
            return Err(SongoError::Config(
                "hidden_size must be at least 4".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(SongoError::Config("batch_size must be positive".to_string()));
        }
        if self.eval_frequency == 0 || self.checkpoint_frequency == 0 {
            return Err(SongoError::Config(
                "eval_frequency and checkpoint_frequency must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn main() {
    env_logger::init();
    let config = TrainConfig::parse();
    if let Err(e) = run(&config) {
        eprintln!("[train] fatal: {e}");
        std::process::exit(1);
    }
}

fn run(config: &TrainConfig) -> SongoResult<()> {
    config.validate()?;
    println!(
        "[train] start: {} hidden={} iterations={} games/iter={} sims={} batch={} lr={}",
        config.network_size.architecture(),
        config.hidden_size,
        config.num_iterations,
        config.games_per_iteration,
        config.mcts_simulations,
        config.batch_size,
        config.learning_rate,
    );

    let mut net = SongoNet::new(config.network_size, config.hidden_size, loader::device())?;

    let mut start_iteration = 0;
    if let Some(path) = &config.resume_from {
        let meta = loader::load_checkpoint(&mut net, path)?;
        start_iteration = meta.iteration;
        println!(
            "[train] resumed from {} at iteration {}",
            path.display(),
            meta.iteration
        );
    }

    let mut opt = AdamW::new(
        net.varmap.all_vars(),
        ParamsAdamW {
            lr: config.learning_rate,
            ..Default::default()
        },
    )?;
    let mut replay = ReplayBuffer::new(config.replay_buffer_size);
    let mut rng = StdRng::seed_from_u64(config.seed);

    for iteration in start_iteration..config.num_iterations {
        if let Err(e) = train_iteration(config, &net, &mut opt, &mut replay, &mut rng, iteration) {
            eprintln!("[train] fatal during iteration {}: {e}", iteration + 1);
            std::process::exit(1);
        }
    }

    println!("[train] done: {} iterations", config.num_iterations);
    Ok(())
}

fn train_iteration(
    config: &TrainConfig,
    net: &SongoNet,
    opt: &mut AdamW,
    replay: &mut ReplayBuffer,
    rng: &mut StdRng,
    iteration: usize,
) -> SongoResult<()> {
    println!(
        "[train] iteration {}/{}",
        iteration + 1,
        config.num_iterations
    );

    // Self-play phase: the network is a read-only snapshot here; the
    // optimizer only touches it after every game has finished.
    let sp_t0 = Instant::now();
    let engine = SelfPlayEngine::new(
        net,
        config.mcts_simulations,
        config.temperature,
        game_seed(config.seed, iteration),
    );
    let (mut examples, results) = engine.generate_games_parallel(config.games_per_iteration);
    println!(
        "[train] self-play: {} games ({}) -> {} examples in {}ms",
        results.len(),
        tally(&results),
        examples.len(),
        sp_t0.elapsed().as_millis()
    );

    if config.use_augmentation {
        examples = augment_examples(examples);
        println!("[train] augmentation: {} examples", examples.len());
    }
    replay.add(examples);
    println!("[train] replay buffer: {}", replay.len());

    // Gradient steps over uniform minibatches.
    let tr_t0 = Instant::now();
    let mut policy_losses = Vec::new();
    let mut value_losses = Vec::new();
    for _ in 0..config.train_steps_per_iteration {
        let batch = replay.sample(config.batch_size, rng);
        if batch.is_empty() {
            break;
        }
        let (policy_loss, value_loss) = train_step(net, opt, &batch, &net.device)?;
        policy_losses.push(policy_loss);
        value_losses.push(value_loss);
    }
    println!(
        "[train] loss: policy={:.4} value={:.4} total={:.4} ({} steps in {}ms)",
        mean(&policy_losses),
        mean(&value_losses),
        mean(&policy_losses) + mean(&value_losses),
        policy_losses.len(),
        tr_t0.elapsed().as_millis()
    );

    if (iteration + 1) % config.eval_frequency == 0 {
        let (wins, draws, losses) = evaluate_vs_random(
            net,
            config.eval_games,
            config.mcts_simulations,
            eval_seed(config.seed, iteration),
        )?;
        println!(
            "[train] eval vs random: W{} D{} L{} ({:.1}% wins)",
            wins,
            draws,
            losses,
            100.0 * wins as f64 / config.eval_games.max(1) as f64
        );
    }

    if (iteration + 1) % config.checkpoint_frequency == 0 {
        let stem = format!("iter_{}", iteration + 1);
        loader::save_checkpoint(net, iteration + 1, &config.checkpoint_dir, &stem)?;
        println!(
            "[train] checkpoint: {}",
            loader::weights_path(&config.checkpoint_dir, &stem).display()
        );
    }
    loader::save_checkpoint(net, iteration + 1, &config.checkpoint_dir, loader::LATEST_STEM)?;
    Ok(())
}

/// One AdamW step on `policy_ce + value_mse` over the sampled minibatch.
fn train_step(
    net: &SongoNet,
    opt: &mut AdamW,
    batch: &[TrainingExample],
    device: &Device,
) -> SongoResult<(f32, f32)> {
    let features: Vec<[f32; encoder::FEATURE_LEN]> = batch.iter().map(|ex| ex.features).collect();
    let policies: Vec<[f32; TOTAL_PITS]> = batch.iter().map(|ex| ex.policy).collect();
    let outcomes: Vec<f32> = batch.iter().map(|ex| ex.outcome).collect();

    let xs = encoder::features_tensor(&features, device)?;
    let target_pi = encoder::policy_tensor(&policies, device)?;
    let target_v = encoder::outcome_tensor(&outcomes, device)?;

    let (logits, values) = net.forward(&xs)?;

    // Cross-entropy of the visit distribution against the policy head.
    let log_probs = candle_nn::ops::log_softmax(&logits, D::Minus1)?;
    let policy_loss = (&target_pi * &log_probs)?
        .sum(D::Minus1)?
        .mean_all()?
        .neg()?;
    // MSE of the tanh value head against the game outcome.
    let value_loss = (values.squeeze(D::Minus1)? - target_v)?.sqr()?.mean_all()?;

    let total = (&policy_loss + &value_loss)?;
    opt.backward_step(&total)?;

    Ok((
        policy_loss.to_scalar::<f32>()?,
        value_loss.to_scalar::<f32>()?,
    ))
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

fn game_seed(base: u64, iteration: usize) -> u64 {
    base.wrapping_add((iteration as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn eval_seed(base: u64, iteration: usize) -> u64 {
    game_seed(base, iteration) ^ 0xE7A1
}
