use std::path::PathBuf;

use clap::Parser;

use songo::enums::{GameResult, GameStatus, Player};
use songo::errors::SongoResult;
use songo::players::nn::self_play::tally;
use songo::players::nn::{loader, PolicyValueNet, UniformNet};
use songo::players::{AlphaZeroPlayer, BotPlayer, RandomPlayer};
use songo::state::GameState;

/// Plays monitoring games of the network (greedy MCTS) against a random
/// opponent, rendering boards along the way.
#[derive(Parser, Debug)]
#[command(name = "simulate")]
struct SimulateConfig {
    /// Number of games to play (sides alternate)
    #[arg(long, default_value_t = 4)]
    games: usize,

    /// MCTS simulations per move
    #[arg(long, default_value_t = 50)]
    mcts_simulations: usize,

    /// Checkpoint to load; defaults to checkpoints/latest when present
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Render every position of the first game
    #[arg(long, default_value_t = false)]
    render: bool,

    /// RNG seed for the random opponent
    #[arg(long, default_value_t = 0xD1CE)]
    seed: u64,
}

fn main() {
    env_logger::init();
    let config = SimulateConfig::parse();
    if let Err(e) = run(&config) {
        eprintln!("[simulate] fatal: {e}");
        std::process::exit(1);
    }
}

fn run(config: &SimulateConfig) -> SongoResult<()> {
    let device = loader::device();

    // Explicit checkpoints must load; the default latest is best-effort.
    let net: Box<dyn PolicyValueNet> = match &config.checkpoint {
        Some(path) => {
            let (net, meta) = loader::open_checkpoint(path, device)?;
            println!(
                "[simulate] loaded {} (hidden {}, iteration {})",
                meta.architecture, meta.hidden_size, meta.iteration
            );
            Box::new(net)
        }
        None => {
            let latest = loader::weights_path(
                &PathBuf::from(loader::DEFAULT_CHECKPOINT_DIR),
                loader::LATEST_STEM,
            );
            match loader::open_checkpoint(&latest, device) {
                Ok((net, meta)) => {
                    println!(
                        "[simulate] loaded {} (hidden {}, iteration {})",
                        meta.architecture, meta.hidden_size, meta.iteration
                    );
                    Box::new(net)
                }
                Err(e) => {
                    log::info!("no checkpoint found ({e}); playing with uniform priors");
                    Box::new(UniformNet)
                }
            }
        }
    };

    let zero = AlphaZeroPlayer::new(net.as_ref(), config.mcts_simulations);
    let random = RandomPlayer::new(config.seed);

    let mut results = Vec::with_capacity(config.games);
    for game in 0..config.games {
        let net_player = if game % 2 == 0 { Player::One } else { Player::Two };
        let result = play_game(&zero, &random, net_player, config.render && game == 0)?;
        println!("[simulate] game {}: {} (network is {:?})", game + 1, result, net_player);
        results.push(result);
    }

    println!("[simulate] tally: {}", tally(&results));
    Ok(())
}

fn play_game(
    zero: &AlphaZeroPlayer,
    random: &RandomPlayer,
    net_player: Player,
    render: bool,
) -> SongoResult<GameResult> {
    const MAX_PLIES: usize = 10_000;

    let mut state = GameState::new();
    let mut reward_trace = 0.0f32;
    let mut plies = 0usize;

    while state.status() == GameStatus::Playing && plies < MAX_PLIES {
        let valid_moves = state.valid_moves();
        let mover = state.current_player();
        let action = if mover == net_player {
            zero.decide(&state, &valid_moves)?
        } else {
            random.decide(&state, &valid_moves)?
        };

        let (next, reward, done) = state.step(action);
        if mover == net_player {
            reward_trace = reward;
        }
        if render {
            println!("{next}");
            println!();
        }
        state = next;
        plies += 1;
        if done {
            break;
        }
    }

    log::debug!("final network-side reward signal: {reward_trace:.3}");
    Ok(GameResult::from_winner(state.winner()))
}
