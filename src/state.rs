use std::fmt;
use std::ops::Range;

use crate::enums::{GameStatus, Player};

pub mod move_application;
pub mod move_generation;

pub const PITS_PER_PLAYER: usize = 7;
pub const TOTAL_PITS: usize = 14;
pub const INITIAL_SEEDS: u8 = 5;
pub const WINNING_SCORE: u8 = 36;
/// Total seeds in play; conserved between board and scores at every
/// reachable state.
pub const TOTAL_SEEDS: u8 = 70;

/// Full Songo game state. A plain value type: moves produce new states and
/// never mutate the one they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    board: [u8; TOTAL_PITS],
    scores: [u8; 2],
    current_player: Player,
    status: GameStatus,
    winner: Option<Player>,
    /// `Some(beneficiary)` when the next move must feed that player's side.
    solidarity: Option<Player>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: [INITIAL_SEEDS; TOTAL_PITS],
            scores: [0, 0],
            current_player: Player::One,
            status: GameStatus::Playing,
            winner: None,
            solidarity: None,
        }
    }

    pub(crate) fn from_parts(
        board: [u8; TOTAL_PITS],
        scores: [u8; 2],
        current_player: Player,
        solidarity: Option<Player>,
    ) -> Self {
        Self {
            board,
            scores,
            current_player,
            status: GameStatus::Playing,
            winner: None,
            solidarity,
        }
    }

    pub fn pit_owner(pit: usize) -> Player {
        if pit < PITS_PER_PLAYER {
            Player::One
        } else {
            Player::Two
        }
    }

    pub fn player_pits(player: Player) -> Range<usize> {
        match player {
            Player::One => 0..PITS_PER_PLAYER,
            Player::Two => PITS_PER_PLAYER..TOTAL_PITS,
        }
    }

    pub fn rightmost_pit(player: Player) -> usize {
        match player {
            Player::One => PITS_PER_PLAYER - 1,
            Player::Two => TOTAL_PITS - 1,
        }
    }

    // ===== Getters =====
    pub fn board(&self) -> &[u8; TOTAL_PITS] {
        &self.board
    }

    pub fn score(&self, player: Player) -> u8 {
        self.scores[player.index()]
    }

    pub fn scores(&self) -> [u8; 2] {
        self.scores
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn solidarity(&self) -> Option<Player> {
        self.solidarity
    }

    /// Seeds remaining on one player's side of the board.
    pub fn side_total(&self, player: Player) -> u8 {
        self.board[Self::player_pits(player)]
            .iter()
            .map(|&seeds| u32::from(seeds))
            .sum::<u32>() as u8
    }

    /// The board-mirror twin of this state: pit `i` maps to `13 - i`, scores
    /// and all player-valued fields swap sides.
    pub fn mirrored(&self) -> GameState {
        let mut board = [0u8; TOTAL_PITS];
        for (i, slot) in board.iter_mut().enumerate() {
            *slot = self.board[TOTAL_PITS - 1 - i];
        }
        GameState {
            board,
            scores: [self.scores[1], self.scores[0]],
            current_player: self.current_player.opponent(),
            status: self.status,
            winner: self.winner.map(Player::opponent),
            solidarity: self.solidarity.map(Player::opponent),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "P1 {} - {} P2, {:?} to move",
            self.scores[0],
            self.scores[1],
            self.current_player
        )?;
        write!(f, "P2: ")?;
        for pit in (PITS_PER_PLAYER..TOTAL_PITS).rev() {
            write!(f, "[{:2}] ", self.board[pit])?;
        }
        writeln!(f)?;
        write!(f, "P1: ")?;
        for pit in 0..PITS_PER_PLAYER {
            write!(f, "[{:2}] ", self.board[pit])?;
        }
        if let Some(beneficiary) = self.solidarity {
            writeln!(f)?;
            write!(f, "solidarity: next move must feed {beneficiary:?}")?;
        }
        Ok(())
    }
}
