use super::{GameState, TOTAL_PITS};
use crate::enums::Player;

impl GameState {
    /// All pits the current player may legally play, in ascending order.
    pub fn valid_moves(&self) -> Vec<usize> {
        Self::player_pits(self.current_player())
            .filter(|&pit| self.is_valid_move(pit))
            .collect()
    }

    /// Legality of playing `pit` for the current player.
    ///
    /// A move is legal when the pit is owned and non-empty, the feeding
    /// obligation is satisfied (or unsatisfiable by every move, in which case
    /// it is waived), and the last-pit restriction does not apply.
    pub fn is_valid_move(&self, pit: usize) -> bool {
        if pit >= TOTAL_PITS || Self::pit_owner(pit) != self.current_player() {
            return false;
        }
        let seeds = self.board()[pit];
        if seeds == 0 {
            return false;
        }

        let opponent = self.current_player().opponent();
        let enforce_feeding = self.solidarity().is_some() || self.side_total(opponent) == 0;
        if enforce_feeding {
            let target = self.solidarity().unwrap_or(opponent);
            if !self.move_feeds(pit, target) && self.has_feeding_move(target) {
                return false;
            }
        }

        // The rightmost pit may not be emptied of a lone seed, except when
        // that seed is the last one on the whole side (desperate auto-capture).
        if pit == Self::rightmost_pit(self.current_player()) && seeds == 1 {
            return self.side_total(self.current_player()) == 1;
        }

        true
    }

    /// Whether sowing from `pit` drops at least one seed on `target`'s side.
    /// A pit holding a full lap or more always feeds.
    fn move_feeds(&self, pit: usize, target: Player) -> bool {
        let seeds = self.board()[pit];
        if seeds as usize >= TOTAL_PITS {
            return true;
        }
        let target_pits = Self::player_pits(target);
        (1..=seeds as usize).any(|k| target_pits.contains(&((pit + k) % TOTAL_PITS)))
    }

    fn has_feeding_move(&self, target: Player) -> bool {
        Self::player_pits(self.current_player())
            .any(|pit| self.board()[pit] > 0 && self.move_feeds(pit, target))
    }
}
