//! Lookahead player for 2048.
//!
//! The player scores each of the four actions by cloning the game, playing
//! the action, and recursively trying every action on the clone up to a fixed
//! depth. An action's value is the best score seen anywhere in its subtree.
//! The action with the strictly highest value above the current score wins;
//! ties keep the earlier action in [`Action::ALL`] order. When nothing beats
//! the current score, a random action is played that passes the
//! [`Game::can_move_in_direction`] check for at least one cell.
//!
//! Simulated games carry a clone of the live game's random stream, so
//! evaluating the same position twice gives the same answer.
//!
//! ```
//! use merge2048_core::{Game, Player, PlayerConfig};
//!
//! let game = Game::new(3);
//! let mut player = Player::new(PlayerConfig { depth: 2, ..PlayerConfig::default() });
//! let action = player.choose_action(&game);
//! if !player.last_stats().fallback {
//!     assert!(Player::simulate_action(&game, action, 2) > game.score());
//! }
//! ```

use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{Action, Coord, Game};

/// Lookahead depth used by [`Player::choose_action`] unless configured otherwise.
pub const DEFAULT_DEPTH: u32 = 4;

/// Knobs for the [`Player`].
///
/// - `depth`: number of simulated turns per candidate action. The work grows
///   as `4^depth` board clones per decision.
/// - `alpha`, `random_factor`: learning-rate and exploration settings kept for
///   configuration compatibility. The decision logic does not read them.
/// - `seed`: seed for the random fallback move.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub depth: u32,
    pub alpha: f64,
    pub random_factor: f64,
    pub seed: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            alpha: 0.15,
            random_factor: 0.2,
            seed: 0,
        }
    }
}

/// Counters for the most recent decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of cloned games a move was played on.
    pub simulations: u64,
    /// Whether the random fallback picked the move.
    pub fallback: bool,
}

/// Chooses moves for a [`Game`] by bounded lookahead.
pub struct Player {
    config: PlayerConfig,
    rng: SmallRng,
    stats: SearchStats,
}

impl Player {
    /// Create a player; `config.seed` seeds the random fallback.
    pub fn new(config: PlayerConfig) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Pick the next action for `game` using the configured depth.
    pub fn choose_action(&mut self, game: &Game) -> Action {
        self.choose_educated_guess(game, self.config.depth)
    }

    /// Pick the action whose simulated future reaches the highest score.
    ///
    /// Only actions that change the live board are candidates: replaying a
    /// no-op would leave the position, and therefore the decision, unchanged.
    pub fn choose_educated_guess(&mut self, game: &Game, depth: u32) -> Action {
        let baseline = game.score();
        let mut best_score = baseline;
        let mut best_action = None;
        let mut simulations = 0;

        for action in Action::ALL {
            if !game.has_effect(action) {
                continue;
            }
            let score = simulate(game, action, depth, &mut simulations);
            trace!("{} simulates to {} (baseline {})", action, score, baseline);
            if score > best_score {
                best_score = score;
                best_action = Some(action);
            }
        }

        self.stats = SearchStats {
            simulations,
            fallback: best_action.is_none(),
        };

        match best_action {
            Some(action) => {
                debug!(
                    "chose {} for {} -> {} after {} simulations",
                    action, baseline, best_score, simulations
                );
                action
            }
            None => {
                let action = self.choose_random_action(game);
                debug!(
                    "no action improves on {}; random fallback chose {}",
                    baseline, action
                );
                action
            }
        }
    }

    /// Best score reachable within `depth` turns after playing `action` on a
    /// copy of `game`. `game` itself is never modified.
    pub fn simulate_action(game: &Game, action: Action, depth: u32) -> u64 {
        let mut simulations = 0;
        simulate(game, action, depth, &mut simulations)
    }

    /// Draw uniformly random actions until one has a cell, empty or not, whose
    /// neighbour in that direction is on the board and empty.
    ///
    /// On a full board no action qualifies; the first action that would merge
    /// something is returned then, and `Up` when even that is impossible.
    pub fn choose_random_action(&mut self, game: &Game) -> Action {
        let can_slide = |action: Action| {
            (0..game.size() as i32).any(|x| {
                (0..game.size() as i32).any(|y| {
                    let pos = Coord::new(x, y);
                    game.can_move_in_direction(pos, action)
                })
            })
        };

        if !Action::ALL.into_iter().any(can_slide) {
            return Action::ALL
                .into_iter()
                .find(|&action| game.has_effect(action))
                .unwrap_or(Action::Up);
        }

        loop {
            let action = Action::ALL[self.rng.gen_range(0..Action::ALL.len())];
            if can_slide(action) {
                return action;
            }
        }
    }
}

fn simulate(game: &Game, action: Action, depth: u32, simulations: &mut u64) -> u64 {
    if depth == 0 {
        return game.score();
    }

    let mut next = game.clone();
    next.move_tiles(action);
    *simulations += 1;
    if next.is_game_over() {
        return next.score();
    }

    Action::ALL
        .into_iter()
        .map(|a| simulate(&next, a, depth - 1, simulations))
        .fold(next.score(), u64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameConfig, GameOverRule};

    fn game_from(rows: [[u32; 4]; 4]) -> Game {
        Game::from_tiles(&GameConfig::default(), &rows.concat()).unwrap()
    }

    fn player(depth: u32, seed: u64) -> Player {
        Player::new(PlayerConfig {
            depth,
            seed,
            ..PlayerConfig::default()
        })
    }

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.depth, 4);
        assert_eq!(config.alpha, 0.15);
        assert_eq!(config.random_factor, 0.2);
    }

    #[test]
    fn test_simulate_depth_zero_returns_score() {
        let game = game_from([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(Player::simulate_action(&game, Action::Left, 0), 0);
    }

    #[test]
    fn test_simulate_does_not_touch_game() {
        let game = Game::new(9);
        let before = game.tiles().to_vec();
        for action in Action::ALL {
            Player::simulate_action(&game, action, 3);
        }
        assert_eq!(game.tiles(), before.as_slice());
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_simulate_is_deterministic() {
        let game = Game::new(21);
        let first = Player::simulate_action(&game, Action::Down, 3);
        let second = Player::simulate_action(&game, Action::Down, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_simulate_counts_merge() {
        let game = game_from([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(Player::simulate_action(&game, Action::Left, 1), 4);
        assert_eq!(Player::simulate_action(&game, Action::Up, 1), 0);
    }

    #[test]
    fn test_deeper_search_never_scores_lower() {
        let game = Game::new(5);
        for action in Action::ALL {
            let shallow = Player::simulate_action(&game, action, 2);
            let deep = Player::simulate_action(&game, action, 3);
            assert!(deep >= shallow);
        }
    }

    #[test]
    fn test_simulate_scores_cascade() {
        // Left folds the whole first row into a single 16: 4 + 8 + 16 points.
        let game = game_from([[2, 2, 4, 8], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 128]]);
        assert_eq!(Player::simulate_action(&game, Action::Left, 1), 28);
        assert!(Player::simulate_action(&game, Action::Left, 4) >= 28);
    }

    #[test]
    fn test_simulate_prunes_finished_games() {
        let stuck = game_from([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let mut simulations = 0;
        assert_eq!(simulate(&stuck, Action::Left, 4, &mut simulations), 0);
        assert_eq!(simulations, 1);
    }

    #[test]
    fn test_ties_keep_first_action() {
        // Left and Right both merge the pair for 4 points; Left comes first.
        let game = game_from([[0, 2, 2, 0], [0; 4], [0; 4], [0; 4]]);
        let mut p = player(1, 0);
        assert_eq!(p.choose_educated_guess(&game, 1), Action::Left);
        assert!(!p.last_stats().fallback);
        // Up cannot change the board and is not simulated.
        assert_eq!(p.last_stats().simulations, 3);
    }

    #[test]
    fn test_chosen_action_beats_baseline() {
        for seed in 0..10u64 {
            let mut game = Game::new(seed);
            let mut p = player(2, seed);
            for _ in 0..30 {
                if game.is_game_over() {
                    break;
                }
                let action = p.choose_action(&game);
                if !p.last_stats().fallback {
                    assert!(Player::simulate_action(&game, action, 2) > game.score());
                    assert!(game.has_effect(action));
                }
                game.move_tiles(action);
            }
        }
    }

    #[test]
    fn test_depth_zero_falls_back_to_random() {
        let game = game_from([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut seen = Vec::new();
        for seed in 0..64u64 {
            let mut p = player(0, seed);
            let action = p.choose_action(&game);
            assert!(p.last_stats().fallback);
            if !seen.contains(&action) {
                seen.push(action);
            }
        }
        // Empty cells count too, so every direction is eligible here.
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_random_action_needs_an_empty_neighbour() {
        // Only the bottom row is empty: nothing has an empty cell above it.
        let game = game_from([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [0; 4]]);
        for seed in 0..32u64 {
            let action = player(0, seed).choose_random_action(&game);
            assert_ne!(action, Action::Up);
        }
    }

    #[test]
    fn test_random_action_without_slides() {
        let mut p = player(1, 0);

        let merge_only = game_from([[2, 2, 4, 8], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 128]]);
        assert_eq!(p.choose_random_action(&merge_only), Action::Left);

        let stuck = game_from([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert_eq!(p.choose_random_action(&stuck), Action::Up);
    }

    #[test]
    fn test_player_is_deterministic() {
        let play = |seed: u64| {
            let mut game = Game::new(seed);
            let mut p = player(2, seed);
            let mut actions = Vec::new();
            for _ in 0..20 {
                let action = p.choose_action(&game);
                game.move_tiles(action);
                actions.push(action);
            }
            (actions, game.score())
        };
        assert_eq!(play(77), play(77));
    }

    #[test]
    fn test_full_game_terminates() {
        for rule in [GameOverRule::SlideOnly, GameOverRule::SlideOrMerge] {
            let config = GameConfig {
                seed: 11,
                game_over_rule: rule,
                ..GameConfig::default()
            };
            let mut game = Game::with_config(&config).unwrap();
            let mut p = player(2, 11);
            let mut moves = 0;
            while !game.is_game_over() && moves < 5_000 {
                let action = p.choose_action(&game);
                game.move_tiles(action);
                moves += 1;
            }
            assert!(game.is_game_over(), "{:?} did not finish", rule);
            assert!(game.score() > 0);
        }
    }
}
