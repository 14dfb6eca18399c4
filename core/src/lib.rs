//! # 2048 Board Engine
//!
//! A Rust implementation of the 2048 sliding-tile puzzle with a seedable PRNG
//! for reproducible games, plus a lookahead [`Player`] that picks moves by
//! simulating cloned games a few turns ahead.
//!
//! ## Example
//!
//! ```rust
//! use merge2048_core::{Action, Game, Player, PlayerConfig};
//!
//! let mut game = Game::new(42);
//! let mut player = Player::new(PlayerConfig { depth: 2, ..PlayerConfig::default() });
//! let action = player.choose_action(&game);
//! let outcome = game.move_tiles(action);
//! println!("Score: {}, Changed: {}", game.score(), outcome.changed);
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

pub mod error;
pub mod player;

pub use error::{GameError, ParseActionError, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
pub use player::{Player, PlayerConfig, SearchStats};

/// Side length of the classic board.
pub const DEFAULT_BOARD_SIZE: usize = 4;

/// Number of random coordinate draws a spawn makes before giving up.
pub const SPAWN_ATTEMPTS: usize = 16;

/// Chance that a spawned tile is a 2 rather than a 4.
const TWO_PROBABILITY: f64 = 0.9;

/// Largest tile value. Two of these never merge, so doubling cannot overflow.
pub const MAX_TILE: u32 = 1 << 31;

/// The four possible move directions in 2048.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    /// All actions, in the order the player evaluates them.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Convert a u8 to an Action (0=Up, 1=Down, 2=Left, 3=Right).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Action> {
        match value {
            0 => Some(Action::Up),
            1 => Some(Action::Down),
            2 => Some(Action::Left),
            3 => Some(Action::Right),
            _ => None,
        }
    }

    /// Get all four actions.
    pub fn all() -> [Action; 4] {
        Self::ALL
    }

    /// Unit offset `(dx, dy)` on the board. `x` grows to the right, `y` grows downwards.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
        }
    }

    /// Single-letter symbol used by drivers: `U`, `D`, `L` or `R`.
    pub fn symbol(self) -> char {
        match self {
            Action::Up => 'U',
            Action::Down => 'D',
            Action::Left => 'L',
            Action::Right => 'R',
        }
    }

    /// Inverse of [`Action::symbol`], case-insensitive.
    pub fn from_symbol(symbol: char) -> Option<Action> {
        match symbol.to_ascii_uppercase() {
            'U' => Some(Action::Up),
            'D' => Some(Action::Down),
            'L' => Some(Action::Left),
            'R' => Some(Action::Right),
            _ => None,
        }
    }
}

impl FromStr for Action {
    type Err = ParseActionError;

    /// Accepts a symbol (`"l"`, `"R"`) or a full name (`"left"`, `"Up"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Action::from_symbol(c).ok_or_else(|| ParseActionError(s.to_string()));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "up" => Ok(Action::Up),
            "down" => Ok(Action::Down),
            "left" => Ok(Action::Left),
            "right" => Ok(Action::Right),
            _ => Err(ParseActionError(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Up => "Up",
            Action::Down => "Down",
            Action::Left => "Left",
            Action::Right => "Right",
        };
        f.write_str(name)
    }
}

/// A board coordinate. Signed so that neighbours past the edge can be named;
/// such coordinates are simply off the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    /// Coordinate of column `x` and row `y`.
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// The neighbouring coordinate one step in `action`'s direction.
    pub fn step(self, action: Action) -> Coord {
        let (dx, dy) = action.offset();
        Coord::new(self.x + dx, self.y + dy)
    }
}

/// How [`Game::is_game_over`] decides that no turn is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameOverRule {
    /// The board is full and no tile can slide. Adjacent equal tiles are
    /// ignored, so a full board that could still merge counts as finished.
    #[default]
    SlideOnly,
    /// The board is full, no tile can slide and no two adjacent tiles are equal.
    SlideOrMerge,
}

/// Settings for creating a [`Game`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Board side length.
    pub size: usize,
    /// Seed for tile spawning.
    pub seed: u64,
    pub game_over_rule: GameOverRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            seed: 0,
            game_over_rule: GameOverRule::default(),
        }
    }
}

/// Summary of one turn played with [`Game::move_tiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// Whether any tile slid or merged.
    pub changed: bool,
    /// Points earned from merges in this move.
    pub reward: u64,
    /// Whether a new tile was placed. Can be false on a changed turn when
    /// every spawn draw hit an occupied cell.
    pub spawned: bool,
}

/// The 2048 game state.
///
/// The grid is stored row-major: index `y * size + x`. Empty cells are 0,
/// tiles contain their value (2, 4, 8, ...).
#[derive(Clone)]
pub struct Game {
    size: usize,
    tiles: Vec<u32>,
    /// Cells that received a tile this turn. Only consulted to gate spawning.
    changed: Vec<bool>,
    score: u64,
    rng: SmallRng,
    game_over_rule: GameOverRule,
}

impl Game {
    /// Create a classic 4x4 game with the given seed.
    ///
    /// The game starts with two random tiles (90% chance of 2, 10% chance of 4).
    pub fn new(seed: u64) -> Self {
        let mut game = Self::empty(DEFAULT_BOARD_SIZE, seed, GameOverRule::default());
        game.reset();
        game
    }

    /// Create a game from a configuration, starting with two random tiles.
    pub fn with_config(config: &GameConfig) -> Result<Self, GameError> {
        validate_size(config.size)?;
        let mut game = Self::empty(config.size, config.seed, config.game_over_rule);
        game.reset();
        Ok(game)
    }

    /// Create a game from an explicit row-major position. No starter tiles
    /// are added and the score starts at zero.
    pub fn from_tiles(config: &GameConfig, tiles: &[u32]) -> Result<Self, GameError> {
        validate_size(config.size)?;
        let expected = config.size * config.size;
        if tiles.len() != expected {
            return Err(GameError::TileCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }
        if let Some((index, &value)) = tiles
            .iter()
            .enumerate()
            .find(|(_, &v)| v != 0 && (v < 2 || !v.is_power_of_two()))
        {
            return Err(GameError::InvalidTileValue { index, value });
        }

        let mut game = Self::empty(config.size, config.seed, config.game_over_rule);
        game.tiles.copy_from_slice(tiles);
        Ok(game)
    }

    fn empty(size: usize, seed: u64, game_over_rule: GameOverRule) -> Self {
        Game {
            size,
            tiles: vec![0; size * size],
            changed: vec![false; size * size],
            score: 0,
            rng: SmallRng::seed_from_u64(seed),
            game_over_rule,
        }
    }

    /// Clear the board and score, then place two starter tiles.
    ///
    /// The random stream continues where it left off, so consecutive resets
    /// produce different openings.
    pub fn reset(&mut self) {
        self.score = 0;
        self.tiles.fill(0);
        self.changed.fill(false);
        self.place_random_tile();
        self.place_random_tile();
    }

    /// Reset the game with a fresh random stream.
    pub fn reset_with_seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
        self.reset();
    }

    /// Play one turn in the given direction.
    ///
    /// Cells are scanned starting from the edge the tiles travel towards, so a
    /// tile is never moved twice. Each tile slides as far as the empty cells
    /// allow, then merges with an equal neighbour ahead of it. A new tile is
    /// spawned only if something slid or merged.
    pub fn move_tiles(&mut self, action: Action) -> MoveOutcome {
        let (dx, dy) = action.offset();
        let n = self.size as i32;
        let mut reward = 0;

        for i in 0..n {
            for j in 0..n {
                let x = if dx == 1 { n - 1 - i } else { i };
                let y = if dy == 1 { n - 1 - j } else { j };
                let mut pos = Coord::new(x, y);

                if self.cell(pos) == 0 {
                    continue;
                }

                if self.can_move_in_direction(pos, action) {
                    let mut dest = pos.step(action);
                    while self.can_move_in_direction(dest, action) {
                        dest = dest.step(action);
                    }
                    let (from, to) = (self.index(pos), self.index(dest));
                    self.tiles[to] = self.tiles[from];
                    self.tiles[from] = 0;
                    self.changed[to] = true;
                    pos = dest;
                }

                let target = pos.step(action);
                if self.can_combine(pos, target) {
                    let (from, to) = (self.index(pos), self.index(target));
                    self.tiles[to] *= 2;
                    self.tiles[from] = 0;
                    self.changed[to] = true;
                    reward += u64::from(self.tiles[to]);
                }
            }
        }

        self.score += reward;
        let changed = self.changed.iter().any(|&c| c);
        let spawned = changed && self.place_random_tile();
        self.changed.fill(false);

        MoveOutcome {
            changed,
            reward,
            spawned,
        }
    }

    /// Place a 2 (90%) or a 4 (10%) on a random empty cell.
    ///
    /// Makes at most [`SPAWN_ATTEMPTS`] coordinate draws; if all of them land
    /// on occupied cells the board is left untouched and `false` is returned.
    pub fn place_random_tile(&mut self) -> bool {
        for _ in 0..SPAWN_ATTEMPTS {
            let x = self.rng.gen_range(0..self.size);
            let y = self.rng.gen_range(0..self.size);
            let idx = y * self.size + x;
            if self.tiles[idx] == 0 {
                self.tiles[idx] = if self.rng.gen::<f64>() < TWO_PROBABILITY { 2 } else { 4 };
                return true;
            }
        }
        log::debug!(
            "spawn skipped: {} draws hit occupied cells ({} empty)",
            SPAWN_ATTEMPTS,
            self.empty_count()
        );
        false
    }

    /// Whether both coordinates lie in `[0, size)`.
    pub fn is_on_board(&self, coord: Coord) -> bool {
        let n = self.size as i32;
        (0..n).contains(&coord.x) && (0..n).contains(&coord.y)
    }

    /// Whether the two cells are on the board, occupied and hold the same value
    /// below [`MAX_TILE`].
    pub fn can_combine(&self, a: Coord, b: Coord) -> bool {
        if !self.is_on_board(a) || !self.is_on_board(b) {
            return false;
        }
        let (va, vb) = (self.cell(a), self.cell(b));
        va != 0 && vb != 0 && va == vb && va < MAX_TILE
    }

    /// Whether the cell one step from `coord` in `action`'s direction is on the
    /// board and empty. Merges are not considered here.
    pub fn can_move_in_direction(&self, coord: Coord, action: Action) -> bool {
        let next = coord.step(action);
        self.is_on_board(next) && self.cell(next) == 0
    }

    /// Whether `coord` could slide in at least one direction.
    pub fn can_move(&self, coord: Coord) -> bool {
        Action::ALL
            .iter()
            .any(|&action| self.can_move_in_direction(coord, action))
    }

    /// Whether some tile would slide or merge if `action` were played.
    pub fn has_effect(&self, action: Action) -> bool {
        self.coords().any(|pos| {
            self.cell(pos) != 0
                && (self.can_move_in_direction(pos, action)
                    || self.can_combine(pos, pos.step(action)))
        })
    }

    /// Check whether the game is finished under the configured [`GameOverRule`].
    pub fn is_game_over(&self) -> bool {
        for pos in self.coords() {
            if self.cell(pos) == 0 || self.can_move(pos) {
                return false;
            }
        }
        match self.game_over_rule {
            GameOverRule::SlideOnly => true,
            GameOverRule::SlideOrMerge => !self.has_adjacent_pair(),
        }
    }

    fn has_adjacent_pair(&self) -> bool {
        self.coords().any(|pos| {
            self.can_combine(pos, pos.step(Action::Right))
                || self.can_combine(pos, pos.step(Action::Down))
        })
    }

    /// Get the current score.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Board side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The rule [`Game::is_game_over`] applies.
    pub fn game_over_rule(&self) -> GameOverRule {
        self.game_over_rule
    }

    /// The grid in row-major order.
    pub fn tiles(&self) -> &[u32] {
        &self.tiles
    }

    /// Value at `coord`, or `None` when it is off the board.
    pub fn tile(&self, coord: Coord) -> Option<u32> {
        self.is_on_board(coord).then(|| self.cell(coord))
    }

    /// Get the maximum tile value on the board.
    pub fn max_tile(&self) -> u32 {
        self.tiles.iter().copied().max().unwrap_or(0)
    }

    /// Get the number of empty cells on the board.
    pub fn empty_count(&self) -> usize {
        self.tiles.iter().filter(|&&v| v == 0).count()
    }

    // -------------------------------------------------------------------------
    // Private methods
    // -------------------------------------------------------------------------

    /// Row-major iteration over every cell.
    fn coords(&self) -> impl Iterator<Item = Coord> {
        let n = self.size as i32;
        (0..n).flat_map(move |y| (0..n).map(move |x| Coord::new(x, y)))
    }

    #[inline]
    fn index(&self, coord: Coord) -> usize {
        coord.y as usize * self.size + coord.x as usize
    }

    /// Value at an on-board coordinate.
    #[inline]
    fn cell(&self, coord: Coord) -> u32 {
        self.tiles[self.index(coord)]
    }
}

fn validate_size(size: usize) -> Result<(), GameError> {
    if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(GameError::InvalidBoardSize(size))
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Game {{ size: {}, score: {}, over: {} }}",
            self.size,
            self.score,
            self.is_game_over()
        )?;
        for row in self.tiles.chunks(self.size) {
            for &val in row {
                if val == 0 {
                    write!(f, "    .")?;
                } else {
                    write!(f, "{:5}", val)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = format!("{}+", "+------".repeat(self.size));
        writeln!(f, "Score: {}", self.score)?;
        writeln!(f, "{}", separator)?;
        for row in self.tiles.chunks(self.size) {
            write!(f, "|")?;
            for &val in row {
                if val == 0 {
                    write!(f, "      |")?;
                } else {
                    write!(f, "{:^6}|", val)?;
                }
            }
            writeln!(f)?;
            writeln!(f, "{}", separator)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
