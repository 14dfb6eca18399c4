//! # 2048 CLI
//!
//! Command-line driver for the 2048 engine: play interactively, replay a
//! scripted move string, or let the lookahead player run a batch of games.

mod stats;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use merge2048_core::{
    Action, Game, GameConfig, GameOverRule, Player, PlayerConfig, DEFAULT_BOARD_SIZE,
};
use std::io::{self, Read, Write};
use std::time::Instant;

use crate::stats::{score_series, EpisodeResult, RunSummary};

#[derive(Parser, Debug)]
#[command(name = "merge2048")]
#[command(author, version, about = "Play 2048 in the terminal or watch the lookahead player")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play interactively with WASD or the arrow keys (default)
    Play(GameArgs),
    /// Apply a string of U/D/L/R symbols and print the final board
    Replay {
        #[command(flatten)]
        game: GameArgs,
        /// Moves to play, e.g. "LLUR" (whitespace is ignored)
        #[arg(short, long)]
        moves: String,
    },
    /// Let the lookahead player run headless episodes
    Ai(AiArgs),
}

#[derive(Args, Debug, Clone)]
struct GameArgs {
    /// Random seed for deterministic runs
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Board side length
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// When a full board counts as finished
    #[arg(long, value_enum, default_value = "slide-only")]
    game_over_rule: RuleArg,
}

#[derive(Args, Debug, Clone)]
struct AiArgs {
    #[command(flatten)]
    game: GameArgs,

    /// Number of episodes to play
    #[arg(short, long, default_value = "5")]
    episodes: u32,

    /// Lookahead depth in turns
    #[arg(short, long, default_value = "4")]
    depth: u32,

    /// Learning-rate setting (accepted, not used by the search)
    #[arg(long, default_value = "0.1")]
    alpha: f64,

    /// Exploration setting (accepted, not used by the search)
    #[arg(long, default_value = "0.25")]
    random_factor: f64,

    /// Maximum moves per episode (0 = unlimited)
    #[arg(short, long, default_value = "0")]
    max_moves: u32,

    /// Show board after each move
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RuleArg {
    /// Full board with no slide available
    SlideOnly,
    /// Full board with no slide and no merge available
    SlideOrMerge,
}

impl From<RuleArg> for GameOverRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::SlideOnly => GameOverRule::SlideOnly,
            RuleArg::SlideOrMerge => GameOverRule::SlideOrMerge,
        }
    }
}

impl GameArgs {
    fn new_game(&self) -> anyhow::Result<Game> {
        let config = GameConfig {
            size: self.size,
            seed: self.seed,
            game_over_rule: self.game_over_rule.into(),
        };
        Game::with_config(&config).context("invalid game configuration")
    }
}

impl Default for GameArgs {
    fn default() -> Self {
        Self {
            seed: 42,
            size: DEFAULT_BOARD_SIZE,
            game_over_rule: RuleArg::SlideOnly,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Play(GameArgs::default())) {
        Command::Play(args) => run_interactive(&args),
        Command::Replay { game, moves } => run_replay(&game, &moves),
        Command::Ai(args) => run_ai(&args),
    }
}

/// Run interactive mode where user plays with keyboard.
fn run_interactive(args: &GameArgs) -> anyhow::Result<()> {
    let mut game = args.new_game()?;
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];

    // Set terminal to raw mode for single-key input
    enable_raw_mode();
    redraw(&game)?;

    loop {
        let bytes_read = match stdin.read(&mut buffer) {
            Ok(0) => {
                // End of input behaves like quitting
                disable_raw_mode();
                return Ok(());
            }
            Ok(n) => n,
            Err(err) => {
                disable_raw_mode();
                return Err(err).context("failed to read keyboard input");
            }
        };

        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(action) => {
                if game.is_game_over() {
                    continue;
                }
                let outcome = game.move_tiles(action);
                redraw(&game)?;

                if outcome.reward > 0 {
                    println!("  +{} points!", outcome.reward);
                }
                if game.is_game_over() {
                    println!("\n  *** GAME OVER ***");
                    println!("  Final Score: {}", game.score());
                    println!("  Max Tile: {}", game.max_tile());
                    println!("\n  Press R to restart or Q to quit");
                }
            }
            InputAction::Restart => {
                game.reset();
                redraw(&game)?;
            }
            InputAction::Quit => {
                disable_raw_mode();
                println!("\nGoodbye!");
                return Ok(());
            }
            InputAction::None => {}
        }
    }
}

/// Play a scripted sequence of action symbols.
fn run_replay(args: &GameArgs, moves: &str) -> anyhow::Result<()> {
    let actions = moves
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_string().parse::<Action>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut game = args.new_game()?;
    let mut played = 0;
    for action in actions {
        if game.is_game_over() {
            break;
        }
        game.move_tiles(action);
        played += 1;
    }

    print_game(&game)?;
    println!("score={}", game.score());
    println!("max_tile={}", game.max_tile());
    println!("moves_played={}", played);
    println!("game_over={}", game.is_game_over());
    Ok(())
}

/// Run headless AI episodes on one game that is reset between episodes.
fn run_ai(args: &AiArgs) -> anyhow::Result<()> {
    if args.episodes == 0 {
        bail!("--episodes must be at least 1");
    }

    let mut game = args.game.new_game()?;
    let mut player = Player::new(PlayerConfig {
        depth: args.depth,
        alpha: args.alpha,
        random_factor: args.random_factor,
        seed: args.game.seed.wrapping_add(1000),
    });

    let start = Instant::now();
    let mut results = Vec::with_capacity(args.episodes as usize);

    for episode in 0..args.episodes {
        let mut moves = 0;
        while !game.is_game_over() && (args.max_moves == 0 || moves < args.max_moves) {
            let action = player.choose_action(&game);
            game.move_tiles(action);
            moves += 1;

            if args.verbose {
                println!("Episode {} Move {}: {}", episode + 1, moves, action);
                print_game(&game)?;
            }
        }

        let result = EpisodeResult {
            score: game.score(),
            max_tile: game.max_tile(),
            moves,
        };
        log::info!(
            "episode {} finished: score={} max_tile={} moves={}",
            episode + 1,
            result.score,
            result.max_tile,
            result.moves
        );
        println!(
            "episode={} score={} max_tile={} moves={}",
            episode + 1,
            result.score,
            result.max_tile,
            result.moves
        );
        results.push(result);
        game.reset();
    }

    let summary = RunSummary::from_results(&results, start.elapsed())
        .context("no episodes were played")?;

    println!("=== AI Results ===");
    println!("episodes={}", summary.episodes);
    println!("depth={}", args.depth);
    println!("seed={}", args.game.seed);
    println!("time_taken_secs={:.3}", summary.elapsed.as_secs_f64());
    println!("moves_per_sec={:.1}", summary.moves_per_sec());
    println!("highest_score={}", summary.highest_score);
    println!("lowest_score={}", summary.lowest_score);
    println!("average_score={:.2}", summary.average_score);
    println!("max_tile_overall={}", summary.max_tile_overall);
    println!("scores={}", score_series(&results));
    Ok(())
}

enum InputAction {
    Move(Action),
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Action::Up),
        [27, 91, 66] => InputAction::Move(Action::Down),
        [27, 91, 67] => InputAction::Move(Action::Right),
        [27, 91, 68] => InputAction::Move(Action::Left),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Action::Up),
        [b's'] | [b'S'] => InputAction::Move(Action::Down),
        [b'a'] | [b'A'] => InputAction::Move(Action::Left),
        [b'd'] | [b'D'] => InputAction::Move(Action::Right),

        // Control keys
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc
        [b'r'] | [b'R'] => InputAction::Restart,

        _ => InputAction::None,
    }
}

fn redraw(game: &Game) -> io::Result<()> {
    println!("\x1b[2J\x1b[H"); // Clear screen
    println!("=== 2048 ===");
    println!("Controls: WASD or Arrow Keys | Q to quit | R to restart\n");
    print_game(game)
}

fn print_game(game: &Game) -> io::Result<()> {
    print!("{}", game);
    io::stdout().flush()
}

// Platform-specific terminal raw mode handling
#[cfg(unix)]
fn enable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag &= !(libc::ICANON | libc::ECHO);
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(unix)]
fn disable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag |= libc::ICANON | libc::ECHO;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(not(unix))]
fn enable_raw_mode() {
    // Without raw mode each key needs Enter
}

#[cfg(not(unix))]
fn disable_raw_mode() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn arrow_and_wasd_keys_map_to_actions() {
        assert!(matches!(parse_input(&[27, 91, 65]), InputAction::Move(Action::Up)));
        assert!(matches!(parse_input(b"a"), InputAction::Move(Action::Left)));
        assert!(matches!(parse_input(b"D"), InputAction::Move(Action::Right)));
        assert!(matches!(parse_input(b"q"), InputAction::Quit));
        assert!(matches!(parse_input(b"r"), InputAction::Restart));
        assert!(matches!(parse_input(b"x"), InputAction::None));
    }

    #[test]
    fn rule_flag_maps_to_core_rule() {
        assert_eq!(GameOverRule::from(RuleArg::SlideOnly), GameOverRule::SlideOnly);
        assert_eq!(GameOverRule::from(RuleArg::SlideOrMerge), GameOverRule::SlideOrMerge);
    }
}
