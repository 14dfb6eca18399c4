use assert_cmd::Command;
use predicates::prelude::*;

fn merge2048() -> Command {
    Command::cargo_bin("merge2048").expect("binary exists")
}

#[test]
fn replay_prints_final_board_and_score() {
    merge2048()
        .args(["replay", "--seed", "7", "--moves", "L L U R D"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score:"))
        .stdout(predicate::str::contains("moves_played=5"))
        .stdout(predicate::str::contains("score="));
}

#[test]
fn replay_is_deterministic_for_a_seed() {
    let run = || {
        merge2048()
            .args(["replay", "--seed", "99", "--moves", "LURDLURDLURD"])
            .output()
            .expect("run replay")
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn replay_rejects_unknown_symbols() {
    merge2048()
        .args(["replay", "--moves", "LX"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown action 'X'"));
}

#[test]
fn ai_reports_summary() {
    merge2048()
        .args(["ai", "--episodes", "2", "--depth", "1", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("episode=1 score="))
        .stdout(predicate::str::contains("episode=2 score="))
        .stdout(predicate::str::contains("episodes=2"))
        .stdout(predicate::str::contains("highest_score="))
        .stdout(predicate::str::contains("average_score="))
        .stdout(predicate::str::is_match(r"scores=\d+,\d+").unwrap());
}

#[test]
fn ai_respects_move_cap() {
    merge2048()
        .args([
            "ai",
            "--episodes",
            "1",
            "--depth",
            "2",
            "--max-moves",
            "10",
            "--game-over-rule",
            "slide-or-merge",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("moves=10"));
}

#[test]
fn ai_rejects_invalid_board_size() {
    merge2048()
        .args(["ai", "--size", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid game configuration"));
}

#[test]
fn ai_rejects_zero_episodes() {
    merge2048()
        .args(["ai", "--episodes", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--episodes must be at least 1"));
}

#[test]
fn play_exits_when_input_ends() {
    merge2048()
        .args(["play", "--seed", "5"])
        .write_stdin("")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("=== 2048 ==="));
}

#[test]
fn play_applies_keys_then_quits() {
    merge2048()
        .arg("play")
        .write_stdin("q")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("Goodbye!"));
}
