//! CLI integration tests
//! Run with: cargo test --test cli_test

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_roll-bot"));
    cmd.env_remove("BOT_TOKEN")
        .env_remove("ROLL_MAX_COUNT")
        .env_remove("ROLL_MAX_SIDES")
        .env("RUST_LOG", "error");
    cmd
}

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("roll-bot-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("Should create scratch dir");
    dir
}

#[test]
fn test_version() {
    let output = bin().arg("version").output().expect("Should run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("roll-bot v"), "{}", stdout);
}

#[test]
fn test_init_config_writes_loadable_yaml() {
    let dir = scratch_dir();
    let path = dir.join("config.yaml");

    let output = bin()
        .args(["--config", path.to_str().unwrap(), "init-config"])
        .output()
        .expect("Should run binary");
    assert!(output.status.success());

    let yaml = std::fs::read_to_string(&path).expect("Config should exist");
    assert!(yaml.contains("max-count: 100"), "{}", yaml);
    assert!(yaml.contains("max-sides: 1000"), "{}", yaml);

    // A second run refuses to overwrite
    let output = bin()
        .args(["--config", path.to_str().unwrap(), "init-config"])
        .output()
        .expect("Should run binary");
    assert!(!output.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_console_session() {
    let dir = scratch_dir();
    let path = dir.join("missing.yaml");

    let mut child = bin()
        .env("USER", "tester")
        .args(["--config", path.to_str().unwrap(), "run"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Should spawn binary");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"/roll 3d6\n/roll 101d6\n/roll 3d1001\n/roll abcd6\n/rolled something\nhello\n/roll 3d6 \n/roll \r\n")
        .unwrap();

    let output = child.wait_with_output().expect("Should exit on EOF");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let replies: Vec<&str> = stdout
        .lines()
        .filter_map(|l| l.strip_prefix("[BOT] "))
        .collect();

    assert_eq!(replies.len(), 6, "{}", stdout);
    assert!(replies[0].starts_with("@tester: 3 drop(s) with a 6 sided dice are ["), "{}", replies[0]);
    assert_eq!(replies[1], "Use maximum of 100 dice");
    assert_eq!(replies[2], "Use maximum of 1000 sided dice");
    assert_eq!(replies[3], "Invalid dice (use xdy format)");
    // Trailing spaces are part of the command, not stripped
    assert_eq!(replies[4], "Invalid dice (use xdy format)");
    assert_eq!(replies[5], "Invalid dice (use xdy format)");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_invalid_env_limits_fail_startup() {
    let dir = scratch_dir();
    let path = dir.join("missing.yaml");

    let output = bin()
        .env("ROLL_MAX_COUNT", "-5")
        .args(["--config", path.to_str().unwrap(), "run"])
        .stdin(Stdio::null())
        .output()
        .expect("Should run binary");
    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("[BOT]"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_invalid_config_file_fails_startup() {
    let dir = scratch_dir();
    let path = dir.join("config.yaml");
    std::fs::write(&path, "bot:\n  name: dice\ndice:\n  max-count: 2147483647\n  max-sides: 2\nadapters: {}\n").unwrap();

    let output = bin()
        .args(["--config", path.to_str().unwrap(), "run"])
        .stdin(Stdio::null())
        .output()
        .expect("Should run binary");
    assert!(!output.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_disabled_console_without_token_fails_startup() {
    let dir = scratch_dir();
    let path = dir.join("config.yaml");
    std::fs::write(&path, "bot:\n  name: dice\nadapters:\n  console:\n    enabled: false\n").unwrap();

    let output = bin()
        .args(["--config", path.to_str().unwrap(), "run"])
        .stdin(Stdio::null())
        .output()
        .expect("Should run binary");
    assert!(!output.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}
