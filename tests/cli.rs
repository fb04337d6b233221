use assert_cmd::Command;
use tempfile::tempdir;

fn colorlock(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("colorlock").unwrap();
    // keep config and log files out of the real home directory
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"));
    cmd
}

#[test]
fn refuses_to_run_without_a_tty() {
    let home = tempdir().unwrap();
    let out = colorlock(home.path()).write_stdin("").output().unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("stdin must be a tty"), "stderr: {stderr}");
}

#[test]
fn rejects_zero_rounds_before_touching_the_terminal() {
    let home = tempdir().unwrap();
    let out = colorlock(home.path())
        .args(["--rounds", "0"])
        .write_stdin("")
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("at least one round"), "stderr: {stderr}");
}

#[test]
fn rejects_short_length_table() {
    let home = tempdir().unwrap();
    let out = colorlock(home.path())
        .args(["--rounds", "4", "--lengths", "3,4"])
        .write_stdin("")
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("pattern lengths lists 2 entries"), "stderr: {stderr}");
}

#[test]
fn save_config_writes_merged_settings() {
    let home = tempdir().unwrap();
    let out = colorlock(home.path())
        .args(["--save-config", "--success-code", "OPEN", "--preset", "classic"])
        .write_stdin("")
        .output()
        .unwrap();
    // saving happens before the tty check
    assert!(!out.status.success());

    let saved = walk(home.path())
        .into_iter()
        .find(|p| p.file_name().is_some_and(|n| n == "config.json"))
        .expect("config.json written under the temp home");
    let text = std::fs::read_to_string(saved).unwrap();
    assert!(text.contains("\"success_code\": \"OPEN\""));
    assert!(text.contains("\"pattern_lengths\": 3"));
}

fn walk(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut out = vec![];
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                out.extend(walk(&path));
            } else {
                out.push(path);
            }
        }
    }
    out
}

#[test]
fn help_lists_game_flags() {
    let home = tempdir().unwrap();
    let out = colorlock(home.path()).arg("--help").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--time-limits-ms"));
    assert!(stdout.contains("--palette"));
}
