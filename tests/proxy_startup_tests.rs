//! Startup behavior of the reverse_proxy binary.

use std::process::Command;

#[test]
fn test_missing_target_exits_with_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_reverse_proxy"))
        .env_remove("TARGET")
        .env("PORT", "0")
        .output()
        .expect("failed to run reverse_proxy");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr was: {}", stderr);
    // Nothing was served, so nothing announced a listener.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("listening"));
}

#[test]
fn test_invalid_target_exits_nonzero() {
    let output = Command::new(env!("CARGO_BIN_EXE_reverse_proxy"))
        .arg("not-a-url")
        .env_remove("TARGET")
        .env("PORT", "0")
        .output()
        .expect("failed to run reverse_proxy");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid proxy target"));
}
