use std::process::Command;

#[test]
fn bundled_stroll_script_runs_headless() {
    let output = Command::new(env!("CARGO_BIN_EXE_herb-garden"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["--script", "scripts/stroll.toml", "--frame-ms", "20"])
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to launch herb-garden");

    assert!(
        output.status.success(),
        "scripted run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let log = String::from_utf8_lossy(&output.stderr);
    assert!(log.contains("Tulsi is within reach"), "{log}");
    assert!(log.contains("left the garden"), "{log}");
}

#[test]
fn invalid_frame_length_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_herb-garden"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["--script", "scripts/stroll.toml", "--frame-ms", "0"])
        .output()
        .expect("failed to launch herb-garden");

    assert!(!output.status.success());
}
