use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_chorus"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "chorus init failed: {}", String::from_utf8_lossy(&output.stderr));

    let config_path = dir.path().join(".chorus.toml");
    assert!(config_path.exists(), ".chorus.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[embedding]"));
    assert!(content.contains("[index]"));
    assert!(content.contains("[pipeline]"));

    // Verify it's valid TOML that chorus-core can parse
    let _config: chorus_core::ChorusConfig = toml::from_str(&content).unwrap();
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".chorus.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_chorus"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
}
