use assert_cmd::Command;
use assert_cmd::cargo_bin;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_decode_prints_next_action() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args(["decode", "tests/fixtures/redirect_response.json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("resultCode: RedirectShopper"))
        .stdout(predicate::str::contains("action: redirect"));

    Ok(())
}

#[test]
fn test_decode_rejects_unknown_action() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args(["decode", "tests/fixtures/unknown_action.json"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("qrCode"));

    Ok(())
}

#[test]
fn test_replay_redirect_flow() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args([
        "replay",
        "--config",
        "tests/fixtures/config.toml",
        "--script",
        "tests/fixtures/redirect_script.json",
        "--payment-method",
        "tests/fixtures/payment_method.json",
    ])
    .write_stdin("shop://payments?redirectResult=abc\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("outcome: success Authorised"))
        .stderr(predicate::str::contains("https://bank.example/3ds"));

    Ok(())
}

#[test]
fn test_replay_challenge_flow() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args([
        "replay",
        "--config",
        "tests/fixtures/config.toml",
        "--script",
        "tests/fixtures/challenge_script.json",
        "--payment-method",
        "tests/fixtures/payment_method.json",
    ])
    .write_stdin("eyJ0cmFuc1N0YXR1cyI6IlkifQ==\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("outcome: success Refused"));

    Ok(())
}

#[test]
fn test_replay_closed_stdin_cancels() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args([
        "replay",
        "--config",
        "tests/fixtures/config.toml",
        "--script",
        "tests/fixtures/challenge_script.json",
        "--payment-method",
        "tests/fixtures/payment_method.json",
    ])
    .write_stdin("");

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("outcome: cancelled"));

    Ok(())
}

#[test]
fn test_replay_transport_failure_when_script_runs_out() -> Result<(), Box<dyn std::error::Error>> {
    let mut script = NamedTempFile::new()?;
    write!(
        script,
        r#"[{{"resultCode": "RedirectShopper", "action": {{"type": "redirect", "url": "https://bank.example/3ds"}}}}]"#
    )?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.args(["replay", "--config", "tests/fixtures/config.toml", "--script"])
        .arg(script.path())
        .args(["--payment-method", "tests/fixtures/payment_method.json"])
        .write_stdin("shop://payments?redirectResult=abc\n");

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("outcome: failure Transport error"));

    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = NamedTempFile::new()?;
    writeln!(config, "[merchant]\nmerchant_account = \"TestMerchant\"")?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.args(["replay", "--config"])
        .arg(config.path())
        .args([
            "--script",
            "tests/fixtures/redirect_script.json",
            "--payment-method",
            "tests/fixtures/payment_method.json",
        ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));

    Ok(())
}

#[test]
fn test_pay_requires_api_key() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = NamedTempFile::new()?;
    let fixture = std::fs::read_to_string("tests/fixtures/config.toml")?;
    write!(
        config,
        "{fixture}\n[client]\nbase_url = \"http://127.0.0.1:9/v71\"\napi_key_env = \"PAYFLOW_TEST_UNSET_KEY\"\n"
    )?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.args(["pay", "--config"])
        .arg(config.path())
        .args(["--payment-method", "tests/fixtures/payment_method.json"])
        .env_remove("PAYFLOW_TEST_UNSET_KEY");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("PAYFLOW_TEST_UNSET_KEY"));

    Ok(())
}
