use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the host: empty config, no env file, private state
/// dir and an API URL nothing listens on.
fn isolated(dir: &TempDir) -> assert_cmd::Command {
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();

    let mut cmd = cargo_bin_cmd!("userdeskctl");
    cmd.arg("--config")
        .arg(&config)
        .arg("--env-file")
        .arg(dir.path().join("absent.env"))
        .arg("--state-dir")
        .arg(dir.path().join("state"))
        .arg("--api-url")
        .arg("http://127.0.0.1:9")
        .env_remove("USERDESK_API_URL")
        .env_remove("USERDESK_LOGIN_PATH")
        .env_remove("USERDESK_TIMEOUT_SECS")
        .env_remove("USERDESK_STATE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn top_level_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("userdeskctl");
    let output =
        cmd.arg("--help").assert().success().get_output().stdout.clone();
    let text = String::from_utf8_lossy(&output);
    for command in ["login", "logout", "whoami", "can", "users", "password"] {
        assert!(text.contains(command), "help missing '{command}'");
    }
    assert!(text.contains("--api-url"), "help missing --api-url");
}

#[test]
fn users_and_password_subcommands_are_documented() {
    let mut cmd = cargo_bin_cmd!("userdeskctl");
    let out = cmd
        .args(["users", "--help"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    for action in ["list", "show", "create", "update", "delete"] {
        assert!(text.contains(action), "users help missing '{action}'");
    }

    let mut cmd = cargo_bin_cmd!("userdeskctl");
    let out = cmd
        .args(["password", "forgot", "--help"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    assert!(text.contains("--token"), "forgot help missing --token");
}

#[test]
fn logged_out_state_is_reported_locally() {
    let dir = TempDir::new().unwrap();

    isolated(&dir).arg("logout").assert().success();
    isolated(&dir).arg("logout").assert().success();

    isolated(&dir)
        .arg("whoami")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("log in"));

    isolated(&dir)
        .args(["can", "list_users"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("denied"));

    isolated(&dir)
        .args(["users", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("log in"));
}

#[test]
fn invalid_login_input_fails_before_any_request() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["login", "--email", "not-an-email", "--password-stdin"])
        .write_stdin("whatever\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("valid email"));
}

#[test]
fn unreachable_server_is_a_transient_failure() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["login", "--email", "a@b.com", "--password-stdin"])
        .write_stdin("pw\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("try again"));
}
