use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;
use userdesk_config::{ConfigLoadError, ConfigLoader, ConfigLoaderOptions};

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn file_then_env_then_overrides() {
    let dir = TempDir::new().unwrap();
    let config_path = write(
        &dir,
        "config.toml",
        r#"
        [api]
        base_url = "http://file.example:9000"
        timeout_secs = 10

        [endpoints]
        login = "/auth/authenticate"
        "#,
    );

    let loader = ConfigLoader::new(ConfigLoaderOptions {
        config_path: Some(config_path.clone()),
        ..Default::default()
    });
    let load = loader.load_with_env(&HashMap::new()).unwrap();
    assert_eq!(load.config.api.base_url, "http://file.example:9000");
    assert_eq!(load.config.api.timeout_secs, 10);
    assert_eq!(load.config.endpoints.login, "/auth/authenticate");
    assert_eq!(load.config.metadata.config_file.as_ref(), Some(&config_path));

    let env = HashMap::from([
        ("USERDESK_API_URL".to_string(), "env.example:8080/".to_string()),
        ("USERDESK_TIMEOUT_SECS".to_string(), "5".to_string()),
    ]);
    let load = loader.load_with_env(&env).unwrap();
    assert_eq!(load.config.api.base_url, "http://env.example:8080");
    assert_eq!(load.config.api.timeout_secs, 5);

    let loader = ConfigLoader::new(ConfigLoaderOptions {
        config_path: Some(config_path),
        api_url: Some("https://cli.example".into()),
        state_dir: Some(dir.path().join("state")),
        ..Default::default()
    });
    let load = loader.load_with_env(&env).unwrap();
    assert_eq!(load.config.api.base_url, "https://cli.example");
    assert_eq!(
        load.config.session.state_dir,
        Some(dir.path().join("state"))
    );
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let loader = ConfigLoader::new(ConfigLoaderOptions {
        config_path: Some(dir.path().join("absent.toml")),
        ..Default::default()
    });
    let err = loader.load_with_env(&HashMap::new()).unwrap_err();
    assert!(matches!(err, ConfigLoadError::ReadFile { .. }));
}

#[test]
fn malformed_file_and_bad_env_values_are_reported() {
    let dir = TempDir::new().unwrap();
    let bad = write(&dir, "bad.toml", "[api\nbase_url = ");
    let loader = ConfigLoader::new(ConfigLoaderOptions {
        config_path: Some(bad),
        ..Default::default()
    });
    assert!(matches!(
        loader.load_with_env(&HashMap::new()),
        Err(ConfigLoadError::ParseFile { .. })
    ));

    let good = write(&dir, "good.toml", "");
    let loader = ConfigLoader::new(ConfigLoaderOptions {
        config_path: Some(good),
        ..Default::default()
    });
    let env = HashMap::from([(
        "USERDESK_TIMEOUT_SECS".to_string(),
        "soon".to_string(),
    )]);
    assert!(matches!(
        loader.load_with_env(&env),
        Err(ConfigLoadError::InvalidEnvValue { .. })
    ));
}

#[test]
fn env_file_values_are_read_without_touching_process_env() {
    let dir = TempDir::new().unwrap();
    let config_path = write(&dir, "config.toml", "");
    let env_file = write(
        &dir,
        ".env",
        "USERDESK_LOGIN_PATH=/auth/authenticate\n",
    );
    let loader = ConfigLoader::new(ConfigLoaderOptions {
        config_path: Some(config_path),
        env_file: Some(env_file),
        ..Default::default()
    });
    let load = loader.load().unwrap();
    // A USERDESK_LOGIN_PATH in the real environment would win.
    if std::env::var("USERDESK_LOGIN_PATH").is_err() {
        assert_eq!(load.config.endpoints.login, "/auth/authenticate");
    }
    assert!(load.config.metadata.env_file_loaded);
}

#[test]
fn empty_env_file_still_counts_as_loaded() {
    let dir = TempDir::new().unwrap();
    let config_path = write(&dir, "config.toml", "");
    let empty = write(&dir, ".env", "");

    let loader = ConfigLoader::new(ConfigLoaderOptions {
        config_path: Some(config_path.clone()),
        env_file: Some(empty),
        ..Default::default()
    });
    assert_eq!(loader.read_env_file().unwrap(), Some(HashMap::new()));
    assert!(loader.load().unwrap().config.metadata.env_file_loaded);

    let loader = ConfigLoader::new(ConfigLoaderOptions {
        config_path: Some(config_path),
        env_file: Some(dir.path().join("absent.env")),
        ..Default::default()
    });
    assert_eq!(loader.read_env_file().unwrap(), None);
    assert!(!loader.load().unwrap().config.metadata.env_file_loaded);
}
