use super::*;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(normalize_database_url("  "), Settings::default().database_url);
}

#[test]
fn keeps_windows_absolute_path_with_single_sqlite_colon() {
    assert_eq!(
        normalize_database_url("sqlite:C:\\Users\\alice\\test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
}

#[test]
fn normalizes_windows_plain_path_with_single_sqlite_colon() {
    assert_eq!(
        normalize_database_url("C:\\Users\\alice\\test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
}

#[test]
fn converts_sqlite_double_slash_windows_path() {
    assert_eq!(
        normalize_database_url("sqlite://C:/Users/alice/test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
}

#[test]
fn creates_parent_dir_for_sqlite_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("data").join("test.db");

    prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare db url");
    assert!(temp_root.path().join("data").exists());
}

#[tokio::test]
async fn prepared_database_url_creates_openable_sqlite_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("server.db");

    let prepared = prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare");
    let storage = storage::Storage::new(&prepared).await.expect("open sqlite");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should be created: {}",
        db_path.display()
    );
}

#[test]
fn file_values_override_defaults() {
    let settings = settings_from(
        Some(
            r#"
            bind_addr = "0.0.0.0:9000"
            database_url = "sqlite://./x.db"
            server_public_url = "https://files.example"
            max_object_bytes = 1024
            "#,
        ),
        no_env,
    );
    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert_eq!(settings.database_url, "sqlite://./x.db");
    assert_eq!(settings.max_object_bytes, 1024);
    assert_eq!(settings.public_url(), "https://files.example");
}

#[test]
fn environment_overrides_file_and_app_prefix_wins() {
    let env = |key: &str| match key {
        "SERVER_BIND" => Some("127.0.0.1:1".to_string()),
        "APP__BIND_ADDR" => Some("127.0.0.1:2".to_string()),
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "APP__MAX_OBJECT_BYTES" => Some("2048".to_string()),
        _ => None,
    };
    let settings = settings_from(Some(r#"bind_addr = "0.0.0.0:9000""#), env);
    assert_eq!(settings.server_bind, "127.0.0.1:2");
    assert_eq!(settings.database_url, "sqlite::memory:");
    assert_eq!(settings.max_object_bytes, 2048);
}

#[test]
fn malformed_inputs_fall_back_to_defaults() {
    let env = |key: &str| (key == "APP__MAX_OBJECT_BYTES").then(|| "lots".to_string());
    let settings = settings_from(Some("this is not toml ="), env);
    assert_eq!(settings, Settings::default());
}

#[test]
fn public_url_falls_back_to_bind_address() {
    let mut settings = Settings::default();
    assert_eq!(settings.public_url(), "http://127.0.0.1:8443");

    settings.server_public_url = Some("https://files.example/".to_string());
    assert_eq!(settings.public_url(), "https://files.example");

    settings.server_public_url = Some("not a url".to_string());
    assert_eq!(settings.public_url(), "http://127.0.0.1:8443");
}
