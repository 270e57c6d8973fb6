// Round trips against a live MySQL server.
//
// Ignored by default. Point DB_HOST / DB_PORT / DB_USER / DB_PASSWORD at a
// disposable server and run with `--ignored`.

use parkgate::config::{Config, DatabaseConfig};
use parkgate::db::{CreateMode, DbError, DbSession, NewVehicle, NpUserEntry};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};
use std::time::{SystemTime, UNIX_EPOCH};

fn live_config() -> DatabaseConfig {
    let mut config = Config::default();
    config.apply_process_env().unwrap();
    config.database
}

fn scratch_name(prefix: &str) -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    format!("{}_{}_{}", prefix, std::process::id(), nanos % 1_000_000_000)
}

async fn admin(config: &DatabaseConfig) -> MySqlConnection {
    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user);
    if !config.password.is_empty() {
        options = options.password(&config.password);
    }
    options.connect().await.unwrap()
}

async fn drop_schema(config: &DatabaseConfig, name: &str) {
    let mut conn = admin(config).await;
    sqlx::raw_sql(&format!("DROP DATABASE IF EXISTS `{}`", name))
        .execute(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();
}

/// Scratch schema with both parking tables; the returned config selects it.
async fn scratch_schema(prefix: &str) -> (DatabaseConfig, String) {
    let mut config = live_config();
    let name = scratch_name(prefix);
    let mut conn = admin(&config).await;
    sqlx::raw_sql(&format!(
        "CREATE DATABASE `{name}`;
         CREATE TABLE `{name}`.np_users (
             id INT AUTO_INCREMENT PRIMARY KEY,
             plate_number VARCHAR(255) NOT NULL,
             employee_name VARCHAR(255) NOT NULL
         );
         CREATE TABLE `{name}`.vehicles (
             vehicle_id INT AUTO_INCREMENT PRIMARY KEY,
             plate_number VARCHAR(32) NOT NULL UNIQUE,
             added_at DATETIME NOT NULL,
             is_authorized BOOLEAN NOT NULL
         );"
    ))
    .execute(&mut conn)
    .await
    .unwrap();
    conn.close().await.unwrap();
    config.database = Some(name.clone());
    (config, name)
}

#[tokio::test]
#[ignore = "needs a MySQL server"]
async fn create_schema_is_idempotent_by_default() {
    let config = live_config();
    let name = scratch_name("pg_schema");

    for _ in 0..2 {
        let mut session = DbSession::connect_server(&config).await.unwrap();
        session.create_database(&name, CreateMode::IfNotExists).await.unwrap();
        session.close().await;
    }

    let mut session = DbSession::connect_server(&config).await.unwrap();
    let err = session
        .create_database(&name, CreateMode::FailIfExists)
        .await
        .unwrap_err();
    session.close().await;
    assert!(matches!(err, DbError::Query { .. }), "unexpected error: {err}");

    drop_schema(&config, &name).await;
}

#[tokio::test]
#[ignore = "needs a MySQL server"]
async fn np_user_values_are_stored_verbatim() {
    let (config, name) = scratch_schema("pg_entries").await;
    let hostile = "x'); DROP TABLE np_users; --";

    let mut session = DbSession::connect(&config).await.unwrap();
    let written = session
        .insert_np_user(&NpUserEntry::new(hostile, "O'Brien, Ana").unwrap())
        .await
        .unwrap();
    assert_eq!(written, 1);
    session
        .insert_np_user(&NpUserEntry::new("B767NTT", "Ion Popescu").unwrap())
        .await
        .unwrap();
    session.close().await;

    let mut conn = admin(&config).await;
    let rows: Vec<(String, String)> = sqlx::query_as(&format!(
        "SELECT plate_number, employee_name FROM `{}`.np_users ORDER BY id",
        name
    ))
    .fetch_all(&mut conn)
    .await
    .unwrap();
    conn.close().await.unwrap();

    assert_eq!(
        rows,
        vec![
            (hostile.to_string(), "O'Brien, Ana".to_string()),
            ("B767NTT".to_string(), "Ion Popescu".to_string()),
        ]
    );
    drop_schema(&config, &name).await;
}

#[tokio::test]
#[ignore = "needs a MySQL server"]
async fn vehicle_registry_lifecycle() {
    let (config, name) = scratch_schema("pg_vehicles").await;
    let mut session = DbSession::connect(&config).await.unwrap();

    let vehicle = NewVehicle {
        plate_number: "CJ12ABC".to_string(),
        is_authorized: false,
    };
    let id = session.append_vehicle(&vehicle).await.unwrap();
    assert!(id > 0);

    let err = session.append_vehicle(&vehicle).await.unwrap_err();
    assert!(matches!(err, DbError::DuplicatePlate(ref plate) if plate == "CJ12ABC"));

    let found = session.find_vehicle("CJ12ABC").await.unwrap().unwrap();
    assert_eq!(found.vehicle_id, id as i64);
    assert_eq!(found.plate_number, "CJ12ABC");
    assert!(!found.is_authorized);

    assert!(session.delete_vehicle("CJ12ABC").await.unwrap());
    assert!(!session.delete_vehicle("CJ12ABC").await.unwrap());
    assert!(session.find_vehicle("CJ12ABC").await.unwrap().is_none());

    session.close().await;
    drop_schema(&config, &name).await;
}
