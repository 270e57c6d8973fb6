//! Single MySQL connection used for one utility invocation.
//!
//! No pooling: each binary opens one session, runs its statement and closes
//! the session on every path.

use super::DbError;
use parkgate_shared::config::DatabaseConfig;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};
use std::time::Duration;

pub struct DbSession {
    conn: MySqlConnection,
    target: String,
}

impl DbSession {
    /// Connect and select the configured default schema, if any.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        Self::open(config, config.database.as_deref()).await
    }

    /// Connect to the server without selecting a schema.
    pub async fn connect_server(config: &DatabaseConfig) -> Result<Self, DbError> {
        Self::open(config, None).await
    }

    async fn open(config: &DatabaseConfig, database: Option<&str>) -> Result<Self, DbError> {
        let target = config.target(database);

        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user);
        if !config.password.is_empty() {
            options = options.password(&config.password);
        }
        if let Some(database) = database {
            options = options.database(database);
        }
        let options = options.disable_statement_logging();

        tracing::info!(db = %target, "Connecting to MySQL");
        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let conn = match tokio::time::timeout(timeout, options.connect()).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(source)) => return Err(DbError::Connect { target, source }),
            Err(_) => return Err(DbError::ConnectTimeout { target, after: timeout }),
        };
        tracing::debug!(db = %target, "Connected to MySQL");

        Ok(Self { conn, target })
    }

    pub(crate) fn conn(&mut self) -> &mut MySqlConnection {
        &mut self.conn
    }

    /// Close the connection. A failed goodbye is only logged: the statement
    /// outcome has already been decided.
    pub async fn close(self) {
        let target = self.target;
        match self.conn.close().await {
            Ok(()) => tracing::debug!(db = %target, "MySQL connection closed"),
            Err(e) => tracing::warn!(db = %target, "Error closing MySQL connection: {}", e),
        }
    }
}

impl std::fmt::Debug for DbSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSession")
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            connect_timeout_secs: 5,
            ..DatabaseConfig::default()
        }
    }

    #[tokio::test]
    async fn unreachable_server_reports_an_error() {
        let err = DbSession::connect(&unreachable_config()).await.unwrap_err();
        assert!(matches!(err, DbError::Connect { .. } | DbError::ConnectTimeout { .. }));
        let message = err.to_string();
        assert!(!message.is_empty());
        assert!(message.contains("127.0.0.1:1"));
    }

    #[tokio::test]
    async fn server_only_target_has_no_schema() {
        let err = DbSession::connect_server(&unreachable_config()).await.unwrap_err();
        assert!(err.to_string().contains("root@127.0.0.1:1/"));
        assert!(!err.to_string().contains("t1db"));
    }
}
