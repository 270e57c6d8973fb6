//! Schema (database) creation.

use super::{DbError, DbSession};

/// MySQL limit on identifier length.
const MAX_IDENTIFIER_LEN: usize = 64;

/// What to do when the schema already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
    /// `CREATE DATABASE IF NOT EXISTS`: re-running succeeds.
    #[default]
    IfNotExists,
    /// Plain `CREATE DATABASE`: re-running fails with the server's error.
    FailIfExists,
}

/// Validate a schema name and wrap it in backticks.
///
/// Schema names cannot be bound as parameters, so only unquoted-identifier
/// characters are accepted.
pub fn quote_identifier(name: &str) -> Result<String, DbError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    let all_digits = name.chars().all(|c| c.is_ascii_digit());
    if name.is_empty() || name.len() > MAX_IDENTIFIER_LEN || !valid_chars || all_digits {
        return Err(DbError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("`{}`", name))
}

pub fn create_database_statement(name: &str, mode: CreateMode) -> Result<String, DbError> {
    let quoted = quote_identifier(name)?;
    Ok(match mode {
        CreateMode::IfNotExists => format!("CREATE DATABASE IF NOT EXISTS {}", quoted),
        CreateMode::FailIfExists => format!("CREATE DATABASE {}", quoted),
    })
}

impl DbSession {
    /// Create schema `name`.
    pub async fn create_database(&mut self, name: &str, mode: CreateMode) -> Result<(), DbError> {
        let statement = create_database_statement(name, mode)?;
        tracing::debug!("Executing: {}", statement);
        sqlx::raw_sql(&statement)
            .execute(self.conn())
            .await
            .map_err(DbError::query("CREATE DATABASE"))?;
        tracing::info!(schema = name, ?mode, "Schema ready");
        Ok(())
    }
}
