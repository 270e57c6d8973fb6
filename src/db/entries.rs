//! `np_users` inserts.

use super::{DbError, DbSession, NpUserEntry};

pub const INSERT_NP_USER: &str = "INSERT INTO np_users(plate_number, employee_name) VALUES(?, ?)";

impl DbSession {
    /// Insert one entry, binding both values. Returns the number of rows written.
    pub async fn insert_np_user(&mut self, entry: &NpUserEntry) -> Result<u64, DbError> {
        let result = sqlx::query(INSERT_NP_USER)
            .bind(entry.plate_number())
            .bind(entry.employee_name())
            .execute(self.conn())
            .await
            .map_err(DbError::query("INSERT INTO np_users"))?;

        tracing::info!(
            plate_number = entry.plate_number(),
            employee_name = entry.employee_name(),
            "Recorded np_users entry"
        );
        Ok(result.rows_affected())
    }
}
