//! Vehicle registry: add, remove and look up vehicles by plate number.

use super::models::VehicleRow;
use super::{DbError, DbSession, NewVehicle, Vehicle};
use chrono::Local;

const SELECT_VEHICLE_ID: &str = "SELECT CAST(vehicle_id AS SIGNED) FROM vehicles WHERE plate_number = ?";
const INSERT_VEHICLE: &str = "INSERT INTO vehicles (plate_number, added_at, is_authorized) VALUES (?, ?, ?)";
const DELETE_VEHICLE: &str = "DELETE FROM vehicles WHERE plate_number = ?";
const SELECT_VEHICLE: &str = "SELECT CAST(vehicle_id AS SIGNED) AS vehicle_id, plate_number, added_at, \
     CAST(is_authorized AS SIGNED) AS is_authorized FROM vehicles WHERE plate_number = ?";

impl DbSession {
    /// Register a vehicle unless its plate is already present.
    ///
    /// Returns the new `vehicle_id`.
    pub async fn append_vehicle(&mut self, vehicle: &NewVehicle) -> Result<u64, DbError> {
        let existing: Option<(i64,)> = sqlx::query_as(SELECT_VEHICLE_ID)
            .bind(&vehicle.plate_number)
            .fetch_optional(self.conn())
            .await
            .map_err(DbError::query("SELECT FROM vehicles"))?;
        if existing.is_some() {
            return Err(DbError::DuplicatePlate(vehicle.plate_number.clone()));
        }

        let added_at = Local::now().naive_local();
        let result = sqlx::query(INSERT_VEHICLE)
            .bind(&vehicle.plate_number)
            .bind(added_at)
            .bind(vehicle.is_authorized)
            .execute(self.conn())
            .await
            .map_err(DbError::query("INSERT INTO vehicles"))?;

        tracing::info!(
            plate_number = %vehicle.plate_number,
            authorized = vehicle.is_authorized,
            "Added vehicle"
        );
        Ok(result.last_insert_id())
    }

    /// Delete a vehicle. Returns `false` when no row matched.
    pub async fn delete_vehicle(&mut self, plate_number: &str) -> Result<bool, DbError> {
        let result = sqlx::query(DELETE_VEHICLE)
            .bind(plate_number)
            .execute(self.conn())
            .await
            .map_err(DbError::query("DELETE FROM vehicles"))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(plate_number, "Deleted vehicle");
        } else {
            tracing::debug!(plate_number, "No vehicle to delete");
        }
        Ok(deleted)
    }

    pub async fn find_vehicle(&mut self, plate_number: &str) -> Result<Option<Vehicle>, DbError> {
        let row: Option<VehicleRow> = sqlx::query_as(SELECT_VEHICLE)
            .bind(plate_number)
            .fetch_optional(self.conn())
            .await
            .map_err(DbError::query("SELECT FROM vehicles"))?;
        Ok(row.map(Vehicle::from))
    }
}
