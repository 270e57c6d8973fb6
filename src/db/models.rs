//! Data models for the parking tables.

use super::DbError;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// One `np_users` row: a plate number and the employee it belongs to.
///
/// Values are kept exactly as given; only blank values are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpUserEntry {
    plate_number: String,
    employee_name: String,
}

impl NpUserEntry {
    pub fn new(plate_number: impl Into<String>, employee_name: impl Into<String>) -> Result<Self, DbError> {
        let plate_number = plate_number.into();
        let employee_name = employee_name.into();
        if plate_number.trim().is_empty() {
            return Err(DbError::InvalidEntry("plate number must not be empty".to_string()));
        }
        if employee_name.trim().is_empty() {
            return Err(DbError::InvalidEntry("employee name must not be empty".to_string()));
        }
        Ok(Self { plate_number, employee_name })
    }

    pub fn plate_number(&self) -> &str {
        &self.plate_number
    }

    pub fn employee_name(&self) -> &str {
        &self.employee_name
    }
}

/// A registered vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub vehicle_id: i64,
    pub plate_number: String,
    pub added_at: NaiveDateTime,
    pub is_authorized: bool,
}

/// Input for registering a vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVehicle {
    pub plate_number: String,
    pub is_authorized: bool,
}

/// Raw `vehicles` row; integer columns are selected as `SIGNED` so they decode
/// the same whatever their declared width.
#[derive(Debug, FromRow)]
pub(crate) struct VehicleRow {
    pub vehicle_id: i64,
    pub plate_number: String,
    pub added_at: NaiveDateTime,
    pub is_authorized: i64,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Self {
            vehicle_id: row.vehicle_id,
            plate_number: row.plate_number,
            added_at: row.added_at,
            is_authorized: row.is_authorized != 0,
        }
    }
}
