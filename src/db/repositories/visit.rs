use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{prelude::*, visits};

#[derive(Debug, Clone)]
pub struct NewVisit {
    pub employee_id: String,
    pub location_id: String,
    pub objectives: Vec<String>,
    pub notes: Option<String>,
    pub met_owner: bool,
}

pub struct VisitRepository {
    conn: DatabaseConnection,
}

impl VisitRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_all(&self) -> Result<Vec<visits::Model>> {
        Visits::find()
            .order_by_desc(visits::Column::CheckInTime)
            .all(&self.conn)
            .await
            .context("Failed to list visits")
    }

    pub async fn list_for_employee(&self, employee_id: &str) -> Result<Vec<visits::Model>> {
        Visits::find()
            .filter(visits::Column::EmployeeId.eq(employee_id))
            .order_by_desc(visits::Column::CheckInTime)
            .all(&self.conn)
            .await
            .context("Failed to list visits for employee")
    }

    pub async fn get(&self, id: &str) -> Result<Option<visits::Model>> {
        Visits::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query visit")
    }

    /// Check-in: the check-in time is stamped server-side.
    pub async fn create(&self, input: NewVisit) -> Result<visits::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        visits::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            employee_id: Set(input.employee_id),
            location_id: Set(input.location_id),
            check_in_time: Set(now.clone()),
            check_out_time: Set(None),
            objectives: Set(input.objectives.join(",")),
            notes: Set(input.notes),
            met_owner: Set(input.met_owner),
            created_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert visit")
    }

    /// Stamp the check-out time. Returns the updated visit, or `None` when
    /// the visit does not exist.
    pub async fn check_out(&self, id: &str) -> Result<Option<visits::Model>> {
        let Some(existing) = Visits::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query visit for check-out")?
        else {
            return Ok(None);
        };

        let mut active: visits::ActiveModel = existing.into();
        active.check_out_time = Set(Some(chrono::Utc::now().to_rfc3339()));

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to check out visit")?;

        Ok(Some(updated))
    }
}
