use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{activity_logs, prelude::*};

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn record(
        &self,
        employee_id: &str,
        employee_name: &str,
        activity_type: &str,
        description: &str,
    ) -> Result<activity_logs::Model> {
        activity_logs::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            employee_id: Set(employee_id.to_string()),
            employee_name: Set(employee_name.to_string()),
            activity_type: Set(activity_type.to_string()),
            description: Set(description.to_string()),
            timestamp: Set(chrono::Utc::now().to_rfc3339()),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert activity log")
    }

    pub async fn list_all(&self) -> Result<Vec<activity_logs::Model>> {
        ActivityLogs::find()
            .order_by_desc(activity_logs::Column::Timestamp)
            .all(&self.conn)
            .await
            .context("Failed to list activity logs")
    }

    pub async fn list_for_employee(&self, employee_id: &str) -> Result<Vec<activity_logs::Model>> {
        ActivityLogs::find()
            .filter(activity_logs::Column::EmployeeId.eq(employee_id))
            .order_by_desc(activity_logs::Column::Timestamp)
            .all(&self.conn)
            .await
            .context("Failed to list activity logs for employee")
    }

    /// Latest clock_in/clock_out event for an employee, used to decide
    /// whether they are currently clocked in.
    pub async fn latest_clock_event(
        &self,
        employee_id: &str,
    ) -> Result<Option<activity_logs::Model>> {
        ActivityLogs::find()
            .filter(activity_logs::Column::EmployeeId.eq(employee_id))
            .filter(
                Condition::any()
                    .add(activity_logs::Column::ActivityType.eq("clock_in"))
                    .add(activity_logs::Column::ActivityType.eq("clock_out")),
            )
            .order_by_desc(activity_logs::Column::Timestamp)
            .one(&self.conn)
            .await
            .context("Failed to query latest clock event")
    }
}
