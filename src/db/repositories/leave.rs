use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{leave_requests, prelude::*};

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: String,
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
}

pub struct LeaveRepository {
    conn: DatabaseConnection,
}

impl LeaveRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_all(&self) -> Result<Vec<leave_requests::Model>> {
        LeaveRequests::find()
            .order_by_desc(leave_requests::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list leave requests")
    }

    pub async fn list_for_employee(&self, employee_id: &str) -> Result<Vec<leave_requests::Model>> {
        LeaveRequests::find()
            .filter(leave_requests::Column::EmployeeId.eq(employee_id))
            .order_by_desc(leave_requests::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list leave requests for employee")
    }

    pub async fn get(&self, id: &str) -> Result<Option<leave_requests::Model>> {
        LeaveRequests::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query leave request")
    }

    pub async fn create(&self, input: NewLeaveRequest) -> Result<leave_requests::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        leave_requests::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            employee_id: Set(input.employee_id),
            leave_type: Set(input.leave_type),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            reason: Set(input.reason),
            status: Set("pending".to_string()),
            reviewed_by: Set(None),
            review_note: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert leave request")
    }

    /// Record a manager decision. Returns `None` when the request does not
    /// exist.
    pub async fn review(
        &self,
        id: &str,
        status: &str,
        reviewer_id: &str,
        note: Option<String>,
    ) -> Result<Option<leave_requests::Model>> {
        let Some(existing) = LeaveRequests::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query leave request for review")?
        else {
            return Ok(None);
        };

        let mut active: leave_requests::ActiveModel = existing.into();
        active.status = Set(status.to_string());
        active.reviewed_by = Set(Some(reviewer_id.to_string()));
        active.review_note = Set(note);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to review leave request")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = LeaveRequests::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete leave request")?;

        Ok(result.rows_affected > 0)
    }
}
