use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{prelude::*, rnd_tasks};

#[derive(Debug, Clone)]
pub struct NewRndTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub assigned_to: Option<String>,
    pub created_by: String,
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RndTaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
}

pub struct RndTaskRepository {
    conn: DatabaseConnection,
}

impl RndTaskRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_all(&self) -> Result<Vec<rnd_tasks::Model>> {
        RndTasks::find()
            .order_by_desc(rnd_tasks::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list R&D tasks")
    }

    /// Tasks an employee can see: assigned to them or created by them.
    pub async fn list_for_employee(&self, employee_id: &str) -> Result<Vec<rnd_tasks::Model>> {
        RndTasks::find()
            .filter(
                Condition::any()
                    .add(rnd_tasks::Column::AssignedTo.eq(employee_id))
                    .add(rnd_tasks::Column::CreatedBy.eq(employee_id)),
            )
            .order_by_desc(rnd_tasks::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list R&D tasks for employee")
    }

    pub async fn get(&self, id: &str) -> Result<Option<rnd_tasks::Model>> {
        RndTasks::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query R&D task")
    }

    pub async fn create(&self, input: NewRndTask) -> Result<rnd_tasks::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        rnd_tasks::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            title: Set(input.title),
            description: Set(input.description),
            status: Set("pending".to_string()),
            priority: Set(input.priority),
            assigned_to: Set(input.assigned_to),
            created_by: Set(input.created_by),
            due_date: Set(input.due_date),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert R&D task")
    }

    pub async fn update(&self, id: &str, update: RndTaskUpdate) -> Result<Option<rnd_tasks::Model>> {
        let Some(existing) = RndTasks::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query R&D task for update")?
        else {
            return Ok(None);
        };

        let mut active: rnd_tasks::ActiveModel = existing.into();

        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description));
        }
        if let Some(status) = update.status {
            active.status = Set(status);
        }
        if let Some(priority) = update.priority {
            active.priority = Set(priority);
        }
        if let Some(assigned_to) = update.assigned_to {
            active.assigned_to = Set(Some(assigned_to));
        }
        if let Some(due_date) = update.due_date {
            active.due_date = Set(Some(due_date));
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update R&D task")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = RndTasks::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete R&D task")?;

        Ok(result.rows_affected > 0)
    }
}
