use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::entities::{maintenance_tasks, prelude::*, spare_parts, task_part_usage};

#[derive(Debug, Clone)]
pub struct NewMaintenanceTask {
    pub title: String,
    pub description: Option<String>,
    pub asset_id: Option<String>,
    pub assigned_to: Option<String>,
    pub priority: String,
    pub scheduled_date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MaintenanceTaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub scheduled_date: Option<String>,
    pub notes: Option<String>,
}

/// Result of consuming stock against a task. Business rejections are data,
/// not errors, so handlers can map them to precise responses.
#[derive(Debug)]
pub enum PartUsageOutcome {
    Applied(task_part_usage::Model),
    TaskNotFound,
    PartNotFound,
    InsufficientStock { available: i32 },
}

#[derive(Debug)]
pub enum RemoveUsageOutcome {
    Removed,
    UsageNotFound,
    TaskMismatch,
}

pub struct MaintenanceRepository {
    conn: DatabaseConnection,
}

impl MaintenanceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, status: Option<&str>) -> Result<Vec<maintenance_tasks::Model>> {
        let mut query =
            MaintenanceTasks::find().order_by_desc(maintenance_tasks::Column::CreatedAt);

        if let Some(status) = status {
            query = query.filter(maintenance_tasks::Column::Status.eq(status));
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to list maintenance tasks")
    }

    pub async fn get(&self, id: &str) -> Result<Option<maintenance_tasks::Model>> {
        MaintenanceTasks::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query maintenance task")
    }

    pub async fn get_usage(&self, task_id: &str) -> Result<Vec<task_part_usage::Model>> {
        TaskPartUsage::find()
            .filter(task_part_usage::Column::TaskId.eq(task_id))
            .order_by_asc(task_part_usage::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list part usage for task")
    }

    pub async fn create(&self, input: NewMaintenanceTask) -> Result<maintenance_tasks::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        maintenance_tasks::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            title: Set(input.title),
            description: Set(input.description),
            asset_id: Set(input.asset_id),
            assigned_to: Set(input.assigned_to),
            priority: Set(input.priority),
            status: Set("pending".to_string()),
            scheduled_date: Set(input.scheduled_date),
            completed_date: Set(None),
            total_cost: Set(0.0),
            notes: Set(input.notes),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert maintenance task")
    }

    pub async fn update(
        &self,
        id: &str,
        update: MaintenanceTaskUpdate,
    ) -> Result<Option<maintenance_tasks::Model>> {
        let Some(existing) = MaintenanceTasks::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query maintenance task for update")?
        else {
            return Ok(None);
        };

        let mut active: maintenance_tasks::ActiveModel = existing.into();

        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description));
        }
        if let Some(priority) = update.priority {
            active.priority = Set(priority);
        }
        if let Some(status) = update.status {
            if status == "completed" {
                active.completed_date = Set(Some(chrono::Utc::now().to_rfc3339()));
            }
            active.status = Set(status);
        }
        if let Some(assigned_to) = update.assigned_to {
            active.assigned_to = Set(Some(assigned_to));
        }
        if let Some(scheduled_date) = update.scheduled_date {
            active.scheduled_date = Set(Some(scheduled_date));
        }
        if let Some(notes) = update.notes {
            active.notes = Set(Some(notes));
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update maintenance task")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        TaskPartUsage::delete_many()
            .filter(task_part_usage::Column::TaskId.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to delete part usage for task")?;

        let result = MaintenanceTasks::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete maintenance task")?;

        Ok(result.rows_affected > 0)
    }

    /// Consume stock against a task in one transaction: record the usage at
    /// the part's current price, decrement stock, and recompute the task's
    /// total cost. A rejection leaves every row untouched.
    pub async fn add_part_usage(
        &self,
        task_id: &str,
        part_id: &str,
        quantity: i32,
    ) -> Result<PartUsageOutcome> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction")?;

        let Some(task) = MaintenanceTasks::find_by_id(task_id)
            .one(&txn)
            .await
            .context("Failed to query task in transaction")?
        else {
            txn.rollback().await.ok();
            return Ok(PartUsageOutcome::TaskNotFound);
        };

        let Some(part) = SpareParts::find_by_id(part_id)
            .one(&txn)
            .await
            .context("Failed to query part in transaction")?
        else {
            txn.rollback().await.ok();
            return Ok(PartUsageOutcome::PartNotFound);
        };

        if part.stock < quantity {
            let available = part.stock;
            txn.rollback().await.ok();
            return Ok(PartUsageOutcome::InsufficientStock { available });
        }

        let price_at_time = part.price;
        let usage = task_part_usage::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            task_id: Set(task_id.to_string()),
            part_id: Set(part_id.to_string()),
            quantity: Set(quantity),
            price_at_time: Set(price_at_time),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        }
        .insert(&txn)
        .await
        .context("Failed to insert part usage")?;

        let new_stock = part.stock - quantity;
        let mut part_active: spare_parts::ActiveModel = part.into();
        part_active.stock = Set(new_stock);
        part_active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        part_active
            .update(&txn)
            .await
            .context("Failed to decrement stock")?;

        Self::recompute_total_cost(&txn, task).await?;

        txn.commit().await.context("Failed to commit part usage")?;

        Ok(PartUsageOutcome::Applied(usage))
    }

    /// Undo a usage record: restore stock, delete the record, recompute the
    /// task total.
    pub async fn remove_part_usage(
        &self,
        task_id: &str,
        usage_id: &str,
    ) -> Result<RemoveUsageOutcome> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction")?;

        let Some(usage) = TaskPartUsage::find_by_id(usage_id)
            .one(&txn)
            .await
            .context("Failed to query usage in transaction")?
        else {
            txn.rollback().await.ok();
            return Ok(RemoveUsageOutcome::UsageNotFound);
        };

        if usage.task_id != task_id {
            txn.rollback().await.ok();
            return Ok(RemoveUsageOutcome::TaskMismatch);
        }

        if let Some(part) = SpareParts::find_by_id(&usage.part_id)
            .one(&txn)
            .await
            .context("Failed to query part for stock restore")?
        {
            let restored = part.stock + usage.quantity;
            let mut part_active: spare_parts::ActiveModel = part.into();
            part_active.stock = Set(restored);
            part_active.updated_at = Set(chrono::Utc::now().to_rfc3339());
            part_active
                .update(&txn)
                .await
                .context("Failed to restore stock")?;
        }

        TaskPartUsage::delete_by_id(usage_id)
            .exec(&txn)
            .await
            .context("Failed to delete part usage")?;

        if let Some(task) = MaintenanceTasks::find_by_id(task_id)
            .one(&txn)
            .await
            .context("Failed to query task for cost recompute")?
        {
            Self::recompute_total_cost(&txn, task).await?;
        }

        txn.commit().await.context("Failed to commit usage removal")?;

        Ok(RemoveUsageOutcome::Removed)
    }

    async fn recompute_total_cost<C: ConnectionTrait>(
        txn: &C,
        task: maintenance_tasks::Model,
    ) -> Result<()> {
        let all_usage = TaskPartUsage::find()
            .filter(task_part_usage::Column::TaskId.eq(task.id.clone()))
            .all(txn)
            .await
            .context("Failed to load usage for cost recompute")?;

        let total_cost: f64 = all_usage
            .iter()
            .map(|u| u.price_at_time * f64::from(u.quantity))
            .sum();

        let mut active: maintenance_tasks::ActiveModel = task.into();
        active.total_cost = Set(total_cost);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(txn)
            .await
            .context("Failed to update task total cost")?;

        Ok(())
    }
}
