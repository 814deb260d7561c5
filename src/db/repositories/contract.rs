use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::{contract_items, prelude::*, service_contracts};

#[derive(Debug, Clone)]
pub struct NewContract {
    pub company_id: String,
    pub contract_number: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub status: String,
    pub price: f64,
    pub notes: Option<String>,
    pub asset_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContractUpdate {
    pub status: Option<String>,
    pub end_date: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
}

pub struct ContractRepository {
    conn: DatabaseConnection,
}

impl ContractRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        status: Option<&str>,
        company_id: Option<&str>,
    ) -> Result<Vec<service_contracts::Model>> {
        let mut query =
            ServiceContracts::find().order_by_desc(service_contracts::Column::CreatedAt);

        if let Some(status) = status {
            query = query.filter(service_contracts::Column::Status.eq(status));
        }
        if let Some(company_id) = company_id {
            query = query.filter(service_contracts::Column::CompanyId.eq(company_id));
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to list contracts")
    }

    pub async fn get_with_items(
        &self,
        id: &str,
    ) -> Result<Option<(service_contracts::Model, Vec<contract_items::Model>)>> {
        let Some(contract) = ServiceContracts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query contract")?
        else {
            return Ok(None);
        };

        let items = ContractItems::find()
            .filter(contract_items::Column::ContractId.eq(id))
            .all(&self.conn)
            .await
            .context("Failed to load contract items")?;

        Ok(Some((contract, items)))
    }

    pub async fn contract_number_exists(&self, contract_number: &str) -> Result<bool> {
        let existing = ServiceContracts::find()
            .filter(service_contracts::Column::ContractNumber.eq(contract_number))
            .one(&self.conn)
            .await
            .context("Failed to query contract by number")?;

        Ok(existing.is_some())
    }

    /// Create the contract and its asset links as one unit.
    pub async fn create(&self, input: NewContract) -> Result<service_contracts::Model> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction")?;

        let now = chrono::Utc::now().to_rfc3339();
        let contract_id = uuid::Uuid::new_v4().to_string();

        let contract = service_contracts::ActiveModel {
            id: Set(contract_id.clone()),
            company_id: Set(input.company_id),
            contract_number: Set(input.contract_number),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            status: Set(input.status),
            price: Set(input.price),
            notes: Set(input.notes),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .context("Failed to insert contract")?;

        for asset_id in input.asset_ids {
            contract_items::ActiveModel {
                id: Set(uuid::Uuid::new_v4().to_string()),
                contract_id: Set(contract_id.clone()),
                asset_id: Set(asset_id),
            }
            .insert(&txn)
            .await
            .context("Failed to insert contract item")?;
        }

        txn.commit().await.context("Failed to commit contract")?;

        Ok(contract)
    }

    pub async fn update(
        &self,
        id: &str,
        update: ContractUpdate,
    ) -> Result<Option<service_contracts::Model>> {
        let Some(existing) = ServiceContracts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query contract for update")?
        else {
            return Ok(None);
        };

        let mut active: service_contracts::ActiveModel = existing.into();

        if let Some(status) = update.status {
            active.status = Set(status);
        }
        if let Some(end_date) = update.end_date {
            active.end_date = Set(Some(end_date));
        }
        if let Some(price) = update.price {
            active.price = Set(price);
        }
        if let Some(notes) = update.notes {
            active.notes = Set(Some(notes));
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update contract")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        ContractItems::delete_many()
            .filter(contract_items::Column::ContractId.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to delete contract items")?;

        let result = ServiceContracts::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete contract")?;

        Ok(result.rows_affected > 0)
    }
}
