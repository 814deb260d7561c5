use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{assets, prelude::*, spare_parts};

#[derive(Debug, Clone)]
pub struct NewSparePart {
    pub name: String,
    pub part_number: String,
    pub description: Option<String>,
    pub stock: i32,
    pub min_stock: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SparePartUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub min_stock: Option<i32>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub serial_number: String,
    pub model_name: String,
    pub status: String,
    pub condition: String,
    pub location_id: Option<String>,
}

pub struct InventoryRepository {
    conn: DatabaseConnection,
}

impl InventoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_parts(&self, search: Option<&str>) -> Result<Vec<spare_parts::Model>> {
        let mut query = SpareParts::find().order_by_asc(spare_parts::Column::Name);

        if let Some(term) = search {
            query = query.filter(
                Condition::any()
                    .add(spare_parts::Column::Name.contains(term))
                    .add(spare_parts::Column::PartNumber.contains(term)),
            );
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to list spare parts")
    }

    pub async fn get_part(&self, id: &str) -> Result<Option<spare_parts::Model>> {
        SpareParts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query spare part")
    }

    pub async fn part_number_exists(&self, part_number: &str) -> Result<bool> {
        let existing = SpareParts::find()
            .filter(spare_parts::Column::PartNumber.eq(part_number))
            .one(&self.conn)
            .await
            .context("Failed to query spare part by part number")?;

        Ok(existing.is_some())
    }

    pub async fn create_part(&self, input: NewSparePart) -> Result<spare_parts::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        spare_parts::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(input.name),
            part_number: Set(input.part_number),
            description: Set(input.description),
            stock: Set(input.stock),
            min_stock: Set(input.min_stock),
            price: Set(input.price),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert spare part")
    }

    pub async fn update_part(
        &self,
        id: &str,
        update: SparePartUpdate,
    ) -> Result<Option<spare_parts::Model>> {
        let Some(existing) = SpareParts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query spare part for update")?
        else {
            return Ok(None);
        };

        let mut active: spare_parts::ActiveModel = existing.into();

        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description));
        }
        if let Some(stock) = update.stock {
            active.stock = Set(stock);
        }
        if let Some(min_stock) = update.min_stock {
            active.min_stock = Set(min_stock);
        }
        if let Some(price) = update.price {
            active.price = Set(price);
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update spare part")?;

        Ok(Some(updated))
    }

    pub async fn delete_part(&self, id: &str) -> Result<bool> {
        let result = SpareParts::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete spare part")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_assets(&self) -> Result<Vec<assets::Model>> {
        Assets::find()
            .order_by_asc(assets::Column::SerialNumber)
            .all(&self.conn)
            .await
            .context("Failed to list assets")
    }

    pub async fn get_asset(&self, id: &str) -> Result<Option<assets::Model>> {
        Assets::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query asset")
    }

    pub async fn create_asset(&self, input: NewAsset) -> Result<assets::Model> {
        assets::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            serial_number: Set(input.serial_number),
            model_name: Set(input.model_name),
            status: Set(input.status),
            condition: Set(input.condition),
            location_id: Set(input.location_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert asset")
    }
}
