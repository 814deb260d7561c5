use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{companies, locations, prelude::*};

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub tax_id: Option<String>,
    pub grade: Option<String>,
    pub status: String,
    pub locations: Vec<NewLocation>,
}

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub code: String,
    pub name: String,
    pub status: String,
    pub address: String,
    pub district: String,
    pub province: String,
    pub region: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub customer_type: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub grade: Option<String>,
    pub status: Option<String>,
}

pub struct CompanyRepository {
    conn: DatabaseConnection,
}

impl CompanyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_with_locations(
        &self,
    ) -> Result<Vec<(companies::Model, Vec<locations::Model>)>> {
        let rows = Companies::find()
            .find_with_related(Locations)
            .order_by_desc(companies::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list companies")?;

        Ok(rows)
    }

    pub async fn get_with_locations(
        &self,
        id: &str,
    ) -> Result<Option<(companies::Model, Vec<locations::Model>)>> {
        let Some(company) = Companies::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query company")?
        else {
            return Ok(None);
        };

        let locations = company
            .find_related(Locations)
            .all(&self.conn)
            .await
            .context("Failed to load company locations")?;

        Ok(Some((company, locations)))
    }

    pub async fn create(&self, input: NewCompany) -> Result<(companies::Model, Vec<locations::Model>)> {
        let now = chrono::Utc::now().to_rfc3339();
        let company_id = uuid::Uuid::new_v4().to_string();

        let company = companies::ActiveModel {
            id: Set(company_id.clone()),
            name: Set(input.name),
            tax_id: Set(input.tax_id),
            grade: Set(input.grade),
            status: Set(input.status),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert company")?;

        let mut created_locations = Vec::with_capacity(input.locations.len());
        for location in input.locations {
            created_locations.push(self.insert_location(&company_id, location).await?);
        }

        Ok((company, created_locations))
    }

    pub async fn add_location(
        &self,
        company_id: &str,
        location: NewLocation,
    ) -> Result<Option<locations::Model>> {
        let exists = Companies::find_by_id(company_id)
            .one(&self.conn)
            .await
            .context("Failed to query company for location insert")?;

        if exists.is_none() {
            return Ok(None);
        }

        Ok(Some(self.insert_location(company_id, location).await?))
    }

    async fn insert_location(
        &self,
        company_id: &str,
        location: NewLocation,
    ) -> Result<locations::Model> {
        locations::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            company_id: Set(company_id.to_string()),
            code: Set(location.code),
            name: Set(location.name),
            status: Set(location.status),
            address: Set(location.address),
            district: Set(location.district),
            province: Set(location.province),
            region: Set(location.region),
            lat: Set(location.lat),
            lng: Set(location.lng),
            customer_type: Set(location.customer_type),
            owner_name: Set(location.owner_name),
            owner_phone: Set(location.owner_phone),
            assigned_to: Set(location.assigned_to),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert location")
    }

    pub async fn update(&self, id: &str, update: CompanyUpdate) -> Result<Option<companies::Model>> {
        let Some(existing) = Companies::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query company for update")?
        else {
            return Ok(None);
        };

        let mut active: companies::ActiveModel = existing.into();

        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(tax_id) = update.tax_id {
            active.tax_id = Set(Some(tax_id));
        }
        if let Some(grade) = update.grade {
            active.grade = Set(Some(grade));
        }
        if let Some(status) = update.status {
            active.status = Set(status);
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update company")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        // Locations go first; SQLite only cascades when foreign keys are
        // enabled on the connection.
        Locations::delete_many()
            .filter(locations::Column::CompanyId.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to delete company locations")?;

        let result = Companies::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete company")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn get_location(&self, id: &str) -> Result<Option<locations::Model>> {
        Locations::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query location")
    }
}
