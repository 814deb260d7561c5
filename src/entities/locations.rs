use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub company_id: String,

    pub code: String,

    pub name: String,

    /// active | inactive | lead
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

    /// Employee currently responsible for this location
    pub assigned_to: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Companies,
    #[sea_orm(has_many = "super::visits::Entity")]
    Visits,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::visits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
