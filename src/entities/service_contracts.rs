use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "service_contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub company_id: String,

    #[sea_orm(unique)]
    pub contract_number: String,

    pub start_date: String,

    pub end_date: Option<String>,

    /// draft | active | expired | cancelled
    pub status: String,

    pub price: f64,

    pub notes: Option<String>,

    pub created_at: String,

    pub updated_at: String,
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
    #[sea_orm(has_many = "super::contract_items::Entity")]
    ContractItems,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::contract_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
