use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub tax_id: Option<String>,

    /// Customer grade (A/B/C)
    pub grade: Option<String>,

    /// lead | existing | inactive | closed | terminate
    pub status: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::locations::Entity")]
    Locations,
    #[sea_orm(has_many = "super::service_contracts::Entity")]
    ServiceContracts,
}

impl Related<super::locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

impl Related<super::service_contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceContracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
