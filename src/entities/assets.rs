use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub serial_number: String,

    pub model_name: String,

    /// in_service | in_repair | retired
    pub status: String,

    pub condition: String,

    pub location_id: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::maintenance_tasks::Entity")]
    MaintenanceTasks,
    #[sea_orm(has_many = "super::contract_items::Entity")]
    ContractItems,
}

impl Related<super::maintenance_tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceTasks.def()
    }
}

impl Related<super::contract_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
