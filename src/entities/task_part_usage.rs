use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_part_usage")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub task_id: String,

    pub part_id: String,

    pub quantity: i32,

    /// Unit price captured when the part was consumed
    pub price_at_time: f64,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::maintenance_tasks::Entity",
        from = "Column::TaskId",
        to = "super::maintenance_tasks::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    MaintenanceTasks,
    #[sea_orm(
        belongs_to = "super::spare_parts::Entity",
        from = "Column::PartId",
        to = "super::spare_parts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    SpareParts,
}

impl Related<super::maintenance_tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceTasks.def()
    }
}

impl Related<super::spare_parts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SpareParts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
