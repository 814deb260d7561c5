use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "maintenance_tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    pub description: Option<String>,

    pub asset_id: Option<String>,

    pub assigned_to: Option<String>,

    /// low | medium | high
    pub priority: String,

    /// pending | in_progress | completed | cancelled
    pub status: String,

    pub scheduled_date: Option<String>,

    pub completed_date: Option<String>,

    /// Sum of part usage (quantity x price at time), kept consistent by the
    /// parts transaction
    pub total_cost: f64,

    pub notes: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assets::Entity",
        from = "Column::AssetId",
        to = "super::assets::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Assets,
    #[sea_orm(has_many = "super::task_part_usage::Entity")]
    TaskPartUsage,
}

impl Related<super::assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl Related<super::task_part_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskPartUsage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
