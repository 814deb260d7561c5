use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "spare_parts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(unique)]
    pub part_number: String,

    pub description: Option<String>,

    pub stock: i32,

    /// Reorder threshold
    pub min_stock: i32,

    pub price: f64,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::task_part_usage::Entity")]
    TaskPartUsage,
}

impl Related<super::task_part_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskPartUsage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
