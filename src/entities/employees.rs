use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    pub phone: String,

    /// Closed role set: manager | sales | rnd | maintenance
    pub role: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id PHC string, never serialized to clients
    pub password_hash: String,

    pub avatar: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::visits::Entity")]
    Visits,
    #[sea_orm(has_many = "super::leave_requests::Entity")]
    LeaveRequests,
    #[sea_orm(has_many = "super::activity_logs::Entity")]
    ActivityLogs,
}

impl Related<super::visits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visits.def()
    }
}

impl Related<super::leave_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveRequests.def()
    }
}

impl Related<super::activity_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
