use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Bootstrap manager account. The password is expected to be rotated right
/// after the first login.
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password123";

/// Hash the bootstrap password using Argon2id
fn hash_admin_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(ADMIN_PASSWORD.as_bytes(), &salt)
        .expect("Failed to hash bootstrap password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Employees)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(Companies)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(Locations)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(Visits)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(LeaveRequests)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(SpareParts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(Assets)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(MaintenanceTasks)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(TaskPartUsage)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(ServiceContracts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(ContractItems)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(RndTasks)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(ActivityLogs)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Seed the bootstrap manager account
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_admin_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Employees)
            .columns([
                crate::entities::employees::Column::Id,
                crate::entities::employees::Column::Name,
                crate::entities::employees::Column::Email,
                crate::entities::employees::Column::Phone,
                crate::entities::employees::Column::Role,
                crate::entities::employees::Column::Username,
                crate::entities::employees::Column::PasswordHash,
                crate::entities::employees::Column::Avatar,
                crate::entities::employees::Column::CreatedAt,
                crate::entities::employees::Column::UpdatedAt,
            ])
            .values_panic([
                uuid::Uuid::new_v4().to_string().into(),
                "Super Administrator".into(),
                "admin@fieldops.local".into(),
                "000-000-0000".into(),
                "manager".into(),
                ADMIN_USERNAME.into(),
                password_hash.into(),
                Option::<String>::None.into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLogs).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RndTasks).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContractItems).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceContracts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskPartUsage).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MaintenanceTasks).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SpareParts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeaveRequests).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Visits).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees).to_owned())
            .await?;

        Ok(())
    }
}
