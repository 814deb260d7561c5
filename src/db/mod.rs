use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{
    activity_logs, assets, companies, contract_items, leave_requests, locations,
    maintenance_tasks, rnd_tasks, service_contracts, spare_parts, task_part_usage, visits,
};

pub mod migrator;
pub mod repositories;

pub use repositories::company::{CompanyUpdate, NewCompany, NewLocation};
pub use repositories::contract::{ContractUpdate, NewContract};
pub use repositories::employee::{Employee, EmployeeUpdate, NewEmployee};
pub use repositories::inventory::{NewAsset, NewSparePart, SparePartUpdate};
pub use repositories::leave::NewLeaveRequest;
pub use repositories::maintenance::{
    MaintenanceTaskUpdate, NewMaintenanceTask, PartUsageOutcome, RemoveUsageOutcome,
};
pub use repositories::rnd_task::{NewRndTask, RndTaskUpdate};
pub use repositories::visit::NewVisit;

/// Single handle to the relational store. Constructed once at startup and
/// cloned into handlers; all durable state lives behind it.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn employee_repo(&self) -> repositories::employee::EmployeeRepository {
        repositories::employee::EmployeeRepository::new(self.conn.clone())
    }

    fn company_repo(&self) -> repositories::company::CompanyRepository {
        repositories::company::CompanyRepository::new(self.conn.clone())
    }

    fn visit_repo(&self) -> repositories::visit::VisitRepository {
        repositories::visit::VisitRepository::new(self.conn.clone())
    }

    fn leave_repo(&self) -> repositories::leave::LeaveRepository {
        repositories::leave::LeaveRepository::new(self.conn.clone())
    }

    fn inventory_repo(&self) -> repositories::inventory::InventoryRepository {
        repositories::inventory::InventoryRepository::new(self.conn.clone())
    }

    fn maintenance_repo(&self) -> repositories::maintenance::MaintenanceRepository {
        repositories::maintenance::MaintenanceRepository::new(self.conn.clone())
    }

    fn contract_repo(&self) -> repositories::contract::ContractRepository {
        repositories::contract::ContractRepository::new(self.conn.clone())
    }

    fn rnd_repo(&self) -> repositories::rnd_task::RndTaskRepository {
        repositories::rnd_task::RndTaskRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity::ActivityRepository {
        repositories::activity::ActivityRepository::new(self.conn.clone())
    }

    // ========== Employees ==========

    pub async fn list_employees(&self, role: Option<&str>) -> Result<Vec<Employee>> {
        self.employee_repo().list(role).await
    }

    pub async fn get_employee(&self, id: &str) -> Result<Option<Employee>> {
        self.employee_repo().get_by_id(id).await
    }

    pub async fn get_employee_by_username(&self, username: &str) -> Result<Option<Employee>> {
        self.employee_repo().get_by_username(username).await
    }

    pub async fn verify_employee_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool> {
        self.employee_repo()
            .verify_credentials(username, password)
            .await
    }

    pub async fn create_employee(
        &self,
        input: NewEmployee,
        config: &SecurityConfig,
    ) -> Result<Employee> {
        self.employee_repo().create(input, config).await
    }

    pub async fn update_employee(
        &self,
        id: &str,
        update: EmployeeUpdate,
        config: &SecurityConfig,
    ) -> Result<Option<Employee>> {
        self.employee_repo().update(id, update, config).await
    }

    pub async fn delete_employee(&self, id: &str) -> Result<bool> {
        self.employee_repo().delete(id).await
    }

    // ========== Companies & Locations ==========

    pub async fn list_companies(&self) -> Result<Vec<(companies::Model, Vec<locations::Model>)>> {
        self.company_repo().list_with_locations().await
    }

    pub async fn get_company(
        &self,
        id: &str,
    ) -> Result<Option<(companies::Model, Vec<locations::Model>)>> {
        self.company_repo().get_with_locations(id).await
    }

    pub async fn create_company(
        &self,
        input: NewCompany,
    ) -> Result<(companies::Model, Vec<locations::Model>)> {
        self.company_repo().create(input).await
    }

    pub async fn add_location(
        &self,
        company_id: &str,
        location: NewLocation,
    ) -> Result<Option<locations::Model>> {
        self.company_repo().add_location(company_id, location).await
    }

    pub async fn update_company(
        &self,
        id: &str,
        update: CompanyUpdate,
    ) -> Result<Option<companies::Model>> {
        self.company_repo().update(id, update).await
    }

    pub async fn delete_company(&self, id: &str) -> Result<bool> {
        self.company_repo().delete(id).await
    }

    pub async fn get_location(&self, id: &str) -> Result<Option<locations::Model>> {
        self.company_repo().get_location(id).await
    }

    // ========== Visits ==========

    pub async fn list_visits(&self) -> Result<Vec<visits::Model>> {
        self.visit_repo().list_all().await
    }

    pub async fn list_visits_for_employee(&self, employee_id: &str) -> Result<Vec<visits::Model>> {
        self.visit_repo().list_for_employee(employee_id).await
    }

    pub async fn get_visit(&self, id: &str) -> Result<Option<visits::Model>> {
        self.visit_repo().get(id).await
    }

    pub async fn create_visit(&self, input: NewVisit) -> Result<visits::Model> {
        self.visit_repo().create(input).await
    }

    pub async fn check_out_visit(&self, id: &str) -> Result<Option<visits::Model>> {
        self.visit_repo().check_out(id).await
    }

    // ========== Leave requests ==========

    pub async fn list_leave_requests(&self) -> Result<Vec<leave_requests::Model>> {
        self.leave_repo().list_all().await
    }

    pub async fn list_leave_requests_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<leave_requests::Model>> {
        self.leave_repo().list_for_employee(employee_id).await
    }

    pub async fn get_leave_request(&self, id: &str) -> Result<Option<leave_requests::Model>> {
        self.leave_repo().get(id).await
    }

    pub async fn create_leave_request(
        &self,
        input: NewLeaveRequest,
    ) -> Result<leave_requests::Model> {
        self.leave_repo().create(input).await
    }

    pub async fn review_leave_request(
        &self,
        id: &str,
        status: &str,
        reviewer_id: &str,
        note: Option<String>,
    ) -> Result<Option<leave_requests::Model>> {
        self.leave_repo().review(id, status, reviewer_id, note).await
    }

    pub async fn delete_leave_request(&self, id: &str) -> Result<bool> {
        self.leave_repo().delete(id).await
    }

    // ========== Inventory ==========

    pub async fn list_spare_parts(&self, search: Option<&str>) -> Result<Vec<spare_parts::Model>> {
        self.inventory_repo().list_parts(search).await
    }

    pub async fn get_spare_part(&self, id: &str) -> Result<Option<spare_parts::Model>> {
        self.inventory_repo().get_part(id).await
    }

    pub async fn spare_part_number_exists(&self, part_number: &str) -> Result<bool> {
        self.inventory_repo().part_number_exists(part_number).await
    }

    pub async fn create_spare_part(&self, input: NewSparePart) -> Result<spare_parts::Model> {
        self.inventory_repo().create_part(input).await
    }

    pub async fn update_spare_part(
        &self,
        id: &str,
        update: SparePartUpdate,
    ) -> Result<Option<spare_parts::Model>> {
        self.inventory_repo().update_part(id, update).await
    }

    pub async fn delete_spare_part(&self, id: &str) -> Result<bool> {
        self.inventory_repo().delete_part(id).await
    }

    pub async fn list_assets(&self) -> Result<Vec<assets::Model>> {
        self.inventory_repo().list_assets().await
    }

    pub async fn get_asset(&self, id: &str) -> Result<Option<assets::Model>> {
        self.inventory_repo().get_asset(id).await
    }

    pub async fn create_asset(&self, input: NewAsset) -> Result<assets::Model> {
        self.inventory_repo().create_asset(input).await
    }

    // ========== Maintenance ==========

    pub async fn list_maintenance_tasks(
        &self,
        status: Option<&str>,
    ) -> Result<Vec<maintenance_tasks::Model>> {
        self.maintenance_repo().list(status).await
    }

    pub async fn get_maintenance_task(&self, id: &str) -> Result<Option<maintenance_tasks::Model>> {
        self.maintenance_repo().get(id).await
    }

    pub async fn get_task_part_usage(&self, task_id: &str) -> Result<Vec<task_part_usage::Model>> {
        self.maintenance_repo().get_usage(task_id).await
    }

    pub async fn create_maintenance_task(
        &self,
        input: NewMaintenanceTask,
    ) -> Result<maintenance_tasks::Model> {
        self.maintenance_repo().create(input).await
    }

    pub async fn update_maintenance_task(
        &self,
        id: &str,
        update: MaintenanceTaskUpdate,
    ) -> Result<Option<maintenance_tasks::Model>> {
        self.maintenance_repo().update(id, update).await
    }

    pub async fn delete_maintenance_task(&self, id: &str) -> Result<bool> {
        self.maintenance_repo().delete(id).await
    }

    pub async fn add_task_part_usage(
        &self,
        task_id: &str,
        part_id: &str,
        quantity: i32,
    ) -> Result<PartUsageOutcome> {
        self.maintenance_repo()
            .add_part_usage(task_id, part_id, quantity)
            .await
    }

    pub async fn remove_task_part_usage(
        &self,
        task_id: &str,
        usage_id: &str,
    ) -> Result<RemoveUsageOutcome> {
        self.maintenance_repo()
            .remove_part_usage(task_id, usage_id)
            .await
    }

    // ========== Contracts ==========

    pub async fn list_contracts(
        &self,
        status: Option<&str>,
        company_id: Option<&str>,
    ) -> Result<Vec<service_contracts::Model>> {
        self.contract_repo().list(status, company_id).await
    }

    pub async fn get_contract(
        &self,
        id: &str,
    ) -> Result<Option<(service_contracts::Model, Vec<contract_items::Model>)>> {
        self.contract_repo().get_with_items(id).await
    }

    pub async fn contract_number_exists(&self, contract_number: &str) -> Result<bool> {
        self.contract_repo()
            .contract_number_exists(contract_number)
            .await
    }

    pub async fn create_contract(&self, input: NewContract) -> Result<service_contracts::Model> {
        self.contract_repo().create(input).await
    }

    pub async fn update_contract(
        &self,
        id: &str,
        update: ContractUpdate,
    ) -> Result<Option<service_contracts::Model>> {
        self.contract_repo().update(id, update).await
    }

    pub async fn delete_contract(&self, id: &str) -> Result<bool> {
        self.contract_repo().delete(id).await
    }

    // ========== R&D tasks ==========

    pub async fn list_rnd_tasks(&self) -> Result<Vec<rnd_tasks::Model>> {
        self.rnd_repo().list_all().await
    }

    pub async fn list_rnd_tasks_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<rnd_tasks::Model>> {
        self.rnd_repo().list_for_employee(employee_id).await
    }

    pub async fn get_rnd_task(&self, id: &str) -> Result<Option<rnd_tasks::Model>> {
        self.rnd_repo().get(id).await
    }

    pub async fn create_rnd_task(&self, input: NewRndTask) -> Result<rnd_tasks::Model> {
        self.rnd_repo().create(input).await
    }

    pub async fn update_rnd_task(
        &self,
        id: &str,
        update: RndTaskUpdate,
    ) -> Result<Option<rnd_tasks::Model>> {
        self.rnd_repo().update(id, update).await
    }

    pub async fn delete_rnd_task(&self, id: &str) -> Result<bool> {
        self.rnd_repo().delete(id).await
    }

    // ========== Activity log ==========

    pub async fn record_activity(
        &self,
        employee_id: &str,
        employee_name: &str,
        activity_type: &str,
        description: &str,
    ) -> Result<activity_logs::Model> {
        self.activity_repo()
            .record(employee_id, employee_name, activity_type, description)
            .await
    }

    pub async fn list_activity(&self) -> Result<Vec<activity_logs::Model>> {
        self.activity_repo().list_all().await
    }

    pub async fn list_activity_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<activity_logs::Model>> {
        self.activity_repo().list_for_employee(employee_id).await
    }

    pub async fn latest_clock_event(
        &self,
        employee_id: &str,
    ) -> Result<Option<activity_logs::Model>> {
        self.activity_repo().latest_clock_event(employee_id).await
    }
}
