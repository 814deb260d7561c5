pub use super::activity_logs::Entity as ActivityLogs;
pub use super::assets::Entity as Assets;
pub use super::companies::Entity as Companies;
pub use super::contract_items::Entity as ContractItems;
pub use super::employees::Entity as Employees;
pub use super::leave_requests::Entity as LeaveRequests;
pub use super::locations::Entity as Locations;
pub use super::maintenance_tasks::Entity as MaintenanceTasks;
pub use super::rnd_tasks::Entity as RndTasks;
pub use super::service_contracts::Entity as ServiceContracts;
pub use super::spare_parts::Entity as SpareParts;
pub use super::task_part_usage::Entity as TaskPartUsage;
pub use super::visits::Entity as Visits;
