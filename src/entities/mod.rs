pub mod prelude;

pub mod activity_logs;
pub mod assets;
pub mod companies;
pub mod contract_items;
pub mod employees;
pub mod leave_requests;
pub mod locations;
pub mod maintenance_tasks;
pub mod rnd_tasks;
pub mod service_contracts;
pub mod spare_parts;
pub mod task_part_usage;
pub mod visits;
