//! Role model and the capability table consulted by both the session gate
//! and individual handlers, so the two enforcement points cannot drift.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of operational roles. Stored as lowercase strings in the
/// employees table and inside session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Sales,
    Rnd,
    Maintenance,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Sales => "sales",
            Self::Rnd => "rnd",
            Self::Maintenance => "maintenance",
        }
    }

    /// Dashboard each role lands on after login and when hitting the site
    /// root.
    #[must_use]
    pub const fn home_route(self) -> &'static str {
        match self {
            Self::Manager => "/admin/dashboard",
            Self::Sales => "/sale/dashboard",
            Self::Rnd => "/rnd/dashboard",
            Self::Maintenance => "/maintenance/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Self::Manager),
            "sales" => Ok(Self::Sales),
            "rnd" => Ok(Self::Rnd),
            "maintenance" => Ok(Self::Maintenance),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Operations that are restricted to a subset of roles. Read-only listing
/// endpoints only require an authenticated session and do not appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageEmployees,
    DeleteCustomers,
    ReviewLeave,
    ManageInventory,
    ManageMaintenance,
    DeleteMaintenance,
    ManageContracts,
    ManageRndTasks,
    DeleteRndTasks,
    ViewAllActivity,
}

/// The single allow-list for role-gated operations.
#[must_use]
pub const fn allows(role: Role, action: Action) -> bool {
    match action {
        Action::ManageEmployees
        | Action::DeleteCustomers
        | Action::ReviewLeave
        | Action::ManageContracts
        | Action::DeleteMaintenance
        | Action::DeleteRndTasks
        | Action::ViewAllActivity => matches!(role, Role::Manager),
        Action::ManageInventory | Action::ManageMaintenance => {
            matches!(role, Role::Manager | Role::Maintenance)
        }
        Action::ManageRndTasks => matches!(role, Role::Manager | Role::Rnd),
    }
}

/// The admin area is the only path prefix reserved for a single role; other
/// dashboards are reachable by any authenticated employee.
#[must_use]
pub fn restricted_area(path: &str) -> Option<Role> {
    if path == "/admin" || path.starts_with("/admin/") {
        Some(Role::Manager)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_only_actions() {
        assert!(allows(Role::Manager, Action::ManageEmployees));
        assert!(!allows(Role::Sales, Action::ManageEmployees));
        assert!(!allows(Role::Rnd, Action::ReviewLeave));
        assert!(!allows(Role::Maintenance, Action::ManageContracts));
    }

    #[test]
    fn shared_actions() {
        assert!(allows(Role::Maintenance, Action::ManageInventory));
        assert!(allows(Role::Manager, Action::ManageInventory));
        assert!(!allows(Role::Sales, Action::ManageInventory));

        assert!(allows(Role::Rnd, Action::ManageRndTasks));
        assert!(!allows(Role::Rnd, Action::DeleteRndTasks));
    }

    #[test]
    fn home_routes_per_role() {
        assert_eq!(Role::Manager.home_route(), "/admin/dashboard");
        assert_eq!(Role::Sales.home_route(), "/sale/dashboard");
        assert_eq!(Role::Rnd.home_route(), "/rnd/dashboard");
        assert_eq!(Role::Maintenance.home_route(), "/maintenance/dashboard");
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Manager, Role::Sales, Role::Rnd, Role::Maintenance] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn admin_prefix_is_manager_territory() {
        assert_eq!(restricted_area("/admin/dashboard"), Some(Role::Manager));
        assert_eq!(restricted_area("/admin"), Some(Role::Manager));
        assert_eq!(restricted_area("/administrators"), None);
        assert_eq!(restricted_area("/sale/dashboard"), None);
    }
}
