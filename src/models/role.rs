use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
    Kitchen,
}

/// Command groups a role may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    /// Order entry, table selection, receipts
    Pos,
    /// Order queue as seen from the kitchen
    Kitchen,
    /// Read-only product, category and table listings
    Browse,
    /// Product and category maintenance
    Catalog,
    /// Table layout
    Floor,
    Printers,
    Inventory,
    Reports,
    Settings,
    Users,
    Database,
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Area::Pos => "the POS",
            Area::Kitchen => "the kitchen view",
            Area::Browse => "listings",
            Area::Catalog => "product management",
            Area::Floor => "table management",
            Area::Printers => "printer management",
            Area::Inventory => "inventory",
            Area::Reports => "reports",
            Area::Settings => "settings",
            Area::Users => "user management",
            Area::Database => "database maintenance",
        };
        f.write_str(s)
    }
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Cashier, Role::Kitchen];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Cashier => "cashier",
            Role::Kitchen => "kitchen",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "cashier" => Some(Role::Cashier),
            "kitchen" => Some(Role::Kitchen),
            _ => None,
        }
    }

    pub fn allows(&self, area: Area) -> bool {
        match self {
            Role::Admin => true,
            Role::Manager => !matches!(area, Area::Users | Area::Database),
            Role::Cashier => matches!(area, Area::Pos | Area::Kitchen | Area::Browse),
            Role::Kitchen => matches!(area, Area::Kitchen | Area::Browse),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_reaches_everything() {
        for area in [Area::Pos, Area::Users, Area::Database, Area::Reports] {
            assert!(Role::Admin.allows(area));
        }
    }

    #[test]
    fn manager_is_kept_out_of_users_and_database() {
        assert!(Role::Manager.allows(Area::Reports));
        assert!(Role::Manager.allows(Area::Printers));
        assert!(!Role::Manager.allows(Area::Users));
        assert!(!Role::Manager.allows(Area::Database));
    }

    #[test]
    fn cashier_and_kitchen_stay_on_the_floor() {
        assert!(Role::Cashier.allows(Area::Pos));
        assert!(!Role::Cashier.allows(Area::Catalog));
        assert!(!Role::Cashier.allows(Area::Reports));
        assert!(Role::Kitchen.allows(Area::Kitchen));
        assert!(!Role::Kitchen.allows(Area::Pos));
    }

    #[test]
    fn role_strings_are_case_insensitive() {
        assert_eq!(Role::from_db_str("Manager"), Some(Role::Manager));
        assert_eq!(Role::from_db_str("waiter"), None);
    }
}
