#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Employee = 1,
    Manager = 2,
    Admin = 3,
    SuperAdmin = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Employee),
            2 => Some(Role::Manager),
            3 => Some(Role::Admin),
            4 => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        for role in [Role::Employee, Role::Manager, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::from_id(role as u8), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(5), None);
    }

    #[test]
    fn only_admins_are_admins() {
        assert!(Role::SuperAdmin.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Manager.is_admin());
        assert!(!Role::Employee.is_admin());
    }
}
