use db::models::user::UserRole;

/// The authenticated caller of a service operation. Every operation takes
/// the acting user explicitly rather than reading ambient request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: i64, role: UserRole) -> Self {
        Self { id, role }
    }

    /// May publish, reject and administer content.
    pub fn is_privileged(&self) -> bool {
        matches!(self.role, UserRole::SuperAdmin | UserRole::Admin)
    }

    /// May author content and view aggregate results.
    pub fn is_trainer_or_admin(&self) -> bool {
        matches!(
            self.role,
            UserRole::SuperAdmin | UserRole::Admin | UserRole::Trainer
        )
    }
}
