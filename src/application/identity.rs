use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::user_role::UserRole,
};

/// Authenticated identity as supplied by the auth boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
    /// Bound owner for staff accounts.
    pub owner_id: Option<Uuid>,
    /// Bound restaurant for staff accounts.
    pub restaurant_id: Option<Uuid>,
}

/// Whose subscription governs an actor's actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// Admins are not bound by any tenant's plan.
    Exempt,
    Owner(Uuid),
}

impl Actor {
    pub fn owner(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Owner,
            owner_id: Some(user_id),
            restaurant_id: None,
        }
    }

    pub fn staff(user_id: Uuid, owner_id: Uuid, restaurant_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Staff,
            owner_id: Some(owner_id),
            restaurant_id: Some(restaurant_id),
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Admin,
            owner_id: None,
            restaurant_id: None,
        }
    }

    pub fn owner_scope(&self) -> AppResult<OwnerScope> {
        match self.role {
            UserRole::Admin => Ok(OwnerScope::Exempt),
            UserRole::Owner => Ok(OwnerScope::Owner(self.user_id)),
            UserRole::Staff => self.owner_id.map(OwnerScope::Owner).ok_or_else(|| {
                AppError::InvalidInput("Staff member has no associated owner".into())
            }),
        }
    }

    /// Owner id for tenant-only operations; admins are refused.
    pub fn tenant_owner_id(&self) -> AppResult<Uuid> {
        match self.owner_scope()? {
            OwnerScope::Owner(id) => Ok(id),
            OwnerScope::Exempt => Err(AppError::Forbidden),
        }
    }
}
