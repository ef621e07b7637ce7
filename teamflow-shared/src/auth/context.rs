/// Authenticated request context and role gating
///
/// After the API's bearer-token middleware validates a JWT, it stores an
/// `AuthContext` in the request extensions. Handlers read the caller's
/// identity and role from it and gate mutations with [`AuthContext::require_role`].
///
/// # Example
///
/// ```
/// use teamflow_shared::auth::context::AuthContext;
/// use teamflow_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let auth = AuthContext::new(Uuid::new_v4(), "m@example.com".into(), UserRole::Manager);
/// assert!(auth.require_role(UserRole::Manager).is_ok());
/// assert!(auth.require_role(UserRole::Admin).is_err());
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role is below the required level
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: UserRole,
        actual: UserRole,
    },

    /// Caller is not allowed to touch this resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email claim from the token
    pub email: String,

    /// Role claim from the token
    pub role: UserRole,
}

impl AuthContext {
    /// Creates an auth context directly (used by tests)
    pub fn new(user_id: Uuid, email: String, role: UserRole) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    /// Creates the auth context from validated JWT claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }

    /// Requires the caller's role to be at least `required` in the lattice
    pub fn require_role(&self, required: UserRole) -> Result<(), AuthzError> {
        if self.role.is_at_least(required) {
            Ok(())
        } else {
            Err(AuthzError::InsufficientRole {
                required,
                actual: self.role,
            })
        }
    }

    /// Requires the caller to either own the resource or hold at least `fallback_role`
    ///
    /// This is the worker-ownership rule: a worker may touch a task only
    /// when it is assigned to them, while managers and admins may touch any.
    pub fn require_owner_or_role(
        &self,
        owner: Option<Uuid>,
        fallback_role: UserRole,
    ) -> Result<(), AuthzError> {
        if self.role.is_at_least(fallback_role) {
            return Ok(());
        }
        if owner == Some(self.user_id) {
            return Ok(());
        }
        Err(AuthzError::NotAuthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: UserRole) -> AuthContext {
        AuthContext::new(Uuid::new_v4(), "t@example.com".to_string(), role)
    }

    #[test]
    fn test_require_role_lattice() {
        assert!(ctx(UserRole::Admin).require_role(UserRole::Admin).is_ok());
        assert!(ctx(UserRole::Admin).require_role(UserRole::Manager).is_ok());
        assert!(ctx(UserRole::Manager)
            .require_role(UserRole::Manager)
            .is_ok());
        assert!(ctx(UserRole::Manager)
            .require_role(UserRole::Admin)
            .is_err());
        assert!(ctx(UserRole::Worker)
            .require_role(UserRole::Manager)
            .is_err());
    }

    #[test]
    fn test_owner_or_role_allows_assignee() {
        let auth = ctx(UserRole::Worker);
        assert!(auth
            .require_owner_or_role(Some(auth.user_id), UserRole::Manager)
            .is_ok());
    }

    #[test]
    fn test_owner_or_role_rejects_other_workers() {
        let auth = ctx(UserRole::Worker);
        assert!(auth
            .require_owner_or_role(Some(Uuid::new_v4()), UserRole::Manager)
            .is_err());
        assert!(auth.require_owner_or_role(None, UserRole::Manager).is_err());
    }

    #[test]
    fn test_owner_or_role_managers_bypass_ownership() {
        let auth = ctx(UserRole::Manager);
        assert!(auth
            .require_owner_or_role(Some(Uuid::new_v4()), UserRole::Manager)
            .is_ok());
    }

    #[test]
    fn test_from_claims() {
        let claims = crate::auth::jwt::Claims::new(
            Uuid::new_v4(),
            "c@example.com".to_string(),
            UserRole::Manager,
        );
        let auth = AuthContext::from_claims(claims.clone());
        assert_eq!(auth.user_id, claims.sub);
        assert_eq!(auth.email, "c@example.com");
        assert_eq!(auth.role, UserRole::Manager);
    }
}
