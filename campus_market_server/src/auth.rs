//! Request-scoped identity.
//!
//! Token validation happens upstream (the edge proxy verifies the session token and installs
//! identity headers on the forwarded request). This module only materialises those headers into a
//! typed [`AuthenticatedUser`] that handlers pass explicitly into the engine — no ambient auth
//! state anywhere below this point.
use std::future::{ready, Ready};

use actix_web::{FromRequest, HttpRequest};
use campus_market_engine::db_types::Role;

use crate::errors::ServerError;

pub const ACCOUNT_ID_HEADER: &str = "x-cm-account-id";
pub const ROLES_HEADER: &str = "x-cm-roles";

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub account_id: i64,
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Cheap pre-check for admin endpoints. The engine re-verifies against the stored account,
    /// so this only exists to fail fast with a clear error.
    pub fn require_role(&self, role: Role) -> Result<(), ServerError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ServerError::InsufficientPermissions(format!("{role} role required")))
        }
    }
}

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, ServerError> {
    let account_id = req
        .headers()
        .get(ACCOUNT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or_else(|| ServerError::Unauthenticated("missing or malformed account id".to_string()))?;
    let roles = req
        .headers()
        .get(ROLES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').filter_map(|r| r.trim().parse().ok()).collect::<Vec<Role>>())
        .unwrap_or_default();
    Ok(AuthenticatedUser { account_id, roles })
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(extract_user(req))
    }
}

#[cfg(test)]
mod test {
    use actix_web::test::TestRequest;

    use super::*;

    #[actix_web::test]
    async fn parses_identity_headers() {
        let req = TestRequest::default()
            .insert_header((ACCOUNT_ID_HEADER, "42"))
            .insert_header((ROLES_HEADER, "Buyer, Seller"))
            .to_http_request();
        let user = extract_user(&req).unwrap();
        assert_eq!(user.account_id, 42);
        assert!(user.has_role(Role::Buyer));
        assert!(user.has_role(Role::Seller));
        assert!(!user.has_role(Role::Admin));
    }

    #[actix_web::test]
    async fn rejects_requests_without_an_identity() {
        let req = TestRequest::default().to_http_request();
        assert!(extract_user(&req).is_err());
    }

    #[actix_web::test]
    async fn ignores_unknown_role_names() {
        let req = TestRequest::default()
            .insert_header((ACCOUNT_ID_HEADER, "7"))
            .insert_header((ROLES_HEADER, "Buyer,Wizard"))
            .to_http_request();
        let user = extract_user(&req).unwrap();
        assert_eq!(user.roles, vec![Role::Buyer]);
    }
}
