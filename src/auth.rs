use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::{roles::RoleSet, shell::AuthState};

/// Header carrying the authenticated user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the user's roles as a comma separated list.
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Principal
///
/// The caller identity as supplied by the gateway in front of this service. Nothing here
/// verifies credentials: a request is authenticated when the gateway forwarded a non-empty
/// user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    pub id: Option<String>,
    pub roles: RoleSet,
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        AuthState::from(self.id.as_deref()).is_authenticated()
    }
}

/// Principal Extractor Implementation
///
/// Never rejects: missing or unreadable headers yield an anonymous principal, which the
/// route tree then guards like any other visitor.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, USER_ID_HEADER)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let roles = header(parts, USER_ROLES_HEADER)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|role| !role.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Principal { id, roles })
    }
}

fn header<'p>(parts: &'p Parts, name: &str) -> Option<&'p str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}
