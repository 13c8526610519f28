//! Request extractors: session, tenant and JSON/path/query wrappers whose
//! rejections render as [`JsonApiError`].

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use service::authz::TenantContext;

use crate::{errors::JsonApiError, state::ServerState};

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(JsonApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(JsonApiError))]
pub struct ApiQuery<T>(pub T);

/// The authenticated caller, set by [`require_session`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
}

fn bearer_token(headers: &HeaderMap) -> Option<Result<String, JsonApiError>> {
    let value = headers.get(AUTHORIZATION)?;
    let parsed = value
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| JsonApiError::unauthorized("expected Authorization: Bearer <token>"));
    Some(parsed)
}

/// Accepts a bearer token or the `auth_token` cookie; anything else is 401.
pub async fn require_session(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let token = match bearer_token(req.headers()) {
        Some(parsed) => parsed?,
        None => match jar.get(AUTH_COOKIE) {
            Some(c) if !c.value().is_empty() => c.value().to_string(),
            _ => {
                warn!(path = %req.uri().path(), "missing session token");
                return Err(JsonApiError::unauthorized("missing session token"));
            }
        },
    };
    let user_id = state.auth.verify_token(&token).map_err(|e| {
        warn!(path = %req.uri().path(), error = %e, "session rejected");
        JsonApiError::from(e)
    })?;
    req.extensions_mut().insert(CurrentUser { id: user_id });
    Ok(next.run(req).await)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or_else(|| JsonApiError::unauthorized("missing session"))
    }
}

/// Organization and role the caller acts under, resolved from storage on
/// every request.
pub struct Tenant(pub TenantContext);

#[async_trait]
impl FromRequestParts<ServerState> for Tenant {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        Ok(Tenant(state.resolver.resolve(user.id).await?))
    }
}
