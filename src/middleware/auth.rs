use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl TryFrom<Claims> for AuthUser {
    type Error = ApiError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = claims
            .sub
            .ok_or_else(|| ApiError::unauthorized("Token does not identify a user"))?;
        Ok(Self { user_id })
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = verify_request(&state, &headers)?;

    // Convert claims to AuthUser and inject into request
    let auth_user = AuthUser::try_from(claims)?;
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Restricts a route group to service-role tokens. Service keys carry no
/// subject, so no `AuthUser` is inserted.
pub async fn service_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = verify_request(&state, &headers)?;
    if !claims.is_service() {
        tracing::warn!("Token with role {:?} attempted a service-only operation", claims.role);
        return Err(ApiError::forbidden("Service role required"));
    }

    Ok(next.run(request).await)
}

fn verify_request(state: &AppState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(headers).map_err(ApiError::unauthorized)?;

    // Validate and decode JWT
    state.verifier.verify(token).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::unauthorized(e.to_string())
    })
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if token.trim().is_empty() => Err("Empty JWT token"),
        Some(token) => Ok(token.trim()),
        None => Err("Authorization header must use Bearer token format"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn service_keys_cannot_act_as_users() {
        let claims = Claims::service(chrono::Duration::hours(1));
        let err = AuthUser::try_from(claims).unwrap_err();
        assert_eq!(err.status_code(), 401);

        let user = Uuid::new_v4();
        let claims = Claims::new(user, "authenticated", chrono::Duration::hours(1));
        assert_eq!(AuthUser::try_from(claims).unwrap().user_id, user);
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def")), Ok("abc.def"));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(
            extract_jwt_from_headers(&HeaderMap::new()),
            Err("Missing Authorization header")
        );
        assert_eq!(extract_jwt_from_headers(&headers("Bearer  ")), Err("Empty JWT token"));
        assert_eq!(
            extract_jwt_from_headers(&headers("Basic dXNlcjpwYXNz")),
            Err("Authorization header must use Bearer token format")
        );
    }
}
