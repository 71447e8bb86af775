// session.rs
// Bearer-token middleware to protect routes and extractor to access the
// authenticated user. Role checks are consolidated here instead of being
// re-spelled in every handler.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;

use crate::{
    error::AppError,
    models::{Role, User},
    state::{AppState, find_user_by_session},
};

#[derive(Clone)]
pub struct SessionData {
    pub user: User,
    pub token: String,
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_owned())
}

pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(token) = bearer_token(&request) else {
        return Err(unauthorized_response());
    };

    match find_user_by_session(&state, &token).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(SessionData { user, token });
            Ok(next.run(request).await)
        }
        Ok(None) => Err(unauthorized_response()),
        Err(_) => {
            Err((StatusCode::INTERNAL_SERVER_ERROR, "session lookup failed").into_response())
        }
    }
}

pub struct SessionUser(pub SessionData);

impl SessionUser {
    pub fn email(&self) -> &str {
        &self.0.user.email
    }

    pub fn token(&self) -> &str {
        &self.0.token
    }

    pub fn role(&self) -> &Role {
        &self.0.user.role
    }

    /// Route-level allow-list check.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(self.role()) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Self-match reads: `userEmail` must match the token's email unless the
    /// caller holds an elevated role.
    pub fn require_self_or_elevated(&self, email: &str) -> Result<(), AppError> {
        if self.email() == email
            || matches!(self.role(), Role::Admin | Role::HrAdmin | Role::Developer)
        {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[allow(refining_impl_trait)]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> BoxFuture<'static, Result<Self, Self::Rejection>> {
        let data = parts
            .extensions
            .get::<SessionData>()
            .cloned()
            .ok_or_else(unauthorized_response);

        Box::pin(async move {
            match data {
                Ok(session) => Ok(SessionUser(session)),
                Err(resp) => Err(resp),
            }
        })
    }
}

fn unauthorized_response() -> Response {
    (StatusCode::UNAUTHORIZED, "unauthorized").into_response()
}
