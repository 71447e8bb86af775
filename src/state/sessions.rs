use anyhow::Result;
use data_encoding::BASE32_NOPAD;
use mongodb::bson::{DateTime, doc};
use rand::RngCore;
use std::time::{Duration, SystemTime};

use crate::models::{AuthToken, TokenKind, User};

use super::{ACTIVATION_TTL_SECONDS, AppState, SESSION_TTL_SECONDS, find_user};

fn random_token() -> String {
    let mut token_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut token_bytes);
    BASE32_NOPAD.encode(&token_bytes)
}

/// Issues a fresh token of the given kind, invalidating any previous token of
/// the same kind for that email.
pub async fn create_token(state: &AppState, email: &str, kind: TokenKind) -> Result<String> {
    let _ = state
        .tokens
        .delete_many(doc! {
            "email": email,
            "kind": match kind { TokenKind::Session => "session", TokenKind::Activation => "activation" },
        })
        .await;

    let token = random_token();
    let ttl = match kind {
        TokenKind::Session => SESSION_TTL_SECONDS,
        TokenKind::Activation => ACTIVATION_TTL_SECONDS,
    };
    let expires_at = DateTime::from_system_time(SystemTime::now() + Duration::from_secs(ttl));

    state
        .tokens
        .insert_one(AuthToken {
            id: None,
            token: token.clone(),
            email: email.to_string(),
            kind,
            expires_at,
        })
        .await?;

    Ok(token)
}

async fn find_token(state: &AppState, token: &str, kind: &str) -> Result<Option<AuthToken>> {
    if let Some(found) = state
        .tokens
        .find_one(doc! { "token": token, "kind": kind })
        .await?
    {
        if found.expires_at.to_system_time() <= SystemTime::now() {
            // Remove expired token, ignore result
            let _ = state.tokens.delete_one(doc! { "token": token }).await;
            return Ok(None);
        }
        return Ok(Some(found));
    }
    Ok(None)
}

pub async fn find_user_by_session(state: &AppState, token: &str) -> Result<Option<User>> {
    match find_token(state, token, "session").await? {
        Some(session) => find_user(state, &session.email).await,
        None => Ok(None),
    }
}

/// Resolves and deletes an activation token in one step; the link is single
/// use.
pub async fn consume_activation_token(state: &AppState, token: &str) -> Result<Option<String>> {
    match find_token(state, token, "activation").await? {
        Some(activation) => {
            let _ = state.tokens.delete_one(doc! { "token": token }).await;
            Ok(Some(activation.email))
        }
        None => Ok(None),
    }
}

pub async fn delete_session(state: &AppState, token: &str) -> Result<()> {
    let _ = state.tokens.delete_one(doc! { "token": token }).await?;
    Ok(())
}
