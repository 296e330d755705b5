use chrono::Duration;
use serde::Deserialize;
use spin_sdk::http::{Request, Response};

use crate::config::{token_expiration_hours, token_key, user_key, TOKENS_LIST_KEY};
use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::{json_response, new_id, now, parse_body, verify_password};
use crate::core::store::DocumentStore;
use crate::models::models::{AuthResponse, TokenData, User};
use crate::users::{find_user_by_email, user_view};

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn is_expired(data: &TokenData) -> bool {
    now() - data.created_at > Duration::hours(token_expiration_hours())
}

/// Creates a bearer token for `user_id` and records it for later revocation.
/// Expired and already-deleted tokens are dropped from the list on the way.
pub fn issue_token<S: DocumentStore>(store: &S, user_id: &str) -> anyhow::Result<String> {
    let token = new_id();
    let data = TokenData {
        user_id: user_id.to_string(),
        created_at: now(),
    };
    store.set_json(&token_key(&token), &data)?;

    let tokens: Vec<String> = store.get_json(TOKENS_LIST_KEY)?.unwrap_or_default();
    let mut live = Vec::with_capacity(tokens.len() + 1);
    for existing in tokens {
        let key = token_key(&existing);
        match store.get_json::<TokenData>(&key)? {
            Some(data) if is_expired(&data) => store.delete(&key)?,
            Some(_) => live.push(existing),
            None => {}
        }
    }
    live.push(token.clone());
    store.set_json(TOKENS_LIST_KEY, &live)?;

    Ok(token)
}

/// Deletes a single token and its list entry.
pub fn revoke_token<S: DocumentStore>(store: &S, token: &str) -> anyhow::Result<()> {
    store.delete(&token_key(token))?;
    let mut tokens: Vec<String> = store.get_json(TOKENS_LIST_KEY)?.unwrap_or_default();
    tokens.retain(|t| t != token);
    store.set_json(TOKENS_LIST_KEY, &tokens)
}

/// Deletes every token belonging to `user_id`.
pub fn revoke_user_tokens<S: DocumentStore>(store: &S, user_id: &str) -> anyhow::Result<()> {
    let tokens: Vec<String> = store.get_json(TOKENS_LIST_KEY)?.unwrap_or_default();
    let mut kept = Vec::with_capacity(tokens.len());

    for token in tokens {
        let key = token_key(&token);
        match store.get_json::<TokenData>(&key)? {
            Some(data) if data.user_id == user_id => store.delete(&key)?,
            Some(_) => kept.push(token),
            None => {}
        }
    }

    store.set_json(TOKENS_LIST_KEY, &kept)
}

pub fn login<S: DocumentStore>(store: &S, creds: &LoginRequest) -> ApiResult<AuthResponse> {
    let user = match find_user_by_email(store, &creds.email)? {
        Some(u) => u,
        None => {
            log::warn!("login rejected: unknown email");
            return Err(ApiError::Unauthenticated);
        }
    };

    if !verify_password(&creds.password, &user.password) {
        log::warn!("login rejected for user {}: bad password", user.id);
        return Err(ApiError::Unauthenticated);
    }

    let token = issue_token(store, &user.id)?;
    log::info!("user {} logged in", user.id);
    Ok(AuthResponse {
        token,
        user: user_view(store, &user)?,
    })
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.header("Authorization")
        .and_then(|h| h.as_str())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the acting user for a request from its bearer token.
pub fn authenticate<S: DocumentStore>(store: &S, req: &Request) -> ApiResult<String> {
    let token = bearer_token(req).ok_or(ApiError::Unauthenticated)?;
    let data = store
        .get_json::<TokenData>(&token_key(token))?
        .ok_or(ApiError::Unauthenticated)?;

    if is_expired(&data) {
        log::warn!("expired token presented for user {}", data.user_id);
        return Err(ApiError::Unauthenticated);
    }

    // Tokens die with their user.
    if store.get_json::<User>(&user_key(&data.user_id))?.is_none() {
        return Err(ApiError::Unauthenticated);
    }

    Ok(data.user_id)
}

// === HTTP Handlers ===

pub fn handle_login<S: DocumentStore>(store: &S, req: &Request) -> ApiResult<Response> {
    let creds: LoginRequest = parse_body(req.body())?;
    let resp = login(store, &creds)?;
    Ok(json_response(200, &resp)?)
}

pub fn handle_logout<S: DocumentStore>(store: &S, req: &Request) -> ApiResult<Response> {
    authenticate(store, req)?;
    if let Some(token) = bearer_token(req) {
        revoke_token(store, token)?;
    }
    Ok(json_response(
        200,
        &serde_json::json!({ "message": "Logged out successfully" }),
    )?)
}

pub fn handle_me<S: DocumentStore>(store: &S, req: &Request) -> ApiResult<Response> {
    let user_id = authenticate(store, req)?;
    let user = crate::users::load_user(store, &user_id)?;
    Ok(json_response(200, &user_view(store, &user)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use crate::users::{register, update_profile, ProfileUpdate, RegisterRequest};

    fn bearer(token: &str) -> Request {
        let mut builder = Request::builder();
        builder
            .method(spin_sdk::http::Method::Get)
            .uri("/api/auth/me")
            .header("Authorization", format!("Bearer {}", token));
        builder.body(Vec::new()).build()
    }

    fn login_alice(store: &MemoryStore) -> String {
        login(
            store,
            &LoginRequest {
                email: "alice@example.com".to_string(),
                password: "secret123".to_string(),
            },
        )
        .unwrap()
        .token
    }

    fn alice(store: &MemoryStore) -> String {
        register(
            store,
            &RegisterRequest {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "secret123".to_string(),
                bio: None,
            },
        )
        .unwrap()
        .user
        .id
    }

    #[test]
    fn login_checks_email_and_password() {
        let store = MemoryStore::new();
        let id = alice(&store);

        let ok = login(
            &store,
            &LoginRequest {
                email: "ALICE@example.com".to_string(),
                password: "secret123".to_string(),
            },
        )
        .unwrap();
        assert_eq!(ok.user.id, id);

        let bad = login(
            &store,
            &LoginRequest {
                email: "alice@example.com".to_string(),
                password: "nope".to_string(),
            },
        );
        assert!(matches!(bad, Err(ApiError::Unauthenticated)));

        let unknown = login(&store, &LoginRequest::default());
        assert!(matches!(unknown, Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn revoking_tokens_only_touches_that_user() {
        let store = MemoryStore::new();
        let a = issue_token(&store, "a").unwrap();
        let b = issue_token(&store, "b").unwrap();

        revoke_user_tokens(&store, "a").unwrap();

        assert!(store.get_json::<TokenData>(&token_key(&a)).unwrap().is_none());
        assert!(store.get_json::<TokenData>(&token_key(&b)).unwrap().is_some());
        let tokens: Vec<String> = store.get_json(TOKENS_LIST_KEY).unwrap().unwrap();
        assert_eq!(tokens, vec![b]);
    }

    #[test]
    fn fresh_token_authenticates() {
        let store = MemoryStore::new();
        let id = alice(&store);
        let token = login_alice(&store);
        assert_eq!(authenticate(&store, &bearer(&token)).unwrap(), id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let store = MemoryStore::new();
        let id = alice(&store);
        let token = login_alice(&store);

        let stale = TokenData {
            user_id: id,
            created_at: now() - Duration::hours(token_expiration_hours()) - Duration::minutes(1),
        };
        store.set_json(&token_key(&token), &stale).unwrap();

        assert!(matches!(
            authenticate(&store, &bearer(&token)),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn token_of_deleted_user_is_rejected() {
        let store = MemoryStore::new();
        let id = alice(&store);
        let token = login_alice(&store);

        store.delete(&user_key(&id)).unwrap();

        assert!(matches!(
            authenticate(&store, &bearer(&token)),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn password_change_revokes_older_tokens() {
        let store = MemoryStore::new();
        let id = alice(&store);
        let old = login_alice(&store);

        let (_, fresh) = update_profile(
            &store,
            &id,
            &ProfileUpdate {
                name: "Alice".to_string(),
                old_password: Some("secret123".to_string()),
                new_password: Some("secret456".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(matches!(
            authenticate(&store, &bearer(&old)),
            Err(ApiError::Unauthenticated)
        ));
        let fresh = fresh.unwrap();
        assert_eq!(authenticate(&store, &bearer(&fresh)).unwrap(), id);
    }

    #[test]
    fn token_list_stays_bounded_across_logins() {
        let store = MemoryStore::new();
        alice(&store);

        for _ in 0..5 {
            let token = login_alice(&store);
            let req = bearer(&token);
            handle_logout(&store, &req).unwrap();
        }

        // Only the token issued at registration is still live.
        let tokens: Vec<String> = store.get_json(TOKENS_LIST_KEY).unwrap().unwrap();
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn issuing_prunes_expired_tokens() {
        let store = MemoryStore::new();
        let stale = new_id();
        store
            .set_json(
                &token_key(&stale),
                &TokenData {
                    user_id: "a".to_string(),
                    created_at: now() - Duration::hours(token_expiration_hours() + 1),
                },
            )
            .unwrap();
        store.set_json(TOKENS_LIST_KEY, &vec![stale.clone()]).unwrap();

        let fresh = issue_token(&store, "a").unwrap();

        assert!(store.get_json::<TokenData>(&token_key(&stale)).unwrap().is_none());
        let tokens: Vec<String> = store.get_json(TOKENS_LIST_KEY).unwrap().unwrap();
        assert_eq!(tokens, vec![fresh]);
    }
}
