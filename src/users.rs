use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use spin_sdk::http::{Request, Response};

use crate::auth::{authenticate, issue_token, revoke_user_tokens};
use crate::config::*;
use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::{
    hash_password, json_response, new_id, now, parse_body, required_text, sanitize_text,
    validate_uuid, verify_password,
};
use crate::core::query_params::QueryParams;
use crate::core::store::DocumentStore;
use crate::follow::{get_followers, get_followings};
use crate::models::models::{AuthResponse, AuthorSummary, User, UserView};
use crate::posts::{page_of, post_view, posts_where};

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Regex should compile")
    })
}

fn clean_bio(bio: &str) -> ApiResult<Option<String>> {
    let clean = sanitize_text(bio);
    if clean.chars().count() > MAX_BIO_LENGTH {
        return Err(ApiError::Validation(format!(
            "Bio too long (max {} chars)",
            MAX_BIO_LENGTH
        )));
    }
    Ok(if clean.is_empty() { None } else { Some(clean) })
}

fn check_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Loads a user, treating malformed ids the same as missing ones.
pub fn load_user<S: DocumentStore>(store: &S, user_id: &str) -> ApiResult<User> {
    if !validate_uuid(user_id) {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    store
        .get_json::<User>(&user_key(user_id))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub fn find_user_by_email<S: DocumentStore>(store: &S, email: &str) -> anyhow::Result<Option<User>> {
    if email.trim().is_empty() {
        return Ok(None);
    }
    match store.get_json::<String>(&email_key(email))? {
        Some(id) => store.get_json::<User>(&user_key(&id)),
        None => Ok(None),
    }
}

pub fn user_view<S: DocumentStore>(store: &S, user: &User) -> anyhow::Result<UserView> {
    let followers = get_followers(store, &user.id)?;
    let following = get_followings(store, &user.id)?;
    Ok(UserView::new(user, followers, following))
}

pub fn author_summary<S: DocumentStore>(store: &S, user_id: &str) -> anyhow::Result<AuthorSummary> {
    Ok(store
        .get_json::<User>(&user_key(user_id))?
        .map(|u| AuthorSummary::of(&u))
        .unwrap_or_else(|| AuthorSummary::unknown(user_id)))
}

/// Creates the user record, its email index entry and its users-list entry.
pub fn create_user<S: DocumentStore>(store: &S, new_user: &RegisterRequest) -> ApiResult<User> {
    let name = required_text("Name", &new_user.name, MAX_NAME_LENGTH)?;
    let email = new_user.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".to_string()));
    }
    if !email_regex().is_match(&email) {
        return Err(ApiError::Validation("Please include a valid email".to_string()));
    }
    if new_user.password.is_empty() {
        return Err(ApiError::Validation("Password is required".to_string()));
    }
    check_password(&new_user.password)?;
    let bio = match &new_user.bio {
        Some(b) => clean_bio(b)?,
        None => None,
    };

    if store.get_json::<String>(&email_key(&email))?.is_some() {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let created = now();
    let user = User {
        id: new_id(),
        name,
        email,
        password: hash_password(&new_user.password)?,
        bio,
        profile_picture: None,
        created_at: created,
        updated_at: created,
    };

    store.set_json(&user_key(&user.id), &user)?;
    store.set_json(&email_key(&user.email), &user.id)?;

    let mut users: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    users.push(user.id.clone());
    store.set_json(USERS_LIST_KEY, &users)?;

    log::info!("registered user {}", user.id);
    Ok(user)
}

pub fn register<S: DocumentStore>(store: &S, new_user: &RegisterRequest) -> ApiResult<AuthResponse> {
    let user = create_user(store, new_user)?;
    let token = issue_token(store, &user.id)?;
    Ok(AuthResponse {
        token,
        user: user_view(store, &user)?,
    })
}

pub fn list_users<S: DocumentStore>(store: &S) -> ApiResult<Vec<UserView>> {
    let ids: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    let mut users = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(u) = store.get_json::<User>(&user_key(&id))? {
            users.push(user_view(store, &u)?);
        }
    }
    Ok(users)
}

/// Applies a profile edit. Returns the new view and, when the password
/// changed, the freshly issued token (all older tokens are revoked).
pub fn update_profile<S: DocumentStore>(
    store: &S,
    actor: &str,
    update: &ProfileUpdate,
) -> ApiResult<(UserView, Option<String>)> {
    let mut user = load_user(store, actor)?;

    user.name = required_text("Name", &update.name, MAX_NAME_LENGTH)?;
    if let Some(bio) = &update.bio {
        user.bio = clean_bio(bio)?;
    }
    if let Some(picture) = &update.profile_picture {
        let picture = picture.trim();
        user.profile_picture = if picture.is_empty() { None } else { Some(picture.to_string()) };
    }

    let mut password_changed = false;
    if let Some(new_password) = &update.new_password {
        check_password(new_password)?;
        let old_password = update
            .old_password
            .as_deref()
            .ok_or_else(|| ApiError::Validation("Current password required".to_string()))?;
        if !verify_password(old_password, &user.password) {
            return Err(ApiError::Unauthorized("Current password is incorrect".to_string()));
        }
        user.password = hash_password(new_password)?;
        password_changed = true;
    }

    user.updated_at = now();
    store.set_json(&user_key(&user.id), &user)?;
    log::info!("user {} updated profile", user.id);

    let token = if password_changed {
        revoke_user_tokens(store, &user.id)?;
        Some(issue_token(store, &user.id)?)
    } else {
        None
    };

    Ok((user_view(store, &user)?, token))
}

// === HTTP Handlers ===

pub fn handle_register<S: DocumentStore>(store: &S, req: &Request) -> ApiResult<Response> {
    let new_user: RegisterRequest = parse_body(req.body())?;
    let resp = register(store, &new_user)?;
    Ok(json_response(201, &resp)?)
}

pub fn handle_list_users<S: DocumentStore>(store: &S) -> ApiResult<Response> {
    Ok(json_response(200, &list_users(store)?)?)
}

pub fn handle_get_user<S: DocumentStore>(store: &S, user_id: &str) -> ApiResult<Response> {
    let user = load_user(store, user_id)?;
    log::debug!("fetched user {}", user.id);
    Ok(json_response(200, &user_view(store, &user)?)?)
}

pub fn handle_user_posts<S: DocumentStore>(
    store: &S,
    req: &Request,
    user_id: &str,
) -> ApiResult<Response> {
    let user = load_user(store, user_id)?;
    let page = QueryParams::parse(&req.uri()).page();
    let posts = posts_where(store, |p| p.author == user.id)?;
    let views = page_of(posts, page)
        .iter()
        .map(|p| post_view(store, p))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(json_response(200, &views)?)
}

pub fn handle_update_profile<S: DocumentStore>(store: &S, req: &Request) -> ApiResult<Response> {
    let user_id = authenticate(store, req)?;
    let update: ProfileUpdate = parse_body(req.body())?;
    let (view, token) = update_profile(store, &user_id, &update)?;

    let mut body = serde_json::to_value(&view).map_err(anyhow::Error::from)?;
    if let Some(token) = token {
        body["token"] = serde_json::Value::String(token);
    }
    Ok(json_response(200, &body)?)
}
