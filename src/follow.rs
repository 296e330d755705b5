use spin_sdk::http::{Request, Response};

use crate::auth::authenticate;
use crate::config::*;
use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::json_response;
use crate::core::store::DocumentStore;
use crate::core::toggle::{toggle_member, Toggled};
use crate::models::models::{Followings, UserView};
use crate::users::{load_user, user_view};

// The relation lives only in the follower's edge list. Followers are a query
// over every edge list, so a follow or unfollow is a single document write.

pub fn get_followings<S: DocumentStore>(store: &S, user_id: &str) -> anyhow::Result<Followings> {
    Ok(store
        .get_json(&followings_key(user_id))?
        .unwrap_or_default())
}

pub fn get_followers<S: DocumentStore>(store: &S, user_id: &str) -> anyhow::Result<Vec<String>> {
    let users: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    let mut followers = Vec::new();

    for id in users {
        if id == user_id {
            continue;
        }
        let followings = get_followings(store, &id)?;
        if followings.iter().any(|f| f == user_id) {
            followers.push(id);
        }
    }

    Ok(followers)
}

/// Follows `target` if `actor` does not already, otherwise unfollows.
/// Returns the actor's refreshed view.
pub fn toggle_follow<S: DocumentStore>(store: &S, actor: &str, target: &str) -> ApiResult<UserView> {
    if actor == target {
        return Err(ApiError::InvalidOperation(
            "You cannot follow yourself".to_string(),
        ));
    }

    let me = load_user(store, actor)?;
    load_user(store, target)?;

    let key = followings_key(actor);
    let mut followings = get_followings(store, actor)?;
    let outcome = toggle_member(&mut followings, target);
    store.set_json(&key, &followings)?;

    match outcome {
        Toggled::Added => log::info!("user {} followed {}", actor, target),
        Toggled::Removed => log::info!("user {} unfollowed {}", actor, target),
    }

    Ok(user_view(store, &me)?)
}

// === HTTP Handlers ===

pub fn handle_toggle_follow<S: DocumentStore>(
    store: &S,
    req: &Request,
    target: &str,
) -> ApiResult<Response> {
    let user_id = authenticate(store, req)?;
    let view = toggle_follow(store, &user_id, target)?;
    Ok(json_response(200, &view)?)
}

pub fn handle_followings_list<S: DocumentStore>(store: &S, user_id: &str) -> ApiResult<Response> {
    let user = load_user(store, user_id)?;
    Ok(json_response(200, &get_followings(store, &user.id)?)?)
}

pub fn handle_followers_list<S: DocumentStore>(store: &S, user_id: &str) -> ApiResult<Response> {
    let user = load_user(store, user_id)?;
    Ok(json_response(200, &get_followers(store, &user.id)?)?)
}
