use spin_sdk::http::{Method, Request, Response};

use crate::core::db;
use crate::core::errors::ApiError;
use crate::core::store::DocumentStore;
use crate::{auth, comments, follow, posts, users};

/// Routes one API request. Every failure is rendered as a JSON error body.
pub fn handle_request<S: DocumentStore>(store: &S, req: &Request) -> Response {
    let full_path = req.path().to_string();
    let path = full_path.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let result = match (req.method(), segments.as_slice()) {
        (Method::Post, ["api", "auth", "register"]) => users::handle_register(store, req),
        (Method::Post, ["api", "auth", "login"]) => auth::handle_login(store, req),
        (Method::Post, ["api", "auth", "logout"]) => auth::handle_logout(store, req),
        (Method::Get, ["api", "auth", "me"]) => auth::handle_me(store, req),

        (Method::Get, ["api", "users"]) => users::handle_list_users(store),
        (Method::Put, ["api", "users", "profile"]) => users::handle_update_profile(store, req),
        (Method::Put, ["api", "users", "follow", id]) => {
            follow::handle_toggle_follow(store, req, id)
        }
        (Method::Get, ["api", "users", id]) => users::handle_get_user(store, id),
        (Method::Get, ["api", "users", id, "posts"]) => users::handle_user_posts(store, req, id),
        (Method::Get, ["api", "users", id, "followers"]) => {
            follow::handle_followers_list(store, id)
        }
        (Method::Get, ["api", "users", id, "following"]) => {
            follow::handle_followings_list(store, id)
        }

        (Method::Get, ["api", "posts"]) => posts::handle_list_posts(store, req),
        (Method::Post, ["api", "posts"]) => posts::handle_create_post(store, req),
        (Method::Get, ["api", "posts", "feed"]) => posts::handle_feed(store, req),
        (Method::Put, ["api", "posts", "like", id]) => posts::handle_toggle_like(store, req, id),
        (Method::Post, ["api", "posts", "comment", id]) => {
            comments::handle_add_comment(store, req, id)
        }
        (Method::Delete, ["api", "posts", "comment", id, comment_id]) => {
            comments::handle_remove_comment(store, req, id, comment_id)
        }
        (Method::Get, ["api", "posts", id]) => posts::handle_get_post(store, id),
        (Method::Delete, ["api", "posts", id]) => posts::handle_delete_post(store, req, id),

        (Method::Post, ["api", "admin", "reset"]) => db::handle_reset(store),

        _ => Err(ApiError::NotFound("No route found".to_string())),
    };

    match result {
        Ok(resp) => resp,
        Err(err) => {
            log::debug!("{} -> {}", path, err);
            err.into()
        }
    }
}
