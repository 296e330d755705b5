use serde::Deserialize;
use spin_sdk::http::{Request, Response};

use crate::auth::authenticate;
use crate::config::MAX_COMMENT_LENGTH;
use crate::core::access::assert_owner;
use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::{json_response, new_id, now, parse_body, required_text};
use crate::core::store::DocumentStore;
use crate::models::models::{Comment, Post};
use crate::posts::{load_post, post_view, save_post};

#[derive(Debug, Default, Deserialize)]
pub struct NewComment {
    #[serde(default)]
    pub text: String,
}

impl Post {
    /// Puts a new comment at the head of the list (newest first).
    pub fn add_comment(&mut self, actor: &str, text: &str) -> ApiResult<&Comment> {
        let text = required_text("Text", text, MAX_COMMENT_LENGTH)?;
        self.comments.insert(
            0,
            Comment {
                id: new_id(),
                text,
                author: actor.to_string(),
                created_at: now(),
            },
        );
        Ok(&self.comments[0])
    }

    /// Removes exactly one comment written by `actor`. On failure the list is
    /// left untouched.
    pub fn remove_comment(&mut self, actor: &str, comment_id: &str) -> ApiResult<Comment> {
        let index = self
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| ApiError::NotFound("Comment does not exist".to_string()))?;
        assert_owner(&self.comments[index], actor)?;
        Ok(self.comments.remove(index))
    }
}

pub fn add_comment<S: DocumentStore>(
    store: &S,
    post_id: &str,
    actor: &str,
    text: &str,
) -> ApiResult<Post> {
    let mut post = load_post(store, post_id)?;
    let comment_id = post.add_comment(actor, text)?.id.clone();
    save_post(store, &post)?;
    log::info!("user {} commented {} on post {}", actor, comment_id, post.id);
    Ok(post)
}

pub fn remove_comment<S: DocumentStore>(
    store: &S,
    post_id: &str,
    actor: &str,
    comment_id: &str,
) -> ApiResult<Post> {
    let mut post = load_post(store, post_id)?;
    let removed = post.remove_comment(actor, comment_id)?;
    save_post(store, &post)?;
    log::info!("user {} removed comment {} from post {}", actor, removed.id, post.id);
    Ok(post)
}

// === HTTP Handlers ===

pub fn handle_add_comment<S: DocumentStore>(
    store: &S,
    req: &Request,
    post_id: &str,
) -> ApiResult<Response> {
    let user_id = authenticate(store, req)?;
    let body: NewComment = parse_body(req.body())?;
    let post = add_comment(store, post_id, &user_id, &body.text)?;
    Ok(json_response(200, &post_view(store, &post)?)?)
}

pub fn handle_remove_comment<S: DocumentStore>(
    store: &S,
    req: &Request,
    post_id: &str,
    comment_id: &str,
) -> ApiResult<Response> {
    let user_id = authenticate(store, req)?;
    let post = remove_comment(store, post_id, &user_id, comment_id)?;
    Ok(json_response(200, &post_view(store, &post)?)?)
}
