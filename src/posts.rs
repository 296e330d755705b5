use serde::Deserialize;
use spin_sdk::http::{Request, Response};

use crate::auth::authenticate;
use crate::config::*;
use crate::core::access::assert_owner;
use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::{json_response, new_id, now, parse_body, required_text, validate_uuid};
use crate::core::query_params::QueryParams;
use crate::core::store::DocumentStore;
use crate::core::toggle::{toggle_member, Toggled};
use crate::follow::get_followings;
use crate::models::models::{CommentView, Post, PostView};
use crate::users::{author_summary, load_user};

#[derive(Debug, Default, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub content: String,
}

pub fn load_post<S: DocumentStore>(store: &S, post_id: &str) -> ApiResult<Post> {
    if !validate_uuid(post_id) {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }
    store
        .get_json::<Post>(&post_key(post_id))?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
}

pub fn save_post<S: DocumentStore>(store: &S, post: &Post) -> anyhow::Result<()> {
    store.set_json(&post_key(&post.id), post)
}

/// Renders a post with its author and comment authors populated.
pub fn post_view<S: DocumentStore>(store: &S, post: &Post) -> anyhow::Result<PostView> {
    let comments = post
        .comments
        .iter()
        .map(|c| -> anyhow::Result<CommentView> {
            Ok(CommentView {
                id: c.id.clone(),
                text: c.text.clone(),
                user: author_summary(store, &c.author)?,
                created_at: c.created_at,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(PostView {
        id: post.id.clone(),
        content: post.content.clone(),
        author: author_summary(store, &post.author)?,
        likes: post.likes.clone(),
        like_count: post.likes.len(),
        comment_count: comments.len(),
        comments,
        created_at: post.created_at,
        updated_at: post.updated_at,
    })
}

/// All posts matching `keep`, newest first. Ids left in the feed after a
/// post vanished are skipped.
pub fn posts_where<S, F>(store: &S, keep: F) -> anyhow::Result<Vec<Post>>
where
    S: DocumentStore,
    F: Fn(&Post) -> bool,
{
    let feed: Vec<String> = store.get_json(FEED_KEY)?.unwrap_or_default();
    let mut posts = Vec::new();
    for id in feed.iter() {
        if let Some(p) = store.get_json::<Post>(&post_key(id))? {
            if keep(&p) {
                posts.push(p);
            }
        }
    }
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(posts)
}

pub fn page_of(posts: Vec<Post>, page: usize) -> Vec<Post> {
    let start = (page.max(1) - 1) * POSTS_PER_PAGE;
    posts.into_iter().skip(start).take(POSTS_PER_PAGE).collect()
}

pub fn create_post<S: DocumentStore>(store: &S, actor: &str, content: &str) -> ApiResult<Post> {
    let content = required_text("Content", content, MAX_POST_LENGTH)?;
    load_user(store, actor)?;

    let created = now();
    let post = Post {
        id: new_id(),
        content,
        author: actor.to_string(),
        likes: Vec::new(),
        comments: Vec::new(),
        created_at: created,
        updated_at: created,
    };
    save_post(store, &post)?;

    let mut feed: Vec<String> = store.get_json(FEED_KEY)?.unwrap_or_default();
    feed.insert(0, post.id.clone());
    store.set_json(FEED_KEY, &feed)?;

    log::info!("user {} created post {}", actor, post.id);
    Ok(post)
}

pub fn list_posts<S: DocumentStore>(store: &S, page: usize) -> ApiResult<Vec<Post>> {
    Ok(page_of(posts_where(store, |_| true)?, page))
}

/// Posts written by the users `actor` follows, newest first.
pub fn home_feed<S: DocumentStore>(store: &S, actor: &str, page: usize) -> ApiResult<Vec<Post>> {
    let followings = get_followings(store, actor)?;
    let posts = posts_where(store, |p| followings.contains(&p.author))?;
    Ok(page_of(posts, page))
}

pub fn delete_post<S: DocumentStore>(store: &S, actor: &str, post_id: &str) -> ApiResult<()> {
    let post = load_post(store, post_id)?;
    assert_owner(&post, actor)?;

    store.delete(&post_key(&post.id))?;

    let mut feed: Vec<String> = store.get_json(FEED_KEY)?.unwrap_or_default();
    feed.retain(|id| id != &post.id);
    store.set_json(FEED_KEY, &feed)?;

    log::info!("user {} deleted post {}", actor, post.id);
    Ok(())
}

/// Likes the post if `actor` has not already, otherwise removes the like.
pub fn toggle_like<S: DocumentStore>(store: &S, actor: &str, post_id: &str) -> ApiResult<Post> {
    let mut post = load_post(store, post_id)?;

    match toggle_member(&mut post.likes, actor) {
        Toggled::Added => log::info!("user {} liked post {}", actor, post.id),
        Toggled::Removed => log::info!("user {} unliked post {}", actor, post.id),
    }
    save_post(store, &post)?;

    Ok(post)
}

fn views<S: DocumentStore>(store: &S, posts: &[Post]) -> anyhow::Result<Vec<PostView>> {
    posts.iter().map(|p| post_view(store, p)).collect()
}

// === HTTP Handlers ===

pub fn handle_create_post<S: DocumentStore>(store: &S, req: &Request) -> ApiResult<Response> {
    let user_id = authenticate(store, req)?;
    let body: NewPost = parse_body(req.body())?;
    let post = create_post(store, &user_id, &body.content)?;
    Ok(json_response(201, &post_view(store, &post)?)?)
}

pub fn handle_list_posts<S: DocumentStore>(store: &S, req: &Request) -> ApiResult<Response> {
    let page = QueryParams::parse(&req.uri()).page();
    let posts = list_posts(store, page)?;
    log::debug!("listing {} posts on page {}", posts.len(), page);
    Ok(json_response(200, &views(store, &posts)?)?)
}

pub fn handle_feed<S: DocumentStore>(store: &S, req: &Request) -> ApiResult<Response> {
    let user_id = authenticate(store, req)?;
    let page = QueryParams::parse(&req.uri()).page();
    let posts = home_feed(store, &user_id, page)?;
    Ok(json_response(200, &views(store, &posts)?)?)
}

pub fn handle_get_post<S: DocumentStore>(store: &S, post_id: &str) -> ApiResult<Response> {
    let post = load_post(store, post_id)?;
    Ok(json_response(200, &post_view(store, &post)?)?)
}

pub fn handle_delete_post<S: DocumentStore>(
    store: &S,
    req: &Request,
    post_id: &str,
) -> ApiResult<Response> {
    let user_id = authenticate(store, req)?;
    delete_post(store, &user_id, post_id)?;
    Ok(json_response(200, &serde_json::json!({ "message": "Post removed" }))?)
}

pub fn handle_toggle_like<S: DocumentStore>(
    store: &S,
    req: &Request,
    post_id: &str,
) -> ApiResult<Response> {
    let user_id = authenticate(store, req)?;
    let post = toggle_like(store, &user_id, post_id)?;
    Ok(json_response(200, &post_view(store, &post)?)?)
}
