use crate::config::*;
use spin_sdk::http::Response;

use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::json_response;
use crate::core::store::DocumentStore;
use crate::follow::get_followings;
use crate::models::models::Post;
use crate::posts::create_post;
use crate::users::{create_user, find_user_by_email, RegisterRequest};

pub const DEMO_PASSWORD: &str = "password123";

const DEMO_USERS: [(&str, &str, &str); 5] = [
    (
        "Demo User",
        "demo@example.com",
        "Software developer who enjoys building web applications.",
    ),
    (
        "John Doe",
        "john@example.com",
        "Full-stack developer working across JavaScript, Python and the cloud.",
    ),
    (
        "Jane Smith",
        "jane@example.com",
        "UI/UX designer and frontend developer.",
    ),
    (
        "Mike Johnson",
        "mike@example.com",
        "Backend developer and DevOps engineer.",
    ),
    (
        "Sarah Wilson",
        "sarah@example.com",
        "Data scientist and machine learning engineer.",
    ),
];

// (index into DEMO_USERS, content)
const DEMO_POSTS: [(usize, &str); 8] = [
    (0, "Just finished building this board! Learning a lot about backends along the way."),
    (1, "Working on a new project with a strongly typed stack. The developer experience is great."),
    (2, "Design tip: prioritize usability over aesthetics. What is your approach to UX?"),
    (3, "Deployed my first microservice today. Containers changed my whole workflow."),
    (4, "Shipped a recommendation model that lifted engagement by 40%."),
    (0, "Collaboration is key in software development. What is your favorite tool?"),
    (1, "The language ecosystem moves fast. Which new feature do you like most?"),
    (2, "Accessibility should be a priority, not an afterthought."),
];

/// Creates the demo accounts, their posts and a fully connected follow graph.
/// Running it again is a no-op.
pub fn seed_demo_data<S: DocumentStore>(store: &S) -> ApiResult<()> {
    if find_user_by_email(store, DEMO_USERS[0].1)?.is_some() {
        log::debug!("demo data already present");
        return Ok(());
    }

    let mut ids = Vec::with_capacity(DEMO_USERS.len());
    for (name, email, bio) in DEMO_USERS {
        let user = create_user(
            store,
            &RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: DEMO_PASSWORD.to_string(),
                bio: Some(bio.to_string()),
            },
        )?;
        ids.push(user.id);
    }

    for (author, content) in DEMO_POSTS {
        create_post(store, &ids[author], content)?;
    }

    for id in &ids {
        let mut followings = get_followings(store, id)?;
        for other in ids.iter().filter(|other| *other != id) {
            if !followings.contains(other) {
                followings.push(other.clone());
            }
        }
        store.set_json(&followings_key(id), &followings)?;
    }

    log::info!(
        "seeded {} demo users and {} demo posts",
        ids.len(),
        DEMO_POSTS.len()
    );
    Ok(())
}

/// Removes every document the application writes.
pub fn reset_data<S: DocumentStore>(store: &S) -> anyhow::Result<()> {
    let users: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    for id in &users {
        if let Some(user) = store.get_json::<crate::models::models::User>(&user_key(id))? {
            store.delete(&email_key(&user.email))?;
        }
        store.delete(&user_key(id))?;
        store.delete(&followings_key(id))?;
    }

    let feed: Vec<String> = store.get_json(FEED_KEY)?.unwrap_or_default();
    for id in feed {
        if store.get_json::<Post>(&post_key(&id))?.is_some() {
            store.delete(&post_key(&id))?;
        }
    }

    let tokens: Vec<String> = store.get_json(TOKENS_LIST_KEY)?.unwrap_or_default();
    for token in tokens {
        store.delete(&token_key(&token))?;
    }

    store.delete(USERS_LIST_KEY)?;
    store.delete(FEED_KEY)?;
    store.delete(TOKENS_LIST_KEY)?;

    log::info!("store reset");
    Ok(())
}

/// Wipes the store, reseeding the demo data when seeding is on. Only
/// routed when `LINKBOARD_ALLOW_RESET` is set.
pub fn handle_reset<S: DocumentStore>(store: &S) -> ApiResult<Response> {
    if !reset_enabled() {
        return Err(ApiError::NotFound("No route found".to_string()));
    }
    reset_data(store)?;
    if seed_demo_enabled() {
        seed_demo_data(store)?;
    }
    Ok(json_response(200, &serde_json::json!({ "message": "Store reset" }))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::get_followers;
    use crate::core::store::MemoryStore;
    use crate::posts::list_posts;
    use crate::users::list_users;

    #[test]
    fn seeding_is_idempotent_and_fully_connected() {
        let store = MemoryStore::new();
        seed_demo_data(&store).unwrap();
        seed_demo_data(&store).unwrap();

        let users = list_users(&store).unwrap();
        assert_eq!(users.len(), DEMO_USERS.len());
        for user in &users {
            assert_eq!(user.following.len(), DEMO_USERS.len() - 1);
            assert!(!user.following.contains(&user.id));
            assert_eq!(get_followers(&store, &user.id).unwrap().len(), DEMO_USERS.len() - 1);
        }
        assert_eq!(list_posts(&store, 1).unwrap().len(), DEMO_POSTS.len());
    }

    #[test]
    fn reset_empties_the_store() {
        let store = MemoryStore::new();
        seed_demo_data(&store).unwrap();
        crate::auth::issue_token(&store, "someone").unwrap();

        reset_data(&store).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn reset_route_is_off_by_default() {
        let store = MemoryStore::new();
        seed_demo_data(&store).unwrap();

        assert!(matches!(handle_reset(&store), Err(ApiError::NotFound(_))));
        assert_eq!(list_users(&store).unwrap().len(), DEMO_USERS.len());
    }
}
