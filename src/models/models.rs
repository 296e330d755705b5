use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::access::Owned;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    pub id: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
pub struct TokenData {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// A user's outgoing follow edges. Followers are derived from these.
pub type Followings = Vec<String>;

impl Owned for Post {
    fn owner_id(&self) -> &str {
        &self.author
    }

    fn resource_name(&self) -> &'static str {
        "post"
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> &str {
        &self.author
    }

    fn resource_name(&self) -> &'static str {
        "comment"
    }
}

// === Response views ===

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthorSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

impl AuthorSummary {
    pub fn of(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }

    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Unknown user".to_string(),
            email: String::new(),
            profile_picture: None,
        }
    }
}

/// Public user profile: never carries the password hash.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserView {
    pub fn new(user: &User, followers: Vec<String>, following: Vec<String>) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            profile_picture: user.profile_picture.clone(),
            followers,
            following,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommentView {
    pub id: String,
    pub text: String,
    pub user: AuthorSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PostView {
    pub id: String,
    pub content: String,
    pub author: AuthorSummary,
    pub likes: Vec<String>,
    pub like_count: usize,
    pub comments: Vec<CommentView>,
    pub comment_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}
