// === Limits ===
pub const MAX_POST_LENGTH: usize = 1000;
pub const MAX_COMMENT_LENGTH: usize = 500;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_NAME_LENGTH: usize = 80;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const POSTS_PER_PAGE: usize = 20;

// === Store keys ===
pub const USERS_LIST_KEY: &str = "users_list";
pub const FEED_KEY: &str = "feed";
pub const TOKENS_LIST_KEY: &str = "tokens_list";

pub fn user_key(id: &str) -> String {
    format!("user:{}", id)
}

pub fn post_key(id: &str) -> String {
    format!("post:{}", id)
}

pub fn token_key(token: &str) -> String {
    format!("token:{}", token)
}

pub fn followings_key(user_id: &str) -> String {
    format!("followings:{}", user_id)
}

pub fn email_key(email: &str) -> String {
    format!("email:{}", email.trim().to_lowercase())
}

// === Runtime settings ===
pub fn token_expiration_hours() -> i64 {
    std::env::var("LINKBOARD_TOKEN_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(24)
}

pub fn bind_addr() -> String {
    std::env::var("LINKBOARD_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

pub fn seed_demo_enabled() -> bool {
    std::env::var("LINKBOARD_SEED_DEMO")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

pub fn reset_enabled() -> bool {
    std::env::var("LINKBOARD_ALLOW_RESET")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_key_is_case_insensitive() {
        assert_eq!(email_key(" Demo@Example.com "), "email:demo@example.com");
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(user_key("a"), "user:a");
        assert_eq!(post_key("b"), "post:b");
        assert_eq!(followings_key("c"), "followings:c");
    }
}
