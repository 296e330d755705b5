pub mod auth;
pub mod comments;
pub mod config;
pub mod core;
pub mod follow;
pub mod handlers;
pub mod models;
pub mod posts;
pub mod users;

#[cfg(target_arch = "wasm32")]
mod component {
    use spin_sdk::{
        http::{IntoResponse, Request},
        http_component,
        key_value::Store,
    };

    use crate::config::seed_demo_enabled;
    use crate::core::db::seed_demo_data;
    use crate::handlers::handle_request;

    #[http_component]
    fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
        let store = Store::open_default()?;
        if seed_demo_enabled() {
            if let Err(e) = seed_demo_data(&store) {
                log::error!("demo seeding failed: {}", e);
            }
        }
        Ok(handle_request(&store, &req))
    }
}
