#[cfg(not(target_arch = "wasm32"))]
mod native {
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use env_logger::Env;

    use linkboard::config::{bind_addr, seed_demo_enabled};
    use linkboard::core::db::seed_demo_data;
    use linkboard::core::store::MemoryStore;
    use linkboard::handlers::handle_request;

    mod adapter {
        use actix_web::http::StatusCode;
        use actix_web::HttpRequest;
        use spin_sdk::http::{Method, Request, Response};

        pub fn actix_to_spin_request(req: &HttpRequest, body: actix_web::web::Bytes) -> Request {
            let method = match req.method().as_str() {
                "GET" => Method::Get,
                "POST" => Method::Post,
                "PUT" => Method::Put,
                "DELETE" => Method::Delete,
                "HEAD" => Method::Head,
                "OPTIONS" => Method::Options,
                "PATCH" => Method::Patch,
                _ => Method::Get,
            };

            let mut builder = Request::builder();
            builder.method(method).uri(req.uri().to_string());
            for (name, value) in req.headers() {
                if let Ok(val_str) = value.to_str() {
                    builder.header(name.as_str(), val_str);
                }
            }
            builder.body(body.to_vec()).build()
        }

        pub fn spin_to_actix_response(spin_resp: Response) -> actix_web::HttpResponse {
            let status = StatusCode::from_u16(*spin_resp.status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

            actix_web::HttpResponse::build(status)
                .content_type("application/json")
                .body(spin_resp.body().to_vec())
        }
    }

    pub async fn run() -> std::io::Result<()> {
        env_logger::Builder::from_env(Env::default().default_filter_or("info"))
            .format_timestamp_secs()
            .init();

        let store = web::Data::new(MemoryStore::new());
        if seed_demo_enabled() {
            if let Err(e) = seed_demo_data(store.get_ref()) {
                log::error!("demo seeding failed: {}", e);
            }
        }

        let addr = bind_addr();
        log::info!("linkboard listening on http://{}", addr);

        HttpServer::new(move || {
            App::new()
                .app_data(store.clone())
                .default_service(web::route().to(handle_all))
        })
        .bind(addr)?
        .run()
        .await
    }

    async fn handle_all(
        store: web::Data<MemoryStore>,
        req: HttpRequest,
        body: web::Bytes,
    ) -> HttpResponse {
        log::debug!("{} {}", req.method(), req.uri());
        let spin_req = adapter::actix_to_spin_request(&req, body);
        let spin_resp = handle_request(store.get_ref(), &spin_req);
        adapter::spin_to_actix_response(spin_resp)
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
