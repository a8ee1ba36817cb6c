mod config;
mod handlers;
mod response;
mod store;
mod types;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

pub(crate) use config::{AppState, ServerConfig};
pub(crate) use types::HealthResponse;

use handlers::{get_leaderboard, health, method_not_allowed, submit_score};

fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .expose_any_header()
        .max_age(3600)
}

fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .service(
            web::resource("/api/leaderboard")
                .route(web::get().to(get_leaderboard))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            web::resource("/api/score")
                .route(web::post().to(submit_score))
                .default_service(web::to(method_not_allowed)),
        );
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let state = AppState::from_config(&config).map_err(std::io::Error::other)?;

    tracing::info!(
        "starting score server: bind_addr={} database_configured={} leaderboard_limit={} json_limit_bytes={} http_workers={:?}",
        config.bind_addr,
        state.scores.is_some(),
        config.leaderboard_limit,
        config.json_limit_bytes,
        config.http_workers
    );

    let json_limit = config.json_limit_bytes;
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::new(json_limit))
            .wrap(cors())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    });
    if let Some(workers) = config.http_workers {
        server = server.workers(workers);
    }

    server.bind(config.bind_addr.as_str())?.run().await
}
