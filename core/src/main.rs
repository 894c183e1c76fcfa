mod cors;

use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use api::AppState;
use common::{clock::SystemClock, env_config::Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;
    let config_data = config.clone();
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup(&config).expect("Failed to set up logger");
    }

    if let Some(dir) = &config.entitlement_data_dir {
        std::fs::create_dir_all(dir)?;
    }

    // one registry of user sessions shared by every worker
    let state = web::Data::new(
        AppState::new(&config, Arc::new(SystemClock))
            .map_err(|e| std::io::Error::other(e.to_string()))?,
    );
    if !state.checkout.is_available() {
        log::warn!(
            "STRIPE_SECRET_KEY not set, purchases follow the {:?} fallback",
            config.payment_fallback
        );
    }

    log::info!(
        "Listening on {}:{} ({})",
        config.server_host,
        config.server_port,
        config.environment
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(logger::middleware()) // 3rd
            .wrap(extractor::middleware(&config_data.jwt_config.secret)) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(
                web::scope("/api")
                    .service(api::mount_plans())
                    .service(api::mount_webhook())
                    .service(api::mount_me()),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
