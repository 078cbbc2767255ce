use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::fmt::Display;
use std::io;
use std::sync::Arc;

use tasklist::{
    auth::{PasswordHasher, TokenService},
    config::{Config, Environment},
    fixtures, routes, security,
    state::AppState,
    store::PgStore,
};

fn fatal(context: &str, err: impl Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| fatal("Invalid configuration", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(config.database.connect_options())
        .await
        .map_err(|e| fatal("Failed to connect to database", e))?;

    let store = Arc::new(PgStore::new(pool));
    store
        .ensure_schema()
        .await
        .map_err(|e| fatal("Failed to prepare schema", e))?;

    let state = web::Data::new(AppState::new(
        store.clone(),
        TokenService::new(config.jwt_secret.as_bytes()),
        PasswordHasher::new(config.bcrypt_cost),
    ));

    if config.environment == Environment::Test {
        store
            .truncate_all()
            .await
            .map_err(|e| fatal("Failed to reset test data", e))?;
        fixtures::seed(&state)
            .await
            .map_err(|e| fatal("Failed to seed test data", e))?;
        log::info!("Seeded {} test users", fixtures::SEED_USERS.len());
    }

    log::info!(
        "Starting server at {} ({:?} mode)",
        config.server_url(),
        config.environment
    );

    let cors_origin = config.cors_allowed_origin.clone();
    // On SIGINT/SIGTERM actix stops accepting, gives in-flight requests
    // shutdown_timeout to finish, then closes the workers.
    HttpServer::new(move || {
        App::new()
            .wrap(security::cors(cors_origin.as_deref()))
            .wrap(security::secure_headers())
            .wrap(Logger::default())
            .configure(routes::configure(state.clone()))
    })
    .shutdown_timeout(config.shutdown_timeout.as_secs())
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    log::info!("Server stopped gracefully");
    Ok(())
}
