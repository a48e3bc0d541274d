use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{
    config::PersistentSession, storage::CookieSessionStore, SessionMiddleware,
};
use actix_web::{
    middleware,
    web::{self, Data},
    App, HttpServer,
};
use log::info;

use crewdesk::{configure, db, default_handler, session_table, AppConfig, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        log::error!("FATAL: {}", e);
        std::process::exit(1);
    });

    let db_pool = db::connect(&config.database_url).await?;

    let sessions = Data::new(session_table(&config));
    let state = Data::new(AppState {
        db_pool,
        config: config.clone(),
    });
    let cookie_key = config.cookie_key();
    // The cookie outlives the longest login; the session table decides when a token dies.
    let cookie_ttl = config.cookie_ttl()?;

    info!("Starting HTTP server on http://{}/", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), cookie_key.clone())
                    .session_lifecycle(PersistentSession::default().session_ttl(cookie_ttl))
                    .build(),
            )
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(sessions.clone())
            .service(Files::new("/static", "static"))
            .configure(configure)
            .default_service(web::to(default_handler))
    })
    .client_request_timeout(config.request_timeout)
    .bind(&config.bind_addr)?
    .run()
    .await
}
