#![allow(dead_code)]

use std::{str::FromStr, time::Duration};

use actix_web::{body::MessageBody, cookie::Cookie, dev::ServiceResponse, test::TestRequest};
use crewdesk::{db, AppConfig, SessionTable};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

pub const ADMIN_EMAIL: &str = "admin@mars.org";
pub const PASSWORD: &str = "wet-sand-42";

/// Builds the full application around an in-memory database, optionally
/// with a custom session table.
#[macro_export]
macro_rules! init_app {
    ($pool:expr) => {
        $crate::init_app!($pool, $crate::common::sessions())
    };
    ($pool:expr, $sessions:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_identity::IdentityMiddleware::default())
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::generate(),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .app_data(actix_web::web::Data::new(crewdesk::AppState {
                    db_pool: $pool.clone(),
                    config: $crate::common::test_config(),
                }))
                .app_data(actix_web::web::Data::new($sessions))
                .configure(crewdesk::configure)
                .default_service(actix_web::web::to(crewdesk::default_handler)),
        )
        .await
    };
}

/// Sends `$req` and returns the response.
#[macro_export]
macro_rules! send {
    ($app:expr, $req:expr) => {
        actix_web::test::call_service(&$app, $req.to_request()).await
    };
}

/// Logs in and returns the session cookie.
#[macro_export]
macro_rules! login {
    ($app:expr, $email:expr) => {{
        let resp = $crate::send!(
            $app,
            $crate::common::post_form(
                "/login",
                &[("email", $email), ("password", $crate::common::PASSWORD)],
                None
            )
        );
        assert_eq!(resp.status(), actix_web::http::StatusCode::FOUND, "login failed for {}", $email);
        $crate::common::session_cookie(&resp).expect("login sets a session cookie")
    }};
}

/// Registers a user with the shared test password.
#[macro_export]
macro_rules! register {
    ($app:expr, $email:expr, $name:expr, $surname:expr) => {{
        let resp = $crate::send!(
            $app,
            $crate::common::post_form(
                "/register",
                &[
                    ("email", $email),
                    ("password", $crate::common::PASSWORD),
                    ("password_again", $crate::common::PASSWORD),
                    ("name", $name),
                    ("surname", $surname),
                ],
                None
            )
        );
        assert_eq!(resp.status(), actix_web::http::StatusCode::FOUND, "registration failed for {}", $email);
    }};
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_owned(),
        admin_emails: vec![ADMIN_EMAIL.to_owned()],
        ..AppConfig::default()
    }
}

pub fn sessions() -> SessionTable {
    SessionTable::new(Duration::from_secs(600), Duration::from_secs(6000))
}

pub async fn memory_pool() -> SqlitePool {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(opts)
        .await
        .unwrap();
    db::migrate(&pool).await.unwrap();
    pool
}

pub fn get(uri: &str, cookie: Option<&Cookie<'static>>) -> TestRequest {
    with_cookie(TestRequest::get().uri(uri), cookie)
}

pub fn post_form(uri: &str, fields: &[(&str, &str)], cookie: Option<&Cookie<'static>>) -> TestRequest {
    with_cookie(TestRequest::post().uri(uri).set_form(fields), cookie)
}

fn with_cookie(req: TestRequest, cookie: Option<&Cookie<'static>>) -> TestRequest {
    match cookie {
        Some(cookie) => req.cookie(cookie.clone()),
        None => req,
    }
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == "id")
        .map(|cookie| cookie.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

pub async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = actix_web::test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
