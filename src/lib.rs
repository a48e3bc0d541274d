#[macro_use]
extern crate lazy_static;

use actix_files::NamedFile;
use actix_web::{
    http::{Method, StatusCode},
    web, Either, HttpResponse, Responder,
};
use sqlx::SqlitePool;
use tera::Tera;

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod forms;
pub mod policy;
pub mod routes;
pub mod structs;
pub mod utils;
pub mod view;

pub use auth::SessionTable;
pub use config::AppConfig;
pub use errors::AppError;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: AppConfig,
}

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = match Tera::new("templates/**/*") {
            Ok(t) => t,
            Err(e) => {
                log::error!("Parsing error(s): {}", e);
                ::std::process::exit(1);
            }
        };
        tera.autoescape_on(vec![".html"]);
        tera
    };
}

pub fn session_table(config: &AppConfig) -> SessionTable {
    SessionTable::new(config.session_ttl, config.remember_ttl)
}

/// Registers every route. Middleware is wrapped by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::index::index_handler)
        .service(routes::index::index_alias_handler)
        .service(routes::auth::login_handler)
        .service(routes::auth::login_form_handler)
        .service(routes::auth::logout_handler)
        .service(routes::auth::register_handler)
        .service(routes::auth::register_form_handler)
        .service(routes::jobs::list_jobs_handler)
        .service(routes::jobs::add_job_handler)
        .service(routes::jobs::add_job_form_handler)
        .service(routes::jobs::edit_job_handler)
        .service(routes::jobs::edit_job_form_handler)
        .service(routes::jobs::delete_job_handler)
        .service(routes::news::add_news_handler)
        .service(routes::news::add_news_form_handler)
        .service(routes::news::edit_news_handler)
        .service(routes::news::edit_news_form_handler)
        .service(routes::news::delete_news_handler)
        .service(routes::departments::list_departments_handler)
        .service(routes::departments::add_department_handler)
        .service(routes::departments::add_department_form_handler)
        .service(routes::departments::edit_department_handler)
        .service(routes::departments::edit_department_form_handler)
        .service(routes::departments::delete_department_handler);
}

/// Fallback for unmatched routes.
pub async fn default_handler(req_method: Method) -> Result<impl Responder, std::io::Error> {
    match req_method {
        Method::GET => {
            let file = NamedFile::open("static/404.html")?
                .customize()
                .with_status(StatusCode::NOT_FOUND);
            Ok(Either::Left(file))
        }
        _ => Ok(Either::Right(HttpResponse::MethodNotAllowed().finish())),
    }
}
