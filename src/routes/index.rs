use actix_web::{get, web::Data, HttpResponse};

use crate::{
    auth::Viewer,
    db,
    errors::AppError,
    policy::may_read_news,
    view::{base_context, job_rows, render},
    AppState,
};

async fn render_index(state: &AppState, viewer: Viewer) -> Result<HttpResponse, AppError> {
    let mut tx = db::begin(&state.db_pool).await?;
    let news: Vec<_> = db::get_all_news(&mut tx)
        .await?
        .into_iter()
        .filter(|news| may_read_news(&viewer, news))
        .collect();
    let jobs = db::get_all_jobs(&mut tx).await?;
    tx.commit().await?;

    let mut context = base_context("Records", &viewer);
    context.insert("news", &news);
    context.insert("jobs", &job_rows(&jobs, &viewer));
    render("index.html", &context)
}

#[get("/")]
pub async fn index_handler(state: Data<AppState>, viewer: Viewer) -> Result<HttpResponse, AppError> {
    render_index(&state, viewer).await
}

#[get("/index")]
pub async fn index_alias_handler(state: Data<AppState>, viewer: Viewer) -> Result<HttpResponse, AppError> {
    render_index(&state, viewer).await
}
