use actix_web::{
    get, post, route,
    web::{self, Data},
    HttpResponse,
};
use sqlx::SqliteConnection;

use crate::{
    auth::{AuthUser, Viewer},
    db,
    errors::AppError,
    forms::NewsForm,
    policy::owned_or_not_found,
    routes::form_page,
    structs::News,
    view::redirect,
    AppState,
};

const ADD_TITLE: &str = "Adding news";
const EDIT_TITLE: &str = "News editing";

async fn owned_news(conn: &mut SqliteConnection, viewer: &Viewer, id: i64) -> Result<News, AppError> {
    owned_or_not_found(viewer, db::get_news(conn, id).await?).ok_or(AppError::NotFound)
}

#[get("/news")]
pub async fn add_news_handler(user: AuthUser) -> Result<HttpResponse, AppError> {
    form_page("news_form.html", ADD_TITLE, &NewsForm::default(), None, &user.into())
}

#[post("/news")]
pub async fn add_news_form_handler(
    user: AuthUser,
    state: Data<AppState>,
    web::Form(form): web::Form<NewsForm>,
) -> Result<HttpResponse, AppError> {
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(e) => return form_page("news_form.html", ADD_TITLE, &form, Some(&e), &user.into()),
    };

    let mut tx = db::begin_write(&state.db_pool).await?;
    db::create_news(&mut tx, user.0.user_id, fields).await?;
    tx.commit().await?;
    Ok(redirect("/"))
}

#[get("/news/{id}")]
pub async fn edit_news_handler(
    user: AuthUser,
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let mut tx = db::begin(&state.db_pool).await?;
    let news = owned_news(&mut tx, &viewer, path.into_inner()).await?;
    tx.commit().await?;

    form_page("news_form.html", EDIT_TITLE, &NewsForm::from_record(&news), None, &viewer)
}

#[post("/news/{id}")]
pub async fn edit_news_form_handler(
    user: AuthUser,
    state: Data<AppState>,
    path: web::Path<i64>,
    web::Form(form): web::Form<NewsForm>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let mut tx = db::begin_write(&state.db_pool).await?;
    let news = owned_news(&mut tx, &viewer, path.into_inner()).await?;

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(e) => return form_page("news_form.html", EDIT_TITLE, &form, Some(&e), &viewer),
    };
    db::update_news(&mut tx, news.id, fields).await?;
    tx.commit().await?;
    Ok(redirect("/"))
}

#[route("/news_delete/{id}", method = "GET", method = "POST")]
pub async fn delete_news_handler(
    user: AuthUser,
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let mut tx = db::begin_write(&state.db_pool).await?;
    let news = owned_news(&mut tx, &viewer, path.into_inner()).await?;
    db::delete_news(&mut tx, news.id).await?;
    tx.commit().await?;
    Ok(redirect("/"))
}
