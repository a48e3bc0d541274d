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
    forms::JobForm,
    policy::owned_or_not_found,
    routes::form_page,
    structs::Job,
    view::{base_context, job_rows, redirect, render},
    AppState,
};

const ADD_TITLE: &str = "Adding a job";
const EDIT_TITLE: &str = "Job editing";

async fn resolve_team_leader(conn: &mut SqliteConnection, email: &str) -> Result<i64, AppError> {
    db::find_user_by_email(conn, email)
        .await?
        .map(|user| user.id)
        .ok_or(AppError::UnknownTeamLeader)
}

/// Fetches the job and hides it unless the viewer may mutate it.
async fn owned_job(conn: &mut SqliteConnection, viewer: &Viewer, id: i64) -> Result<Job, AppError> {
    owned_or_not_found(viewer, db::get_job(conn, id).await?).ok_or(AppError::NotFound)
}

#[get("/jobs")]
pub async fn list_jobs_handler(state: Data<AppState>, viewer: Viewer) -> Result<HttpResponse, AppError> {
    let mut tx = db::begin(&state.db_pool).await?;
    let jobs = db::get_all_jobs(&mut tx).await?;
    tx.commit().await?;

    let mut context = base_context("Works log", &viewer);
    context.insert("jobs", &job_rows(&jobs, &viewer));
    render("jobs.html", &context)
}

#[get("/addjob")]
pub async fn add_job_handler(user: AuthUser) -> Result<HttpResponse, AppError> {
    form_page("job_form.html", ADD_TITLE, &JobForm::default(), None, &user.into())
}

#[post("/addjob")]
pub async fn add_job_form_handler(
    user: AuthUser,
    state: Data<AppState>,
    web::Form(form): web::Form<JobForm>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(e) => return form_page("job_form.html", ADD_TITLE, &form, Some(&e), &viewer),
    };

    let mut tx = db::begin_write(&state.db_pool).await?;
    let leader = match resolve_team_leader(&mut tx, &draft.leader_email).await {
        Ok(leader) => leader,
        Err(e) if e.is_form_error() => return form_page("job_form.html", ADD_TITLE, &form, Some(&e), &viewer),
        Err(e) => return Err(e),
    };
    db::create_job(&mut tx, draft.into_fields(leader)).await?;
    tx.commit().await?;
    Ok(redirect("/jobs"))
}

#[get("/addjob/{id}")]
pub async fn edit_job_handler(
    user: AuthUser,
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let mut tx = db::begin(&state.db_pool).await?;
    let job = owned_job(&mut tx, &viewer, path.into_inner()).await?;
    let leader_email = db::get_user_by_id(&mut tx, job.team_leader)
        .await?
        .map(|user| user.email)
        .unwrap_or_default();
    tx.commit().await?;

    form_page("job_form.html", EDIT_TITLE, &JobForm::from_record(&job, &leader_email), None, &viewer)
}

#[post("/addjob/{id}")]
pub async fn edit_job_form_handler(
    user: AuthUser,
    state: Data<AppState>,
    path: web::Path<i64>,
    web::Form(form): web::Form<JobForm>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let mut tx = db::begin_write(&state.db_pool).await?;
    let job = owned_job(&mut tx, &viewer, path.into_inner()).await?;

    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(e) => return form_page("job_form.html", EDIT_TITLE, &form, Some(&e), &viewer),
    };
    let leader = match resolve_team_leader(&mut tx, &draft.leader_email).await {
        Ok(leader) => leader,
        Err(e) if e.is_form_error() => return form_page("job_form.html", EDIT_TITLE, &form, Some(&e), &viewer),
        Err(e) => return Err(e),
    };
    db::update_job(&mut tx, job.id, draft.into_fields(leader)).await?;
    tx.commit().await?;
    Ok(redirect("/jobs"))
}

#[route("/job_delete/{id}", method = "GET", method = "POST")]
pub async fn delete_job_handler(
    user: AuthUser,
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let mut tx = db::begin_write(&state.db_pool).await?;
    let job = owned_job(&mut tx, &viewer, path.into_inner()).await?;
    db::delete_job(&mut tx, job.id).await?;
    tx.commit().await?;
    Ok(redirect("/jobs"))
}
