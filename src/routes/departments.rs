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
    forms::DepartmentForm,
    policy::owned_or_not_found,
    routes::form_page,
    structs::Department,
    view::{base_context, department_rows, redirect, render},
    AppState,
};

const ADD_TITLE: &str = "Add a department";
const EDIT_TITLE: &str = "Department editing";

async fn resolve_chief(conn: &mut SqliteConnection, email: &str) -> Result<i64, AppError> {
    db::find_user_by_email(conn, email)
        .await?
        .map(|user| user.id)
        .ok_or(AppError::UnknownChief)
}

async fn owned_department(
    conn: &mut SqliteConnection,
    viewer: &Viewer,
    id: i64,
) -> Result<Department, AppError> {
    owned_or_not_found(viewer, db::get_department(conn, id).await?).ok_or(AppError::NotFound)
}

#[get("/departments")]
pub async fn list_departments_handler(
    state: Data<AppState>,
    viewer: Viewer,
) -> Result<HttpResponse, AppError> {
    let mut tx = db::begin(&state.db_pool).await?;
    let departments = db::get_all_departments(&mut tx).await?;
    tx.commit().await?;

    let mut context = base_context("List of departments", &viewer);
    context.insert("departments", &department_rows(&departments, &viewer));
    render("departments.html", &context)
}

#[get("/add_department")]
pub async fn add_department_handler(user: AuthUser) -> Result<HttpResponse, AppError> {
    form_page("department_form.html", ADD_TITLE, &DepartmentForm::default(), None, &user.into())
}

#[post("/add_department")]
pub async fn add_department_form_handler(
    user: AuthUser,
    state: Data<AppState>,
    web::Form(form): web::Form<DepartmentForm>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(e) => return form_page("department_form.html", ADD_TITLE, &form, Some(&e), &viewer),
    };

    let mut tx = db::begin_write(&state.db_pool).await?;
    let chief = match resolve_chief(&mut tx, &draft.chief_email).await {
        Ok(chief) => chief,
        Err(e) if e.is_form_error() => {
            return form_page("department_form.html", ADD_TITLE, &form, Some(&e), &viewer)
        }
        Err(e) => return Err(e),
    };
    db::create_department(&mut tx, draft.into_fields(chief)).await?;
    tx.commit().await?;
    Ok(redirect("/departments"))
}

#[get("/departments/{id}")]
pub async fn edit_department_handler(
    user: AuthUser,
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let mut tx = db::begin(&state.db_pool).await?;
    let department = owned_department(&mut tx, &viewer, path.into_inner()).await?;
    let chief_email = db::get_user_by_id(&mut tx, department.chief)
        .await?
        .map(|user| user.email)
        .unwrap_or_default();
    tx.commit().await?;

    let form = DepartmentForm::from_record(&department, &chief_email);
    form_page("department_form.html", EDIT_TITLE, &form, None, &viewer)
}

#[post("/departments/{id}")]
pub async fn edit_department_form_handler(
    user: AuthUser,
    state: Data<AppState>,
    path: web::Path<i64>,
    web::Form(form): web::Form<DepartmentForm>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let mut tx = db::begin_write(&state.db_pool).await?;
    let department = owned_department(&mut tx, &viewer, path.into_inner()).await?;

    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(e) => return form_page("department_form.html", EDIT_TITLE, &form, Some(&e), &viewer),
    };
    let chief = match resolve_chief(&mut tx, &draft.chief_email).await {
        Ok(chief) => chief,
        Err(e) if e.is_form_error() => {
            return form_page("department_form.html", EDIT_TITLE, &form, Some(&e), &viewer)
        }
        Err(e) => return Err(e),
    };
    db::update_department(&mut tx, department.id, draft.into_fields(chief)).await?;
    tx.commit().await?;
    Ok(redirect("/departments"))
}

#[route("/depart_delete/{id}", method = "GET", method = "POST")]
pub async fn delete_department_handler(
    user: AuthUser,
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from(user);
    let mut tx = db::begin_write(&state.db_pool).await?;
    let department = owned_department(&mut tx, &viewer, path.into_inner()).await?;
    db::delete_department(&mut tx, department.id).await?;
    tx.commit().await?;
    Ok(redirect("/departments"))
}
