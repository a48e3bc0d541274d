use actix_web::{
    get, post,
    web::{self, Data},
    HttpRequest, HttpResponse,
};

use crate::{
    auth::{end_session, start_session, AuthUser, Principal, SessionTable, Viewer},
    db,
    errors::AppError,
    forms::{LoginForm, RegisterForm},
    routes::form_page,
    view::redirect,
    AppState,
};

const BAD_CREDENTIALS: &str = "Incorrect login or password";

#[get("/login")]
pub async fn login_handler(viewer: Viewer) -> Result<HttpResponse, AppError> {
    form_page("login.html", "Authorization", &LoginForm::default(), None, &viewer)
}

#[post("/login")]
pub async fn login_form_handler(
    web::Form(form): web::Form<LoginForm>,
    state: Data<AppState>,
    sessions: Data<SessionTable>,
    viewer: Viewer,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    if let Err(e) = form.validate() {
        return form_page("login.html", "Authorization", &form, Some(&e), &viewer);
    }

    let mut tx = db::begin(&state.db_pool).await?;
    let user = db::verify_credentials(&mut tx, &form.email, &form.password).await?;
    tx.commit().await?;

    match user {
        Some(user) => {
            let principal = Principal {
                user_id: user.id,
                is_admin: user.is_admin,
            };
            start_session(&request, &sessions, principal, form.remember())?;
            log::info!("User {} logged in", user.id);
            Ok(redirect("/"))
        }
        None => {
            log::warn!("Rejected login for {}", form.email);
            let e = AppError::ValidationError(BAD_CREDENTIALS.to_owned());
            form_page("login.html", "Authorization", &form, Some(&e), &viewer)
        }
    }
}

#[get("/logout")]
pub async fn logout_handler(
    _user: AuthUser,
    sessions: Data<SessionTable>,
    request: HttpRequest,
) -> HttpResponse {
    end_session(&request, &sessions);
    redirect("/")
}

#[get("/register")]
pub async fn register_handler(viewer: Viewer) -> Result<HttpResponse, AppError> {
    form_page("register.html", "Register form", &RegisterForm::default(), None, &viewer)
}

#[post("/register")]
pub async fn register_form_handler(
    web::Form(form): web::Form<RegisterForm>,
    state: Data<AppState>,
    viewer: Viewer,
) -> Result<HttpResponse, AppError> {
    let mut profile = match form.validate() {
        Ok(profile) => profile,
        Err(e) => return form_page("register.html", "Register form", &form, Some(&e), &viewer),
    };
    profile.is_admin = state.config.is_admin_email(&profile.email);

    let mut tx = db::begin_write(&state.db_pool).await?;
    match db::register_user(&mut tx, profile, &form.password).await {
        Ok(_) => {
            tx.commit().await?;
            Ok(redirect("/"))
        }
        Err(e) if e.is_form_error() => form_page("register.html", "Register form", &form, Some(&e), &viewer),
        Err(e) => Err(e),
    }
}
