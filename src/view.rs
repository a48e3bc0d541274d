use actix_web::HttpResponse;
use chrono::NaiveDateTime;
use serde::Serialize;
use tera::Context;

use crate::{
    auth::Viewer,
    errors::AppError,
    policy::may_mutate,
    structs::{DepartmentListing, JobListing},
    TEMPLATES,
};

/// Whole hours between two timestamps, halves rounded away from zero.
pub fn duration_hours(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let seconds = (end - start).num_seconds() as f64;
    (seconds / 3600.0).round() as i64
}

#[derive(Serialize, Debug, Clone)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub team_leader_id: i64,
    pub team_leader: String,
    pub duration: String,
    pub collaborators: String,
    pub is_finished: bool,
    pub can_edit: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct DepartmentRow {
    pub id: i64,
    pub title: String,
    pub chief: String,
    pub email: String,
    pub members: String,
    pub can_edit: bool,
}

pub fn job_rows(jobs: &[JobListing], viewer: &Viewer) -> Vec<JobRow> {
    jobs.iter()
        .map(|listing| {
            let job = &listing.job;
            JobRow {
                id: job.id,
                title: job.job_title.clone(),
                team_leader_id: job.team_leader,
                team_leader: format!("{} {}", listing.leader_name, listing.leader_surname),
                duration: format!("{} hours", duration_hours(job.start_date, job.end_date)),
                collaborators: job.collaborators.clone(),
                is_finished: job.is_finished,
                can_edit: may_mutate(viewer, job),
            }
        })
        .collect()
}

pub fn department_rows(departments: &[DepartmentListing], viewer: &Viewer) -> Vec<DepartmentRow> {
    departments
        .iter()
        .map(|listing| {
            let department = &listing.department;
            DepartmentRow {
                id: department.id,
                title: department.title.clone(),
                chief: format!("{} {}", listing.chief_name, listing.chief_surname),
                email: department.email.clone(),
                members: department.members.clone(),
                can_edit: may_mutate(viewer, department),
            }
        })
        .collect()
}

/// Context every page gets: who is looking.
pub fn base_context(title: &str, viewer: &Viewer) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("authenticated", &viewer.is_authenticated());
    context.insert("viewer_id", &viewer.user_id());
    context.insert("is_admin", &viewer.principal().is_some_and(|p| p.is_admin));
    context.insert("version", env!("CARGO_PKG_VERSION"));
    context
}

pub fn render(template: &str, context: &Context) -> Result<HttpResponse, AppError> {
    let rendered = TEMPLATES.render(template, context).map_err(|e| {
        log::error!("Failed to render template: {}", e);
        AppError::TemplateError(e)
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered))
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", location))
        .finish()
}
