use actix_web::HttpResponse;
use serde::Serialize;

use crate::{
    auth::Viewer,
    errors::AppError,
    view::{base_context, render},
};

pub mod auth;
pub mod departments;
pub mod index;
pub mod jobs;
pub mod news;

/// Renders a form page, echoing the submitted values and an optional error.
pub(crate) fn form_page<F: Serialize>(
    template: &str,
    title: &str,
    form: &F,
    error: Option<&AppError>,
    viewer: &Viewer,
) -> Result<HttpResponse, AppError> {
    let mut context = base_context(title, viewer);
    context.insert("form", form);
    if let Some(error) = error {
        context.insert("message", &error.to_string());
    }
    render(template, &context)
}
