//! Route handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use crossmark_core::{process, CrossPosition, MarkSummary, Outcome, StoredImage};
use minijinja::context;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{AppState, CaptchaWidget};
use crate::form::{fields, FieldErrors, FormValues, ImageForm};

/// An unexpected failure, answered with a bare 500.
pub struct AppError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("{:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

#[derive(Serialize)]
struct PositionChoice {
    value: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct IndexPage<'a> {
    form: &'a FormValues,
    errors: &'a FieldErrors,
    positions: Vec<PositionChoice>,
    csrf_token: String,
    captcha: Option<&'a CaptchaWidget>,
    image_name: Option<&'a str>,
    image_name_proc: Option<&'a str>,
    save_color_image: Option<&'a str>,
    save_color_new_image: Option<&'a str>,
    mark: Option<MarkSummary>,
    error: Option<&'a str>,
}

fn url(image: Option<&StoredImage>) -> Option<&str> {
    image.map(|stored| stored.url.as_str())
}

fn render_index(
    state: &AppState,
    form: &FormValues,
    errors: &FieldErrors,
    outcome: Option<&Outcome>,
    error: Option<&str>,
) -> Result<Html<String>, AppError> {
    let page = IndexPage {
        form,
        errors,
        positions: CrossPosition::ALL
            .iter()
            .map(|p| PositionChoice {
                value: p.as_str(),
                label: p.label(),
            })
            .collect(),
        csrf_token: state.csrf.issue(),
        captcha: state.captcha_widget.as_ref(),
        image_name: url(outcome.and_then(|o| o.upload.as_ref())),
        image_name_proc: url(outcome.and_then(|o| o.marked.as_ref())),
        save_color_image: url(outcome.and_then(|o| o.original_colors.as_ref())),
        save_color_new_image: url(outcome.and_then(|o| o.processed_colors.as_ref())),
        mark: outcome.and_then(|o| o.mark),
        error,
    };
    Ok(Html(state.templates.render("index.html", page)?))
}

/// `GET /`
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let form = FormValues {
        cross_position: CrossPosition::default().as_str().to_string(),
        ..FormValues::default()
    };
    render_index(&state, &form, &FieldErrors::default(), None, None)
}

/// `GET /info`
pub async fn info(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(
        state
            .templates
            .render("info.html", context! { title => "about" })?,
    ))
}

/// `POST /`
pub async fn submit(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let form = match ImageForm::from_multipart(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Rejected malformed form body: {e}");
            return Ok((e.status(), e.body_text()).into_response());
        }
    };

    let values = form.values.clone();
    let mut errors = FieldErrors::default();

    if let Err(e) = state.csrf.verify(form.csrf_token.as_deref()) {
        errors.add(fields::CSRF, e.to_string());
    }

    let remote_ip = connect_info.map(|ConnectInfo(addr)| addr.ip());
    if let Err(rejection) = state
        .captcha
        .verify(form.captcha_response.as_deref(), remote_ip)
        .await
    {
        errors.add(fields::CAPTCHA, rejection.to_string());
    }

    let Some(submission) = form.into_submission(&mut errors) else {
        debug!("Form rejected: {errors:?}");
        return Ok(render_index(&state, &values, &errors, None, None)?.into_response());
    };

    info!(
        "Processing {} ({} bytes, {})",
        submission.file_name,
        submission.data.len(),
        submission.position
    );

    let worker = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        process(worker.store.as_ref(), &submission, &worker.options)
    })
    .await?;

    match result {
        Ok(outcome) => {
            let page = render_index(&state, &values, &errors, Some(&outcome), None)?;
            Ok(page.into_response())
        }
        Err(failure) => {
            error!("Processing failed: {failure}");
            let message = failure.to_string();
            let page = render_index(
                &state,
                &values,
                &errors,
                Some(&failure.partial),
                Some(&message),
            )?;
            Ok((StatusCode::INTERNAL_SERVER_ERROR, page).into_response())
        }
    }
}
