use std::sync::Arc;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::debug;

use crate::auth::{AdminTier, Authorized, BasicTier, UserRepo};
use crate::error::ApiError;
use crate::models::*;
use crate::repo::{filter_and_sample, QuestionRepo};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .service(web::resource("/status").route(web::get().to(check_status)))
    .service(web::resource("/QCM").route(web::get().to(generate_qcm)))
    .service(web::resource("/Questions").route(web::post().to(add_question)));
}

#[derive(Clone)]
pub struct AppState { pub repo: Arc<dyn QuestionRepo>, pub users: Arc<dyn UserRepo> }

#[utoipa::path(
    get,
    path = "/status",
    tag = "Basic APIs",
    params(("Auth_header" = Option<String>, Header, description = "username:password")),
    responses(
        (status = 200, description = "OK", body = StatusResponse),
        (status = 401, description = "Authentication error", body = ApiErrorBody),
        (status = 403, description = "Not enough privileges", body = ApiErrorBody)
    )
)]
pub async fn check_status(_auth: Authorized<BasicTier>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(StatusResponse { status: 1 }))
}

#[derive(Debug, Deserialize)]
pub struct QcmParams {
    #[serde(default)]
    pub n_questions: QuestionCount,
    #[serde(rename = "use")]
    pub usage: Option<String>,
    pub subjects: Option<String>,
}

#[utoipa::path(
    get,
    path = "/QCM",
    tag = "Basic APIs",
    params(
        ("Auth_header" = Option<String>, Header, description = "username:password"),
        ("n_questions" = Option<QuestionCount>, Query, description = "5, 10 or 20 (default 10)"),
        ("use" = Option<String>, Query, description = "Exact use; omitted means any"),
        ("subjects" = Option<String>, Query, description = "Comma separated subjects; omitted means any")
    ),
    responses(
        (status = 200, description = "OK", body = QcmResponse),
        (status = 401, description = "Authentication error", body = ApiErrorBody),
        (status = 403, description = "Not enough privileges", body = ApiErrorBody),
        (status = 404, description = "No questions corresponding to specified use and/or subjects", body = ApiErrorBody),
        (status = 422, description = "Invalid query", body = ApiErrorBody)
    )
)]
pub async fn generate_qcm(
    auth: Authorized<BasicTier>,
    data: web::Data<AppState>,
    query: web::Query<QcmParams>,
) -> Result<HttpResponse, ApiError> {
    let params = query.into_inner();
    let filter = QuizFilter::new(params.usage, params.subjects.as_deref());
    let table = data.repo.snapshot().await?;
    let quiz = filter_and_sample(&table, &filter, params.n_questions.get(), &mut rand::thread_rng())?;
    debug!(
        user = %auth.user.username,
        requested = params.n_questions.get(),
        returned = quiz.questions.len(),
        "quiz drawn"
    );
    Ok(HttpResponse::Ok().json(QcmResponse::from(quiz)))
}

#[utoipa::path(
    post,
    path = "/Questions",
    tag = "Admin APIs",
    request_body = NewQuestion,
    params(("Auth_header" = Option<String>, Header, description = "username:password")),
    responses(
        (status = 200, description = "Question stored", body = Question),
        (status = 401, description = "Authentication error", body = ApiErrorBody),
        (status = 403, description = "Not enough privileges", body = ApiErrorBody),
        (status = 422, description = "Invalid question", body = ApiErrorBody)
    )
)]
pub async fn add_question(
    _auth: Authorized<AdminTier>,
    data: web::Data<AppState>,
    payload: web::Json<NewQuestion>,
) -> Result<HttpResponse, ApiError> {
    let stored = data.repo.append(payload.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(stored))
}
