use crate::error::ApiErrorBody;
use crate::models::{Answer, NewQuestion, QcmResponse, Question, QuestionCount, StatusResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::check_status,
        crate::routes::generate_qcm,
        crate::routes::add_question,
    ),
    components(schemas(
        Question, NewQuestion, Answer, QuestionCount,
        QcmResponse, StatusResponse, ApiErrorBody
    )),
    tags(
        (name = "Basic APIs", description = "Endpoints accessible to all users"),
        (name = "Admin APIs", description = "Endpoints accessible to admin users only"),
    )
)]
pub struct ApiDoc;

/// OpenAPI document with the service's own title and version.
pub fn api_doc() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = "QCM_Generator".into();
    doc.info.description = Some("Generator of sample QCM about Data Engineer".into());
    doc.info.version = env!("CARGO_PKG_VERSION").into();
    doc
}
