use actix_web::{middleware::Compress, web, App, HttpServer};
use anyhow::Context;
use utoipa_swagger_ui::SwaggerUi;

use qcm_generator::auth::StaticUsers;
use qcm_generator::config::Settings;
use qcm_generator::openapi::api_doc;
use qcm_generator::repo::csv_file::CsvQuestionRepo;
use qcm_generator::{config, AppState};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Bootstrapping QCM generator");
    let settings = Settings::from_env();

    let repo = CsvQuestionRepo::open(&settings.questions_path).with_context(|| {
        format!("failed to load question table '{}'", settings.questions_path.display())
    })?;
    info!("Serving questions from '{}'", repo.path().display());

    let state = web::Data::new(AppState {
        repo: Arc::new(repo),
        users: Arc::new(StaticUsers::default()),
    });
    let openapi = api_doc();
    info!("OpenAPI spec generated");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .app_data(state.clone())
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
    })
    .bind((settings.host.as_str(), settings.port))?;

    info!("Listening on http://{}:{}", settings.host, settings.port);

    server.run().await?;
    Ok(())
}
