use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::error::InternalError;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use finterm_core::{NerOptions, TermTypes};
use finterm_services::catalog::NER_MODELS;
use finterm_services::{
    available_models, model_info, AbbrMethod, CorrMethod, EmbeddingOptions, ErrorOptions, GenMethod,
    GenRequest, LlmOptions, ServiceError, Services, StdOptions,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NerRequest {
    text: String,
    #[serde(default)]
    options: NerOptions,
    #[serde(default)]
    term_types: TermTypes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StdRequest {
    text: String,
    #[serde(default)]
    options: StdOptions,
    embedding_options: Option<EmbeddingOptions>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AbbrRequest {
    text: String,
    #[serde(default)]
    context: String,
    #[serde(default)]
    method: AbbrMethod,
    #[serde(default)]
    llm_options: LlmOptions,
    embedding_options: Option<EmbeddingOptions>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorrRequest {
    text: String,
    #[serde(default)]
    method: CorrMethod,
    #[serde(default)]
    error_options: ErrorOptions,
    #[serde(default)]
    llm_options: LlmOptions,
}

#[derive(Deserialize)]
struct GenerateRequest {
    #[serde(flatten)]
    request: GenRequest,
    #[serde(default)]
    method: GenMethod,
    #[serde(default, rename = "llmOptions")]
    llm_options: LlmOptions,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(services: Arc<Services>, host: &str, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(web::Data::new(services.clone()))
                .configure(configure)
        })
        .bind((host, port))?
        .run()
        .await
    }
}

/// Register the JSON body config and every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        InternalError::from_response(err, detail_response(StatusCode::BAD_REQUEST, detail)).into()
    }))
    .route("/healthz", web::get().to(health))
    .route("/api/config", web::get().to(get_config))
    .route("/api/ner", web::post().to(recognize))
    .route("/api/std", web::post().to(standardize))
    .route("/api/abbr", web::post().to(expand_abbreviations))
    .route("/api/corr", web::post().to(correct))
    .route("/api/gen", web::post().to(generate));
}

fn detail_response(status: StatusCode, detail: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "detail": detail.into() }))
}

pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::InvalidInput(_) | ServiceError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
        ServiceError::Core(finterm_core::Error::IndexNotFound(_)) => StatusCode::NOT_FOUND,
        ServiceError::Core(finterm_core::Error::InvalidDimension { .. })
        | ServiceError::Core(finterm_core::Error::InvalidConfig(_)) => StatusCode::BAD_REQUEST,
        e if e.is_upstream() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn service_error(context: &str, err: ServiceError) -> HttpResponse {
    let status = status_for(&err);
    error!(status = status.as_u16(), "Error in {}: {}", context, err);
    detail_response(status, err.to_string())
}

async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}

async fn get_config(services: web::Data<Arc<Services>>) -> ActixResult<HttpResponse> {
    let config = services.config();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": {
            "embedding": config.embedding_options(),
            "model_info": model_info(&config.embedding_model),
            "available_models": available_models(),
            "ner_models": NER_MODELS,
            "overlap_policy": config.overlap_policy,
        }
    })))
}

async fn recognize(
    services: web::Data<Arc<Services>>,
    req: web::Json<NerRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    info!(chars = req.text.chars().count(), options = ?req.options, term_types = ?req.term_types, "NER request");

    match services.ner().process(&req.text, &req.options, &req.term_types).await {
        Ok(output) => Ok(HttpResponse::Ok().json(output)),
        Err(e) => Ok(service_error("NER processing", e)),
    }
}

async fn standardize(
    services: web::Data<Arc<Services>>,
    req: web::Json<StdRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    let embedding = req
        .embedding_options
        .unwrap_or_else(|| services.config().embedding_options());
    info!(chars = req.text.chars().count(), options = ?req.options, db_name = %embedding.db_name, "Standardization request");

    match services.standardizer().standardize(&req.text, &req.options, &embedding).await {
        Ok(output) => Ok(HttpResponse::Ok().json(output)),
        Err(e) => Ok(service_error("standardization processing", e)),
    }
}

async fn expand_abbreviations(
    services: web::Data<Arc<Services>>,
    req: web::Json<AbbrRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    let embedding = req
        .embedding_options
        .unwrap_or_else(|| services.config().embedding_options());

    match services
        .abbr()
        .expand(req.method, &req.text, &req.context, &req.llm_options, &embedding)
        .await
    {
        Ok(output) => Ok(HttpResponse::Ok().json(output)),
        Err(e) => Ok(service_error("abbreviation expansion", e)),
    }
}

async fn correct(
    services: web::Data<Arc<Services>>,
    req: web::Json<CorrRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();

    match services
        .corr()
        .correct(req.method, &req.text, &req.error_options, &req.llm_options)
        .await
    {
        Ok(output) => Ok(HttpResponse::Ok().json(output)),
        Err(e) => Ok(service_error("correction processing", e)),
    }
}

async fn generate(
    services: web::Data<Arc<Services>>,
    req: web::Json<GenerateRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();

    match services.generator().generate(req.method, &req.request, &req.llm_options).await {
        Ok(output) => Ok(HttpResponse::Ok().json(output)),
        Err(e) => Ok(service_error("financial content generation", e)),
    }
}
