use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpResponse, HttpServer, Responder};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use env_logger::Env;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod invoice;
pub mod services;
pub mod state;

pub use crate::state::AppState;

use crate::config::AppConfig;

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn bad_gateway(message: &str) -> Self {
        Self::new("BadGateway", message)
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health,
        crate::invoice::routes::get_draft,
        crate::invoice::routes::apply_change,
        crate::invoice::routes::reset_draft,
        crate::invoice::routes::preview,
        crate::invoice::routes::download_pdf,
        crate::invoice::routes::send_invoice
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            invoice::model::LineItem,
            invoice::model::InvoiceContext,
            invoice::model::InvoiceDraft,
            invoice::model::DerivedContent,
            invoice::model::FieldChange,
            invoice::routes::DraftResponse,
            invoice::routes::SendInvoiceRequest,
            invoice::routes::SendInvoiceResponse,
        )
    ),
    tags(
        (name = "Invoice", description = "Rent invoice form, PDF rendering and email delivery."),
        (name = "Health", description = "Liveness probe.")
    )
)]
pub struct ApiDoc;

fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app_state = web::Data::new(
        AppState::new(&config).context("failed to build the HTTP client for invoice services")?,
    );

    if config.api_key.is_none() {
        log::warn!("API_KEY is not set; render and email requests will be sent without x-api-key");
    }
    log::info!(
        "Render service: {}, email service: {}",
        config.render_api_url,
        config.email_api_url
    );

    let prometheus = PrometheusMetricsBuilder::new("rent_invoice_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    let (host, port) = config.bind_addr();
    log::info!("Starting server at http://{}:{}", host, port);

    let allowed_origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors(&allowed_origins))
            .app_data(app_state.clone())
            .service(web::scope("/api").configure(invoice::routes::config))
            .service(web::resource("/health").route(web::get().to(health)))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((host.as_str(), port))
    .with_context(|| format!("failed to bind {}:{}", host, port))?
    .run()
    .await?;

    Ok(())
}
