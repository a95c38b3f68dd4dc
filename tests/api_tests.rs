mod common;

use std::sync::Arc;

use actix_web::{test, web, App};
use common::{test_state, MockMailer, MockRenderer};
use rent_invoice_server::invoice::FieldChange;
use rent_invoice_server::{health, ApiDoc, ErrorResponse, HealthResponse};
use utoipa::OpenApi;

#[actix_web::test]
async fn test_health() {
    let app = test::init_service(
        App::new().service(web::resource("/health").route(web::get().to(health))),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp: HealthResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp.status, "ok");
    assert_eq!(resp.version, env!("CARGO_PKG_VERSION"));
}

#[::core::prelude::v1::test]
fn test_openapi_lists_invoice_routes() {
    let doc = ApiDoc::openapi();
    let paths = &doc.paths.paths;

    for path in [
        "/health",
        "/api/invoice",
        "/api/invoice/changes",
        "/api/invoice/reset",
        "/api/invoice/preview",
        "/api/invoice/pdf",
        "/api/invoice/send",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
}

#[::core::prelude::v1::test]
fn test_error_response() {
    let error = ErrorResponse::bad_gateway("render service responded with status 500");
    assert_eq!(error.error, "BadGateway");
    assert!(!error.timestamp.is_empty());

    let json = serde_json::to_string(&ErrorResponse::bad_request("line item 4 does not exist"))
        .unwrap();
    let back: ErrorResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(back.error, "BadRequest");
    assert_eq!(back.message, "line item 4 does not exist");
}

#[::core::prelude::v1::test]
fn test_concurrent_changes_are_all_applied() {
    let state = Arc::new(test_state(
        Arc::new(MockRenderer::default()),
        Arc::new(MockMailer::default()),
        None,
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            std::thread::spawn(move || {
                state.apply_change(FieldChange::AddRow).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let draft = state.snapshot();
    assert_eq!(draft.context.line_items.len(), 11);
    assert_eq!(draft.context.invoice_number, "00220");
}
