use axum::routing::{get, post, put};
use axum::Router;

use grimoire_application::AppState;

use crate::handlers::{import_handlers, ops_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/imports",
            get(import_handlers::list_imports).post(import_handlers::create_import),
        )
        .route("/v1/preview", post(import_handlers::preview_import))
        .route("/v1/imports/:id", get(import_handlers::get_import))
        .route(
            "/v1/imports/:id/review/:kind/:list/:index/:action",
            post(import_handlers::review_entry),
        )
        .route(
            "/v1/imports/:id/review/:kind/:list/:index",
            put(import_handlers::edit_candidate),
        )
        .route("/v1/imports/:id/continue", post(import_handlers::continue_import))
        .route(
            "/v1/imports/:id/asi",
            post(import_handlers::add_asi)
                .put(import_handlers::edit_asi)
                .delete(import_handlers::remove_asi),
        )
        .route("/v1/imports/:id/confirm", post(import_handlers::confirm_character))
        .route("/v1/imports/:id/save", post(import_handlers::save_import))
        .route("/v1/imports/:id/resume", post(import_handlers::resume_import))
        .route("/v1/imports/:id/cancel", post(import_handlers::cancel_import))
        .route("/v1/imports/:id/reset", post(import_handlers::reset_import))
        .route("/v1/ops/health/live", get(ops_handlers::health_live))
        .route("/v1/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v1/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
