use axum::http::HeaderValue;
use axum::{middleware, routing::get, routing::post, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{state::AppState, tasks};

pub mod health;
pub mod mail;
pub mod recruitment;
pub mod storage_files;
pub mod uploads;

fn cors_layer(allowed: Option<&str>) -> CorsLayer {
    let allow_origin = match allowed {
        Some(origins) => {
            let headers: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .filter_map(|value| match value.parse::<HeaderValue>() {
                    Ok(header) => Some(header),
                    Err(_) => {
                        tracing::warn!(origin = %value, "ignoring invalid CORS allowed origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(headers)
        }
        None => AllowOrigin::mirror_request(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router<()> {
    let cors = cors_layer(state.config.cors_allowed_origin.as_deref());

    let cc_routes = Router::new()
        .route("/applications", get(recruitment::cc_applications))
        .route("/applied", get(recruitment::have_applied_for_cc))
        .route("/apply", post(recruitment::cc_apply));

    let storage_routes = Router::new()
        .route(
            "/",
            get(storage_files::list_storage_files).post(storage_files::create_storage_file),
        )
        .route(
            "/:id",
            get(storage_files::get_storage_file)
                .patch(storage_files::update_storage_file)
                .delete(storage_files::delete_storage_file),
        );

    let api_routes = Router::new()
        .nest("/api/cc", cc_routes)
        .nest("/api/storagefiles", storage_routes)
        .route("/api/mail/send", post(mail::send_mail))
        .route("/api/signed-upload-url", get(uploads::signed_upload_url))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tasks::run_deferred_tasks,
        ));

    Router::new()
        .merge(api_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
