//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use clearcut_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clearcut API",
        version = "0.1.0",
        description = "Background-removal gateway: forwards uploaded images to a segmentation provider and a media vault, and sweeps stored assets past the retention window."
    ),
    paths(
        handlers::health::health,
        handlers::remove::remove_background,
        handlers::remove::remove_info,
        handlers::upload::upload_images,
        handlers::cleanup::run_cleanup,
        handlers::cleanup::cleanup_info,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::health::HealthResponse,
        handlers::upload::UploadBatchResponse,
        models::CleanupReport,
        models::RetentionSummary,
    )),
    tags(
        (name = "remove", description = "Background removal"),
        (name = "upload", description = "Media vault uploads"),
        (name = "cleanup", description = "Retention sweep"),
        (name = "health", description = "Health check")
    )
)]
pub struct ApiDoc;
