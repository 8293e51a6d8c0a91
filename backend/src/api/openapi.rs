//! OpenAPI document generated from handler annotations via utoipa.

use utoipa::OpenApi;

/// Root OpenAPI document; handler modules merge their own paths into it.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Download Tracker API",
        description = "Records download intent signals sent by the project website.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
)]
pub struct ApiDoc;

/// Build the merged OpenAPI document from all handler modules.
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(super::handlers::downloads::DownloadsApiDoc::openapi());
    doc.merge(super::handlers::health::HealthApiDoc::openapi());
    doc
}
