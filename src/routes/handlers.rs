//! Request handlers: validate, extract, normalize, respond

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::extractor::MediaExtractor;
use crate::normalize::{select_formats, MediaResult, NormalizedFormat};
use crate::platform::Platform;
use crate::probe::MediaProber;
use crate::routes::AppContext;

/// yt-dlp points thumbnail-less posts at its FAQ; never serve that as an image
const YTDLP_FAQ_MARKER: &str = "yt-dlp/wiki/FAQ";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

pub async fn index() -> Json<Value> {
    Json(json!({ "msg": "API is running" }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    url: String,
}

/// GET /download/{platform}?url=...
pub async fn download(
    State(ctx): State<AppContext>,
    Path(platform): Path<Platform>,
    Query(query): Query<DownloadQuery>,
) -> Result<Json<MediaResult>, ApiError> {
    if !platform.matches_url(&query.url) {
        return Err(ApiError::InvalidUrl(platform.name()));
    }

    let url = platform.sanitize_url(&query.url);
    let policy = platform.policy();

    info!(platform = platform.name(), url, "extracting media info");

    let info = match ctx.extractor.extract(url, &ctx.extractor_config).await {
        Ok(info) => info,
        Err(e) if policy.image_fallback => {
            // Image-only posts make yt-dlp fail outright; the page itself
            // may still yield a usable og:image.
            warn!(platform = platform.name(), error = %e, "extraction failed, trying image fallback");
            return image_result(&ctx, url, None, None)
                .await
                .ok_or(ApiError::Extraction(e))
                .map(Json);
        }
        Err(e) => return Err(e.into()),
    };

    let selected = select_formats(&info.formats, &policy);

    if selected.is_empty() {
        if policy.image_fallback {
            if let Some(result) =
                image_result(&ctx, url, info.thumbnail.as_deref(), Some(info.title)).await
            {
                return Ok(Json(result));
            }
        }
        return Err(ApiError::NoFormats);
    }

    // Size resolution is sequential: one HEAD probe per size-less format
    let mut formats = Vec::with_capacity(selected.len());
    for s in selected {
        let file_size = ctx.prober.resolve_size(s.declared_size, &s.download_url).await;
        formats.push(NormalizedFormat {
            quality: s.quality,
            file_size,
            download_url: s.download_url,
        });
    }

    Ok(Json(MediaResult::video(info.title, info.thumbnail, formats)))
}

/// Build an image-only result from the page thumbnail or a page scrape
async fn image_result(
    ctx: &AppContext,
    page_url: &str,
    thumbnail: Option<&str>,
    title: Option<String>,
) -> Option<MediaResult> {
    let image_url = match thumbnail.filter(|t| !t.is_empty() && !t.contains(YTDLP_FAQ_MARKER)) {
        Some(t) => t.to_string(),
        None => ctx.prober.scrape_og_image(page_url).await?,
    };

    let file_size = ctx.prober.resolve_size(None, &image_url).await;
    Some(MediaResult::image(
        title.unwrap_or_else(|| "Image".to_string()),
        image_url,
        file_size,
    ))
}
