use std::borrow::Cow;

use rust_embed::RustEmbed;

/// Embed the entire `assets/` directory (the pre-built pages) into the binary.
#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedAssets;

pub struct Asset {
    pub data: Cow<'static, [u8]>,
    pub mime: &'static str,
}

/// Look up an embedded file by request path. Directory paths (`/`,
/// `/auction/`, `/auction`) resolve to their `index.html`.
pub fn lookup(path: &str) -> Option<Asset> {
    let canonical = canonical_asset_path(path)?;
    if let Some(file) = EmbeddedAssets::get(&canonical) {
        return Some(Asset {
            data: file.data,
            mime: guess_mime(&canonical),
        });
    }

    let index = if canonical.is_empty() {
        "index.html".to_string()
    } else {
        format!("{}/index.html", canonical.trim_end_matches('/'))
    };
    EmbeddedAssets::get(&index).map(|file| Asset {
        data: file.data,
        mime: guess_mime(&index),
    })
}

/// The HTML page behind a routed path such as `/dispatch`.
pub fn page(route: &str) -> Option<Asset> {
    lookup(route).filter(|asset| asset.mime.starts_with("text/html"))
}

pub fn list() -> impl Iterator<Item = Cow<'static, str>> {
    EmbeddedAssets::iter()
}

fn canonical_asset_path(path: &str) -> Option<String> {
    let trimmed = path.trim_start_matches('/');
    let trimmed = trimmed.strip_prefix("assets/").unwrap_or(trimmed);
    // Embedded lookups are flat keys, but refuse traversal segments outright.
    if trimmed.split('/').any(|segment| segment == "..") {
        return None;
    }
    Some(trimmed.to_string())
}

fn guess_mime(path: &str) -> &'static str {
    if path.ends_with(".html") {
        "text/html; charset=utf-8"
    } else if path.ends_with(".css") {
        "text/css"
    } else if path.ends_with(".js") {
        "text/javascript"
    } else if path.ends_with(".json") {
        "application/json"
    } else if path.ends_with(".svg") {
        "image/svg+xml"
    } else if path.ends_with(".ico") {
        "image/x-icon"
    } else if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}
