//! Loading and building of everything the scene draws.
//!
//! - `font` fetches and parses typeface JSON files
//! - `text` turns glyph outlines into extruded meshes
//! - `cube` builds the glow cube

pub mod cube;
pub mod font;
pub mod text;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid url `{0}`")]
    Url(String),
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> Result<reqwest::Url, LoadError> {
    if is_remote(file_name) {
        return reqwest::Url::parse(file_name).map_err(|_| LoadError::Url(file_name.to_string()));
    }
    let origin = web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .ok_or_else(|| LoadError::Url(file_name.to_string()))?;
    reqwest::Url::parse(&format!("{}/assets/", origin))
        .and_then(|base| base.join(file_name))
        .map_err(|_| LoadError::Url(file_name.to_string()))
}

/// Loads a text resource.
///
/// `http(s)://` sources are fetched over the network. Anything else is a file
/// under `./assets/` (or an absolute path) natively, and a path relative to
/// `<origin>/assets/` on the web.
pub async fn load_string(source: &str) -> Result<String, LoadError> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(source)?;
        reqwest::get(url).await?.error_for_status()?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = if is_remote(source) {
        reqwest::get(source).await?.error_for_status()?.text().await?
    } else {
        let path = std::path::Path::new("./").join("assets").join(source);
        tokio::fs::read_to_string(path).await?
    };

    Ok(txt)
}
