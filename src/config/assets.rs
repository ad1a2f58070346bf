//! Resolution of stored asset paths against the configured base URL.

use url::Url;

use super::Config;
use crate::validation::is_url;

/// Turns stored asset paths into URLs a browser can load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrlResolver {
    base: Url,
}

impl AssetUrlResolver {
    pub fn new(mut base: Url) -> Self {
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.asset_base_url.clone())
    }

    /// Absolute `http(s)` URLs pass through and relative paths are joined
    /// onto the base. Anything else with a scheme resolves to `None`.
    pub fn resolve(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        if Url::parse(path).is_ok() {
            return is_url(path).then(|| path.to_string());
        }
        self.base
            .join(path.trim_start_matches('/'))
            .ok()
            .filter(|url| url.origin() == self.base.origin())
            .map(Into::into)
    }
}
