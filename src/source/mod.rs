//! Acquisition of input products (satellite scenes, reference files).

pub mod http;
pub mod local;

pub use http::HttpSourceFetcher;
pub use local::LocalSourceFetcher;

use std::io;
use std::path::{Path, PathBuf};

/// Makes the product behind `reference` available as a file in `out_dir`.
pub trait SourceFetcher: Send + Sync {
    fn fetch(&self, reference: &str, out_dir: &Path) -> io::Result<PathBuf>;
}

pub fn is_http_reference(reference: &str) -> bool {
    let lower = reference.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Dispatches on the reference scheme: `http(s)://` goes to the HTTP
/// fetcher, everything else is treated as a local file.
pub struct RoutingSourceFetcher {
    http: HttpSourceFetcher,
    local: LocalSourceFetcher,
}

impl RoutingSourceFetcher {
    pub fn new(http: HttpSourceFetcher, local: LocalSourceFetcher) -> Self {
        Self { http, local }
    }
}

impl SourceFetcher for RoutingSourceFetcher {
    fn fetch(&self, reference: &str, out_dir: &Path) -> io::Result<PathBuf> {
        if is_http_reference(reference) {
            self.http.fetch(reference, out_dir)
        } else {
            self.local.fetch(reference, out_dir)
        }
    }
}
