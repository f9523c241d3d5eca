use super::SourceFetcher;
use crate::shared::ids::random_hex_id;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Downloads products over HTTP and remembers where each one landed.
///
/// The cache is keyed by reference. An entry whose file has disappeared is
/// dropped and the product is downloaded again.
pub struct HttpSourceFetcher {
    agent: ureq::Agent,
    authorization: Option<String>,
    cache: Mutex<HashMap<String, PathBuf>>,
}

impl HttpSourceFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self::with_agent(ureq::AgentBuilder::new().timeout(timeout).build())
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self {
            agent,
            authorization: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Sends HTTP basic credentials with every product request, as data hubs
    /// such as the Copernicus Open Access Hub require.
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        let token = STANDARD.encode(format!("{username}:{password}"));
        self.authorization = Some(format!("Basic {token}"));
        self
    }

    fn cached(&self, reference: &str) -> Option<PathBuf> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match cache.get(reference) {
            Some(path) if path.is_file() => Some(path.clone()),
            Some(_) => {
                cache.remove(reference);
                None
            }
            None => None,
        }
    }

    fn remember(&self, reference: &str, path: &Path) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(reference.to_string(), path.to_path_buf());
    }
}

impl SourceFetcher for HttpSourceFetcher {
    fn fetch(&self, reference: &str, out_dir: &Path) -> io::Result<PathBuf> {
        if let Some(path) = self.cached(reference) {
            info!(reference, path = %path.display(), "returning cached product");
            return Ok(path);
        }

        info!(reference, "downloading product");
        let mut request = self
            .agent
            .get(reference)
            .set("Accept", "application/octet-stream");
        if let Some(authorization) = &self.authorization {
            request = request.set("Authorization", authorization);
        }
        let response = request
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(status, _) => {
                    warn!(reference, status, "product request rejected");
                    io::Error::other(format!("GET {reference} returned status {status}"))
                }
                other => io::Error::other(format!("GET {reference} failed: {other}")),
            })?;

        if response.header("Content-Length").map(str::trim) == Some("0") {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no product available for `{reference}`"),
            ));
        }

        let file_name = response
            .header("Content-Disposition")
            .and_then(file_name_from_disposition)
            .or_else(|| file_name_from_url(reference))
            .unwrap_or_else(|| hashed_file_name(reference));

        fs::create_dir_all(out_dir)?;
        let target = out_dir.join(&file_name);
        // Unique per fetch: concurrent runs may download the same product.
        let nonce = random_hex_id(6).map_err(io::Error::other)?;
        let partial = out_dir.join(format!(".{file_name}.{nonce}.part"));
        let mut reader = response.into_reader();
        let copied = fs::File::create(&partial).and_then(|mut file| io::copy(&mut reader, &mut file));
        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(err) => {
                let _ = fs::remove_file(&partial);
                return Err(err);
            }
        };
        fs::rename(&partial, &target)?;
        debug!(reference, bytes, path = %target.display(), "product downloaded");

        self.remember(reference, &target);
        Ok(target)
    }
}

/// Only the last path component is kept so a header cannot escape `out_dir`.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw
        .trim()
        .trim_matches('"')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

/// Reads `filename*=` (RFC 5987) or `filename=` from a Content-Disposition
/// header, preferring the extended form.
pub(crate) fn file_name_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    for part in header.split(';').map(str::trim) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = value.trim().rsplit("''").next().unwrap_or_default();
                let decoded = urlencoding::decode(encoded).ok()?;
                if let Some(name) = sanitize_file_name(&decoded) {
                    return Some(name);
                }
            }
            "filename" => plain = sanitize_file_name(value),
            _ => {}
        }
    }
    plain
}

/// Last URL path segment, percent-decoded. OData style `$value` segments
/// carry no name and are skipped.
pub(crate) fn file_name_from_url(reference: &str) -> Option<String> {
    let without_query = reference.split(['?', '#']).next().unwrap_or_default();
    let after_scheme = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);
    let (_, path) = after_scheme.split_once('/')?;
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    if segment.starts_with('$') {
        return None;
    }
    let decoded = urlencoding::decode(segment).ok()?;
    sanitize_file_name(&decoded)
}

pub(crate) fn hashed_file_name(reference: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(reference.as_bytes()));
    format!("product-{}", &digest[..16])
}
