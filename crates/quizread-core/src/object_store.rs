//! Object storage behind the Library concept.
//!
//! The trait mirrors what book uploads need: hand the client a signed PUT
//! URL, later verify the object landed, serve signed view URLs, and delete
//! on removal. The shipped implementation keeps objects on the local
//! filesystem and signs URLs with HMAC-SHA256.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Everything the client needs to upload one object.
#[derive(Debug, Clone)]
pub struct SignedUpload {
    /// Signed PUT target, valid for a short window.
    pub signed_url: String,
    /// Stable URL the object is reachable at once uploaded.
    pub public_url: String,
    /// Unique object name under which the file will be stored.
    pub file_name: String,
}

pub trait ObjectStore: Send + Sync {
    /// Reserve a unique object name for `file_name` owned by `owner` and
    /// sign an upload URL for it.
    fn prepare_upload(
        &self,
        file_name: &str,
        content_type: &str,
        owner: &str,
    ) -> std::result::Result<SignedUpload, String>;

    /// Signed read URL for an existing object, valid for `minutes`.
    fn signed_view_url(&self, name: &str, minutes: i64) -> std::result::Result<String, String>;

    fn exists(&self, name: &str) -> bool;

    fn delete(&self, name: &str) -> std::result::Result<(), String>;

    fn read(&self, name: &str) -> std::result::Result<Vec<u8>, String>;
}

/// Filesystem-backed store signing URLs against a shared secret.
pub struct LocalObjectStore {
    root: PathBuf,
    base_url: String,
    secret: Vec<u8>,
}

impl LocalObjectStore {
    pub fn new(root: PathBuf, base_url: String, secret: &[u8]) -> Self {
        Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret: secret.to_vec(),
        }
    }

    fn object_path(&self, name: &str) -> std::result::Result<PathBuf, String> {
        if name.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(format!("invalid object name: {name}"));
        }
        Ok(self.root.join(name))
    }

    fn sign(&self, name: &str, expires: i64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(format!("{name}:{expires}").as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    fn signed_url(&self, name: &str, minutes: i64) -> String {
        let expires = Utc::now().timestamp() + minutes * 60;
        let sig = self.sign(name, expires);
        format!("{}/objects/{name}?expires={expires}&sig={sig}", self.base_url)
    }

    /// Check a signature produced by `signed_url`. Used by whatever serves
    /// the objects; the concepts only mint URLs.
    pub fn verify(&self, name: &str, expires: i64, sig: &str) -> bool {
        if expires < Utc::now().timestamp() {
            return false;
        }
        self.sign(name, expires) == sig
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> std::result::Result<(), String> {
        let path = self.object_path(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        fs::write(&path, bytes).map_err(|e| e.to_string())
    }
}

/// Object names are `books/{owner}/{timestamp}_{sanitized file name}`;
/// anything outside `[A-Za-z0-9.-]` in the client file name becomes `_`.
pub fn unique_object_name(file_name: &str, owner: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("books/{owner}/{timestamp}_{sanitized}")
}

impl ObjectStore for LocalObjectStore {
    fn prepare_upload(
        &self,
        file_name: &str,
        content_type: &str,
        owner: &str,
    ) -> std::result::Result<SignedUpload, String> {
        // Parameters after the media type are fine ("application/pdf; charset=binary").
        if !content_type.starts_with("application/pdf") {
            return Err("Only PDF files are allowed".to_string());
        }
        let name = unique_object_name(file_name, owner);
        Ok(SignedUpload {
            signed_url: self.signed_url(&name, 15),
            public_url: format!("{}/objects/{name}", self.base_url),
            file_name: name,
        })
    }

    fn signed_view_url(&self, name: &str, minutes: i64) -> std::result::Result<String, String> {
        self.object_path(name)?;
        Ok(self.signed_url(name, minutes))
    }

    fn exists(&self, name: &str) -> bool {
        self.object_path(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn delete(&self, name: &str) -> std::result::Result<(), String> {
        let path = self.object_path(name)?;
        fs::remove_file(&path).map_err(|_| format!("Failed to delete file: {name}"))
    }

    fn read(&self, name: &str) -> std::result::Result<Vec<u8>, String> {
        let path = self.object_path(name)?;
        fs::read(&path).map_err(|e| e.to_string())
    }
}

/// Object name from a public URL minted by this store, if it is one.
pub fn object_name_from_url(url: &str) -> Option<&str> {
    url.split_once("/objects/").map(|(_, name)| name)
}
