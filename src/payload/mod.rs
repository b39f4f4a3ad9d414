pub mod parser;
pub mod upload;

use bytes::Bytes;
use serde_json::{Map, Value};

/// A decoded request body: plain fields plus at most one uploaded file.
#[derive(Debug, Default)]
pub struct Payload {
    pub fields: Map<String, Value>,
    pub upload: Option<Upload>,
}

/// A file part held in memory until the request has been validated.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Multipart field that carries the employee profile picture.
pub const PROFILE_PICTURE_FIELD: &str = "profile_picture";
