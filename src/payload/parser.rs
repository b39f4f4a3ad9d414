use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use bytes::Bytes;
use serde_json::{Map, Value};

use super::{Payload, Upload, PROFILE_PICTURE_FIELD};

/// Decode a JSON, form-urlencoded or multipart body into a [`Payload`].
/// An empty body decodes to no fields so validation can report what is missing.
pub async fn parse(headers: &HeaderMap, body: Bytes) -> Result<Payload, String> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());

    if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        return parse_multipart(headers, body).await;
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::default());
    }

    let value: Value = match content_type {
        Some(ct) if ct.contains("application/x-www-form-urlencoded") => parse_form_urlencoded(&body)?,
        Some(ct) if ct.contains("application/json") => {
            serde_json::from_slice(&body).map_err(|e| format!("Invalid JSON: {e}"))?
        }
        // Try JSON first, then form-urlencoded
        _ => serde_json::from_slice(&body)
            .or_else(|_| parse_form_urlencoded(&body))
            .map_err(|e| format!("Unable to parse body: {e}"))?,
    };

    match value {
        Value::Object(fields) => Ok(Payload { fields, upload: None }),
        _ => Err("Request body must be an object".to_string()),
    }
}

fn parse_form_urlencoded(body: &[u8]) -> Result<Value, String> {
    std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;
    let map: Map<String, Value> = form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    Ok(Value::Object(map))
}

/// Parse multipart form data using multer. Text parts become string fields;
/// a non-empty file part named `profile_picture` becomes the upload.
async fn parse_multipart(headers: &HeaderMap, body: Bytes) -> Result<Payload, String> {
    let boundary = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut payload = Payload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(|m| m.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| format!("File read error: {e}"))?;
            if name == PROFILE_PICTURE_FIELD && !data.is_empty() {
                payload.upload = Some(Upload {
                    file_name,
                    content_type,
                    data,
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| format!("Field read error: {e}"))?;
        payload.fields.insert(name, Value::String(value));
    }

    Ok(payload)
}
