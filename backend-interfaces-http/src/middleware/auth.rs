use std::io::Read;

use anyhow::Result;
use axum::http::HeaderMap;
use flate2::read::GzDecoder;

use backend_application::dtos::ManifestUploadRequest;
use backend_domain::RuntimeConfig;

/// Module permission check: the external collaborator hands scanning clients
/// a bearer token; without a configured token the module is open.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

/// Manifest uploads can be large; accept a gzip-compressed JSON body.
pub fn parse_manifest_upload(headers: &HeaderMap, body: &[u8]) -> Result<ManifestUploadRequest> {
    let content = maybe_gunzip(headers, body)?;
    let upload: ManifestUploadRequest = serde_json::from_str(&content)?;
    Ok(upload)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let mut decoder = GzDecoder::new(body);
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn config(token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            api_token: token.map(ToString::to_string),
            ..RuntimeConfig::default()
        }
    }

    #[test]
    fn open_module_without_token() {
        assert!(authorize(&config(None), &HeaderMap::new()));
    }

    #[test]
    fn bearer_token_must_match() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer secret"));
        assert!(authorize(&config(Some("secret")), &headers));
        assert!(!authorize(&config(Some("other")), &headers));
        assert!(!authorize(&config(Some("secret")), &HeaderMap::new()));
    }

    #[test]
    fn gzip_upload_is_decoded() {
        let payload = r#"{"file_name":"m.csv","content":"SKU,QTY\nABC,1\n"}"#;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload.as_bytes()).unwrap();
        let body = encoder.finish().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("Content-Encoding", HeaderValue::from_static("gzip"));
        let upload = parse_manifest_upload(&headers, &body).expect("decode");
        assert_eq!(upload.file_name, "m.csv");
        assert!(upload.content.starts_with("SKU,QTY"));
    }

    #[test]
    fn plain_upload_is_decoded() {
        let payload = r#"{"file_name":"m.csv","content":"SKU\n"}"#;
        let upload = parse_manifest_upload(&HeaderMap::new(), payload.as_bytes()).expect("decode");
        assert_eq!(upload.file_name, "m.csv");
    }
}
