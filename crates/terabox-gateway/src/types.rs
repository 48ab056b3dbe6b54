//! Gateway response types

use expiring_cache::CacheStats;
use serde::{Deserialize, Serialize};
use terabox_resolver::{human_size, ResolvedFile};

/// File metadata returned by the resolution endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfoResponse {
    pub file_name: String,
    pub download_link: String,
    pub thumbnail: Option<String>,
    pub file_size: String,
    pub size_bytes: u64,
    pub proxy_url: String,
}

impl FileInfoResponse {
    /// Compose the client-facing payload from a cached record.
    ///
    /// The proxy URL embeds the requesting host and scheme, so it is rebuilt
    /// on every response rather than stored with the record.
    pub fn compose(record: &ResolvedFile, scheme: &str, host: &str) -> Self {
        let proxy_url = format!(
            "{}://{}/proxy?url={}&file_name={}",
            scheme,
            host,
            urlencoding::encode(&record.download_link),
            urlencoding::encode(&record.file_name),
        );

        Self {
            file_name: record.file_name.clone(),
            download_link: record.download_link.clone(),
            thumbnail: record.thumbnail.clone(),
            file_size: human_size(record.size_bytes),
            size_bytes: record.size_bytes,
            proxy_url,
        }
    }
}

/// Request body for POST /
#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub link: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ResolvedFile {
        ResolvedFile {
            file_name: "my file.mkv".to_string(),
            download_link: "https://d.terabox.com/file/abc?dstime=1700000000".to_string(),
            thumbnail: None,
            size_bytes: 1_610_612_736,
        }
    }

    #[test]
    fn test_compose_builds_proxy_url_for_request_origin() {
        let info = FileInfoResponse::compose(&sample_record(), "https", "example.com");

        assert!(info.proxy_url.starts_with("https://example.com/proxy?url="));
        // query-string metacharacters in the download link are escaped
        assert!(info
            .proxy_url
            .contains("url=https%3A%2F%2Fd.terabox.com%2Ffile%2Fabc%3Fdstime%3D1700000000"));
        assert!(info.proxy_url.ends_with("&file_name=my%20file.mkv"));
    }

    #[test]
    fn test_compose_derives_human_size() {
        let info = FileInfoResponse::compose(&sample_record(), "http", "localhost:8080");

        assert_eq!(info.file_size, "1.50 GB");
        assert_eq!(info.size_bytes, 1_610_612_736);
    }

    #[test]
    fn test_file_info_serialization_field_names() {
        let info = FileInfoResponse::compose(&sample_record(), "http", "localhost:8080");

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"file_name\""));
        assert!(json.contains("\"download_link\""));
        assert!(json.contains("\"file_size\":\"1.50 GB\""));
        assert!(json.contains("\"size_bytes\":1610612736"));
        assert!(json.contains("\"proxy_url\""));
    }

    #[test]
    fn test_link_request_deserialization() {
        let req: LinkRequest =
            serde_json::from_str(r#"{"link": "https://terabox.com/s/1abc123"}"#).unwrap();
        assert_eq!(req.link, "https://terabox.com/s/1abc123");

        assert!(serde_json::from_str::<LinkRequest>(r#"{}"#).is_err());
    }
}
