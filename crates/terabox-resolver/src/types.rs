//! Resolution result and origin wire types

use serde::{Deserialize, Serialize};

/// Metadata for a successfully resolved share link.
///
/// The download link is time-limited by the origin; entries are cached only
/// for the gateway's TTL window and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedFile {
    pub file_name: String,
    pub download_link: String,
    pub thumbnail: Option<String>,
    pub size_bytes: u64,
}

/// Response from the origin's `share/list` API
#[derive(Debug, Deserialize)]
pub struct ShareListResponse {
    pub errno: i64,
    #[serde(default)]
    pub errmsg: String,
    #[serde(default)]
    pub list: Vec<ShareListItem>,
}

#[derive(Debug, Deserialize)]
pub struct ShareListItem {
    pub server_filename: String,
    pub dlink: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub thumbs: Option<ShareListThumbs>,
}

#[derive(Debug, Deserialize)]
pub struct ShareListThumbs {
    #[serde(default)]
    pub url3: Option<String>,
}

/// Render a byte count the way download UIs expect: two-decimal GB/MB/KB
/// above each power-of-two threshold, a plain count below 1 KiB.
pub fn human_size(size_bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size_bytes >= GB {
        format!("{:.2} GB", size_bytes as f64 / GB as f64)
    } else if size_bytes >= MB {
        format!("{:.2} MB", size_bytes as f64 / MB as f64)
    } else if size_bytes >= KB {
        format!("{:.2} KB", size_bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", size_bytes)
    }
}
