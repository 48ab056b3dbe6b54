//! Share-link resolution against the TeraBox origin

use crate::error::{ResolveError, Result};
use crate::extract::find_between;
use crate::types::{ResolvedFile, ShareListResponse};
use reqwest::header;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const LIST_API_URL: &str = "https://www.terabox.com/share/list";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const ACCEPT: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,hi;q=0.8";

/// Resolves public share links by walking the origin's redirect chain,
/// scraping page tokens, and querying the listing API.
///
/// Each call performs fresh network round-trips; callers deduplicate
/// repeated resolutions (the gateway does so with its cache), not this type.
pub struct ShareResolver {
    client: Client,
    cookie: Option<String>,
}

impl ShareResolver {
    /// Create a resolver. The session cookie is supplied by the operator
    /// and rotated out-of-band; without it the origin serves a login wall.
    pub fn new(cookie: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, cookie }
    }

    /// Resolve a share link to a direct download URL plus file metadata.
    pub async fn resolve(&self, link: &str) -> Result<ResolvedFile> {
        let link_url = Url::parse(link).map_err(|e| ResolveError::InvalidLink(e.to_string()))?;
        if !matches!(link_url.scheme(), "http" | "https") {
            return Err(ResolveError::InvalidLink(format!(
                "unsupported scheme '{}'",
                link_url.scheme()
            )));
        }

        debug!(link, "resolving share link");

        // Follow the short-link redirect chain to the canonical share URL,
        // which carries the share identifier as a query parameter.
        let response = self.get(link_url).send().await?;
        let final_url = response.url().clone();

        let surl = final_url
            .query_pairs()
            .find(|(name, _)| name.as_ref() == "surl")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| {
                ResolveError::InvalidLink("no share identifier, please check the link".to_string())
            })?;

        debug!(surl = %surl, final_url = %final_url, "followed share redirect");

        // Fetch the share page and scrape the ephemeral tokens embedded in
        // its inline JavaScript.
        let page = self.get(final_url.clone()).send().await?.text().await?;

        let js_token = find_between(&page, "fn%28%22", "%22%29");
        let logid = find_between(&page, "dp-logid=", "&");
        // bdstoken is not sent to the listing API, but a page without it did
        // not render a session and the other tokens cannot be trusted.
        let bdstoken = find_between(&page, r#"bdstoken":""#, r#"""#);

        let (Some(js_token), Some(logid), Some(_)) = (js_token, logid, bdstoken) else {
            warn!(surl = %surl, "share page did not contain the expected tokens");
            return Err(ResolveError::MissingTokens);
        };

        let api_url = Url::parse_with_params(
            LIST_API_URL,
            &[
                ("app_id", "250528"),
                ("web", "1"),
                ("channel", "dubox"),
                ("clienttype", "0"),
                ("jsToken", js_token),
                ("dp-logid", logid),
                ("page", "1"),
                ("num", "20"),
                ("by", "name"),
                ("order", "asc"),
                ("site_referer", final_url.as_str()),
                ("shorturl", surl.as_str()),
                ("root", "1"),
            ],
        )
        .expect("listing API URL is valid");

        let listing: ShareListResponse = self.get(api_url).send().await?.json().await?;

        if listing.errno != 0 {
            warn!(errno = listing.errno, errmsg = %listing.errmsg, "listing API rejected the share");
            return Err(ResolveError::Upstream(listing.errmsg));
        }
        let Some(file) = listing.list.into_iter().next() else {
            return Err(ResolveError::Upstream("share listing is empty".to_string()));
        };

        debug!(
            file_name = %file.server_filename,
            size = file.size,
            "resolved share link"
        );

        Ok(ResolvedFile {
            file_name: file.server_filename,
            download_link: file.dlink,
            thumbnail: file
                .thumbs
                .and_then(|t| t.url3)
                .filter(|u| !u.is_empty()),
            size_bytes: file.size,
        })
    }

    /// Origin requests masquerade as a browser session.
    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, ACCEPT)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .header(header::USER_AGENT, USER_AGENT);

        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie.as_str());
        }
        request
    }
}
