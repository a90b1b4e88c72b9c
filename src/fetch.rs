//! Remote crate documentation: fetch a docs.rs page and convert it to text.
//!
//! This path shares nothing with corpus filtering except the final
//! truncation step. The page is fetched with the shared `reqwest` client,
//! the documentation container is extracted with `scraper`, converted with
//! `htmd`, and cut to `[filter].max_chars` with a notice pointing at the
//! page URL.

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, instrument};

use docs_mcp_core::filter::{truncate, FilterOptions};
use docs_mcp_core::models::{Excerpt, Selection};

use crate::config::{Config, FetchConfig};
use crate::error::{LookupError, Result};

/// Containers tried in order; the first match supplies the page content.
const CONTENT_SELECTORS: &[&str] = &["#main-content", "main", "[role=\"main\"]", "body"];

const SKIP_TAGS: &[&str] = &["script", "style", "nav", "iframe", "noscript", "svg"];

/// Build the HTTP client used for every remote fetch.
pub fn build_client(config: &FetchConfig) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Crate names on crates.io: ASCII alphanumerics, `-` and `_`.
pub fn validate_crate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LookupError::InvalidParams(
            "crate_name must not be empty".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LookupError::InvalidParams(format!(
            "invalid crate name: '{}'",
            name
        )));
    }
    Ok(())
}

fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() || version.contains('/') || version.chars().any(char::is_whitespace) {
        return Err(LookupError::InvalidParams(format!(
            "invalid version: '{}'",
            version
        )));
    }
    Ok(())
}

/// `{base}/{crate}/{version}/{crate_ident}/`, where the last segment uses
/// underscores the way rustdoc names the library target.
pub fn crate_docs_url(base_url: &str, crate_name: &str, version: &str) -> String {
    format!(
        "{}/{}/{}/{}/",
        base_url.trim_end_matches('/'),
        crate_name,
        version,
        crate_name.replace('-', "_")
    )
}

/// Fetch and convert the documentation page for `crate_name`.
#[instrument(skip(client, config))]
pub async fn fetch_crate_docs(
    client: &reqwest::Client,
    config: &Config,
    crate_name: &str,
    version: Option<&str>,
) -> Result<Excerpt> {
    let crate_name = crate_name.trim();
    validate_crate_name(crate_name)?;
    let version = version.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("latest");
    validate_version(version)?;

    let url = crate_docs_url(&config.fetch.base_url, crate_name, version);
    debug!(%url, "fetching crate docs");

    let response = client.get(&url).send().await.map_err(|e| request_error(&url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Fetch {
            url,
            message: format!("HTTP {}", status),
        });
    }

    let body = response.text().await.map_err(|e| request_error(&url, e))?;
    let text = html_to_text(&body)?;
    debug!(html_len = body.len(), text_len = text.len(), "conversion complete");

    let options = FilterOptions::new(config.filter.max_chars, &url);
    Ok(truncate(&text, Selection::Remote, &options))
}

fn request_error(url: &str, err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout {
            url: url.to_string(),
        }
    } else {
        LookupError::Fetch {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Convert an HTML page to plain Markdown-flavoured text.
pub fn html_to_text(html: &str) -> Result<String> {
    let content = extract_content_html(html);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIP_TAGS.to_vec())
        .build();
    let markdown = converter
        .convert(&content)
        .map_err(|e| LookupError::Conversion(format!("htmd conversion failed: {e}")))?;

    Ok(collapse_blank_lines(&markdown))
}

fn extract_content_html(html: &str) -> String {
    let doc = Html::parse_document(html);
    for sel_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(sel_str) {
            if let Some(el) = doc.select(&selector).next() {
                return el.inner_html();
            }
        }
    }
    html.to_string()
}

/// Trim trailing whitespace per line and keep at most one blank line in a row.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_string()
}
