//! Owned snapshot of a portal response.

use custom_debug_derive::Debug as CustomDebug;
use html_scraper::Html;
use reqwest::StatusCode;
use std::fmt;
use url::Url;

use super::errors::Result;

#[allow(clippy::ptr_arg)]
fn body_len(body: &String, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<{} bytes>", body.len())
}

/// A fully-read response: where the portal left us, and what it rendered.
///
/// The session keeps the most recent `Page` as its cursor; every "act on the
/// current page" operation reads from it.
#[derive(Clone, CustomDebug)]
pub struct Page {
    /// Final URL after redirects.
    pub url: Url,
    pub status: StatusCode,
    #[debug(with = "body_len")]
    pub body: String,
    /// Cookies set by this response, in header order.
    pub set_cookies: Vec<(String, String)>,
}

impl Page {
    pub fn new(url: Url, status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            url,
            status,
            body: body.into(),
            set_cookies: Vec::new(),
        }
    }

    /// Drain a response into a page. Consumes the body.
    pub async fn read(response: reqwest::Response) -> Result<Self> {
        let url = response.url().clone();
        let status = response.status();
        let set_cookies = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let body = response.text().await?;

        Ok(Self {
            url,
            status,
            body,
            set_cookies,
        })
    }

    /// Parse the body. `Html` is not `Send`; keep it out of await points.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Value of a cookie set by this response.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.set_cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}
