//! The stateful crawl over one WebAdvisor deployment.
//!
//! WebAdvisor has no API. Every step is a page request whose meaning depends
//! on the page before it, so the session keeps the last response as a cursor
//! and each operation acts on wherever the cursor currently is. Callers are
//! responsible for invoking operations in the portal's navigation order:
//!
//! connect -> follow_link("Log In") -> login -> follow_link(..) -> select_term
//! connect -> follow_link(..)* -> section_search -> grab_section_rows

use async_trait::async_trait;
use custom_debug_derive::Debug as CustomDebug;
use html_scraper::Selector;
use reqwest::cookie::{CookieStore, Jar};
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use super::errors::{Result, WebAdvisorError};
use super::extract::{self, DetailFetcher};
use super::forms::{login_form, section_search_form, term_form};
use super::locate::{element_text, find_link, select_first};
use super::models::Section;
use super::page::Page;
use super::query::set_query;
use crate::utils::{fmt_duration, log_if_slow};

/// Cookie the portal uses to hand out the anti-forgery token.
pub const TOKEN_COOKIE: &str = "LASTTOKEN";
/// Query parameter that carries the token on every request.
pub const TOKEN_PARAM: &str = "TOKENIDX";

const USER_AGENT: &str = concat!("webadvisor/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);

/// The section search endpoint only answers with `APP=ST`.
const SEARCH_APP: (&str, &str) = ("APP", "ST");

static LOGIN_ERROR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.errorText").unwrap());

/// Result of a login attempt. A rejected password is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    Rejected { message: String },
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Connection policy fixed for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Verify TLS certificates. Several deployments run self-signed certificates.
    pub verify: bool,
    /// Applied to every request individually.
    pub timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            verify: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn mask(token: &str) -> String {
    let head: String = token.chars().take(3).collect();
    format!("{head}***")
}

#[allow(clippy::ptr_arg)]
fn masked(token: &String, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&mask(token))
}

/// An authenticated (or at least tokened) WebAdvisor session.
#[derive(CustomDebug)]
pub struct WebAdvisor {
    #[debug(skip)]
    http: reqwest::Client,
    #[debug(skip)]
    jar: Arc<Jar>,
    verify: bool,
    timeout: Duration,
    #[debug(with = "masked")]
    token: String,
    current: Page,
}

/// Send one request and read the whole response.
async fn exchange(
    request: reqwest::RequestBuilder,
    timeout: Duration,
    method: &'static str,
) -> Result<Page> {
    let start = Instant::now();
    let response = request.timeout(timeout).send().await?;
    let page = Page::read(response).await?;

    debug!(
        method,
        path = page.url.path(),
        status = page.status.as_u16(),
        duration = fmt_duration(start.elapsed()),
        "Portal request"
    );
    log_if_slow(start, method, &page.url);

    Ok(page)
}

/// Value of cookie `name` the jar would send to `url`.
fn jar_cookie(jar: &Jar, url: &Url, name: &str) -> Option<String> {
    let header = jar.cookies(url)?;
    let header = header.to_str().ok()?;
    cookie::Cookie::split_parse(header)
        .filter_map(|c| c.ok())
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

/// Token set by `page`, falling back to whatever the jar holds for its URL.
fn issued_token(page: &Page, jar: &Jar) -> Option<String> {
    page.cookie(TOKEN_COOKIE)
        .map(str::to_string)
        .or_else(|| jar_cookie(jar, &page.url, TOKEN_COOKIE))
        .filter(|token| !token.is_empty())
}

impl WebAdvisor {
    /// Open a session and perform the token handshake.
    ///
    /// The portal only issues `LASTTOKEN` when a request arrives with a blank
    /// `TOKENIDX`; the token then has to ride along as `TOKENIDX` before the
    /// home page renders working links.
    pub async fn connect(base_url: &str, options: SessionOptions) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .danger_accept_invalid_certs(!options.verify)
            .user_agent(USER_AGENT)
            .build()?;

        if !options.verify {
            warn!(host = base.host_str(), "TLS certificate verification disabled");
        }

        let landing = exchange(http.get(base), options.timeout, "GET").await?;

        let blank = set_query(&landing.url, TOKEN_PARAM, "");
        let issued = exchange(http.get(blank), options.timeout, "GET").await?;
        let token = issued_token(&issued, &jar).ok_or_else(|| {
            WebAdvisorError::Connectivity(format!(
                "portal never set the {TOKEN_COOKIE} cookie; has the bootstrap flow changed?"
            ))
        })?;

        // Requests accumulate query parameters; overwrite the blank token.
        let home_url = set_query(&issued.url, TOKEN_PARAM, &token);
        let home = exchange(http.get(home_url), options.timeout, "GET").await?;

        info!(
            host = home.url.host_str(),
            token = mask(&token),
            "Acquired portal token"
        );

        Ok(Self {
            http,
            jar,
            verify: options.verify,
            timeout: options.timeout,
            token,
            current: home,
        })
    }

    /// The most recent response.
    pub fn current(&self) -> &Page {
        &self.current
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn verifies_tls(&self) -> bool {
        self.verify
    }

    /// Value of a cookie the session would send to `url`.
    pub fn cookie(&self, url: &Url, name: &str) -> Option<String> {
        jar_cookie(&self.jar, url, name)
    }

    /// GET `url` with extra query `params` and make the response current.
    pub async fn get(&mut self, url: &Url, params: &[(&str, &str)]) -> Result<&Page> {
        let mut request = self.http.get(url.clone());
        if !params.is_empty() {
            request = request.query(params);
        }
        self.current = exchange(request, self.timeout, "GET").await?;
        Ok(&self.current)
    }

    /// POST a form to `url` and make the response current.
    pub async fn post(&mut self, url: &Url, form: &[(String, String)]) -> Result<&Page> {
        let request = self.http.post(url.clone()).form(form);
        self.current = exchange(request, self.timeout, "POST").await?;
        Ok(&self.current)
    }

    /// Follow the first link on the current page whose text contains `label`.
    pub async fn follow_link(&mut self, label: &str) -> Result<&Page> {
        let href = find_link(label, &self.current.document())?;
        let url = self.current.url.join(&href)?;
        debug!(label, path = url.path(), "Following link");
        self.get(&url, &[]).await
    }

    /// Submit credentials. Assumes the current page is the login page.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginOutcome> {
        let url = self.current.url.clone();
        let form = login_form(username, password, url.as_str());
        let page = self.post(&url, &form).await?;

        let outcome = {
            let document = page.document();
            match select_first(&document, &LOGIN_ERROR) {
                Some(error) => LoginOutcome::Rejected {
                    message: element_text(error),
                },
                None => LoginOutcome::Authenticated,
            }
        };

        match &outcome {
            LoginOutcome::Authenticated => info!(username, "Logged in"),
            LoginOutcome::Rejected { message } => {
                warn!(username, reason = message.as_str(), "Login rejected")
            }
        }
        Ok(outcome)
    }

    /// Choose a term. Assumes the current page is the term selection page.
    pub async fn select_term(&mut self, term: &str) -> Result<&Page> {
        let url = self.current.url.clone();
        let form = term_form(term, url.as_str());
        self.post(&url, &form).await
    }

    /// Search for `sections` in `term`. Assumes the current page is the
    /// section search form.
    pub async fn section_search(&mut self, term: &str, sections: &[Section]) -> Result<&Page> {
        let form = section_search_form(term, sections, self.current.url.as_str());
        let (app, value) = SEARCH_APP;
        let url = set_query(&self.current.url, app, value);
        debug!(term, rows = sections.len(), "Submitting section search");
        self.post(&url, &form).await
    }

    /// Sections on the current (search results) page.
    pub async fn grab_section_rows(&mut self, detailed: bool) -> Result<Vec<Section>> {
        // Detail fetches move the cursor, so extract from a snapshot.
        let page = self.current.clone();
        extract::grab_section_rows(&page, detailed, self).await
    }

    /// Sections on the current (class schedule) page.
    pub async fn grab_schedule_rows(&mut self, get_faculty: bool) -> Result<Vec<Section>> {
        let page = self.current.clone();
        extract::grab_schedule_rows(&page, get_faculty, self).await
    }
}

#[async_trait]
impl DetailFetcher for WebAdvisor {
    async fn fetch_detail_page(&mut self, url: &Url) -> Result<Page> {
        self.get(url, &[]).await.cloned()
    }
}
