//! A scripted stand-in for a WebAdvisor deployment.
//!
//! Dispatch mimics the real portal: everything lives at one path and the
//! query string decides what is rendered.

#![allow(dead_code)]

use axum::extract::{Form, RawQuery, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::form_urlencoded;

pub const TOKEN: &str = "tok-42";
pub const PASSWORD: &str = "hunter2";
pub const LOGIN_ERROR: &str = "You entered an invalid password.";
pub const PORTAL_PATH: &str = "/WebAdvisor/WebAdvisor";
/// Requests carrying `SLOW=1` are answered only after this delay.
pub const SLOW_RESPONSE: Duration = Duration::from_secs(2);

/// A POST the portal received.
#[derive(Debug, Clone)]
pub struct Submission {
    pub query: String,
    pub form: Vec<(String, String)>,
}

impl Submission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
pub struct Recorded {
    /// Raw query of every GET, in arrival order.
    pub gets: Vec<Option<String>>,
    pub posts: Vec<Submission>,
}

#[derive(Clone)]
pub struct Portal {
    /// When false the portal never hands out `LASTTOKEN`.
    issues_token: bool,
    pub recorded: Arc<Mutex<Recorded>>,
}

impl Portal {
    pub fn new() -> Self {
        Self {
            issues_token: true,
            recorded: Arc::default(),
        }
    }

    pub fn without_token() -> Self {
        Self {
            issues_token: false,
            ..Self::new()
        }
    }

    pub fn gets(&self) -> Vec<Option<String>> {
        self.recorded.lock().unwrap().gets.clone()
    }

    pub fn posts(&self) -> Vec<Submission> {
        self.recorded.lock().unwrap().posts.clone()
    }

    /// Serve on an ephemeral port and return the portal's entry URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route(PORTAL_PATH, get(handle_get).post(handle_post))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}{PORTAL_PATH}")
    }
}

fn params(query: Option<&str>) -> Vec<(String, String)> {
    form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .into_owned()
        .collect()
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

fn page(body: &str) -> Response {
    Html(format!("<html><body>{body}</body></html>")).into_response()
}

async fn handle_get(State(portal): State<Portal>, RawQuery(query): RawQuery) -> Response {
    portal.recorded.lock().unwrap().gets.push(query.clone());
    let params = params(query.as_deref());

    if param(&params, "SLOW") == Some("1") {
        tokio::time::sleep(SLOW_RESPONSE).await;
        return page("<p>Finally.</p>");
    }

    if param(&params, "TYPE") == Some("M") {
        let sec = param(&params, "SEC").unwrap_or_default();
        return detail_page(sec);
    }

    match param(&params, "TOKENIDX") {
        None => page("<h1>Welcome to WebAdvisor</h1>"),
        Some("") if portal.issues_token => (
            [(header::SET_COOKIE, format!("LASTTOKEN={TOKEN}; Path=/"))],
            page("<p>Loading...</p>"),
        )
            .into_response(),
        Some("") => page("<p>Loading...</p>"),
        Some(_) => match (param(&params, "TYPE"), param(&params, "SS")) {
            (Some("L"), _) => page(r#"<form method="post"><input name="USER.NAME"/><input name="CURR.PWD" type="password"/></form>"#),
            (Some("P"), _) => page(&format!(
                r#"<ul>
                  <li><a href="?TOKENIDX={TOKEN}&amp;SS=1&amp;APP=XX">Search for Sections</a></li>
                  <li><a href="?TOKENIDX={TOKEN}&amp;SS=2">My class schedule</a></li>
                </ul>"#
            )),
            (_, Some("1")) => page(r#"<form method="post"><input name="VAR1"/></form>"#),
            (_, Some("2")) => page(r#"<form method="post"><select name="VAR4"></select></form>"#),
            _ => home_page(""),
        },
    }
}

async fn handle_post(
    State(portal): State<Portal>,
    RawQuery(query): RawQuery,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let params = params(query.as_deref());
    let submission = Submission {
        query: query.unwrap_or_default(),
        form,
    };
    portal
        .recorded
        .lock()
        .unwrap()
        .posts
        .push(submission.clone());

    if param(&params, "TYPE") == Some("L") {
        return if submission.field("CURR.PWD") == Some(PASSWORD) {
            home_page("<p>Welcome back.</p>")
        } else {
            page(&format!(r#"<div class="errorText">{LOGIN_ERROR}</div>"#))
        };
    }

    match param(&params, "SS") {
        Some("1") => results_page(),
        Some("2") => schedule_page(),
        _ => page("<p>Your session has expired.</p>"),
    }
}

fn home_page(banner: &str) -> Response {
    page(&format!(
        r#"{banner}
           <a href="?TOKENIDX={TOKEN}&amp;TYPE=L">Log In to WebAdvisor</a>
           <a href="?TOKENIDX={TOKEN}&amp;TYPE=P"><span>WebAdvisor</span> for Students</a>"#
    ))
}

fn onclick(sec: u32) -> String {
    format!("window.open('?TOKENIDX={TOKEN}&amp;TYPE=M&amp;SEC={sec}&amp;CLONE=Y','WSS'); return false;")
}

fn results_page() -> Response {
    page(&format!(
        r#"<table summary="Sections">
          <tr>
            <td><p id="LIST_VAR1_1">Open</p></td>
            <td><a id="SEC_SHORT_TITLE_1" href="javascript:void(0);" onclick="{one}">MAT-241-001 (3) Calculus III</a></td>
            <td><p id="SEC_MEETING_INFO_1">MWF 09:00AM-09:50AM</p></td>
            <td><p id="SEC_FACULTY_INFO_1">Smith, J.</p></td>
            <td><p id="LIST_VAR5_1">12 / 30</p></td>
            <td><p id="SEC_MIN_CRED_1">4.00</p></td>
          </tr>
          <tr>
            <td><p id="LIST_VAR1_2">Closed</p></td>
            <td><a id="SEC_SHORT_TITLE_2" href="javascript:void(0);" onclick="{two}">MAT-241-002 (3) Calculus III</a></td>
            <td><p id="SEC_MEETING_INFO_2">TTh 01:00PM-02:15PM</p></td>
            <td><p id="SEC_FACULTY_INFO_2">Doe, A.</p></td>
            <td><p id="LIST_VAR5_2">0 / 30</p></td>
            <td><p id="SEC_MIN_CRED_2">4.00</p></td>
          </tr>
        </table>"#,
        one = onclick(1),
        two = onclick(2),
    ))
}

fn schedule_page() -> Response {
    page(&format!(
        r#"<table summary="Schedule">
          <tr>
            <td><a id="LIST_VAR6_1" onclick="{one}">MAT-241-001 (3) Calculus III</a></td>
            <td><p id="LIST_VAR12_1">MWF 09:00AM-09:50AM</p></td>
            <td><p id="LIST_VAR8_1">4.00</p></td>
            <td><p id="DATE_LIST_VAR1_1">08/24/2015</p></td>
          </tr>
        </table>"#,
        one = onclick(1),
    ))
}

fn detail_page(sec: &str) -> Response {
    let (faculty, description) = match sec {
        "1" => ("Smith, J.", "Vector calculus in two and three dimensions."),
        "2" => ("Doe, A.", "Vector calculus, evening section."),
        _ => return page("<p>Section not found.</p>"),
    };
    page(&format!(
        r#"<p id="LIST_VAR7_1">{faculty}</p><p id="VAR3">{description}</p>"#
    ))
}
