use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Request paths in arrival order, with the instant each one arrived.
pub type ArrivalLog = Arc<Mutex<Vec<(String, Instant)>>>;

/// Serves a fixed page after `delay`, noting when each request arrived.
struct TimedPage {
    html: String,
    delay: Duration,
    arrivals: ArrivalLog,
}

impl Respond for TimedPage {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.arrivals
            .lock()
            .unwrap()
            .push((request.url.path().to_string(), Instant::now()));
        ResponseTemplate::new(200)
            .set_body_string(self.html.clone())
            .insert_header("content-type", "text/html; charset=utf-8")
            .set_delay(self.delay)
    }
}

/// Minimal company page with a name, follower line and one detail entry.
pub fn profile_html(name: &str, followers: &str, industry: &str) -> String {
    format!(
        r#"<html><body>
          <div class="top-card-layout__entity-info">
            <h1>{name}</h1>
            <h3 class="top-card-layout__first-subline">{industry} <span>Somewhere</span> {followers} followers</h3>
          </div>
          <div class="core-section-container__content">
            <div class="mb-2"><dt class="text-md">Industry</dt><dd class="text-md">{industry}</dd></div>
          </div>
        </body></html>"#
    )
}

/// Mounts an HTML page at `url_path` on `server`.
pub async fn mount_page(server: &MockServer, url_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts a fixed error status at `url_path` on `server`.
pub async fn mount_status(server: &MockServer, url_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts a page at `url_path` whose response is held back for `delay`.
pub async fn mount_timed_page(
    server: &MockServer,
    url_path: &str,
    html: &str,
    delay: Duration,
    arrivals: &ArrivalLog,
) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(TimedPage {
            html: html.to_string(),
            delay,
            arrivals: Arc::clone(arrivals),
        })
        .expect(1)
        .mount(server)
        .await;
}
