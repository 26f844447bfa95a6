use super::*;
use crate::api::test_support::{body_string, get, store_page, test_app, test_state};
use axum::body::Body;
use axum::http::Request;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .expect("request")
}

fn form_body(url: &str) -> String {
    let encoded: String = url
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect();
    format!("url={encoded}")
}

async fn mock_store_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(ResponseTemplate::new(200).set_body_string(store_page()))
        .mount(&server)
        .await;
    server
}

#[test]
fn escape_html_neutralises_markup() {
    assert_eq!(
        escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
    );
}

#[test]
fn empty_page_has_form_and_no_results() {
    let html = render_page("", &Outcome::Empty);
    assert!(html.contains("<h2>Smart Location Scraper</h2>"));
    assert!(html.contains("name=\"url\""));
    assert!(!html.contains("Scraped"));
}

#[test]
fn scraped_page_links_csv_by_result_id() {
    let id = Uuid::new_v4();
    let records = vec![LocationRecord {
        name: Some("Store <A>".to_owned()),
        ..LocationRecord::default()
    }];
    let html = render_page(
        "https://example.com/?a=1&b=2",
        &Outcome::Scraped {
            result_id: id,
            records: &records,
        },
    );
    assert!(html.contains("<h3>Scraped 1 locations</h3>"));
    assert!(html.contains(&format!("/download.csv?id={id}")));
    assert!(html.contains("Store &lt;A&gt;"));
    assert!(html.contains("value=\"https://example.com/?a=1&amp;b=2\""));
}

#[tokio::test]
async fn index_renders_form() {
    let response = test_app(test_state())
        .oneshot(get("/"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Smart Location Scraper"));
    assert!(body.contains("value=\"Scrape\""));
}

#[tokio::test]
async fn scrape_then_download_csv() {
    let server = mock_store_site().await;
    let app = test_app(test_state());

    let url = format!("{}/stores", server.uri());
    let response = app
        .clone()
        .oneshot(post_form(&form_body(&url)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Scraped 5 locations"), "body: {body}");
    assert!(body.contains("604-555-0182"));

    let link = body
        .split("href=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("download link");
    assert!(link.starts_with("/download.csv?id="), "link: {link}");

    let response = app.oneshot(get(link)).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"store_locations.csv\"")
    );
    let csv = body_string(response).await;
    let mut lines = csv.split("\r\n");
    assert_eq!(
        lines.next(),
        Some("Name,Street,City,Region,Postal,Phone,Latitude,Longitude")
    );
    assert_eq!(
        lines.next(),
        Some("Store A,123 Main St,Vancouver,BC,V5K0A1,604-555-0182,,")
    );
    assert_eq!(csv.matches("\r\n").count(), 6);
}

#[tokio::test]
async fn missing_url_is_bad_request() {
    let response = test_app(test_state())
        .oneshot(post_form("url="))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("enter a URL"));
}

#[tokio::test]
async fn fetch_failure_renders_error_with_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let response = test_app(test_state())
        .oneshot(post_form(&form_body(&server.uri())))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_string(response).await;
    assert!(body.contains("Could not scrape that page"));
    assert!(body.contains("404"));
}

#[tokio::test]
async fn download_requires_id() {
    let response = test_app(test_state())
        .oneshot(get("/download.csv"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_of_unknown_result_is_not_found() {
    let uri = format!("/download.csv?id={}", Uuid::new_v4());
    let response = test_app(test_state())
        .oneshot(get(&uri))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_of_malformed_id_is_bad_request() {
    let response = test_app(test_state())
        .oneshot(get("/download.csv?id=not-a-uuid"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
