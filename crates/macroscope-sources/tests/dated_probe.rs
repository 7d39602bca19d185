//! The dated-document probe against a mock release server: only the date
//! that has been published answers 200, everything else 404s.

use chrono::NaiveDate;
use macroscope_models::FetchConfig;
use macroscope_sources::{probe_dated, FetchError, HttpFetcher, RawContent};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&FetchConfig::default()).unwrap()
}

#[tokio::test]
async fn returns_kth_candidate_after_k_plus_one_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/h41/20240305/h41.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 release".to_vec()))
        .mount(&server)
        .await;

    let template = format!("{}/h41/{{date}}/h41.pdf", server.uri());
    let document = probe_dated(&fetcher(), &template, "%Y%m%d", start_date(), 14)
        .await
        .unwrap();

    assert_eq!(document.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    assert!(document.url.ends_with("/h41/20240305/h41.pdf"));
    assert_eq!(
        document.content,
        RawContent::Binary(b"%PDF-1.4 release".to_vec())
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].url.path(), "/h41/20240308/h41.pdf");
}

#[tokio::test]
async fn gives_up_after_bound() {
    let server = MockServer::start().await;
    let template = format!("{}/h41/{{date}}/h41.pdf", server.uri());

    let err = probe_dated(&fetcher(), &template, "%Y%m%d", start_date(), 5)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::NotFound { attempts: 5 }));
    assert_eq!(server.received_requests().await.unwrap().len(), 5);
}

#[tokio::test]
async fn server_errors_count_as_misses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/h41/20240308/h41.pdf"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/h41/20240307/h41.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
        .mount(&server)
        .await;

    let template = format!("{}/h41/{{date}}/h41.pdf", server.uri());
    let document = probe_dated(&fetcher(), &template, "%Y%m%d", start_date(), 14)
        .await
        .unwrap();

    assert_eq!(document.date, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
