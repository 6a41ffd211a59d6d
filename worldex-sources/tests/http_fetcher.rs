use std::time::Duration;

use httpmock::prelude::*;
use worldex_core::{ExtractContext, IndicatorSource};
use worldex_sources::{HttpFetch, ReqwestFetcher, USER_AGENT, WorldBankSource};

#[tokio::test]
async fn non_success_status_is_a_response_not_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing.csv");
            then.status(404).body("not here");
        })
        .await;

    let http = ReqwestFetcher::new(Duration::from_secs(5)).unwrap();
    let resp = http.get(&server.url("/missing.csv")).await.unwrap();
    assert_eq!(resp.status, 404);
    assert!(!resp.is_success());
}

#[tokio::test]
async fn requests_carry_the_crate_user_agent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/ping").header("user-agent", USER_AGENT);
            then.status(200).body("pong");
        })
        .await;

    let http = ReqwestFetcher::new(Duration::from_secs(5)).unwrap();
    let resp = http.get(&server.url("/ping")).await.unwrap();
    mock.assert_async().await;
    assert_eq!(resp.body, b"pong");
}

#[tokio::test]
async fn world_bank_end_to_end_over_http() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2/country/all/indicator/SP.POP.TOTL")
                .query_param("format", "json")
                .query_param("mrv", "1");
            then.status(200).header("content-type", "application/json").body(
                r#"[{"page":1},[
                    {"countryiso3code":"FRA","date":"2024","value":68400000},
                    {"countryiso3code":"","date":"2024","value":8100000000}
                ]]"#,
            );
        })
        .await;

    let http = std::sync::Arc::new(ReqwestFetcher::new(Duration::from_secs(5)).unwrap());
    let wb = WorldBankSource::new(http)
        .with_base_url(server.url("/v2"))
        .with_request_delay(Duration::ZERO)
        .with_indicators([("SP.POP.TOTL", "population")]);

    let payload = wb.fetch().await.unwrap();
    let ctx = ExtractContext::default().with_cutoff_year(2025);
    let out = wb.extract(payload, &ctx).unwrap();
    let fra = out.fields.get("FRA", "population").unwrap();
    assert_eq!((fra.value, fra.year.as_str()), (68_400_000.0, "2024"));
}
