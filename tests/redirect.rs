//! End-to-end tests through the router's HTTP surface.

use reqwest::header::LOCATION;
use reqwest::StatusCode;
use serde_json::Value;

use pomf_router::config::SelectionStrategy;

mod common;
use common::Reply;

#[tokio::test]
async fn test_redirects_to_least_loaded_server() {
    let a = common::start_storage_server(vec![("/load", Reply::load(3.0, 2.0))]).await;
    let b = common::start_storage_server(vec![("/load", Reply::load(1.0, 0.0))]).await;
    let config = common::config_with(vec![common::server("A", a), common::server("B", b)]);
    let (router, shutdown) = common::start_router(config).await;

    let res = common::no_redirect_client()
        .get(format!("http://{}/f2/?h=abc123&e=png&f=cat%20photo.png", router))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers()[LOCATION].to_str().unwrap(),
        format!("http://{}/get2/?h=abc123&e=png&f=cat+photo.png", b)
    );
    assert!(res.headers().contains_key("x-request-id"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_pool_redirects_to_default() {
    let a = common::unreachable_addr().await;
    let config = common::config_with(vec![
        common::server("A", a),
        common::server("B", common::unreachable_addr().await),
    ]);
    let (router, shutdown) = common::start_router(config).await;

    let res = common::no_redirect_client()
        .get(format!("http://{}/f2", router))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers()[LOCATION].to_str().unwrap(),
        format!("http://{}/get2/?h=0&e=bin&f=file.bin", a)
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_nearest_uses_forwarded_client_location() {
    let geo = common::start_storage_server(vec![(
        "/json/203.0.113.7",
        Reply::ok(r#"{"status":"success","lat":59.91,"lon":10.75}"#),
    )])
    .await;
    let near = common::start_storage_server(vec![("/health", Reply::ok("ok"))]).await;
    let far = common::start_storage_server(vec![("/health", Reply::ok("ok"))]).await;

    let mut far_server = common::server("US1", far);
    far_server.lat = Some(40.71);
    far_server.lon = Some(-74.0);
    let mut near_server = common::server("NO1", near);
    near_server.lat = Some(59.2083);
    near_server.lon = Some(10.9484);

    let mut config = common::config_with(vec![far_server, near_server]);
    config.routing.strategy = SelectionStrategy::Nearest;
    config.geolocation.endpoint = format!("http://{}/json", geo);
    let (router, shutdown) = common::start_router(config).await;

    let res = common::no_redirect_client()
        .get(format!("http://{}/f2/?h=x&e=txt&f=a.txt", router))
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers()[LOCATION].to_str().unwrap(),
        format!("http://{}/get2/?h=x&e=txt&f=a.txt", near)
    );

    // Without a forwarded address the client location is unknown.
    let res = common::no_redirect_client()
        .get(format!("http://{}/f2/?h=x&e=txt&f=a.txt", router))
        .send()
        .await
        .unwrap();
    assert_eq!(
        res.headers()[LOCATION].to_str().unwrap(),
        format!("http://{}/get2/?h=x&e=txt&f=a.txt", far)
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_health_endpoint() {
    let a = common::unreachable_addr().await;
    let (router, shutdown) = common::start_router(common::config_with(vec![common::server("A", a)])).await;

    let res = reqwest::get(format!("http://{}/health", router)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");

    shutdown.trigger();
}

#[tokio::test]
async fn test_servers_snapshot() {
    let a = common::start_storage_server(vec![("/load", Reply::load(2.0, 3.0))]).await;
    let b = common::unreachable_addr().await;
    let config = common::config_with(vec![common::server("A", a), common::server("B", b)]);
    let (router, shutdown) = common::start_router(config).await;

    let rows: Value = reqwest::get(format!("http://{}/servers", router))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(rows[0]["name"], "A");
    assert_eq!(rows[0]["default"], true);
    assert_eq!(rows[0]["load"], 5.0);
    assert_eq!(rows[1]["name"], "B");
    assert!(rows[1]["load"].is_null());
    assert!(rows[1]["error"].is_string());

    shutdown.trigger();
}
