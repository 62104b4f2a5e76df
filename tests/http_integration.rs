//! Testes de integração HTTP: proxy real na frente de um serviço de score falso.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use score_proxy::engine::{EngineSettings, ScoreProxy};
use score_proxy::server;
use score_proxy::upstream::HttpScoreSource;
use serde_json::{json, Value};

/// Requisição vista pelo serviço falso.
#[derive(Debug, Clone)]
struct SeenRequest {
    cpf: String,
    client_id: Option<String>,
    accept: Option<String>,
}

type Seen = Arc<Mutex<Vec<SeenRequest>>>;

/// Serviço de score falso em `/api/score`.
///
/// - `00000000000` responde 404 com corpo JSON;
/// - CPFs começando com `slow` demoram 2s;
/// - os demais respondem 200.
async fn fake_score(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let cpf = params.get("cpf").cloned().unwrap_or_default();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    seen.lock().unwrap().push(SeenRequest {
        cpf: cpf.clone(),
        client_id: header("client-id"),
        accept: header("accept"),
    });

    if cpf == "00000000000" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "cpf not found" }))).into_response();
    }
    if cpf.starts_with("slow") {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    Json(json!({ "cpf": cpf, "score": 812 })).into_response()
}

async fn spawn_router(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn spawn_upstream() -> (SocketAddr, Seen) {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/api/score", get(fake_score))
        .with_state(seen.clone());
    (spawn_router(router).await, seen)
}

fn fast_settings() -> EngineSettings {
    EngineSettings {
        queue_capacity: 10,
        interval: Duration::from_millis(10),
        request_timeout: Duration::from_secs(10),
        cache_capacity: 100,
        cache_ttl: Duration::from_secs(300),
    }
}

/// Sobe o proxy apontando para o serviço falso e devolve a URL base.
async fn spawn_proxy(upstream: SocketAddr, settings: EngineSettings) -> String {
    let source = Arc::new(HttpScoreSource::with_client(
        reqwest::Client::new(),
        &format!("http://{}/api", upstream),
        "julio",
    ));
    let (proxy, _worker) = ScoreProxy::start(settings, source);

    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::run(listener, proxy, std::future::pending()));

    format!("http://{}", addr)
}

async fn get_json(url: &str) -> (StatusCode, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    let body = response.text().await.unwrap();
    (status, serde_json::from_str(&body).unwrap_or(Value::String(body)))
}

#[tokio::test]
async fn test_score_is_proxied_and_cached() {
    let (upstream, seen) = spawn_upstream().await;
    let proxy = spawn_proxy(upstream, fast_settings()).await;
    let url = format!("{}/proxy_scores?cpf=12345678900", proxy);

    let (status, body) = get_json(&url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "cpf": "12345678900", "score": 812 }));

    let (status, cached) = get_json(&url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached, body);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].cpf, "12345678900");
    assert_eq!(seen[0].client_id.as_deref(), Some("julio"));
    assert_eq!(seen[0].accept.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_remote_error_passes_through() {
    let (upstream, _seen) = spawn_upstream().await;
    let proxy = spawn_proxy(upstream, fast_settings()).await;

    let (status, body) = get_json(&format!("{}/proxy_scores?cpf=00000000000", proxy)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "cpf not found" }));
}

#[tokio::test]
async fn test_missing_or_blank_cpf_is_bad_request() {
    let (upstream, seen) = spawn_upstream().await;
    let proxy = spawn_proxy(upstream, fast_settings()).await;

    let response = reqwest::get(format!("{}/proxy_scores", proxy)).await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body: Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert!(body["detail"].is_string());

    let (status, body) = get_json(&format!("{}/proxy_scores?cpf=%20", proxy)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cpf_is_forwarded_unchanged() {
    let (upstream, seen) = spawn_upstream().await;
    let proxy = spawn_proxy(upstream, fast_settings()).await;

    let (status, body) = get_json(&format!("{}/proxy_scores?cpf=%20123%20", proxy)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cpf"], " 123 ");

    // chave sem espaços é outra entrada de cache
    get_json(&format!("{}/proxy_scores?cpf=123", proxy)).await;

    let seen: Vec<String> = seen.lock().unwrap().iter().map(|r| r.cpf.clone()).collect();
    assert_eq!(seen, vec![" 123 ", "123"]);
}

#[tokio::test]
async fn test_slow_upstream_is_gateway_timeout() {
    let (upstream, _seen) = spawn_upstream().await;
    let settings = EngineSettings {
        request_timeout: Duration::from_millis(300),
        ..fast_settings()
    };
    let proxy = spawn_proxy(upstream, settings).await;

    let (status, body) = get_json(&format!("{}/proxy_scores?cpf=slow-1", proxy)).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_full_queue_is_service_unavailable() {
    let (upstream, _seen) = spawn_upstream().await;
    let settings = EngineSettings {
        queue_capacity: 1,
        ..fast_settings()
    };
    let proxy = spawn_proxy(upstream, settings).await;
    let stats_url = format!("{}/stats", proxy);

    let wait_for = |queued: u64, in_flight: u64| {
        let stats_url = stats_url.clone();
        async move {
            for _ in 0..200 {
                let (_, stats) = get_json(&stats_url).await;
                if stats["queued"] == queued && stats["in_flight"] == in_flight {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            panic!("stats never reached queued={} in_flight={}", queued, in_flight);
        }
    };

    // slow-1 sai da fila e fica preso no serviço
    let first = tokio::spawn(reqwest::get(format!("{}/proxy_scores?cpf=slow-1", proxy)));
    wait_for(0, 1).await;

    // slow-2 ocupa a única vaga
    let second = tokio::spawn(reqwest::get(format!("{}/proxy_scores?cpf=slow-2", proxy)));
    wait_for(1, 2).await;

    let (status, body) = get_json(&format!("{}/proxy_scores?cpf=slow-3", proxy)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].is_string());

    assert!(first.await.unwrap().unwrap().status().is_success());
    assert!(second.await.unwrap().unwrap().status().is_success());
}

#[tokio::test]
async fn test_healthcheck_and_stats() {
    let (upstream, _seen) = spawn_upstream().await;
    let proxy = spawn_proxy(upstream, fast_settings()).await;

    let response = reqwest::get(format!("{}/healthcheck", proxy)).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "ok");

    get_json(&format!("{}/proxy_scores?cpf=1", proxy)).await;
    get_json(&format!("{}/proxy_scores?cpf=1", proxy)).await;

    let (status, stats) = get_json(&format!("{}/stats", proxy)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["queue_capacity"], 10);
    assert_eq!(stats["cache"]["hits"], 1);
    assert_eq!(stats["cache"]["size"], 1);
    assert_eq!(stats["in_flight"], 0);
}
