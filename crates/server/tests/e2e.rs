use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use service::file::item_store::FileItemStore;
use service::items::store::ItemCollectionStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, ServerState};

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Isolated temp data file per test run
    let data_file = std::env::temp_dir().join(format!("items_e2e_{}/items.json", Uuid::new_v4()));
    let items: Arc<dyn ItemCollectionStore> = FileItemStore::new(&data_file).await?;

    let state = ServerState { items: Arc::clone(&items) };
    let app: Router = routes::build_router(cors(), state);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn e2e_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_fresh_store_lists_empty() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/items", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["items"], json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_create_then_list() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .post(format!("{}/items", app.base_url))
        .json(&json!({"name": "apple"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Item created");
    assert_eq!(body["item"]["name"], "apple");
    assert!(body["item"]["id"].is_i64());

    let res = c.get(format!("{}/items", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "apple");
    Ok(())
}

#[tokio::test]
async fn e2e_create_assigns_distinct_ids() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    for name in ["a", "b", "c"] {
        let res = c
            .post(format!("{}/items", app.base_url))
            .json(&json!({"name": name}))
            .send()
            .await?;
        assert_eq!(res.status(), HttpStatusCode::CREATED);
    }

    let body = c
        .get(format!("{}/items", app.base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 3);
    let mut ids: Vec<i64> = items.iter().map(|it| it["id"].as_i64().unwrap()).collect();
    // insertion order is preserved in the listing
    let names: Vec<_> = items.iter().map(|it| it["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    ids.dedup();
    assert_eq!(ids.len(), 3);
    Ok(())
}

#[tokio::test]
async fn e2e_create_requires_name() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .post(format!("{}/items", app.base_url))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Name is required");

    // empty string counts as missing too
    let res = c
        .post(format!("{}/items", app.base_url))
        .json(&json!({"name": ""}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    // nothing was appended
    let body = c
        .get(format!("{}/items", app.base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(body["items"], json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_body_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .post(format!("{}/items", app.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid JSON body");

    let body = c
        .get(format!("{}/items", app.base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(body["items"], json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_update_replaces_and_keeps_name() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let created = c
        .post(format!("{}/items", app.base_url))
        .json(&json!({"name": "apple"}))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let id = created["item"]["id"].as_i64().expect("id");

    // a non-empty name replaces the stored one
    let res = c
        .put(format!("{}/items/{}", app.base_url, id))
        .json(&json!({"name": "banana"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Item updated");
    assert_eq!(body["item"]["name"], "banana");

    // an absent name keeps it
    let res = c
        .put(format!("{}/items/{}", app.base_url, id))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["item"]["name"], "banana");
    Ok(())
}

#[tokio::test]
async fn e2e_update_missing_returns_not_found() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .put(format!("{}/items/999999", app.base_url))
        .json(&json!({"name": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Item not found");
    Ok(())
}

#[tokio::test]
async fn e2e_delete_roundtrip_and_idempotence() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let created = c
        .post(format!("{}/items", app.base_url))
        .json(&json!({"name": "pear"}))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let id = created["item"]["id"].as_i64().expect("id");

    let res = c.delete(format!("{}/items/{}", app.base_url, id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Item deleted");

    let body = c
        .get(format!("{}/items", app.base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(body["items"], json!([]));

    // deleting again is always a 404
    let res = c.delete(format!("{}/items/{}", app.base_url, id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Item not found");
    Ok(())
}

#[tokio::test]
async fn e2e_invalid_id_segment() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.delete(format!("{}/items/abc", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid ID");

    let res = c
        .put(format!("{}/items/abc", app.base_url))
        .json(&json!({"name": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    // the id check wins over method dispatch
    let res = c.get(format!("{}/items/abc", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid ID");
    Ok(())
}

#[tokio::test]
async fn e2e_method_not_allowed() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.delete(format!("{}/items", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::METHOD_NOT_ALLOWED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Method not allowed");

    let res = c.get(format!("{}/items/123", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::METHOD_NOT_ALLOWED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Method not allowed");
    Ok(())
}

#[tokio::test]
async fn e2e_unknown_route() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/nope", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Route not found");
    Ok(())
}
