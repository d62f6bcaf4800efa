//! End-to-end tests of route document hot reload.

use std::path::Path;
use std::time::Duration;

use ultramarine_gateway::{Gateway, GatewayHandle, GatewayOptions, LocalDispatchRegistry};

mod common;

fn write_doc(dir: &Path, contents: &str) {
    std::fs::write(dir.join("router.yaml"), contents).unwrap();
}

async fn start_gateway(dir: &Path, backend: String) -> GatewayHandle {
    Gateway::start(GatewayOptions {
        port: 0,
        routes_path: dir.join("router.yaml"),
        backend_addr: backend,
        registry: LocalDispatchRegistry::new(),
        forward_timeout: Duration::from_secs(2),
        ..Default::default()
    })
    .await
    .unwrap()
}

fn url(handle: &GatewayHandle, path: &str) -> String {
    format!("http://127.0.0.1:{}{}", handle.local_addr().port(), path)
}

async fn get_status(target: &str) -> u16 {
    reqwest::Client::new()
        .get(target)
        .send()
        .await
        .unwrap()
        .status()
        .as_u16()
}

/// Poll until the gateway returns the wanted status or the deadline passes.
async fn wait_for_status(target: &str, wanted: u16) -> bool {
    for _ in 0..50 {
        if get_status(target).await == wanted {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

#[tokio::test]
async fn test_reload_makes_new_routes_live() {
    let backend = common::start_mock_backend("live").await;
    let dir = tempfile::tempdir().unwrap();
    write_doc(dir.path(), "routes: []\n");

    let gateway = start_gateway(dir.path(), backend.to_string()).await;
    let target = url(&gateway, "/api/widgets");

    // Empty document: everything misses.
    assert_eq!(get_status(&target).await, 404);

    write_doc(
        dir.path(),
        "routes:\n  - path: /api/widgets\n    service: widgets\n",
    );

    assert!(
        wait_for_status(&target, 200).await,
        "route from reloaded document never became live"
    );

    gateway.stop().await;
}

#[tokio::test]
async fn test_malformed_reload_keeps_previous_generation_serving() {
    let backend = common::start_mock_backend("still-here").await;
    let dir = tempfile::tempdir().unwrap();
    write_doc(
        dir.path(),
        "routes:\n  - path: /api/widgets\n    service: widgets\n",
    );

    let gateway = start_gateway(dir.path(), backend.to_string()).await;
    let target = url(&gateway, "/api/widgets");
    assert_eq!(get_status(&target).await, 200);

    write_doc(dir.path(), "routes: [:::definitely not yaml\n");

    // Give the watcher time to attempt (and reject) the reload.
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(get_status(&target).await, 200);

    // A later good edit still takes effect.
    write_doc(
        dir.path(),
        concat!(
            "routes:\n",
            "  - path: /api/widgets\n",
            "    service: widgets\n",
            "  - path: /api/orders\n",
            "    service: orders\n",
        ),
    );
    assert!(wait_for_status(&url(&gateway, "/api/orders"), 200).await);

    gateway.stop().await;
}
