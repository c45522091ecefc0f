//! HTTP client against a local stand-in for the range API

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use range_sync::{BackendError, ClientConfig, EditorController, HttpRangeBackend, RangeBackend, RestoreOutcome};
use range_test_utils::lab_snapshot;
use range_topology::{DeploymentSerializer, NodeId, Role, Topology, MASTER_ID};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

type Posted = Arc<Mutex<Vec<Value>>>;

/// Serve the three range routes; POST rejects payloads without a master link
fn spawn_api(ranges: Vec<Value>) -> (SocketAddr, Posted) {
    let posted: Posted = Arc::default();

    let list = warp::path!("api" / "v1" / "ranges")
        .and(warp::get())
        .map(move || warp::reply::json(&ranges));

    let sink = posted.clone();
    let deploy = warp::path!("api" / "v1" / "range")
        .and(warp::post())
        .and(warp::body::json())
        .map(move |body: Value| {
            let has_links = body["links"].as_array().is_some_and(|l| !l.is_empty());
            let range_id = body["range_metadata"]["id"].clone();
            sink.lock().push(body);
            if has_links {
                warp::reply::with_status(
                    warp::reply::json(&json!({
                        "range_id": range_id,
                        "status": "accepted",
                        "message": "Reconciliation task started."
                    })),
                    StatusCode::ACCEPTED,
                )
            } else {
                warp::reply::with_status(
                    warp::reply::json(&json!({
                        "detail": "Invalid topology: No Master Jumpbox found or graph is disconnected."
                    })),
                    StatusCode::BAD_REQUEST,
                )
            }
        });

    let delete = warp::path!("api" / "v1" / "range" / String)
        .and(warp::delete())
        .map(|id: String| {
            if id == MASTER_ID {
                warp::reply::with_status(
                    warp::reply::json(&json!({ "range_id": id, "status": "deleted" })),
                    StatusCode::OK,
                )
            } else {
                warp::reply::with_status(
                    warp::reply::json(&json!({ "detail": "Range not found" })),
                    StatusCode::NOT_FOUND,
                )
            }
        });

    let (addr, server) = warp::serve(list.or(deploy).or(delete)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, posted)
}

fn client_for(addr: SocketAddr) -> HttpRangeBackend {
    HttpRangeBackend::new(ClientConfig::new().with_base_url(format!("http://{addr}")).with_timeout_secs(5))
        .unwrap()
}

#[tokio::test]
async fn lists_ranges_undecoded() {
    let (addr, _) = spawn_api(vec![lab_snapshot(), json!({ "unexpected": true })]);
    let ranges = client_for(addr).list_ranges().await.unwrap();

    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[0]["metadata"]["id"], MASTER_ID);
}

#[tokio::test]
async fn posts_serialized_topology() {
    let (addr, posted) = spawn_api(Vec::new());
    let mut topology = Topology::new();
    let web = topology.add_node(Role::Service);
    topology.connect(&NodeId::master(), &web).unwrap();
    let request = DeploymentSerializer::new().serialize(&topology.snapshot());

    let response = client_for(addr).deploy(&request).await.unwrap();

    assert_eq!(response.range_id, MASTER_ID);
    assert_eq!(response.status, "accepted");
    let body = posted.lock()[0].clone();
    assert_eq!(body, serde_json::to_value(&request).unwrap());
    assert_eq!(body["links"][0]["connection_type"], "vlan_bridge");
}

#[tokio::test]
async fn rejection_carries_backend_detail() {
    let (addr, _) = spawn_api(Vec::new());
    let request = DeploymentSerializer::new().serialize(&Topology::new().snapshot());

    let err = client_for(addr).deploy(&request).await.unwrap_err();

    match err {
        BackendError::Status { status, detail } => {
            assert_eq!(status, 400);
            assert!(detail.starts_with("Invalid topology"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn delete_reports_missing_range() {
    let (addr, _) = spawn_api(Vec::new());
    let client = client_for(addr);

    let response = client.delete_range(MASTER_ID).await.unwrap();
    assert_eq!(response.status, "deleted");

    let err = client.delete_range("nope").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.detail(), Some("Range not found"));
}

#[tokio::test]
async fn refused_connection_is_unavailable() {
    // Bind then drop to get a port with nothing listening
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

    let err = client_for(addr).list_ranges().await.unwrap_err();
    assert!(matches!(err, BackendError::Unavailable(_)), "unexpected error: {err}");
    assert!(err.is_transport());
    assert_eq!(err.detail(), None);
}

#[tokio::test]
async fn controller_restores_over_http() {
    let (addr, _) = spawn_api(vec![lab_snapshot()]);
    let editor = EditorController::new(Arc::new(client_for(addr)));

    assert_eq!(
        editor.restore().await,
        RestoreOutcome::Restored { nodes: 2, edges: 1 }
    );
}
