use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use oracle_datum::{DatumCodec, OracleDatum};
use oracle_explorer::BlockInfo;
use oracle_lifecycle::OracleController;
use oracle_nullables::{NullChainSync, NullExplorer, NullTxBuilder, SyncStats};
use oracle_rpc::{router, AppState};
use oracle_types::{ChainPoint, OutRef, TxHash};
use oracle_vrf::{VrfLocator, DEFAULT_STEP_BUDGET};
use serde_json::{json, Value};
use tower::ServiceExt;

const SEED_TX: &str = "5151515151515151515151515151515151515151515151515151515151515151";
const ORACLE_TX: &str = "7777777777777777777777777777777777777777777777777777777777777777";
const UNIT: &str = "0123456789abcdef0123456789abcdef0123456789abcdef012345676f7261636c65";

struct App {
    router: Router,
    explorer: Arc<NullExplorer>,
    sync: Arc<SyncStats>,
}

fn app() -> App {
    let explorer = Arc::new(NullExplorer::new());
    let seed: TxHash = SEED_TX.parse().unwrap();
    explorer.add_tx(seed, 11);
    explorer.add_block(BlockInfo {
        hash: "b10".into(),
        slot: 100,
        height: Some(10),
        previous_block: None,
    });
    explorer.add_block(BlockInfo {
        hash: "b11".into(),
        slot: 120,
        height: Some(11),
        previous_block: Some("b10".into()),
    });

    let sync = NullChainSync::new()
        .with_block(ChainPoint::new(100, "b10"), Some("0"))
        .with_block(ChainPoint::new(120, "b11"), Some("vrf_7a9"));
    let stats = sync.stats();

    let controller = OracleController::new(
        explorer.clone(),
        VrfLocator::new(Arc::new(sync), DEFAULT_STEP_BUDGET),
        Arc::new(NullTxBuilder::default()),
    );
    App {
        router: router(Arc::new(AppState { controller })),
        explorer,
        sync: stats,
    }
}

fn seed_phrase() -> String {
    ["abandon"; 12].join(" ")
}

fn register_body() -> Value {
    json!({
        "network": 0,
        "walletSeed": seed_phrase(),
        "CBORhex": "4e4d01000033222220051200120011",
        "ogmiosUrl": "ws://ogmios.test:1337",
        "rngfid": "rngfid_test",
        "initRNGTx": SEED_TX,
        "rnlen": 2,
        "oracleDIDUnit": UNIT,
    })
}

async fn call(router: Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_success() {
    let (status, body) = call(app().router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn register_returns_digits_in_envelope() {
    let app = app();
    let (status, body) = call(app.router, "POST", "/register", Some(register_body())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["rngOutput"], "79");
    assert_eq!(body["data"]["oracleDIDUnit"], UNIT);
    assert_eq!(body["data"]["txHash"].as_str().map(str::len), Some(64));
    assert_eq!(app.sync.closes(), 1);
}

#[tokio::test]
async fn register_with_unknown_seed_is_404() {
    let app = app();
    let mut body = register_body();
    body["initRNGTx"] = json!(ORACLE_TX);
    let (status, body) = call(app.router, "POST", "/register", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["kind"], "not_found");
    assert_eq!(app.sync.connects(), 0);
}

#[tokio::test]
async fn validation_failures_are_400() {
    let cases = [
        ("network", json!(2)),
        ("rnlen", json!(9)),
        ("rnlen", json!(0)),
        ("rngfid", json!("abc")),
        ("rngfid", json!("x".repeat(33))),
        ("walletSeed", json!("too few words")),
        ("ogmiosUrl", json!("not a url")),
        ("CBORhex", json!("")),
        ("oracleDIDUnit", json!("beef")),
        ("initRNGTx", json!("nothex")),
    ];
    for (field, value) in cases {
        let mut body = register_body();
        body[field] = value;
        let (status, resp) = call(app().router, "POST", "/register", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}: {resp}");
        assert_eq!(resp["success"], false);
        assert!(resp["error"].is_string());
    }
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/query")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn initiate_without_rngfid_generates_one() {
    let body = json!({
        "network": 1,
        "walletSeed": seed_phrase(),
        "CBORhex": "4e4d01",
        "rnlen": 3,
    });
    let (status, body) = call(app().router, "POST", "/initiate", Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let rngfid = body["data"]["rngfid"].as_str().unwrap();
    assert!(rngfid.starts_with("rngfid_"));
    assert_eq!(rngfid.len(), "rngfid_".len() + 17);
    assert_eq!(body["data"]["rnlen"], 3);
    assert!(body["data"]["datum"].as_str().unwrap().starts_with("d879"));
}

#[tokio::test]
async fn query_reads_oracle_output() {
    let app = app();
    let oracle: TxHash = ORACLE_TX.parse().unwrap();
    let datum = OracleDatum {
        publisher: vec![1; 28],
        initiator: vec![1; 28],
        rngfid: b"rngfid_test".to_vec(),
        seedtxid: SEED_TX.as_bytes().to_vec(),
        rngoutput: b"31415".to_vec(),
    };
    app.explorer
        .put_utxo(OutRef::first(oracle), Some(datum.to_cbor().unwrap()), false);

    let body = json!({ "network": 0, "currUpdatedOracleDIDTx": ORACLE_TX });
    let (status, body) = call(app.router, "POST", "/query", Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, json!({ "data": { "rngOutput": "31415" }, "success": true }));
}

#[tokio::test]
async fn update_of_missing_prior_is_404() {
    let mut body = register_body();
    body["currUpdatedOracleDIDTx"] = json!(ORACLE_TX);
    let (status, body) = call(app().router, "POST", "/update", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
}

#[tokio::test]
async fn upstream_outage_is_502() {
    let app = app();
    app.explorer.set_unavailable(true);
    let (status, body) = call(app.router, "POST", "/register", Some(register_body())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "upstream_unavailable");
}
