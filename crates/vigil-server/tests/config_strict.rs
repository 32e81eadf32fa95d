#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use vigil_server::config::{self, ServiceSection};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8000"
service:
  kind: predict
  model_path: "model.json"
  latency_bukets: [0.1] # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_predict_config() {
    let ok = r#"
version: 1
service:
  kind: predict
  model_path: "config/iris_model.json"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen, "0.0.0.0:8000");
    let ServiceSection::Predict(p) = &cfg.service else {
        panic!("expected predict service");
    };
    assert_eq!(p.latency_buckets, vec![0.01, 0.05, 0.1, 0.3, 0.5, 1.0, 2.0]);
}

#[test]
fn ok_minimal_quote_config() {
    let ok = r#"
version: 1
service:
  kind: quote
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.service.kind(), "quote");
    let ServiceSection::Quote(q) = &cfg.service else {
        panic!("expected quote service");
    };
    assert_eq!(q.timeout_ms, 5000);
    assert_eq!(q.chaos.min_delay_ms, 1000);
    assert_eq!(q.chaos.max_delay_ms, 5000);
    assert_eq!(q.latency_buckets.len(), 14);
}

#[test]
fn rejects_unknown_service_kind() {
    let bad = r#"
version: 1
service:
  kind: billing
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn rejects_unsorted_buckets() {
    let bad = r#"
version: 1
service:
  kind: predict
  model_path: "m.json"
  latency_buckets: [0.5, 0.1]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn rejects_bad_listen_and_version() {
    let bad_listen = r#"
version: 1
server:
  listen: "not-an-addr"
service:
  kind: quote
"#;
    assert!(config::load_from_str(bad_listen).is_err());

    let bad_version = r#"
version: 2
service:
  kind: quote
"#;
    assert!(config::load_from_str(bad_version).is_err());
}

#[test]
fn rejects_inverted_chaos_range() {
    let bad = r#"
version: 1
service:
  kind: quote
  chaos:
    min_delay_ms: 5000
    max_delay_ms: 1000
"#;
    assert!(config::load_from_str(bad).is_err());
}
