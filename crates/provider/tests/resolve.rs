#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use konf_provider::{
    ConfigProvider, Error, MemStore, Resolver, ResolverOptions, ResourceKind, ResourceStore,
};

fn keys(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn opts(separator: &str) -> ResolverOptions {
    ResolverOptions {
        separator: separator.to_string(),
    }
}

fn store() -> Arc<MemStore> {
    let mut mem = MemStore::new("default");
    mem.insert(
        ResourceKind::ConfigMap,
        "default",
        "test-map",
        &[("test-key-1", "v1"), ("test-key-2", "v2"), ("test-key-3", "v3")],
    );
    mem.insert(
        ResourceKind::ConfigMap,
        "kafka",
        "broker-config",
        &[
            ("test.config", "v1"),
            ("test2.config", "v2"),
            ("test.properties", "v3"),
        ],
    );
    let user = STANDARD.encode("admin");
    let pass = STANDARD.encode("hunter2");
    mem.insert(
        ResourceKind::Secret,
        "kafka",
        "creds",
        &[("user", &user), ("pass", &pass)],
    );
    mem.insert(ResourceKind::Secret, "kafka", "broken", &[("bad", "!!!")]);
    Arc::new(mem)
}

#[tokio::test]
async fn get_returns_all_keys() {
    let r = Resolver::new(store(), ResourceKind::ConfigMap, opts("\n"));
    let out = r.get("default/test-map").await.expect("ok");
    assert_eq!(out.len(), 3);
    assert_eq!(out.get("test-key-2").map(String::as_str), Some("v2"));
}

#[tokio::test]
async fn get_keys_selects_literals() {
    let r = Resolver::new(store(), ResourceKind::ConfigMap, opts("\n"));
    let out = r
        .get_keys("default/test-map", &keys(&["test-key-1", "test-key-3"]))
        .await
        .expect("ok");
    assert_eq!(out.len(), 2);
    assert_eq!(out.get("test-key-1").map(String::as_str), Some("v1"));
    assert_eq!(out.get("test-key-3").map(String::as_str), Some("v3"));
}

#[tokio::test]
async fn glob_spec_joins_matches_in_key_order() {
    let r = Resolver::new(store(), ResourceKind::ConfigMap, opts("\n"));
    let out = r
        .get_keys("kafka/broker-config", &keys(&["*.config"]))
        .await
        .expect("ok");
    assert_eq!(out.get("*.config").map(String::as_str), Some("v1\nv2"));
}

#[tokio::test]
async fn separator_is_per_instance() {
    let s = store();
    let newline = Resolver::new(s.clone(), ResourceKind::ConfigMap, opts("\n"));
    let comma = Resolver::new(s, ResourceKind::ConfigMap, opts(","));
    let req = keys(&["*.config"]);
    let a = newline.get_keys("kafka/broker-config", &req).await.expect("ok");
    let b = comma.get_keys("kafka/broker-config", &req).await.expect("ok");
    assert_eq!(a.get("*.config").map(String::as_str), Some("v1\nv2"));
    assert_eq!(b.get("*.config").map(String::as_str), Some("v1,v2"));
}

#[tokio::test]
async fn bare_name_uses_store_default_namespace() {
    let r = Resolver::new(store(), ResourceKind::ConfigMap, opts("\n"));
    let out = r.get("test-map").await.expect("ok");
    assert_eq!(out.get("test-key-1").map(String::as_str), Some("v1"));
}

#[tokio::test]
async fn secret_values_come_back_decoded() {
    let r = Resolver::new(store(), ResourceKind::Secret, opts("\n"));
    let out = r.get("kafka/creds").await.expect("ok");
    assert_eq!(out.get("user").map(String::as_str), Some("admin"));
    assert_eq!(out.get("pass").map(String::as_str), Some("hunter2"));
}

#[tokio::test]
async fn undecodable_secret_aborts_resolution() {
    let r = Resolver::new(store(), ResourceKind::Secret, opts("\n"));
    let err = r.get("kafka/broken").await.unwrap_err();
    assert!(matches!(err, Error::Decode { ref key, .. } if key == "bad"));
}

#[tokio::test]
async fn missing_resource_is_an_error_not_an_empty_map() {
    let r = Resolver::new(store(), ResourceKind::ConfigMap, opts("\n"));
    let err = r.get("default/absent").await.unwrap_err();
    match err {
        Error::NotFound {
            kind,
            namespace,
            name,
        } => {
            assert_eq!(kind, ResourceKind::ConfigMap);
            assert_eq!(namespace, "default");
            assert_eq!(name, "absent");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn kind_addressing_is_disjoint() {
    // A Secret fetch never falls back to a ConfigMap of the same name.
    let r = Resolver::new(store(), ResourceKind::Secret, opts("\n"));
    let err = r.get("default/test-map").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn malformed_path_propagates_invalid_reference() {
    let r = Resolver::new(store(), ResourceKind::ConfigMap, opts("\n"));
    for path in ["a/b/c", "ns//name", "/name", "NS/name"] {
        let err = r.get(path).await.unwrap_err();
        assert!(
            matches!(err, Error::InvalidReference { .. }),
            "path {:?} should be invalid",
            path
        );
    }
}

#[tokio::test]
async fn close_is_idempotent() {
    let r = Resolver::new(store(), ResourceKind::ConfigMap, opts("\n"));
    r.close().await;
    r.close().await;
    // Still usable as plain data afterwards; nothing was torn down.
    assert_eq!(r.kind(), ResourceKind::ConfigMap);
}

#[tokio::test]
async fn mem_store_reports_default_namespace() {
    let s = store();
    assert_eq!(s.default_namespace(), "default");
}
