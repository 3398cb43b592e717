//! Integration tests for network registration and multi-network routing.

use crate::mock_infrastructure::{EndpointBehavior, MockTransport};
use serde_json::json;
use std::sync::Arc;
use veil_core::{
    NetworkRegistry, ProviderDescriptorSet, ProviderEndpoint, RegistryError, RpcRequest, Transport,
};

fn endpoint(url: &str) -> ProviderEndpoint {
    ProviderEndpoint {
        url: url.to_string(),
        priority: 1,
        weight: 1,
        stall_timeout_ms: Some(25),
    }
}

fn descriptor(name: &str, chain_id: u64, endpoints: Vec<ProviderEndpoint>) -> ProviderDescriptorSet {
    ProviderDescriptorSet { network_name: name.to_string(), chain_id, endpoints }
}

fn registry(transport: &Arc<MockTransport>) -> NetworkRegistry {
    NetworkRegistry::new(Arc::clone(transport) as Arc<dyn Transport>)
}

fn request() -> RpcRequest {
    RpcRequest::new("eth_blockNumber", None, json!(1))
}

#[tokio::test]
async fn test_concurrent_networks_route_independently() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("https://eth.example", json!("0x1"));
    transport.respond("https://polygon.example", json!("0x89"));

    let registry = registry(&transport);
    registry
        .register_network(descriptor("Ethereum", 1, vec![endpoint("https://eth.example")]))
        .unwrap();
    registry
        .register_network(descriptor("Polygon", 137, vec![endpoint("https://polygon.example")]))
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let ethereum = registry.router("Ethereum").unwrap();
        let polygon = registry.router("Polygon").unwrap();

        handles.push(tokio::spawn(async move {
            let eth_response = ethereum.request(&request()).await.unwrap();
            let polygon_response = polygon.request(&request()).await.unwrap();
            (eth_response.response.result, polygon_response.response.result)
        }));
    }

    for handle in handles {
        let (eth_result, polygon_result) = handle.await.unwrap();
        assert_eq!(eth_result, Some(json!("0x1")));
        assert_eq!(polygon_result, Some(json!("0x89")));
    }
}

#[tokio::test]
async fn test_reregistration_leaves_inflight_requests_on_old_router() {
    let transport = Arc::new(MockTransport::new());
    transport.set("https://old.example", EndpointBehavior::Stall);
    transport.respond("https://new.example", json!("0x2"));

    let registry = registry(&transport);
    let old_router = registry
        .register_network(descriptor("Ethereum", 1, vec![endpoint("https://old.example")]))
        .unwrap();

    // Start a request against the old router, then replace the network
    // while it is still in flight.
    let inflight = tokio::spawn({
        let old_router = Arc::clone(&old_router);
        async move { old_router.request(&request()).await }
    });

    registry
        .register_network(descriptor("Ethereum", 1, vec![endpoint("https://new.example")]))
        .unwrap();

    // New lookups resolve to the replacement immediately.
    let response = registry.router("Ethereum").unwrap().request(&request()).await.unwrap();
    assert_eq!(response.endpoint.as_ref(), "https://new.example");

    // The in-flight request completes against the old configuration: its
    // only endpoint stalls, so it exhausts rather than migrating.
    let old_outcome = inflight.await.unwrap();
    assert!(old_outcome.is_err(), "old request must not migrate to the new router");
}

#[tokio::test]
async fn test_invalid_registration_does_not_disturb_other_networks() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("https://eth.example", json!("0x1"));

    let registry = registry(&transport);
    registry
        .register_network(descriptor("Ethereum", 1, vec![endpoint("https://eth.example")]))
        .unwrap();

    let bad = ProviderEndpoint {
        url: "https://bad.example".to_string(),
        priority: 1,
        weight: 0,
        stall_timeout_ms: None,
    };
    let result = registry.register_network(descriptor("Polygon", 137, vec![bad]));
    assert!(matches!(result, Err(RegistryError::InvalidConfig { .. })));

    assert!(registry.router("Polygon").is_none());
    assert!(registry.router("Ethereum").unwrap().request(&request()).await.is_ok());
}

#[tokio::test]
async fn test_fees_surface_in_registry_snapshot() {
    let transport = Arc::new(MockTransport::new());
    transport.respond_with_fee(
        "https://eth.example",
        json!("0x10"),
        json!({"gasPrice": "0x5208"}),
    );

    let registry = registry(&transport);
    registry
        .register_network(descriptor("Ethereum", 1, vec![endpoint("https://eth.example")]))
        .unwrap();

    registry.router("Ethereum").unwrap().request(&request()).await.unwrap();

    let fees = registry.fees_serialized("Ethereum").unwrap();
    assert_eq!(fees, json!({"https://eth.example": {"gasPrice": "0x5208"}}));

    let snapshot = registry.telemetry_snapshot("Ethereum").unwrap();
    assert_eq!(snapshot.chain_id, 1);
    assert_eq!(snapshot.endpoints[0].success_count, 1);
    assert!(snapshot.endpoints[0].observed_at.is_some());
}
