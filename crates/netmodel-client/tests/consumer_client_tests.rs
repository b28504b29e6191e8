//! End-to-end tests for the consumer client against an in-memory service.

mod common;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{client, client_with_config, feeder_network, mrids, MockTransport};
use netmodel_client::config::ClientConfig;
use netmodel_client::{ConfigLoadError, NetworkConsumerClient};
use netmodel_domain::model::HierarchySelection;
use netmodel_domain::resolver::LocalStore;
use netmodel_domain::{DomainError, EntityType, Mrid, MultiObjectResult, Role};
use netmodel_store::MemoryStore;

fn keys(result: &MultiObjectResult) -> BTreeSet<&str> {
    result.objects.keys().map(Mrid::as_str).collect()
}

fn operations(transport: &MockTransport) -> Vec<&'static str> {
    transport
        .exchanges()
        .into_iter()
        .map(|exchange| exchange.operation)
        .collect()
}

// ============================================================
// Section 1: Container assembly
// ============================================================

#[tokio::test]
async fn test_get_container_assembles_feeder_equipment_and_connectivity() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let result = client
        .get_container(&Mrid::from("f001"), EntityType::Feeder)
        .await
        .into_result()
        .unwrap();

    // Feeder, 3 equipment items, 5 terminals and 3 connectivity nodes.
    let terminals_and_nodes = 5 + 3;
    assert_eq!(result.len(), 1 + 3 + terminals_and_nodes);
    assert!(result.failed.is_empty());
    assert_eq!(
        keys(&result),
        BTreeSet::from([
            "f001", "b1", "l1", "e1", "t1", "t2", "t3", "t4", "t5", "cn0", "cn1", "cn2"
        ])
    );

    // One hierarchy call, then equipment and two resolution passes.
    assert_eq!(transport.hierarchy_calls().len(), 1);
    assert_eq!(
        operations(&transport),
        vec![
            "get_equipment_for_containers",
            "get_identified_objects",
            "get_identified_objects"
        ]
    );

    // Associations are wired both ways.
    let b1 = client.store().get(&Mrid::from("b1")).unwrap();
    assert_eq!(b1.associated(Role::Terminals), mrids(&["t1", "t2"]));
    let cn1 = client.store().get(&Mrid::from("cn1")).unwrap();
    assert_eq!(cn1.associated(Role::NodeTerminals), mrids(&["t2", "t3"]));
}

#[tokio::test]
async fn test_get_container_with_wrong_type_is_type_mismatch() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let outcome = client
        .get_container(&Mrid::from("f001"), EntityType::Circuit)
        .await;

    let err = outcome.into_result().unwrap_err();
    assert!(matches!(err, DomainError::TypeMismatch { .. }));
    let message = err.to_string();
    assert!(message.contains("Circuit"), "{message}");
    assert!(message.contains("Feeder"), "{message}");

    // Nothing beyond the hierarchy was requested.
    assert!(transport.exchanges().is_empty());
}

#[tokio::test]
async fn test_unknown_container_is_not_found() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let err = client
        .get_container(&Mrid::from("nowhere"), EntityType::Feeder)
        .await
        .into_result()
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound { .. }));
    assert!(err.to_string().contains("nowhere"));
}

#[tokio::test]
async fn test_restriction_container_assembles_restricted_equipment() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let result = client
        .get_container(&Mrid::from("or1"), EntityType::OperationalRestriction)
        .await
        .into_result()
        .unwrap();

    assert_eq!(
        keys(&result),
        BTreeSet::from(["or1", "b1", "t1", "t2", "cn0", "cn1"])
    );
}

#[tokio::test]
async fn test_get_equipment_for_loop_assembles_circuits_and_substations() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let result = client
        .get_equipment_for_loop(&Mrid::from("loop1"))
        .await
        .into_result()
        .unwrap();

    assert_eq!(
        keys(&result),
        BTreeSet::from(["loop1", "c1", "s1", "l1", "t3", "t4", "cn1", "cn2"])
    );
}

#[tokio::test]
async fn test_get_all_loops_covers_every_loop_in_the_hierarchy() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let result = client.get_all_loops().await.into_result().unwrap();

    assert!(result.contains(&Mrid::from("loop1")));
    assert!(result.contains(&Mrid::from("c1")));
    assert!(result.contains(&Mrid::from("l1")));
    assert!(result.failed.is_empty());
}

#[tokio::test]
async fn test_retrieve_network_assembles_every_feeder() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let result = client.retrieve_network().await.into_result().unwrap();

    for mrid in [
        "f001", "f002", "b1", "l1", "e1", "tx1", "t1", "t2", "t3", "t4", "t5", "t6", "t7", "cn0",
        "cn1", "cn2", "cn3",
    ] {
        assert!(result.contains(&Mrid::from(mrid)), "missing {mrid}");
    }
    // Containers referenced by fetched equipment are followed on the first pass.
    assert!(result.contains(&Mrid::from("lvf1")));
}

// ============================================================
// Section 2: Identified objects
// ============================================================

#[tokio::test]
async fn test_get_object_unknown_is_not_found() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let outcome = client.get_object(&Mrid::from("unknown")).await;

    assert!(outcome.is_failure());
    let err = outcome.into_result().unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    assert!(err.to_string().contains("unknown"));
}

#[tokio::test]
async fn test_repeated_fetch_returns_first_instance() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let first = client.get_object(&Mrid::from("b1")).await.into_result().unwrap();
    let second = client.get_object(&Mrid::from("b1")).await.into_result().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    // The second lookup is answered by the store.
    assert_eq!(transport.exchanges().len(), 1);
}

#[tokio::test]
async fn test_get_objects_reports_every_requested_identifier() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);
    let requested = mrids(&["t1", "nope1", "b1", "nope2", "t1"]);

    let result = client
        .get_objects(requested.clone())
        .await
        .into_result()
        .unwrap();

    let resolved: BTreeSet<Mrid> = result.objects.keys().cloned().collect();
    assert!(resolved.is_disjoint(&result.failed));
    let covered: BTreeSet<Mrid> = resolved.union(&result.failed).cloned().collect();
    let expected: BTreeSet<Mrid> = requested.into_iter().collect();
    assert_eq!(covered, expected);
    assert_eq!(
        result.failed,
        mrids(&["nope1", "nope2"]).into_iter().collect::<BTreeSet<_>>()
    );
}

#[tokio::test]
async fn test_2500_identifiers_are_sent_in_three_batches() {
    let transport = Arc::new(MockTransport::new());
    let client = client(&transport);
    let requested: Vec<Mrid> = (0..2500).map(|i| Mrid::new(format!("m{i}"))).collect();

    let result = client.get_objects(requested).await.into_result().unwrap();

    assert_eq!(transport.batch_sizes(), vec![1000, 1000, 500]);
    assert!(result.is_empty());
    assert_eq!(result.failed.len(), 2500);

    let metrics = client.metrics();
    assert_eq!(metrics.exchanges, 1);
    assert_eq!(metrics.batches_sent, 3);
}

#[tokio::test]
async fn test_configured_batch_size_is_honoured() {
    let transport = Arc::new(MockTransport::new());
    let mut config = ClientConfig::default();
    config.client.batch_size = 300;
    let client = client_with_config(&transport, &config);
    let requested: Vec<Mrid> = (0..700).map(|i| Mrid::new(format!("m{i}"))).collect();

    client.get_objects(requested).await.into_result().unwrap();

    assert_eq!(transport.batch_sizes(), vec![300, 300, 100]);
}

#[tokio::test]
async fn test_transport_failure_mid_stream_fails_whole_operation() {
    let transport = Arc::new(feeder_network().failing_after_batches(1));
    let client = client(&transport);
    let mut requested = mrids(&["b1", "t1"]);
    requested.extend((0..1198).map(|i| Mrid::new(format!("m{i}"))));

    let outcome = client.get_objects(requested).await;

    assert!(outcome.value().is_none());
    let err = outcome.into_result().unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err}");
    assert!(err.to_string().contains("server went away"));
    assert_eq!(transport.batch_sizes(), vec![1000, 200]);
}

#[tokio::test]
async fn test_get_equipment_for_container_does_not_resolve() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let result = client
        .get_equipment_for_container(&Mrid::from("f001"))
        .await
        .into_result()
        .unwrap();

    assert_eq!(keys(&result), BTreeSet::from(["b1", "l1", "e1"]));
    assert_eq!(operations(&transport), vec!["get_equipment_for_containers"]);
    assert!(client.store().num_unresolved_references() > 0);
}

// ============================================================
// Section 3: Reference resolution
// ============================================================

#[tokio::test]
async fn test_later_passes_do_not_pull_in_unrelated_containers() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let seed = client
        .get_objects(mrids(&["t6"]))
        .await
        .into_result()
        .unwrap();
    let result = client.resolve_references(seed).await.into_result().unwrap();

    assert_eq!(
        keys(&result),
        BTreeSet::from(["t6", "tx1", "cn2", "t7", "cn3"])
    );
    let store = client.store();
    assert!(!store.contains(&Mrid::from("lvf1")));
    assert!(!store.contains(&Mrid::from("f002")));
    // The skipped container links stay outstanding.
    assert_eq!(store.unresolved_references_from(&Mrid::from("tx1")).len(), 2);
}

#[tokio::test]
async fn test_restriction_equipment_follows_containers_only_on_first_pass() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let result = client
        .get_equipment_for_restriction(&Mrid::from("or1"))
        .await
        .into_result()
        .unwrap();

    // b1's feeder is reached on the first pass; the feeder's substation is not.
    assert_eq!(
        keys(&result),
        BTreeSet::from(["b1", "f001", "t1", "t2", "cn0", "cn1"])
    );
    assert!(!client.store().contains(&Mrid::from("s1")));
}

// ============================================================
// Section 4: Hierarchy cache
// ============================================================

#[tokio::test]
async fn test_hierarchy_is_fetched_once_and_ignores_later_selection() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    let first = client
        .get_hierarchy(HierarchySelection::default())
        .await
        .into_result()
        .unwrap();
    let other_selection = HierarchySelection::default()
        .with_loops(false)
        .with_lv_feeders(true);
    let second = client
        .get_hierarchy(other_selection)
        .await
        .into_result()
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.selection, HierarchySelection::default());
    assert_eq!(second.feeders.len(), 2);
    assert_eq!(second.loops.len(), 1);
    assert_eq!(transport.hierarchy_calls(), vec![HierarchySelection::default()]);

    let metrics = client.metrics();
    assert_eq!(metrics.hierarchy_misses, 1);
    assert_eq!(metrics.hierarchy_hits, 1);
}

#[tokio::test]
async fn test_hierarchy_stream_closed_without_response_is_channel_closed() {
    let transport = Arc::new(feeder_network().with_empty_hierarchy());
    let client = client(&transport);

    let err = client
        .get_hierarchy(HierarchySelection::default())
        .await
        .into_result()
        .unwrap_err();
    assert!(matches!(
        &err,
        DomainError::ChannelClosed { operation } if operation == "get_network_hierarchy"
    ));
    assert!(!client.hierarchy_cache().is_populated());

    // Assembly needs the hierarchy first, so it fails the same way.
    let err = client
        .get_container(&Mrid::from("f001"), EntityType::Feeder)
        .await
        .into_result()
        .unwrap_err();
    assert!(matches!(err, DomainError::ChannelClosed { .. }));
    assert!(!client.hierarchy_cache().is_populated());
    assert_eq!(transport.hierarchy_calls().len(), 2);
    assert!(transport.exchanges().is_empty());
}

// ============================================================
// Section 5: Outcomes, timeouts and metrics
// ============================================================

#[tokio::test]
async fn test_error_handlers_see_failures() {
    let transport = Arc::new(feeder_network());
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let client = client(&transport).with_error_handler(move |error: &DomainError| {
        counter.fetch_add(1, Ordering::SeqCst);
        matches!(error, DomainError::NotFound { .. })
    });

    let outcome = client.get_object(&Mrid::from("unknown")).await;
    assert!(outcome.was_handled());

    let outcome = client.get_object(&Mrid::from("b1")).await;
    assert!(outcome.is_successful());

    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_operation_times_out() {
    let transport = Arc::new(feeder_network().with_hierarchy_delay(Duration::from_secs(5)));
    let mut config = ClientConfig::default();
    config.client.request_timeout_secs = 1;
    let client = client_with_config(&transport, &config);

    let err = client
        .get_container(&Mrid::from("f001"), EntityType::Feeder)
        .await
        .into_result()
        .unwrap_err();

    assert!(matches!(err, DomainError::Timeout { duration_ms: 1000 }));
    assert!(!client.hierarchy_cache().is_populated());
}

#[tokio::test]
async fn test_timed_out_exchanges_release_their_response_streams() {
    let marker = Arc::new(());
    let transport = Arc::new(MockTransport::new().stalling_exchanges(&marker));
    let mut config = ClientConfig::default();
    config.client.request_timeout_secs = 1;
    let client = client_with_config(&transport, &config);

    for i in 0..3 {
        let err = client
            .get_objects(vec![Mrid::new(format!("stalled{i}"))])
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, DomainError::Timeout { .. }));
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    // Only the test and the mock still hold the marker.
    assert_eq!(Arc::strong_count(&marker), 2);
    assert_eq!(transport.exchanges().len(), 3);
}

#[test]
fn test_client_rejects_invalid_configuration() {
    let transport = Arc::new(feeder_network());
    let mut config = ClientConfig::default();
    config.client.request_timeout_secs = 0;

    let err = NetworkConsumerClient::with_store(
        Arc::clone(&transport),
        MemoryStore::new_shared(),
        &config,
    )
    .err()
    .expect("zero timeout rejected");
    match err {
        ConfigLoadError::Invalid { message } => {
            assert!(message.contains("client.request_timeout_secs"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let mut config = ClientConfig::default();
    config.client.batch_size = 0;
    assert!(NetworkConsumerClient::with_config(feeder_network(), &config).is_err());
}

#[tokio::test]
async fn test_metrics_track_exchanges() {
    let transport = Arc::new(feeder_network());
    let client = client(&transport);

    client
        .get_container(&Mrid::from("f001"), EntityType::Feeder)
        .await
        .into_result()
        .unwrap();

    let metrics = client.metrics();
    assert_eq!(metrics.exchanges, 4);
    assert_eq!(metrics.batches_sent, 3);
    // 7 hierarchy objects, 3 equipment, 5 terminals, 3 nodes.
    assert_eq!(metrics.objects_received, 18);
    assert_eq!(metrics.hierarchy_misses, 1);
    assert_eq!(metrics.hierarchy_hits, 0);
}
