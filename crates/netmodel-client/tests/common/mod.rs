//! Shared test utilities for client integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tonic::Status;

use netmodel_client::config::ClientConfig;
use netmodel_client::handlers::batch::IdentifierBatch;
use netmodel_client::{NetworkConsumerClient, NetworkTransport, RequestStream, ResponseStream};
use netmodel_domain::model::{
    EquipmentKind, HierarchyResponse, HierarchySelection, WireObject, WirePayload,
};
use netmodel_domain::Mrid;
use netmodel_store::MemoryStore;

/// One batched exchange as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedExchange {
    pub operation: &'static str,
    pub batch_sizes: Vec<usize>,
}

/// In-memory stand-in for the network model service.
#[derive(Default)]
pub struct MockTransport {
    objects: HashMap<Mrid, WireObject>,
    container_equipment: HashMap<Mrid, Vec<Mrid>>,
    restriction_equipment: HashMap<Mrid, Vec<Mrid>>,
    hierarchy: HierarchyResponse,
    fail_after_batches: Option<usize>,
    hierarchy_delay: Option<Duration>,
    empty_hierarchy: bool,
    stall_marker: Option<Arc<()>>,
    exchanges: Mutex<Vec<RecordedExchange>>,
    hierarchy_calls: Mutex<Vec<HierarchySelection>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects<I: IntoIterator<Item = WireObject>>(mut self, objects: I) -> Self {
        for object in objects {
            self.objects.insert(object.mrid.clone(), object);
        }
        self
    }

    pub fn with_container(mut self, container: &str, equipment: &[&str]) -> Self {
        self.container_equipment
            .insert(Mrid::from(container), equipment.iter().map(|m| Mrid::from(*m)).collect());
        self
    }

    pub fn with_restriction(mut self, restriction: &str, equipment: &[&str]) -> Self {
        self.restriction_equipment.insert(
            Mrid::from(restriction),
            equipment.iter().map(|m| Mrid::from(*m)).collect(),
        );
        self
    }

    pub fn with_hierarchy(mut self, hierarchy: HierarchyResponse) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    /// Answers the first `batches` batches of an exchange, then fails it.
    pub fn failing_after_batches(mut self, batches: usize) -> Self {
        self.fail_after_batches = Some(batches);
        self
    }

    pub fn with_hierarchy_delay(mut self, delay: Duration) -> Self {
        self.hierarchy_delay = Some(delay);
        self
    }

    /// Closes the hierarchy stream without sending a response.
    pub fn with_empty_hierarchy(mut self) -> Self {
        self.empty_hierarchy = true;
        self
    }

    /// Batched exchanges never answer; each open stream holds a clone of `marker`.
    pub fn stalling_exchanges(mut self, marker: &Arc<()>) -> Self {
        self.stall_marker = Some(Arc::clone(marker));
        self
    }

    pub fn exchanges(&self) -> Vec<RecordedExchange> {
        self.exchanges.lock().unwrap().clone()
    }

    /// Batch sizes across every batched exchange, in order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.exchanges()
            .into_iter()
            .flat_map(|exchange| exchange.batch_sizes)
            .collect()
    }

    pub fn hierarchy_calls(&self) -> Vec<HierarchySelection> {
        self.hierarchy_calls.lock().unwrap().clone()
    }

    async fn answer_batches<F>(
        &self,
        operation: &'static str,
        requests: RequestStream,
        lookup: F,
    ) -> ResponseStream<WireObject>
    where
        F: Fn(&Mrid) -> Vec<WireObject>,
    {
        let batches: Vec<IdentifierBatch> = requests.collect().await;
        self.exchanges.lock().unwrap().push(RecordedExchange {
            operation,
            batch_sizes: batches.iter().map(IdentifierBatch::len).collect(),
        });

        if let Some(marker) = &self.stall_marker {
            let held = Arc::clone(marker);
            return stream::pending::<Result<WireObject, Status>>()
                .map(move |item| {
                    let _ = &held;
                    item
                })
                .boxed();
        }

        let mut responses = Vec::new();
        for (index, batch) in batches.iter().enumerate() {
            if self.fail_after_batches == Some(index) {
                responses.push(Err(Status::unavailable("server went away")));
                break;
            }
            for mrid in &batch.mrids {
                responses.extend(lookup(mrid).into_iter().map(Ok));
            }
        }
        stream::iter(responses).boxed()
    }

    fn lookup_all(&self, mrids: Option<&Vec<Mrid>>) -> Vec<WireObject> {
        mrids
            .into_iter()
            .flatten()
            .filter_map(|mrid| self.objects.get(mrid).cloned())
            .collect()
    }
}

#[async_trait]
impl NetworkTransport for MockTransport {
    async fn get_identified_objects(
        &self,
        requests: RequestStream,
    ) -> Result<ResponseStream<WireObject>, Status> {
        Ok(self
            .answer_batches("get_identified_objects", requests, |mrid| {
                self.objects.get(mrid).cloned().into_iter().collect()
            })
            .await)
    }

    async fn get_equipment_for_containers(
        &self,
        requests: RequestStream,
    ) -> Result<ResponseStream<WireObject>, Status> {
        Ok(self
            .answer_batches("get_equipment_for_containers", requests, |mrid| {
                self.lookup_all(self.container_equipment.get(mrid))
            })
            .await)
    }

    async fn get_equipment_for_restriction(
        &self,
        mrid: Mrid,
    ) -> Result<ResponseStream<WireObject>, Status> {
        let equipment = self.lookup_all(self.restriction_equipment.get(&mrid));
        Ok(stream::iter(equipment.into_iter().map(Ok::<_, Status>)).boxed())
    }

    async fn get_network_hierarchy(
        &self,
        selection: HierarchySelection,
    ) -> Result<ResponseStream<HierarchyResponse>, Status> {
        self.hierarchy_calls.lock().unwrap().push(selection);
        if let Some(delay) = self.hierarchy_delay {
            tokio::time::sleep(delay).await;
        }
        if self.empty_hierarchy {
            return Ok(stream::empty().boxed());
        }
        Ok(stream::iter(vec![Ok(self.hierarchy.clone())]).boxed())
    }
}

/// Builds a client over a shared mock so tests can inspect it afterwards.
pub fn client(transport: &Arc<MockTransport>) -> NetworkConsumerClient<MockTransport> {
    client_with_config(transport, &ClientConfig::default())
}

pub fn client_with_config(
    transport: &Arc<MockTransport>,
    config: &ClientConfig,
) -> NetworkConsumerClient<MockTransport> {
    NetworkConsumerClient::with_store(Arc::clone(transport), MemoryStore::new_shared(), config)
        .expect("valid test configuration")
}

pub fn mrids(values: &[&str]) -> Vec<Mrid> {
    values.iter().map(|value| Mrid::from(*value)).collect()
}

fn opt(mrid: &str) -> Option<Mrid> {
    Some(Mrid::from(mrid))
}

pub fn terminal(mrid: &str, equipment: &str, node: &str) -> WireObject {
    WireObject::new(
        mrid,
        mrid,
        WirePayload::Terminal {
            conducting_equipment: opt(equipment),
            connectivity_node: opt(node),
        },
    )
}

pub fn node(mrid: &str) -> WireObject {
    WireObject::new(mrid, mrid, WirePayload::ConnectivityNode)
}

pub fn equipment(mrid: &str, kind: EquipmentKind, terminals: &[&str], containers: &[&str]) -> WireObject {
    WireObject::new(
        mrid,
        mrid,
        WirePayload::ConductingEquipment {
            kind,
            terminals: mrids(terminals),
            equipment_containers: mrids(containers),
        },
    )
}

pub fn feeder(mrid: &str, head_terminal: &str, substation: &str) -> WireObject {
    WireObject::new(
        mrid,
        mrid,
        WirePayload::Feeder {
            normal_head_terminal: opt(head_terminal),
            normal_energizing_substation: opt(substation),
        },
    )
}

/// A small network:
///
/// ```text
/// gr1 - sgr1 - s1 - f001: b1 (t1, t2), l1 (t3, t4), e1 (t5)
///                 - f002: tx1 (t6, t7), also in lvf1
///                 - loop1: c1 (holds l1), s1
/// t1-cn0, t2/t3-cn1, t4/t5/t6-cn2, t7-cn3
/// or1 restricts b1
/// ```
pub fn feeder_network() -> MockTransport {
    let hierarchy = HierarchyResponse {
        geographical_regions: vec![WireObject::new(
            "gr1",
            "region",
            WirePayload::GeographicalRegion {
                sub_geographical_regions: mrids(&["sgr1"]),
            },
        )],
        sub_geographical_regions: vec![WireObject::new(
            "sgr1",
            "sub-region",
            WirePayload::SubGeographicalRegion {
                geographical_region: opt("gr1"),
                substations: mrids(&["s1"]),
            },
        )],
        substations: vec![WireObject::new(
            "s1",
            "zone substation",
            WirePayload::Substation {
                sub_geographical_region: opt("sgr1"),
                normal_energized_feeders: mrids(&["f001", "f002"]),
                loops: mrids(&["loop1"]),
            },
        )],
        feeders: vec![feeder("f001", "t1", "s1"), feeder("f002", "t6", "s1")],
        circuits: vec![WireObject::new(
            "c1",
            "circuit",
            WirePayload::Circuit {
                loop_: opt("loop1"),
                end_terminals: Vec::new(),
            },
        )],
        loops: vec![WireObject::new(
            "loop1",
            "loop",
            WirePayload::Loop {
                circuits: mrids(&["c1"]),
                substations: mrids(&["s1"]),
            },
        )],
        lv_feeders: Vec::new(),
    };

    MockTransport::new()
        .with_hierarchy(hierarchy.clone())
        .with_objects(hierarchy.into_objects())
        .with_objects([
            equipment("b1", EquipmentKind::Breaker, &["t1", "t2"], &["f001"]),
            equipment("l1", EquipmentKind::AcLineSegment, &["t3", "t4"], &["f001", "c1"]),
            equipment("e1", EquipmentKind::EnergyConsumer, &["t5"], &["f001"]),
            equipment("tx1", EquipmentKind::PowerTransformer, &["t6", "t7"], &["f002", "lvf1"]),
            terminal("t1", "b1", "cn0"),
            terminal("t2", "b1", "cn1"),
            terminal("t3", "l1", "cn1"),
            terminal("t4", "l1", "cn2"),
            terminal("t5", "e1", "cn2"),
            terminal("t6", "tx1", "cn2"),
            terminal("t7", "tx1", "cn3"),
            node("cn0"),
            node("cn1"),
            node("cn2"),
            node("cn3"),
            WireObject::new(
                "lvf1",
                "lv feeder",
                WirePayload::LvFeeder {
                    normal_head_terminal: opt("t7"),
                },
            ),
            WireObject::new("or1", "restriction", WirePayload::OperationalRestriction),
        ])
        .with_container("f001", &["b1", "l1", "e1"])
        .with_container("f002", &["tx1"])
        .with_container("c1", &["l1"])
        .with_restriction("or1", &["b1"])
}
