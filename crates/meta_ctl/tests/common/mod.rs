//! Shared mock clients for diagnosis and sweep tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use meta_ctl::error::{ClientError, Result};
use meta_ctl::master_client::MasterApi;
use meta_ctl::meta::{
    MetaNodeInfo, MetaNodePartitionInfo, MetaPartitionDiagnosis, MetaPartitionInfo,
    MetaReplicaInfo, PeerInfo, VolInfo, VolView,
};
use meta_ctl::node_client::MetaNodeApi;

/// Build a partition record whose replicas mirror `hosts` (first is leader).
pub fn partition(
    id: u64,
    vol: &str,
    factor: u8,
    hosts: &[&str],
    status: i8,
    miss: &[&str],
) -> MetaPartitionInfo {
    MetaPartitionInfo {
        partition_id: id,
        vol_name: vol.to_string(),
        replica_num: factor,
        status,
        hosts: hosts.iter().map(|h| h.to_string()).collect(),
        miss_nodes: miss.iter().map(|h| h.to_string()).collect(),
        replicas: hosts
            .iter()
            .enumerate()
            .map(|(idx, h)| MetaReplicaInfo {
                addr: h.to_string(),
                is_leader: idx == 0,
            })
            .collect(),
    }
}

/// In-memory control plane. `visited` records every partition fetch;
/// `fail_partition_fetches` injects master-side fetch errors.
#[derive(Default)]
pub struct MockMaster {
    pub partitions: HashMap<u64, MetaPartitionInfo>,
    pub vols: Vec<VolInfo>,
    pub views: HashMap<String, VolView>,
    pub nodes: HashMap<String, MetaNodeInfo>,
    pub diagnosis: MetaPartitionDiagnosis,
    pub fail_partition_fetches: HashSet<u64>,
    pub visited: Mutex<Vec<u64>>,
}

#[async_trait]
impl MasterApi for MockMaster {
    async fn get_meta_partition(&self, partition_id: u64) -> Result<MetaPartitionInfo> {
        self.visited.lock().unwrap().push(partition_id);
        if self.fail_partition_fetches.contains(&partition_id) {
            return Err(ClientError::Api {
                target: "master".to_string(),
                code: 500,
                msg: "injected fetch failure".to_string(),
            });
        }
        self.partitions
            .get(&partition_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("meta partition {partition_id} not exists")))
    }

    async fn diagnose_meta_partitions(&self) -> Result<MetaPartitionDiagnosis> {
        Ok(self.diagnosis.clone())
    }

    async fn list_vols(&self, _keywords: &str) -> Result<Vec<VolInfo>> {
        Ok(self.vols.clone())
    }

    async fn get_volume(&self, name: &str, _auth_key: &str) -> Result<VolView> {
        self.views
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("volume {name} not exists")))
    }

    async fn get_meta_node(&self, addr: &str) -> Result<MetaNodeInfo> {
        self.nodes
            .get(addr)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("meta node {addr} not exists")))
    }

    async fn decommission_meta_partition(&self, _partition_id: u64, _addr: &str) -> Result<()> {
        Ok(())
    }

    async fn add_meta_replica(&self, _partition_id: u64, _addr: &str) -> Result<()> {
        Ok(())
    }

    async fn delete_meta_replica(&self, _partition_id: u64, _addr: &str) -> Result<()> {
        Ok(())
    }
}

/// In-memory meta nodes, keyed by bare host (service port stripped). Tracks
/// the peak number of concurrent queries so sweep tests can assert the pool
/// bound.
#[derive(Default)]
pub struct MockNodes {
    /// host -> peer addresses reported for every partition on that host.
    pub peers: HashMap<String, Vec<String>>,
    pub unreachable: HashSet<String>,
    pub delay: Duration,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

#[async_trait]
impl MetaNodeApi for MockNodes {
    async fn get_partition(
        &self,
        node_host: &str,
        partition_id: u64,
    ) -> Result<MetaNodePartitionInfo> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = if self.unreachable.contains(node_host) {
            Err(ClientError::Api {
                target: node_host.to_string(),
                code: 503,
                msg: "connect refused".to_string(),
            })
        } else {
            self.peers
                .get(node_host)
                .map(|addrs| MetaNodePartitionInfo {
                    peers: addrs
                        .iter()
                        .enumerate()
                        .map(|(idx, addr)| PeerInfo {
                            id: idx as u64 + 1,
                            addr: addr.clone(),
                        })
                        .collect(),
                })
                .ok_or_else(|| {
                    ClientError::NotFound(format!("partition {partition_id} not on {node_host}"))
                })
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
