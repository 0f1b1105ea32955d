//! Partition-health diagnosis engine.
//!
//! Cross-references the master's recorded membership of one partition against
//! the peer set each replica locally reports, and classifies the partition as
//! healthy or unhealthy with specific reasons. All output here is structured;
//! text rendering lives in [`crate::report`].

use crate::error::{ClientError, Result};
use crate::master_client::MasterApi;
use crate::meta::{MetaPartitionInfo, STATUS_NO_LEADER};
use crate::node_client::{host_of, MetaNodeApi};

/// One violated health condition. A partition is unhealthy when it has at
/// least one; a single check can accumulate several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnhealthyReason {
    /// The master reports hosts missing from the partition.
    MissingReplicas { nodes: Vec<String> },
    /// The master reports no elected leader.
    NoLeader,
    /// The assigned host count disagrees with the replica factor.
    HostCountMismatch { got: usize, want: usize },
    /// The replica could not be queried for its local peer view.
    ReplicaUnreachable { addr: String },
    /// The replica's local peer set disagrees with the master's host set.
    PeerMismatch { addr: String },
    /// The replica's local peer count disagrees with the replica factor.
    PeerCountMismatch { addr: String, got: usize, want: usize },
}

/// Peer view observed from (or error encountered at) one replica.
#[derive(Debug, Clone)]
pub struct ReplicaPeerRow {
    pub addr: String,
    /// Sorted peer addresses; `None` when the replica was unreachable.
    pub peers: Option<Vec<String>>,
    /// Expected peer count (the replica factor).
    pub expected: u8,
    pub error: Option<String>,
}

impl ReplicaPeerRow {
    pub fn peer_count(&self) -> usize {
        self.peers.as_ref().map_or(0, Vec::len)
    }
}

/// Full diagnosis of one partition. `partition.hosts` is sorted ascending.
#[derive(Debug, Clone)]
pub struct PartitionCheck {
    pub partition: MetaPartitionInfo,
    pub rows: Vec<ReplicaPeerRow>,
    pub reasons: Vec<UnhealthyReason>,
}

impl PartitionCheck {
    pub fn is_healthy(&self) -> bool {
        self.reasons.is_empty()
    }
}

/// Outcome of a single-partition check. A partition the master does not know
/// gets a distinct outcome instead of a health verdict.
#[derive(Debug, Clone)]
pub enum CheckOutcome {
    NotFound(u64),
    Checked(PartitionCheck),
}

/// Diagnose one partition: fetch the master record, then every replica's
/// local peer view. Replica query failures are captured as rows and reasons
/// and never abort the check.
pub async fn check_meta_partition(
    master: &dyn MasterApi,
    node: &dyn MetaNodeApi,
    partition_id: u64,
) -> Result<CheckOutcome> {
    let mut partition = match master.get_meta_partition(partition_id).await {
        Ok(partition) => partition,
        Err(ClientError::NotFound(_)) => return Ok(CheckOutcome::NotFound(partition_id)),
        Err(err) => return Err(err),
    };
    partition.hosts.sort();

    let want = partition.replica_num as usize;
    let mut reasons = Vec::new();
    if !partition.miss_nodes.is_empty() {
        let mut nodes = partition.miss_nodes.clone();
        nodes.sort();
        reasons.push(UnhealthyReason::MissingReplicas { nodes });
    }
    if partition.status == STATUS_NO_LEADER {
        reasons.push(UnhealthyReason::NoLeader);
    }
    if partition.hosts.len() != want {
        reasons.push(UnhealthyReason::HostCountMismatch {
            got: partition.hosts.len(),
            want,
        });
    }

    let mut rows = Vec::with_capacity(partition.replicas.len());
    for replica in &partition.replicas {
        match node.get_partition(host_of(&replica.addr), partition_id).await {
            Err(err) => {
                reasons.push(UnhealthyReason::ReplicaUnreachable {
                    addr: replica.addr.clone(),
                });
                rows.push(ReplicaPeerRow {
                    addr: replica.addr.clone(),
                    peers: None,
                    expected: partition.replica_num,
                    error: Some(err.to_string()),
                });
            }
            Ok(view) => {
                let mut peers: Vec<String> =
                    view.peers.into_iter().map(|peer| peer.addr).collect();
                peers.sort();
                if peers != partition.hosts {
                    reasons.push(UnhealthyReason::PeerMismatch {
                        addr: replica.addr.clone(),
                    });
                }
                if peers.len() != want {
                    reasons.push(UnhealthyReason::PeerCountMismatch {
                        addr: replica.addr.clone(),
                        got: peers.len(),
                        want,
                    });
                }
                rows.push(ReplicaPeerRow {
                    addr: replica.addr.clone(),
                    peers: Some(peers),
                    expected: partition.replica_num,
                    error: None,
                });
            }
        }
    }

    Ok(CheckOutcome::Checked(PartitionCheck {
        partition,
        rows,
        reasons,
    }))
}
