//! Wire data model shared by the master and meta-node clients.

use serde::{Deserialize, Serialize};

/// Partition status reported by the master when no leader is elected.
pub const STATUS_NO_LEADER: i8 = -1;
/// Partition accepts reads only.
pub const STATUS_READ_ONLY: i8 = 1;
/// Partition accepts reads and writes.
pub const STATUS_READ_WRITE: i8 = 2;

pub fn format_partition_status(status: i8) -> &'static str {
    match status {
        STATUS_NO_LEADER => "NoLeader",
        STATUS_READ_ONLY => "ReadOnly",
        STATUS_READ_WRITE => "ReadWrite",
        _ => "Unknown",
    }
}

/// Master-side record of a meta partition's membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaPartitionInfo {
    pub partition_id: u64,
    pub vol_name: String,
    /// Configured replica factor.
    pub replica_num: u8,
    pub status: i8,
    /// Assigned host addresses (`host:port`).
    pub hosts: Vec<String>,
    /// Hosts the master currently reports as missing.
    #[serde(default)]
    pub miss_nodes: Vec<String>,
    #[serde(default)]
    pub replicas: Vec<MetaReplicaInfo>,
}

/// Per-replica descriptor inside a partition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaReplicaInfo {
    pub addr: String,
    #[serde(default)]
    pub is_leader: bool,
}

/// Peer set a single meta node locally believes a partition has.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaNodePartitionInfo {
    #[serde(default)]
    pub peers: Vec<PeerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: u64,
    pub addr: String,
}

/// Meta node descriptor held by the master.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaNodeInfo {
    pub addr: String,
    pub id: u64,
    pub active: bool,
    #[serde(default)]
    pub zone: String,
}

/// Volume summary row from the master's volume listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolInfo {
    pub name: String,
    pub owner: String,
}

/// Client view of a volume, carrying its partition list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolView {
    #[serde(default)]
    pub meta_partitions: Vec<MetaPartitionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaPartitionView {
    pub partition_id: u64,
    #[serde(default)]
    pub leader_addr: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Cluster-level diagnosis summary computed by the master.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaPartitionDiagnosis {
    #[serde(default)]
    pub inactive_meta_nodes: Vec<String>,
    #[serde(default)]
    pub corrupt_meta_partition_ids: Vec<u64>,
    #[serde(default)]
    pub lack_replica_meta_partition_ids: Vec<u64>,
}
