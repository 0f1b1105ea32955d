//! Text rendering for diagnosis results.
//!
//! Everything here consumes the structured types from [`crate::check`] and
//! [`crate::meta`]; nothing in the engine or coordinator formats its own
//! output, so the whole presentation layer can be swapped at once.

use std::fmt::Write as _;

use crate::check::{PartitionCheck, ReplicaPeerRow, UnhealthyReason};
use crate::meta::{format_partition_status, MetaNodeInfo, MetaPartitionInfo};

pub fn partition_table_header() -> String {
    format!(
        "{:<12} {:<16} {:<10} {:<28} {:<8} {}",
        "ID", "VOLUME", "STATUS", "REPLICA", "PEERS", "MEMBERS"
    )
}

pub fn node_table_header() -> String {
    format!("{:<12} {:<24} {:<8} {}", "ID", "ADDRESS", "ACTIVE", "ZONE")
}

/// Summary row for one partition under [`partition_table_header`].
pub fn render_partition_row(partition: &MetaPartitionInfo) -> String {
    format!(
        "{:<12} {:<16} {:<10} {:<28} {:<8} {}",
        partition.partition_id,
        partition.vol_name,
        format_partition_status(partition.status),
        "-",
        format!("{}/{}", partition.hosts.len(), partition.replica_num),
        partition.hosts.join("; "),
    )
}

/// Row for one replica's locally observed peer set, indented under the
/// partition summary row.
pub fn render_replica_row(row: &ReplicaPeerRow) -> String {
    let detail = match (&row.peers, &row.error) {
        (Some(peers), _) => peers.join("; "),
        (None, Some(error)) => format!("get partition info failed: {error}"),
        (None, None) => "no data".to_string(),
    };
    format!(
        "{:<12} {:<16} {:<10} {:<28} {:<8} {}",
        "",
        "",
        "",
        format!("{}(peers)", row.addr),
        format!("{}/{}", row.peer_count(), row.expected),
        detail,
    )
}

pub fn render_reason(reason: &UnhealthyReason) -> String {
    match reason {
        UnhealthyReason::MissingReplicas { nodes } => {
            format!("missing replicas on [{}]", nodes.join("; "))
        }
        UnhealthyReason::NoLeader => "no leader elected".to_string(),
        UnhealthyReason::HostCountMismatch { got, want } => {
            format!("host count {got} != replica factor {want}")
        }
        UnhealthyReason::ReplicaUnreachable { addr } => {
            format!("replica {addr} unreachable")
        }
        UnhealthyReason::PeerMismatch { addr } => {
            format!("peer set on {addr} disagrees with master hosts")
        }
        UnhealthyReason::PeerCountMismatch { addr, got, want } => {
            format!("peer count on {addr} is {got}, expected {want}")
        }
    }
}

/// Full report for one checked partition: summary row, per-replica rows and,
/// when unhealthy, one line per violated condition.
pub fn render_partition_check(check: &PartitionCheck) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_partition_row(&check.partition));
    for row in &check.rows {
        let _ = writeln!(out, "{}", render_replica_row(row));
    }
    for reason in &check.reasons {
        let _ = writeln!(out, "  unhealthy: {}", render_reason(reason));
    }
    out
}

/// Multi-line detail for `metactl get`.
pub fn render_partition_detail(partition: &MetaPartitionInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Partition ID : {}", partition.partition_id);
    let _ = writeln!(out, "Volume       : {}", partition.vol_name);
    let _ = writeln!(
        out,
        "Status       : {}",
        format_partition_status(partition.status)
    );
    let _ = writeln!(out, "Replica num  : {}", partition.replica_num);
    let _ = writeln!(out, "Hosts        : {}", partition.hosts.join("; "));
    let _ = writeln!(out, "Miss nodes   : {}", partition.miss_nodes.join("; "));
    for replica in &partition.replicas {
        let role = if replica.is_leader { "leader" } else { "follower" };
        let _ = writeln!(out, "Replica      : {} ({role})", replica.addr);
    }
    out
}

/// Listing row for one replica's peer view in the lack-replica section.
pub fn render_peer_listing_row(addr: &str, got: usize, expected: u8, detail: &str) -> String {
    format!(
        "{:<12} {:<16} {:<10} {:<28} {:<8} {}",
        "",
        "",
        "",
        addr,
        format!("{got}/{expected}"),
        detail,
    )
}

pub fn render_node_detail(node: &MetaNodeInfo) -> String {
    format!(
        "{:<12} {:<24} {:<8} {}",
        node.id, node.addr, node.active, node.zone
    )
}

/// Visual separator printed after each unhealthy partition report.
pub fn sweep_separator() -> String {
    "_ ".repeat(partition_table_header().len() / 2 + 20)
}
