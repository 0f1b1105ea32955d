//! Cluster-wide diagnosis: the `check --all` sweep and the default
//! `check` listing.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use futures_util::stream::{self, StreamExt};

use crate::check::{self, CheckOutcome};
use crate::master_client::{vol_auth_key, MasterApi};
use crate::node_client::{host_of, MetaNodeApi};
use crate::report;

/// Tuning for the per-volume partition fan-out.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Cap on concurrently diagnosed partitions within one volume.
    pub max_in_flight: usize,
    /// Delay each task holds its slot after finishing, so a sweep does not
    /// burst-query the meta nodes.
    pub throttle: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            throttle: Duration::from_millis(10),
        }
    }
}

/// Diagnose every partition of every volume. Volumes are processed strictly
/// sequentially; partitions within a volume run through a bounded pool and
/// are joined before the next volume starts. Only unhealthy partitions are
/// printed, each followed by a separator line. Per-partition failures are
/// reported inline and never abort the sweep.
pub async fn check_all_meta_partitions(
    master: &dyn MasterApi,
    node: &dyn MetaNodeApi,
    config: &SweepConfig,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let vols = master.list_vols("").await.context("list volumes")?;
    let throttle = config.throttle;

    writeln!(out)?;
    writeln!(out, "[Partition peer info not valid]:")?;
    writeln!(out, "{}", report::partition_table_header())?;
    for vol in vols {
        let view = match master.get_volume(&vol.name, &vol_auth_key(&vol.owner)).await {
            Ok(view) => view,
            Err(err) => {
                tracing::warn!(volume = %vol.name, %err, "volume view fetch failed");
                writeln!(out, "found an invalid volume {}: {err}", vol.name)?;
                continue;
            }
        };
        let mut partitions = view.meta_partitions;
        partitions.sort_by_key(|partition| partition.partition_id);

        // Each task hands its finished report back as an owned buffer; this
        // task is the only writer, so reports never interleave.
        let mut checks = stream::iter(partitions)
            .map(|partition| {
                let master = master;
                let node = node;
                async move {
                    let result =
                        check::check_meta_partition(master, node, partition.partition_id).await;
                    tokio::time::sleep(throttle).await;
                    (partition.partition_id, result)
                }
            })
            .buffer_unordered(config.max_in_flight.max(1));

        while let Some((partition_id, result)) = checks.next().await {
            match result {
                Ok(CheckOutcome::NotFound(id)) => {
                    writeln!(out, "partition {id} is not found on the master")?;
                }
                Ok(CheckOutcome::Checked(check)) => {
                    if !check.is_healthy() {
                        write!(out, "{}", report::render_partition_check(&check))?;
                        writeln!(out, "{}", report::sweep_separator())?;
                    }
                }
                Err(err) => {
                    writeln!(out, "check of partition {partition_id} failed: {err}")?;
                }
            }
        }
    }
    Ok(())
}

/// Default `check` listing: inactive nodes, corrupt (no leader) partitions
/// and partitions lacking replicas, each section sorted ascending. The two
/// partition sections fail fast on the first master fetch error; the sweep
/// above deliberately does not.
pub async fn default_check(
    master: &dyn MasterApi,
    node: &dyn MetaNodeApi,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut diagnosis = master
        .diagnose_meta_partitions()
        .await
        .context("diagnose meta partitions")?;

    writeln!(out, "[Inactive meta nodes]:")?;
    writeln!(out, "{}", report::node_table_header())?;
    diagnosis.inactive_meta_nodes.sort();
    let mut nodes = Vec::new();
    for addr in &diagnosis.inactive_meta_nodes {
        match master.get_meta_node(addr).await {
            Ok(info) => nodes.push(info),
            Err(err) => writeln!(out, "meta node {addr}: {err}")?,
        }
    }
    nodes.sort_by_key(|info| info.id);
    for info in &nodes {
        writeln!(out, "{}", report::render_node_detail(info))?;
    }

    writeln!(out)?;
    writeln!(out, "[Corrupt meta partitions](no leader):")?;
    writeln!(out, "{}", report::partition_table_header())?;
    diagnosis.corrupt_meta_partition_ids.sort_unstable();
    for partition_id in &diagnosis.corrupt_meta_partition_ids {
        let mut partition = master
            .get_meta_partition(*partition_id)
            .await
            .with_context(|| format!("fetch corrupt partition {partition_id}"))?;
        partition.hosts.sort();
        writeln!(out, "{}", report::render_partition_row(&partition))?;
    }

    writeln!(out)?;
    writeln!(out, "[Partitions lacking replicas]:")?;
    writeln!(out, "{}", report::partition_table_header())?;
    diagnosis.lack_replica_meta_partition_ids.sort_unstable();
    for partition_id in &diagnosis.lack_replica_meta_partition_ids {
        let mut partition = master
            .get_meta_partition(*partition_id)
            .await
            .with_context(|| format!("fetch lack-replica partition {partition_id}"))?;
        partition.hosts.sort();
        writeln!(out, "{}", report::render_partition_row(&partition))?;
        // Pure listing of the locally observed peer sets; no verdict here.
        for replica in &partition.replicas {
            match node.get_partition(host_of(&replica.addr), *partition_id).await {
                Ok(view) => {
                    let mut peers: Vec<String> =
                        view.peers.into_iter().map(|peer| peer.addr).collect();
                    peers.sort();
                    writeln!(
                        out,
                        "{}",
                        report::render_peer_listing_row(
                            &replica.addr,
                            peers.len(),
                            partition.replica_num,
                            &peers.join("; "),
                        )
                    )?;
                }
                Err(err) => {
                    writeln!(
                        out,
                        "{}",
                        report::render_peer_listing_row(
                            &replica.addr,
                            0,
                            partition.replica_num,
                            &format!("no data: {err}"),
                        )
                    )?;
                }
            }
        }
        writeln!(out, "{}", report::sweep_separator())?;
    }
    Ok(())
}
