//! `metactl`: operator CLI for meta partition diagnosis and membership
//! repair.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use meta_ctl::error::ClientError;
use meta_ctl::master_client::{MasterApi, MasterClient};
use meta_ctl::node_client::MetaNodeClient;
use meta_ctl::report;
use meta_ctl::sweep::{self, SweepConfig};

#[derive(Parser)]
#[command(name = "metactl")]
#[command(about = "Diagnose and repair meta partition membership", long_about = None)]
struct Args {
    /// Master (control plane) address, host:port.
    #[arg(long, env = "METACTL_MASTER", default_value = "127.0.0.1:17010")]
    master: String,
    /// Per-RPC timeout in seconds; no request is ever retried.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    /// Port meta nodes expose their local partition state on.
    #[arg(long, default_value_t = 17220)]
    node_port: u16,
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Display detail information of a meta partition.
    Get { partition_id: u64 },
    /// Check inactive nodes and corrupt / lack-replica partitions; with
    /// --all, diagnose every partition of every volume.
    Check {
        #[arg(long)]
        all: bool,
        /// Cap on concurrently diagnosed partitions within a volume.
        #[arg(long, default_value_t = 8)]
        workers: usize,
        /// Per-task delay after each diagnosis, in milliseconds.
        #[arg(long, default_value_t = 10)]
        throttle_ms: u64,
    },
    /// Decommission the replica of a meta partition on an address.
    Decommission {
        address: String,
        partition_id: u64,
    },
    /// Add a replica of a meta partition on a new address.
    Replicate {
        address: String,
        partition_id: u64,
    },
    /// Delete the replica of a meta partition on a fixed address.
    DeleteReplica {
        address: String,
        partition_id: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level: Level = args.log_level.parse().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).context("set tracing subscriber")?;

    let timeout = Duration::from_secs(args.timeout_secs.max(1));
    let master = MasterClient::new(&args.master, timeout).context("build master client")?;
    let node = MetaNodeClient::new(args.node_port, timeout).context("build meta node client")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Get { partition_id } => match master.get_meta_partition(partition_id).await {
            Ok(mut partition) => {
                partition.hosts.sort();
                write!(out, "{}", report::render_partition_detail(&partition))?;
            }
            Err(ClientError::NotFound(msg)) => {
                writeln!(out, "partition {partition_id} is not found on the master: {msg}")?;
            }
            Err(err) => return Err(err).context("get meta partition"),
        },
        Command::Check {
            all,
            workers,
            throttle_ms,
        } => {
            if all {
                let config = SweepConfig {
                    max_in_flight: workers,
                    throttle: Duration::from_millis(throttle_ms),
                };
                sweep::check_all_meta_partitions(&master, &node, &config, &mut out).await?;
            } else {
                sweep::default_check(&master, &node, &mut out).await?;
            }
        }
        Command::Decommission {
            address,
            partition_id,
        } => {
            master
                .decommission_meta_partition(partition_id, &address)
                .await
                .context("decommission meta partition")?;
            writeln!(out, "ok")?;
        }
        Command::Replicate {
            address,
            partition_id,
        } => {
            master
                .add_meta_replica(partition_id, &address)
                .await
                .context("add meta replica")?;
            writeln!(out, "ok")?;
        }
        Command::DeleteReplica {
            address,
            partition_id,
        } => {
            master
                .delete_meta_replica(partition_id, &address)
                .await
                .context("delete meta replica")?;
            writeln!(out, "ok")?;
        }
    }

    Ok(())
}
