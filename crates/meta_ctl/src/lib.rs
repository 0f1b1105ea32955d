//! Operator tooling for a sharded, replicated metadata service.
//!
//! The master (control plane) records the membership of every meta partition;
//! each meta node can report the peer set it locally believes a partition has.
//! The core of this crate cross-references the two views and classifies every
//! partition as healthy or unhealthy with specific reasons. Repair commands
//! (decommission / add replica / delete replica) are single-shot passthroughs
//! to the master.

pub mod check;
pub mod error;
pub mod master_client;
pub mod meta;
pub mod node_client;
pub mod report;
pub mod sweep;
