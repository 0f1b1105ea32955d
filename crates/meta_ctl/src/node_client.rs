//! HTTP client for a single meta node's local partition state.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::meta::MetaNodePartitionInfo;

/// Strip the service port from a replica address, leaving the host part.
pub fn host_of(addr: &str) -> &str {
    addr.split(':').next().unwrap_or(addr)
}

/// Read access to one node's locally observed partition membership.
#[async_trait]
pub trait MetaNodeApi: Send + Sync {
    /// `node_host` is a bare host (no port); the client knows which port the
    /// meta nodes expose their local state on.
    async fn get_partition(
        &self,
        node_host: &str,
        partition_id: u64,
    ) -> Result<MetaNodePartitionInfo>;
}

#[derive(Debug, Deserialize)]
struct NodeEnvelope {
    code: i32,
    #[serde(default)]
    msg: String,
    data: Option<MetaNodePartitionInfo>,
}

/// HTTP implementation of [`MetaNodeApi`] against the meta-node profiling port.
#[derive(Clone)]
pub struct MetaNodeClient {
    prof_port: u16,
    http: reqwest::Client,
}

impl MetaNodeClient {
    pub fn new(prof_port: u16, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout.max(Duration::from_millis(1)))
            .build()?;
        Ok(Self { prof_port, http })
    }
}

#[async_trait]
impl MetaNodeApi for MetaNodeClient {
    async fn get_partition(
        &self,
        node_host: &str,
        partition_id: u64,
    ) -> Result<MetaNodePartitionInfo> {
        let target = format!("{}:{}", node_host, self.prof_port);
        let url = format!("http://{target}/getPartitionById");
        tracing::debug!(%url, partition_id, "meta node request");
        let body = self
            .http
            .get(&url)
            .query(&[("pid", partition_id.to_string())])
            .send()
            .await
            .map_err(|source| ClientError::Unreachable {
                target: target.clone(),
                source,
            })?
            .bytes()
            .await
            .map_err(|source| ClientError::Unreachable {
                target: target.clone(),
                source,
            })?;
        let envelope: NodeEnvelope =
            serde_json::from_slice(&body).map_err(|source| ClientError::InvalidResponse {
                target: target.clone(),
                source,
            })?;
        match envelope.code {
            0 => envelope.data.ok_or(ClientError::Api {
                target,
                code: 0,
                msg: "success response carried no data".to_string(),
            }),
            code => Err(ClientError::Api {
                target,
                code,
                msg: envelope.msg,
            }),
        }
    }
}
