//! HTTP client for the master (control plane).

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::meta::{
    MetaNodeInfo, MetaPartitionDiagnosis, MetaPartitionInfo, VolInfo, VolView,
};

/// API code the master returns for absent partitions, nodes and volumes.
const CODE_NOT_FOUND: i32 = 404;

/// Control-plane capability set consumed by the diagnosis engine and the
/// repair commands. Implemented over HTTP by [`MasterClient`]; tests provide
/// in-memory implementations.
#[async_trait]
pub trait MasterApi: Send + Sync {
    async fn get_meta_partition(&self, partition_id: u64) -> Result<MetaPartitionInfo>;
    async fn diagnose_meta_partitions(&self) -> Result<MetaPartitionDiagnosis>;
    async fn list_vols(&self, keywords: &str) -> Result<Vec<VolInfo>>;
    async fn get_volume(&self, name: &str, auth_key: &str) -> Result<VolView>;
    async fn get_meta_node(&self, addr: &str) -> Result<MetaNodeInfo>;
    async fn decommission_meta_partition(&self, partition_id: u64, addr: &str) -> Result<()>;
    async fn add_meta_replica(&self, partition_id: u64, addr: &str) -> Result<()>;
    async fn delete_meta_replica(&self, partition_id: u64, addr: &str) -> Result<()>;
}

/// Every master response arrives in this envelope; `code == 0` is success.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    code: i32,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

fn unpack<T>(envelope: ApiEnvelope<T>, target: &str) -> Result<T> {
    match envelope.code {
        0 => envelope.data.ok_or_else(|| ClientError::Api {
            target: target.to_string(),
            code: 0,
            msg: "success response carried no data".to_string(),
        }),
        CODE_NOT_FOUND => Err(ClientError::NotFound(envelope.msg)),
        code => Err(ClientError::Api {
            target: target.to_string(),
            code,
            msg: envelope.msg,
        }),
    }
}

/// Auth key the master expects for volume views: hex md5 of the volume owner.
pub fn vol_auth_key(owner: &str) -> String {
    format!("{:x}", md5::compute(owner))
}

/// HTTP implementation of [`MasterApi`].
#[derive(Clone)]
pub struct MasterClient {
    master_addr: String,
    http: reqwest::Client,
}

impl MasterClient {
    pub fn new(master_addr: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout.max(Duration::from_millis(1)))
            .build()?;
        Ok(Self {
            master_addr: master_addr.to_string(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("http://{}{}", self.master_addr, path);
        tracing::debug!(%url, "master request");
        let body = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| ClientError::Unreachable {
                target: self.master_addr.clone(),
                source,
            })?
            .bytes()
            .await
            .map_err(|source| ClientError::Unreachable {
                target: self.master_addr.clone(),
                source,
            })?;
        let envelope: ApiEnvelope<T> =
            serde_json::from_slice(&body).map_err(|source| ClientError::InvalidResponse {
                target: self.master_addr.clone(),
                source,
            })?;
        unpack(envelope, &self.master_addr)
    }

    /// Issue a membership-change request; only the envelope code matters.
    async fn exec(&self, path: &str, query: &[(&str, String)]) -> Result<()> {
        match self.get_json::<serde_json::Value>(path, query).await {
            Ok(_) => Ok(()),
            // A membership change legitimately returns a success envelope
            // with no data payload.
            Err(ClientError::Api { code: 0, .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl MasterApi for MasterClient {
    async fn get_meta_partition(&self, partition_id: u64) -> Result<MetaPartitionInfo> {
        self.get_json(
            "/client/metaPartition",
            &[("id", partition_id.to_string())],
        )
        .await
    }

    async fn diagnose_meta_partitions(&self) -> Result<MetaPartitionDiagnosis> {
        self.get_json("/admin/diagnoseMetaPartitions", &[]).await
    }

    async fn list_vols(&self, keywords: &str) -> Result<Vec<VolInfo>> {
        self.get_json("/admin/listVols", &[("keywords", keywords.to_string())])
            .await
    }

    async fn get_volume(&self, name: &str, auth_key: &str) -> Result<VolView> {
        self.get_json(
            "/client/vol",
            &[("name", name.to_string()), ("authKey", auth_key.to_string())],
        )
        .await
    }

    async fn get_meta_node(&self, addr: &str) -> Result<MetaNodeInfo> {
        self.get_json("/metaNode/get", &[("addr", addr.to_string())])
            .await
    }

    async fn decommission_meta_partition(&self, partition_id: u64, addr: &str) -> Result<()> {
        self.exec(
            "/metaPartition/decommission",
            &[("id", partition_id.to_string()), ("addr", addr.to_string())],
        )
        .await
    }

    async fn add_meta_replica(&self, partition_id: u64, addr: &str) -> Result<()> {
        self.exec(
            "/metaReplica/add",
            &[("id", partition_id.to_string()), ("addr", addr.to_string())],
        )
        .await
    }

    async fn delete_meta_replica(&self, partition_id: u64, addr: &str) -> Result<()> {
        self.exec(
            "/metaReplica/delete",
            &[("id", partition_id.to_string()), ("addr", addr.to_string())],
        )
        .await
    }
}
