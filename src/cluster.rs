//! Read-only view of the search cluster: the two `_cat` listings the monitor needs.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::core::error::{ReconcileError, ReconcileResult};
use crate::core::state::ActualState;
use crate::core::types::Namespace;

const GET: &str = "GET";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Source of the actual state. Implementations return raw names; namespace
/// filtering happens in [`observe`].
pub trait ClusterState {
    fn list_indices(&self) -> ReconcileResult<Vec<String>>;
    fn list_aliases(&self) -> ReconcileResult<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct CatIndex {
    index: String,
}

#[derive(Debug, Deserialize)]
struct CatAlias {
    alias: String,
}

/// Snapshot both listings and restrict them to `namespace`.
pub fn observe<C: ClusterState + ?Sized>(
    cluster: &C,
    namespace: &Namespace,
) -> ReconcileResult<ActualState> {
    let indices = cluster.list_indices()?;
    let aliases = cluster.list_aliases()?;
    let actual = ActualState::from_listing(namespace, indices, aliases);
    tracing::info!(
        indices = actual.indices.len(),
        aliases = actual.aliases.len(),
        prefix = namespace.prefix(),
        "cluster state observed"
    );
    Ok(actual)
}

pub struct HttpCluster {
    base_url: String,
    client: Client,
}

impl HttpCluster {
    pub fn new(base_url: impl Into<String>) -> ReconcileResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ReconcileError::Request {
                method: GET,
                url: "/".to_string(),
                source,
            })?;
        Ok(Self { base_url, client })
    }

    // error messages carry only the path: the base URL may embed credentials
    fn cat<T: DeserializeOwned>(&self, endpoint: &str) -> ReconcileResult<Vec<T>> {
        let path = format!("/_cat/{endpoint}?format=json");
        let url = format!("{}{path}", self.base_url);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|source| ReconcileError::Request {
                method: GET,
                url: path.clone(),
                source: source.without_url(),
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().map_err(|source| ReconcileError::Request {
                method: GET,
                url: path.clone(),
                source: source.without_url(),
            })?;
            return Err(ReconcileError::Status {
                method: GET,
                url: path,
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().map_err(|source| ReconcileError::Request {
            method: GET,
            url: path.clone(),
            source: source.without_url(),
        })?;
        let rows: Vec<T> = serde_json::from_str(&text).map_err(|source| {
            ReconcileError::ResponseDecode {
                method: GET,
                url: path.clone(),
                source,
            }
        })?;

        tracing::info!(url = %path, rows = rows.len(), "cluster listing fetched");
        Ok(rows)
    }
}

impl ClusterState for HttpCluster {
    fn list_indices(&self) -> ReconcileResult<Vec<String>> {
        Ok(self
            .cat::<CatIndex>("indices")?
            .into_iter()
            .map(|row| row.index)
            .collect())
    }

    fn list_aliases(&self) -> ReconcileResult<Vec<String>> {
        Ok(self
            .cat::<CatAlias>("aliases")?
            .into_iter()
            .map(|row| row.alias)
            .collect())
    }
}
