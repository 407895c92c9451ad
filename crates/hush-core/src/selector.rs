//! Model and voice selection from a provider inventory

use std::sync::Arc;

use http::Method;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{ErrorKind, GatewayError, Result},
    provider::ProviderConfig,
    transport::Transport,
};

const ID_FIELDS: &[&str] = &["id", "modelId", "voice_id", "_id"];
const NAME_FIELDS: &[&str] = &["name", "displayName", "title", "slug"];
const TAG_FIELDS: &[&str] = &["tags", "labels", "attributes"];

/// One entry of a provider inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCandidate {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub tags: Vec<String>,
}

/// Preference order plus last-resort pattern
#[derive(Debug, Clone, Default)]
pub struct SelectionPolicy {
    preferred: Vec<String>,
    fallback: Option<Regex>,
}

impl SelectionPolicy {
    /// # Errors
    ///
    /// Returns an error if the fallback pattern is not a valid regex
    pub fn new(preferred: Vec<String>, fallback_pattern: Option<&str>) -> std::result::Result<Self, regex::Error> {
        let fallback = fallback_pattern.map(Regex::new).transpose()?;
        Ok(Self { preferred, fallback })
    }

    /// Pick an ID from `candidates`
    ///
    /// The preference order is authoritative: the first preferred ID present
    /// wins regardless of its position in the inventory. Otherwise the
    /// smallest candidate ID matching the fallback pattern is returned, so
    /// reordering the inventory never changes the outcome.
    pub fn choose(&self, candidates: &[ModelCandidate]) -> Option<String> {
        if let Some(preferred) = self
            .preferred
            .iter()
            .find(|preferred| candidates.iter().any(|candidate| &candidate.id == *preferred))
        {
            return Some(preferred.clone());
        }

        let fallback = self.fallback.as_ref()?;
        candidates
            .iter()
            .map(|candidate| candidate.id.as_str())
            .filter(|id| fallback.is_match(id))
            .min()
            .map(str::to_owned)
    }
}

/// Queries a provider inventory and picks a model or voice from it
///
/// The inventory is fetched on every call; nothing is cached between
/// requests.
#[derive(Clone)]
pub struct ModelSelector {
    transport: Arc<dyn Transport>,
    provider: Arc<ProviderConfig>,
    inventory_path: String,
}

impl ModelSelector {
    pub fn new(transport: Arc<dyn Transport>, provider: Arc<ProviderConfig>, inventory_path: impl Into<String>) -> Self {
        Self {
            transport,
            provider,
            inventory_path: inventory_path.into(),
        }
    }

    pub fn inventory_url(&self) -> String {
        self.provider.url_for(&self.inventory_path)
    }

    /// Fetch and parse the inventory
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success statuses, non-JSON bodies and
    /// missing credentials
    pub async fn list_candidates(&self) -> Result<Vec<ModelCandidate>> {
        let name = self.provider.name();
        let url = self.inventory_url();
        let request = self.provider.request(Method::GET, url.clone())?;
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| e.for_provider(name))?;

        if !response.is_success() {
            tracing::warn!(provider = %name, status = response.status, "inventory listing failed");
            return Err(GatewayError::new(
                ErrorKind::UpstreamError,
                format!("inventory listing from provider '{name}' failed"),
            )
            .with_status(response.status)
            .with_detail(response.detail())
            .for_provider(name));
        }

        if !response.is_json() {
            return Err(GatewayError::new(
                ErrorKind::UnexpectedContentType,
                format!("unexpected content-type '{}' from {url}", response.content_type),
            )
            .with_status(response.status)
            .with_detail(Value::String(response.body_prefix()))
            .for_provider(name));
        }

        let listing: Value = serde_json::from_slice(&response.body).map_err(|e| {
            GatewayError::new(ErrorKind::InvalidResponse, format!("invalid JSON inventory from {url}: {e}"))
                .with_status(response.status)
                .with_detail(Value::String(response.body_prefix()))
                .for_provider(name)
        })?;

        let candidates = parse_inventory(&listing);
        tracing::debug!(provider = %name, count = candidates.len(), "fetched inventory");

        Ok(candidates)
    }

    /// Fetch the inventory and apply `policy`
    ///
    /// # Errors
    ///
    /// Fails with `NoCandidateFound` when the inventory is empty or nothing
    /// matches, or with any error from [`Self::list_candidates`]
    pub async fn choose_model(&self, policy: &SelectionPolicy) -> Result<String> {
        let name = self.provider.name();
        let candidates = self.list_candidates().await?;

        if candidates.is_empty() {
            return Err(
                GatewayError::no_candidate(format!("inventory of provider '{name}' is empty")).for_provider(name),
            );
        }

        let chosen = policy.choose(&candidates).ok_or_else(|| {
            GatewayError::no_candidate(format!("no usable model found in inventory of provider '{name}'"))
                .with_detail(Value::from(
                    candidates.iter().map(|candidate| candidate.id.clone()).collect::<Vec<_>>(),
                ))
                .for_provider(name)
        })?;

        tracing::debug!(provider = %name, model = %chosen, "selected model");

        Ok(chosen)
    }
}

/// Extract candidates from a listing
///
/// Accepts a bare array or an object with a `data` array. Entries without an
/// ID are dropped.
pub fn parse_inventory(listing: &Value) -> Vec<ModelCandidate> {
    let entries = match listing {
        Value::Array(entries) => entries.as_slice(),
        other => other.get("data").and_then(Value::as_array).map_or(&[][..], Vec::as_slice),
    };

    entries.iter().filter_map(parse_candidate).collect()
}

fn parse_candidate(entry: &Value) -> Option<ModelCandidate> {
    let id = first_string(entry, ID_FIELDS)?;
    let display_name = first_string(entry, NAME_FIELDS).unwrap_or("Unnamed");
    let tags = TAG_FIELDS
        .iter()
        .find_map(|field| entry.get(*field).and_then(Value::as_array))
        .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_owned).collect())
        .unwrap_or_default();

    Some(ModelCandidate {
        id: id.to_owned(),
        display_name: display_name.to_owned(),
        tags,
    })
}

fn first_string<'a>(entry: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .find_map(|field| entry.get(*field).and_then(Value::as_str).filter(|value| !value.is_empty()))
}
