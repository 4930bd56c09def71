// Tenant policy storage with in-memory caching

use crate::core::errors::FirewallError;
use crate::core::models::Policy;
use crate::loader::policy_loader::PolicyLoader;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;

/// Policy collaborator consumed by the orchestrator's caller.
///
/// Policies come back in the order the store holds them; the policy engine
/// treats that order as significant (first match wins) and never re-sorts.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Enabled policies for `tenant_id`, in stored order.
    async fn active_policies(&self, tenant_id: &str) -> Result<Vec<Policy>, FirewallError>;
}

/// YAML-file-backed policy store (for deployment without a database).
pub struct YamlPolicyStore {
    loader: PolicyLoader,
}

impl YamlPolicyStore {
    pub fn new(loader: PolicyLoader) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl PolicyStore for YamlPolicyStore {
    async fn active_policies(&self, tenant_id: &str) -> Result<Vec<Policy>, FirewallError> {
        Ok(self
            .loader
            .tenant_policies(tenant_id)
            .map(|policies| {
                policies
                    .iter()
                    .filter(|p| p.enabled)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Caching wrapper over any policy store.
///
/// Policies are immutable during one evaluation call, so a short TTL cache
/// in front of the store is safe and keeps hot tenants off the backing
/// store.
pub struct CachedPolicyStore {
    inner: Arc<dyn PolicyStore>,
    cache: Cache<String, Arc<Vec<Policy>>>,
}

impl CachedPolicyStore {
    pub fn new(inner: Arc<dyn PolicyStore>) -> Self {
        let cache = Cache::builder()
            .time_to_live(std::time::Duration::from_secs(300)) // 5 minutes
            .max_capacity(100)
            .build();

        Self { inner, cache }
    }
}

#[async_trait]
impl PolicyStore for CachedPolicyStore {
    async fn active_policies(&self, tenant_id: &str) -> Result<Vec<Policy>, FirewallError> {
        if let Some(cached) = self.cache.get(tenant_id).await {
            return Ok(cached.as_ref().clone());
        }

        let policies = self.inner.active_policies(tenant_id).await?;
        self.cache
            .insert(tenant_id.to_string(), Arc::new(policies.clone()))
            .await;
        Ok(policies)
    }
}
