// YAML policy loading - per-tenant policy definitions

use crate::core::errors::FirewallError;
use crate::core::models::Policy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Container for policies.yaml root structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PoliciesYaml {
    tenants: Vec<TenantEntry>,
}

/// One tenant with its ordered policy list
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TenantEntry {
    tenant_id: String,
    #[serde(default)]
    policies: Vec<Policy>,
}

/// Policy loader - manages per-tenant policy configurations.
///
/// Policy order within a tenant is the file order; the policy engine's
/// first-match-wins rule depends on it being preserved.
#[derive(Debug)]
pub struct PolicyLoader {
    /// Map tenant id -> ordered policies
    tenants: HashMap<String, Vec<Policy>>,
}

impl PolicyLoader {
    /// Load policies from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FirewallError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(FirewallError::ConfigurationError(format!(
                "Policies file not found at {:?}",
                path_ref
            )));
        }

        let yaml_content = fs::read_to_string(path_ref).map_err(|e| {
            FirewallError::ConfigurationError(format!("Failed to read policies file: {}", e))
        })?;

        let policies_yaml: PoliciesYaml = serde_yaml::from_str(&yaml_content).map_err(|e| {
            FirewallError::ConfigurationError(format!("Failed to parse policies YAML: {}", e))
        })?;

        let mut tenants = HashMap::new();
        for entry in policies_yaml.tenants {
            tenants.insert(entry.tenant_id, entry.policies);
        }

        let loader = Self { tenants };
        loader.validate()?;
        Ok(loader)
    }

    /// Get a tenant's policies in file order
    pub fn tenant_policies(&self, tenant_id: &str) -> Option<&Vec<Policy>> {
        self.tenants.get(tenant_id)
    }

    /// Validate that policy ids are unique within each tenant
    fn validate(&self) -> Result<(), FirewallError> {
        for (tenant_id, policies) in &self.tenants {
            let mut seen = std::collections::HashSet::new();
            for policy in policies {
                if !seen.insert(policy.id.as_str()) {
                    return Err(FirewallError::ConfigurationError(format!(
                        "Tenant '{}' has duplicate policy id '{}'",
                        tenant_id, policy.id
                    )));
                }
            }
        }
        Ok(())
    }
}
