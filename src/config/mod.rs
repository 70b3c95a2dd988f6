//! Configuration loading for controller routes
//!
//! Controllers that are not declared in code can be described in YAML and
//! loaded into a [`RouteRegistry`](crate::routes::RouteRegistry).

use crate::routes::ControllerMapping;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Route declarations for a set of controllers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default)]
    pub controllers: Vec<ControllerMapping>,
}

impl RoutesConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read routes config '{}'", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge several configurations into one
    ///
    /// Controllers keep their first-seen position; a later definition with
    /// the same name replaces the earlier one.
    pub fn merge(configs: Vec<RoutesConfig>) -> Self {
        let mut merged: Vec<ControllerMapping> = Vec::new();

        for controller in configs.into_iter().flat_map(|c| c.controllers) {
            match merged.iter_mut().find(|c| c.name == controller.name) {
                Some(existing) => {
                    tracing::debug!(
                        controller = %controller.name,
                        "Replacing controller definition while merging configs"
                    );
                    *existing = controller;
                }
                None => merged.push(controller),
            }
        }

        Self {
            controllers: merged,
        }
    }

    /// Find a controller declaration
    pub fn find_controller(&self, name: &str) -> Option<&ControllerMapping> {
        self.controllers.iter().find(|c| c.name == name)
    }
}
