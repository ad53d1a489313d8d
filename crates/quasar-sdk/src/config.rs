// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine configuration, stored as RON.

use anyhow::{Context, Result};
use quasar_core::settings::{PhysicsSettings, RenderSettings, UpdateSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initial settings of the three pipelines.
///
/// Every field is optional in the RON source; missing ones take their
/// default value.
///
/// ```ron
/// (
///   rendering: (
///     clear_color: (0.1, 0.1, 0.1, 1.0),
///     debug_overlay: true,
///   ),
///   physics: (time_step_ms: 8),
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Update pipeline settings.
    pub update: UpdateSettings,
    /// Rendering pipeline settings.
    pub rendering: RenderSettings,
    /// Physics pipeline settings.
    pub physics: PhysicsSettings,
}

impl EngineConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).context("Failed to parse engine configuration")
    }

    /// Reads and parses a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine configuration {}", path.display()))?;
        let config = Self::from_ron_str(&source)
            .with_context(|| format!("Invalid engine configuration {}", path.display()))?;
        log::info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Serializes the configuration as human-readable RON.
    pub fn to_ron_string(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty).context("Failed to serialize engine configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quasar_core::renderer::{LayerMask, RenderLayer};

    #[test]
    fn test_empty_source_gives_defaults() {
        assert_eq!(EngineConfig::from_ron_str("()").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_source_keeps_other_defaults() {
        let config = EngineConfig::from_ron_str(
            "(rendering: (debug_overlay: true, scene_layers: 3), physics: (time_step_ms: 8))",
        )
        .unwrap();
        assert!(config.rendering.debug_overlay);
        assert_eq!(
            config.rendering.scene_layers,
            RenderLayer::Background | RenderLayer::Opaque
        );
        assert_eq!(config.rendering.clear_color, RenderSettings::default().clear_color);
        assert_eq!(config.physics.time_step_ms, 8);
        assert!(config.physics.enabled);
        assert_eq!(config.update, UpdateSettings::default());
    }

    #[test]
    fn test_unknown_layer_bits_are_dropped() {
        let config = EngineConfig::from_ron_str("(rendering: (scene_layers: 4294967295))").unwrap();
        assert_eq!(config.rendering.scene_layers, LayerMask::ALL);
    }

    #[test]
    fn test_serialized_config_parses_back() {
        let mut config = EngineConfig::default();
        config.rendering.scene_layers = LayerMask::GEOMETRY;
        config.update.dispatcher_budget_ms = 2;
        let text = config.to_ron_string().unwrap();
        assert_eq!(EngineConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = EngineConfig::from_ron_str("(rendering: (debug_overlay: maybe))").unwrap_err();
        assert!(err.to_string().contains("Failed to parse engine configuration"));
    }
}
