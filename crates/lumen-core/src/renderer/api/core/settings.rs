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

//! Configuration consumed by a render system when it is configured.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The base pipeline a render system implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPipeline {
    /// Deferred shading with physically based materials.
    #[default]
    DeferredPbr,
}

/// An optional step that can be plugged into the base pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStep {
    /// Image based lighting: environment precomputation and environment drawing.
    Ibl,
    /// Fast approximate anti-aliasing on the final image.
    Fxaa,
}

/// Settings of the image based lighting step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IblStepConfiguration {
    /// The mip level of the prefiltered environment drawn as background,
    /// between `0.0` and `8.0`. `-1.0` disables drawing the environment.
    pub render_level: f32,
}

impl IblStepConfiguration {
    /// The largest accepted render level.
    pub const MAX_RENDER_LEVEL: f32 = 8.0;
    /// The render level that disables the environment draw.
    pub const SKIP: f32 = -1.0;

    /// Returns `true` if `render_level` is either [`Self::SKIP`] or inside `0.0..=8.0`.
    pub fn is_valid_render_level(render_level: f32) -> bool {
        render_level == Self::SKIP || (0.0..=Self::MAX_RENDER_LEVEL).contains(&render_level)
    }
}

impl Default for IblStepConfiguration {
    fn default() -> Self {
        Self {
            render_level: Self::SKIP,
        }
    }
}

/// The quality preset of the FXAA step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FxaaQualityPreset {
    /// Fewest edge search steps.
    #[default]
    Medium,
    /// More edge search steps.
    High,
    /// The most edge search steps.
    Extreme,
}

/// Settings of the FXAA step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxaaSettings {
    /// The quality preset.
    pub quality_preset: FxaaQualityPreset,
    /// Amount of sub-pixel aliasing removal, between `0.0` and `1.0`.
    pub subpixel_filter: f32,
}

impl Default for FxaaSettings {
    fn default() -> Self {
        Self {
            quality_preset: FxaaQualityPreset::Medium,
            subpixel_filter: 0.75,
        }
    }
}

/// The options recognized by a render system at configuration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfiguration {
    /// The base pipeline.
    pub base_pipeline: RenderPipeline,
    /// If `true`, buffer swaps wait for the display's vertical sync.
    pub vsync: bool,
    /// The optional steps to enable, without duplicates.
    pub render_steps: Vec<RenderStep>,
    /// Settings of the IBL step, used when [`RenderStep::Ibl`] is enabled.
    pub ibl: IblStepConfiguration,
    /// Settings of the FXAA step, used when [`RenderStep::Fxaa`] is enabled.
    pub fxaa: FxaaSettings,
}

impl Default for RenderConfiguration {
    fn default() -> Self {
        Self {
            base_pipeline: RenderPipeline::DeferredPbr,
            vsync: true,
            render_steps: Vec::new(),
            ibl: IblStepConfiguration::default(),
            fxaa: FxaaSettings::default(),
        }
    }
}

impl RenderConfiguration {
    /// Creates a configuration for `base_pipeline` with no optional steps.
    pub fn new(base_pipeline: RenderPipeline, vsync: bool) -> Self {
        Self {
            base_pipeline,
            vsync,
            ..Default::default()
        }
    }

    /// Enables an optional step. Enabling a step twice has no further effect.
    pub fn enable_render_step(&mut self, step: RenderStep) -> &mut Self {
        if !self.render_steps.contains(&step) {
            self.render_steps.push(step);
        }
        self
    }

    /// Returns `true` if `step` is enabled.
    pub fn is_render_step_enabled(&self, step: RenderStep) -> bool {
        self.render_steps.contains(&step)
    }

    /// Parses a configuration from a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON for this structure.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let mut configuration: Self = serde_json::from_str(json)?;
        configuration.render_steps.sort();
        configuration.render_steps.dedup();
        Ok(configuration)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read render configuration '{}'", path.display()))?;
        let configuration = Self::from_json_str(&json)
            .with_context(|| format!("Failed to parse render configuration '{}'", path.display()))?;
        log::info!(
            "Loaded render configuration from '{}': {:?}",
            path.display(),
            configuration.render_steps
        );
        Ok(configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabling_a_step_twice_keeps_one_entry() {
        let mut config = RenderConfiguration::new(RenderPipeline::DeferredPbr, false);
        config
            .enable_render_step(RenderStep::Ibl)
            .enable_render_step(RenderStep::Ibl);
        assert_eq!(config.render_steps, vec![RenderStep::Ibl]);
        assert!(config.is_render_step_enabled(RenderStep::Ibl));
        assert!(!config.is_render_step_enabled(RenderStep::Fxaa));
    }

    #[test]
    fn json_with_missing_fields_uses_defaults() {
        let config =
            RenderConfiguration::from_json_str(r#"{ "vsync": false, "render_steps": ["fxaa", "ibl", "ibl"] }"#)
                .unwrap();
        assert!(!config.vsync);
        assert_eq!(config.base_pipeline, RenderPipeline::DeferredPbr);
        assert_eq!(config.render_steps, vec![RenderStep::Ibl, RenderStep::Fxaa]);
        assert_eq!(config.ibl.render_level, IblStepConfiguration::SKIP);
        assert_eq!(config.fxaa, FxaaSettings::default());
    }

    #[test]
    fn json_rejects_unknown_step() {
        assert!(RenderConfiguration::from_json_str(r#"{ "render_steps": ["bloom"] }"#).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = RenderConfiguration::load("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }

    #[test]
    fn render_level_range() {
        assert!(IblStepConfiguration::is_valid_render_level(-1.0));
        assert!(IblStepConfiguration::is_valid_render_level(0.0));
        assert!(IblStepConfiguration::is_valid_render_level(8.0));
        assert!(!IblStepConfiguration::is_valid_render_level(8.5));
        assert!(!IblStepConfiguration::is_valid_render_level(-0.5));
    }
}
