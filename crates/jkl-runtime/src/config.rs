//! Engine configuration

use jkl_model::LeafBonePolicy;
use std::path::PathBuf;

use crate::error::{Result, RuntimeError};

/// Settings shared by the frame loop and the host collaborators
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub window_title: String,
    /// RGBA
    pub clear_color: [f32; 4],
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    /// Diffuse texture bound to unit 0 by the viewer scenes
    pub texture: PathBuf,
    /// Seconds between FPS log lines
    pub fps_log_interval: f64,
    pub leaf_bone_policy: LeafBonePolicy,
    /// Upper bound on the per-frame delta handed to scenes, in seconds
    pub max_frame_delta: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_width: 1200,
            window_height: 900,
            window_title: "jackal_engine".to_string(),
            clear_color: [0.05, 0.05, 0.05, 1.0],
            vertex_shader: PathBuf::from("resources/texflat.vs"),
            fragment_shader: PathBuf::from("resources/texflat.fs"),
            texture: PathBuf::from("resources/grid.png"),
            fps_log_interval: 1.0,
            leaf_bone_policy: LeafBonePolicy::Exclude,
            max_frame_delta: None,
        }
    }
}

impl EngineConfig {
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_shaders(mut self, vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        self.vertex_shader = vertex.into();
        self.fragment_shader = fragment.into();
        self
    }

    pub fn with_texture(mut self, texture: impl Into<PathBuf>) -> Self {
        self.texture = texture.into();
        self
    }

    pub fn with_leaf_bone_policy(mut self, policy: LeafBonePolicy) -> Self {
        self.leaf_bone_policy = policy;
        self
    }

    pub fn with_max_frame_delta(mut self, max: Option<f32>) -> Self {
        self.max_frame_delta = max;
        self
    }

    /// Aspect ratio of the configured window
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }

    /// Reject values the frame loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(RuntimeError::Config(format!(
                "window size {}x{} must be non-zero",
                self.window_width, self.window_height
            )));
        }
        if self.fps_log_interval.is_nan() || self.fps_log_interval <= 0.0 {
            return Err(RuntimeError::Config(format!(
                "fps_log_interval must be positive, got {}",
                self.fps_log_interval
            )));
        }
        if let Some(max) = self.max_frame_delta {
            if max.is_nan() || max <= 0.0 {
                return Err(RuntimeError::Config(format!(
                    "max_frame_delta must be positive, got {max}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl EngineConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RuntimeError::Config(format!("invalid engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.window_width, 1200);
        assert_eq!(config.window_height, 900);
        assert_eq!(config.window_title, "jackal_engine");
        assert_eq!(config.clear_color, [0.05, 0.05, 0.05, 1.0]);
        assert_eq!(config.vertex_shader, PathBuf::from("resources/texflat.vs"));
        assert_eq!(config.texture, PathBuf::from("resources/grid.png"));
        assert_eq!(config.leaf_bone_policy, LeafBonePolicy::Exclude);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validation() {
        let config = EngineConfig::default()
            .with_window_size(0, 600)
            .with_title("test");
        assert!(matches!(config.validate(), Err(RuntimeError::Config(_))));

        let config = EngineConfig::default().with_max_frame_delta(Some(-1.0));
        assert!(config.validate().is_err());

        let config = EngineConfig::default().with_window_size(800, 400);
        assert!((config.aspect_ratio() - 2.0).abs() < 0.001);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_partial_override() {
        let config = EngineConfig::from_json_str(
            r#"{ "window_title": "viewer", "leaf_bone_policy": "Include", "max_frame_delta": 0.1 }"#,
        )
        .unwrap();
        assert_eq!(config.window_title, "viewer");
        assert_eq!(config.leaf_bone_policy, LeafBonePolicy::Include);
        assert_eq!(config.max_frame_delta, Some(0.1));
        assert_eq!(config.window_width, 1200);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_invalid() {
        let err = EngineConfig::from_json_str(r#"{ "window_width": "wide" }"#).unwrap_err();
        assert!(err.to_string().contains("invalid engine config"));
    }
}
