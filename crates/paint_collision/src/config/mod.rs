//! Configuration system
//!
//! Settings are plain serde structs loaded from `.toml` or `.ron` files.

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::{Vec3, Vec4};
use crate::input::MouseButton;
use crate::physics::collision::Aabb;
use crate::spatial::OctreeConfig;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Extent and partitioning of the collision world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Minimum corner of the octree bounds
    pub bounds_min: [f32; 3],
    /// Maximum corner of the octree bounds
    pub bounds_max: [f32; 3],
    /// Octree subdivision settings
    pub octree: OctreeConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds_min: [-10_000.0; 3],
            bounds_max: [10_000.0; 3],
            octree: OctreeConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Octree bounds as a box
    pub fn bounds(&self) -> Aabb {
        Aabb::new(Vec3::from(self.bounds_min), Vec3::from(self.bounds_max))
    }
}

/// Paint tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    /// Radius of the probe sphere (also its margin)
    pub probe_radius: f32,
    /// Component difference at which a proxy counts as changed
    pub change_epsilon: f32,
    /// Seconds passed to the world step each frame
    pub step_seconds: f32,
    /// Maximum reticle trace distance; misses land this far along the ray
    pub trace_distance: f32,
    /// Mesh used for the reticle marker
    pub marker_mesh: String,
    /// Material used for the reticle marker
    pub marker_material: String,
    /// RGBA tint of the reticle marker
    pub marker_color: [f32; 4],
    /// Button that triggers an overlap query
    pub trigger_button: MouseButton,
    /// Collision world settings
    pub world: WorldConfig,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            probe_radius: 1.0,
            change_epsilon: 1e-5,
            step_seconds: 0.1,
            trace_distance: 1000.0,
            marker_mesh: "SM_Sphere".to_string(),
            marker_material: "M_PaintSphere".to_string(),
            marker_color: [1.0, 1.0, 1.0, 1.0],
            trigger_button: MouseButton::Left,
            world: WorldConfig::default(),
        }
    }
}

impl Config for PaintConfig {}

impl PaintConfig {
    /// Marker tint as a vector
    pub fn marker_color(&self) -> Vec4 {
        Vec4::from(self.marker_color)
    }

    /// Reject values the tool cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("probe_radius", self.probe_radius),
            ("change_epsilon", self.change_epsilon),
            ("step_seconds", self.step_seconds),
            ("trace_distance", self.trace_distance),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
        }

        let min = Vec3::from(self.world.bounds_min);
        let max = Vec3::from(self.world.bounds_max);
        if min.iter().zip(max.iter()).any(|(lo, hi)| lo >= hi) {
            return Err(ConfigError::Invalid(format!(
                "world bounds are empty: {:?} .. {:?}",
                self.world.bounds_min, self.world.bounds_max
            )));
        }
        if self.world.octree.max_entities_per_node == 0 {
            return Err(ConfigError::Invalid("octree.max_entities_per_node must be at least 1".to_string()));
        }
        Ok(())
    }
}
