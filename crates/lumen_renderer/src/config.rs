//! Render settings and per-frame input.

use crate::RenderError;
use serde::{Deserialize, Serialize};

/// Largest accepted bounce budget.
pub const MAX_TRACE_DEPTH: u32 = 256;

/// Thin-lens approximation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthOfField {
    /// Standard deviation of the origin jitter, world units
    pub aperture: f32,
    /// Distance along the primary ray that stays in focus
    pub focal_distance: f32,
}

/// Pipeline switches fixed at init.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Traverse the scene BVH instead of scanning every geom
    pub use_bvh: bool,
    /// Reuse depth-0 intersections across iterations while the scene is static
    pub cache_first_bounce: bool,
    /// Group active paths by material before shading
    pub sort_by_material: bool,
    /// Jitter camera rays within the pixel footprint
    pub antialias: bool,
    pub depth_of_field: Option<DepthOfField>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            use_bvh: true,
            cache_first_bounce: true,
            sort_by_material: false,
            antialias: false,
            depth_of_field: None,
        }
    }
}

impl RenderConfig {
    /// True when camera rays differ between iterations.
    pub fn jitters_camera_rays(&self) -> bool {
        self.antialias || self.depth_of_field.is_some()
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if let Some(dof) = &self.depth_of_field {
            if !(dof.aperture.is_finite() && dof.aperture >= 0.0) {
                return Err(RenderError::Config(format!(
                    "aperture must be finite and non-negative, got {}",
                    dof.aperture
                )));
            }
            if !(dof.focal_distance.is_finite() && dof.focal_distance > 0.0) {
                return Err(RenderError::Config(format!(
                    "focal distance must be finite and positive, got {}",
                    dof.focal_distance
                )));
            }
        }
        Ok(())
    }
}

/// Per-iteration input from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameState {
    /// Geometry or camera moved since the previous iteration
    pub scene_changed: bool,
}

impl FrameState {
    pub fn unchanged() -> Self {
        Self { scene_changed: false }
    }

    pub fn changed() -> Self {
        Self { scene_changed: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert!(config.use_bvh);
        assert!(config.cache_first_bounce);
        assert!(!config.jitters_camera_rays());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "sort_by_material": true, "depth_of_field": { "aperture": 0.1, "focal_distance": 4.0 } }"#)
                .unwrap();
        assert!(config.sort_by_material);
        assert!(config.use_bvh);
        assert!(config.jitters_camera_rays());
        assert_eq!(config.depth_of_field.unwrap().focal_distance, 4.0);
    }

    #[test]
    fn test_rejects_bad_lens() {
        let mut config = RenderConfig::default();
        config.depth_of_field = Some(DepthOfField {
            aperture: -1.0,
            focal_distance: 2.0,
        });
        assert!(matches!(config.validate(), Err(RenderError::Config(_))));

        config.depth_of_field = Some(DepthOfField {
            aperture: 0.1,
            focal_distance: f32::NAN,
        });
        assert!(config.validate().is_err());
    }
}
