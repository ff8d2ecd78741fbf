//! Scene container handed to the renderer.

use crate::{Bvh, Camera, Geom, Material, SceneError};

/// Geometry, materials, camera and optional spatial index.
#[derive(Debug, Clone)]
pub struct Scene {
    pub geoms: Vec<Geom>,
    pub materials: Vec<Material>,
    pub camera: Camera,
    pub bvh: Option<Bvh>,
}

impl Scene {
    /// Create an empty scene viewed through `camera`.
    pub fn new(camera: Camera) -> Self {
        Self {
            geoms: Vec::new(),
            materials: Vec::new(),
            camera,
            bvh: None,
        }
    }

    /// Add a material and return its id.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add a geom and return its index. Invalidates any built BVH.
    pub fn add_geom(&mut self, geom: Geom) -> usize {
        self.geoms.push(geom);
        self.bvh = None;
        self.geoms.len() - 1
    }

    /// Build the spatial index over the current geometry.
    pub fn build_bvh(&mut self) {
        self.bvh = Some(Bvh::build(&self.geoms));
    }

    pub fn pixel_count(&self) -> usize {
        self.camera.pixel_count()
    }

    /// Reject malformed scene data before rendering starts.
    pub fn validate(&self) -> Result<(), SceneError> {
        self.camera.validate()?;

        if !self.geoms.is_empty() && self.materials.is_empty() {
            return Err(SceneError::NoMaterials);
        }

        for (material, m) in self.materials.iter().enumerate() {
            let ior = m.index_of_refraction;
            if m.has_refractive && !(ior.is_finite() && ior > 0.0) {
                return Err(SceneError::InvalidIor { material, ior });
            }
        }

        for (geom, g) in self.geoms.iter().enumerate() {
            if g.material_id >= self.materials.len() {
                return Err(SceneError::InvalidMaterial {
                    geom,
                    material: g.material_id,
                });
            }
            if !g.is_well_formed() {
                return Err(SceneError::DegenerateGeom { geom });
            }
        }

        if let Some(bvh) = &self.bvh {
            bvh.validate(&self.geoms)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::{Transform, Vec3};

    fn camera() -> Camera {
        let mut camera = Camera::new().with_resolution(8, 8);
        camera.initialize();
        camera
    }

    #[test]
    fn test_scene_creation() {
        let mut scene = Scene::new(camera());
        let m = scene.add_material(Material::diffuse(Vec3::ONE));
        let g = scene.add_geom(Geom::sphere(Transform::default(), m));
        scene.build_bvh();

        assert_eq!(m, 0);
        assert_eq!(g, 0);
        assert_eq!(scene.pixel_count(), 64);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_scene_invalid_material() {
        let mut scene = Scene::new(camera());
        scene.add_material(Material::diffuse(Vec3::ONE));
        scene.add_geom(Geom::cube(Transform::default(), 4));

        assert_eq!(
            scene.validate(),
            Err(SceneError::InvalidMaterial { geom: 0, material: 4 })
        );
    }

    #[test]
    fn test_scene_no_materials() {
        let mut scene = Scene::new(camera());
        scene.add_geom(Geom::cube(Transform::default(), 0));
        assert_eq!(scene.validate(), Err(SceneError::NoMaterials));
    }

    #[test]
    fn test_scene_invalid_ior() {
        let mut scene = Scene::new(camera());
        scene.add_material(Material::refractive(Vec3::ONE, Vec3::ONE, 0.0));
        assert!(matches!(scene.validate(), Err(SceneError::InvalidIor { material: 0, .. })));
    }

    #[test]
    fn test_add_geom_drops_stale_bvh() {
        let mut scene = Scene::new(camera());
        let m = scene.add_material(Material::diffuse(Vec3::ONE));
        scene.add_geom(Geom::sphere(Transform::default(), m));
        scene.build_bvh();
        scene.add_geom(Geom::sphere(Transform::default(), m));

        assert!(scene.bvh.is_none());
    }
}
