//! Built-in demo scene: a closed box lit from the ceiling.

use lumen_core::{Camera, Geom, Material, Scene};
use lumen_math::{Transform, Vec3};

fn slab(center: Vec3, scale: Vec3, material: usize) -> Geom {
    Geom::cube(Transform::from_translation_scale(center, scale), material)
}

pub fn cornell_box(width: u32, height: u32, trace_depth: u32) -> Scene {
    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_trace_depth(trace_depth)
        .with_position(Vec3::new(0.0, 0.0, 10.5), Vec3::ZERO, Vec3::Y)
        .with_fov(45.0);
    camera.initialize();

    let mut scene = Scene::new(camera);

    let white = scene.add_material(Material::diffuse(Vec3::splat(0.85)));
    let red = scene.add_material(Material::diffuse(Vec3::new(0.85, 0.35, 0.35)));
    let green = scene.add_material(Material::diffuse(Vec3::new(0.35, 0.85, 0.35)));
    let light = scene.add_material(Material::emissive(Vec3::ONE, 5.0));
    let mirror = scene.add_material(Material::reflective(Vec3::splat(0.98), Vec3::splat(0.98)));
    let glass = scene.add_material(Material::refractive(Vec3::splat(0.98), Vec3::splat(0.98), 1.5));

    // Walls
    scene.add_geom(slab(Vec3::new(0.0, -5.0, 0.0), Vec3::new(10.0, 0.01, 10.0), white));
    scene.add_geom(slab(Vec3::new(0.0, 5.0, 0.0), Vec3::new(10.0, 0.01, 10.0), white));
    scene.add_geom(slab(Vec3::new(0.0, 0.0, -5.0), Vec3::new(10.0, 10.0, 0.01), white));
    scene.add_geom(slab(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(0.01, 10.0, 10.0), red));
    scene.add_geom(slab(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.01, 10.0, 10.0), green));

    // Ceiling light
    scene.add_geom(slab(Vec3::new(0.0, 4.95, 0.0), Vec3::new(3.0, 0.1, 3.0), light));

    scene.add_geom(Geom::sphere(
        Transform::from_translation_scale(Vec3::new(-2.0, -3.0, -1.5), Vec3::splat(4.0)),
        mirror,
    ));
    scene.add_geom(Geom::sphere(
        Transform::from_translation_scale(Vec3::new(2.2, -3.5, 1.0), Vec3::splat(3.0)),
        glass,
    ));
    scene.add_geom(Geom::cube(
        Transform::new(
            Vec3::new(2.0, -4.0, -2.5),
            Vec3::new(0.0, 25.0, 0.0),
            Vec3::new(2.0, 2.0, 2.0),
        ),
        white,
    ));
    scene.add_geom(Geom::triangle(
        Vec3::new(-4.5, 1.0, -4.9),
        Vec3::new(-1.5, 1.0, -4.9),
        Vec3::new(-3.0, 3.5, -4.9),
        green,
    ));

    scene
}
