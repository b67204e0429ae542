//! Example: Build a small scene and fire a few rays through it.
//!
//! Run with: cargo run --example trace_quad

use iris_math::{Ray, Vec3};
use iris_trace::{AcceleratorKind, AreaLight, Material, Primitive, Scene, Triangle};

fn main() {
    env_logger::init();

    // Two unit triangles forming a quad at z = 0, plus a light above it.
    let primitives = vec![
        Primitive::new(
            Triangle::new(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
            ),
            0,
        ),
        Primitive::new(
            Triangle::new(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ),
            1,
        ),
    ];
    let materials = vec![
        Material::diffuse(Vec3::new(0.8, 0.2, 0.2)),
        Material::diffuse(Vec3::new(0.2, 0.8, 0.2)),
    ];
    let lights = vec![AreaLight::new(
        Triangle::new(
            Vec3::new(0.25, 0.25, 3.0),
            Vec3::new(0.75, 0.25, 3.0),
            Vec3::new(0.25, 0.75, 3.0),
        ),
        Vec3::splat(12.0),
    )];

    let scene = match Scene::with_accelerator(primitives, materials, lights, AcceleratorKind::Bvh)
    {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error assembling scene: {}", e);
            return;
        }
    };

    let rays = [
        Ray::with_pixel(Vec3::new(0.5, 0.5, -1.0), Vec3::Z, (0, 0)),
        Ray::with_pixel(Vec3::new(0.4, 0.4, 4.0), -Vec3::Z, (1, 0)),
        Ray::with_pixel(Vec3::new(2.0, 2.0, -1.0), Vec3::Z, (2, 0)),
    ];

    for ray in &rays {
        match scene.trace(ray) {
            Some(hit) => {
                println!(
                    "pixel {:?}: hit at depth {:.3}, point ({:.2}, {:.2}, {:.2})",
                    ray.pixel, hit.depth, hit.point.x, hit.point.y, hit.point.z
                );
                if let Some(radiance) = hit.emission {
                    println!("    light, emitting {:?}", radiance);
                } else if let Some(id) = hit.material {
                    println!("    material {}: diffuse {:?}", id, scene.material(id).diffuse);
                }
            }
            None => println!("pixel {:?}: miss", ray.pixel),
        }

        let shadow = Ray::new(ray.origin, Vec3::Z);
        println!("    visibility over 10 units: {}", scene.visibility(&shadow, 10.0));
    }
}
