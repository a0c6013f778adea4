//! End-to-end scenarios: scene file in, pixels out.

use std::sync::Arc;

use lux_core::{RenderMode, SceneDescription, TextureCache};
use lux_renderer::{
    render, BvhNode, Camera, Color, Cylinder, Hittable, HittableList, Interval, Lambertian,
    Material, Ray, RenderConfig, Scene, Shape, Sphere, Triangle, Vec3, HIT_COLOR, SCENE_RAY_T,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Unit sphere at the origin, light above, camera five units back. Positions
/// are written in the file's left-handed frame and come out z-negated.
const UNIT_SPHERE: &str = r#"{
    "rendermode": "binary",
    "nbounces": 0,
    "camera": {
        "type": "pinhole",
        "width": 21,
        "height": 21,
        "position": [0.0, 0.0, 5.0],
        "lookAt": [0.0, 0.0, 0.0],
        "upVector": [0.0, 1.0, 0.0],
        "fov": 45.0,
        "exposure": 0.1
    },
    "scene": {
        "backgroundcolor": [0.25, 0.25, 0.5],
        "lightsources": [
            { "type": "pointlight", "position": [0.0, 5.0, 0.0], "intensity": [1.0, 1.0, 1.0] }
        ],
        "shapes": [
            { "type": "sphere", "center": [0.0, 0.0, 0.0], "radius": 1.0,
              "material": { "brdfType": "lambertian", "ks": 0.1, "kd": 0.9, "specularexponent": 10,
                            "diffusecolor": [0.8, 0.8, 0.8], "specularcolor": [1, 1, 1] } }
        ]
    }
}"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn load(text: &str) -> (SceneDescription, Scene, Camera, RenderConfig) {
    init_logging();
    let desc = SceneDescription::from_json_str(text).expect("scene should parse");
    let scene = Scene::from_description(&desc, &mut TextureCache::new()).expect("scene builds");
    let camera = Camera::from_description(&desc.camera);
    let config = RenderConfig::from_description(&desc);
    (desc, scene, camera, config)
}

fn gray() -> Arc<Material> {
    Arc::new(Material::from(Lambertian::new(Color::splat(0.5))))
}

#[test]
fn binary_unit_sphere_center_hits_and_corner_misses() {
    let (desc, scene, camera, config) = load(UNIT_SPHERE);
    assert_eq!(desc.camera.position, Vec3::new(0.0, 0.0, -5.0));

    let image = render(&camera, &scene, &config);
    assert_eq!((image.width, image.height), (21, 21));

    assert_eq!(image.get(10, 10), HIT_COLOR);
    assert_eq!(image.get(0, 0), desc.scene.background);
    assert_eq!(image.get(20, 20), desc.scene.background);

    // The written file agrees with the buffer
    let mut out = Vec::new();
    image.write_ppm(&mut out, &config.tone_mapper()).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(&lines[..3], &["P3", "21 21", "255"]);
    assert_eq!(lines.len(), 3 + 21 * 21);

    let [r, g, b] = config.tone_mapper().to_rgb8(HIT_COLOR);
    assert_eq!(lines[3 + 10 * 21 + 10], format!("{r} {g} {b}"));
}

#[test]
fn every_mode_renders_the_unit_sphere() {
    for mode in ["binary", "phong", "pathtracer"] {
        let text = UNIT_SPHERE
            .replace("\"binary\"", &format!("\"{mode}\""))
            .replace("\"nbounces\": 0", "\"nbounces\": 2")
            .replace("\"width\": 21", "\"width\": 9")
            .replace("\"height\": 21", "\"height\": 9")
            .replace("\"exposure\": 0.1", "\"exposure\": 0.1, \"samples\": 4");
        let (desc, scene, camera, config) = load(&text);
        let image = render(&camera, &scene, &config);

        // Corners always miss
        assert_eq!(image.get(0, 0), desc.scene.background, "{mode}");
        // The lit sphere is never the background colour
        assert_ne!(image.get(4, 4), desc.scene.background, "{mode}");
    }
}

#[test]
fn pathtracer_without_bounces_is_black_on_hits() {
    let text = UNIT_SPHERE.replace("\"binary\"", "\"pathtracer\"");
    let (desc, scene, camera, config) = load(&text);
    assert_eq!(config.mode, RenderMode::Pathtracer);
    assert_eq!(config.nbounces, 0);

    let image = render(&camera, &scene, &config);
    assert_eq!(image.get(10, 10), Color::ZERO);
    assert_eq!(image.get(0, 0), desc.scene.background);
}

#[test]
fn renders_are_reproducible_from_the_seed() {
    let text = UNIT_SPHERE
        .replace("\"binary\"", "\"pathtracer\"")
        .replace("\"nbounces\": 0", "\"nbounces\": 3, \"seed\": 99")
        .replace("\"exposure\": 0.1", "\"exposure\": 0.1, \"lensRadius\": 0.1, \"samples\": 3");
    let (_, scene, camera, config) = load(&text);

    let first = render(&camera, &scene, &config);
    let second = render(&camera, &scene, &config);
    assert_eq!(first.pixels, second.pixels);
}

fn mixed_shapes() -> Vec<Shape> {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut shapes: Vec<Shape> = Vec::new();

    for _ in 0..40 {
        let center = Vec3::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-30.0..-10.0),
        );
        match rng.gen_range(0..3) {
            0 => shapes.push(Sphere::new(center, rng.gen_range(0.3..1.5), gray()).into()),
            1 => {
                let axis = [Vec3::X, Vec3::Y, Vec3::Z][rng.gen_range(0..3)];
                shapes.push(
                    Cylinder::new(center, axis, rng.gen_range(0.3..1.0), rng.gen_range(0.5..2.0), gray())
                        .into(),
                )
            }
            _ => {
                let offset = |rng: &mut StdRng| {
                    Vec3::new(
                        rng.gen_range(-1.5..1.5),
                        rng.gen_range(-1.5..1.5),
                        rng.gen_range(-1.5..1.5),
                    )
                };
                let (a, b, c) = (offset(&mut rng), offset(&mut rng), offset(&mut rng));
                shapes.push(Triangle::new(center + a, center + b, center + c, gray()).into())
            }
        }
    }

    shapes
}

#[test]
fn bvh_agrees_with_brute_force() {
    let shapes = mixed_shapes();
    let list: HittableList = shapes.iter().cloned().collect();
    let bvh = BvhNode::new(shapes);
    assert_eq!(bvh.len(), list.len());

    let mut rng = StdRng::seed_from_u64(7);
    let mut hits = 0;
    for _ in 0..2000 {
        let origin = Vec3::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0), 0.0);
        let target = Vec3::new(
            rng.gen_range(-12.0..12.0),
            rng.gen_range(-12.0..12.0),
            rng.gen_range(-30.0..-10.0),
        );
        let ray = Ray::new(origin, target - origin);

        let expected = list.hit(&ray, SCENE_RAY_T);
        let actual = bvh.hit(&ray, SCENE_RAY_T);
        match (expected, actual) {
            (None, None) => {}
            (Some(e), Some(a)) => {
                hits += 1;
                assert!((e.t - a.t).abs() < 1e-4, "t {} vs {}", e.t, a.t);
                assert!((e.p - a.p).length() < 1e-3);
            }
            (e, a) => panic!(
                "brute force {:?} vs bvh {:?}",
                e.map(|r| r.t),
                a.map(|r| r.t)
            ),
        }
    }
    assert!(hits > 50, "too few hits to be meaningful: {hits}");
}

#[test]
fn hits_stay_in_window_with_unit_normals() {
    let shapes = mixed_shapes();
    let mut rng = StdRng::seed_from_u64(8);

    for _ in 0..2000 {
        let origin = Vec3::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0), 0.0);
        let direction = Vec3::new(
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
            -1.0,
        );
        let ray = Ray::new(origin, direction);
        let lo = rng.gen_range(0.001..15.0);
        let window = Interval::new(lo, lo + rng.gen_range(0.5..20.0));

        for shape in &shapes {
            if let Some(rec) = shape.hit(&ray, window) {
                assert!(window.surrounds(rec.t), "t {} outside {:?}", rec.t, window);
                assert!((rec.normal.length() - 1.0).abs() < 1e-3);
                assert!(rec.normal.dot(ray.direction()) <= 0.0);
            }
        }
    }
}

#[test]
fn enclosing_box_is_not_a_surface() {
    // The small sphere sits in the corner of the big sphere's box, outside
    // the big sphere itself
    let big = Sphere::new(Vec3::ZERO, 4.0, gray());
    let small = Sphere::new(Vec3::new(3.3, 3.3, 0.0), 0.4, gray());
    let bvh = BvhNode::new(vec![big.into(), small.into()]);

    // Through the box corner beside the small sphere: nothing to hit
    let ray = Ray::new(Vec3::new(3.3, 2.7, 10.0), Vec3::new(0.0, 0.0, -1.0));
    assert!(bvh.bounding_box().hit(&ray, SCENE_RAY_T));
    assert!(bvh.hit(&ray, SCENE_RAY_T).is_none());

    // Onto the small sphere: its surface, not the big box
    let ray = Ray::new(Vec3::new(3.3, 3.3, 10.0), Vec3::new(0.0, 0.0, -1.0));
    let rec = bvh.hit(&ray, SCENE_RAY_T).expect("small sphere");
    assert!((rec.p - Vec3::new(3.3, 3.3, 0.4)).length() < 1e-3);
}
