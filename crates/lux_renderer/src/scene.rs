//! Render-ready scene: shapes in a BVH plus the light list.

use std::sync::Arc;

use lux_core::{
    LightDesc, MaterialDesc, RenderMode, SceneDescription, ShapeDesc, TextureCache, TextureResult,
};
use lux_math::{Color, Interval};
use rand::RngCore;

use crate::{
    AreaLight, BlinnPhong, BvhNode, Cylinder, HitRecord, Hittable, Lambertian, Light, Material,
    PointLight, Ray, Schlick, SchlickRefractive, Shape, Sphere, Triangle,
};

/// Geometry and lights, immutable for the duration of a render.
pub struct Scene {
    world: BvhNode,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new(shapes: Vec<Shape>, lights: Vec<Light>) -> Self {
        Self {
            world: BvhNode::new(shapes),
            lights,
        }
    }

    /// Build the scene a description names.
    ///
    /// Phong mode reads every material block as Blinn-Phong; the other modes
    /// read it as a BRDF choice. Textures go through `textures` so shapes that
    /// name the same file share one copy.
    pub fn from_description(
        desc: &SceneDescription,
        textures: &mut TextureCache,
    ) -> TextureResult<Self> {
        let mut shapes = Vec::with_capacity(desc.scene.shapes.len());

        for shape in &desc.scene.shapes {
            let material = Arc::new(build_material(shape.material(), desc.render_mode, textures)?);

            let shape: Shape = match *shape {
                ShapeDesc::Sphere { center, radius, .. } => {
                    Sphere::new(center, radius, material).into()
                }
                ShapeDesc::Cylinder {
                    center,
                    axis,
                    radius,
                    height,
                    ..
                } => Cylinder::new(center, axis, radius, height, material).into(),
                ShapeDesc::Triangle { v0, v1, v2, .. } => Triangle::new(v0, v1, v2, material).into(),
            };
            shapes.push(shape);
        }

        let lights = desc
            .scene
            .lights
            .iter()
            .map(|light| match *light {
                LightDesc::Point {
                    position,
                    intensity,
                } => PointLight::new(position, intensity).into(),
                LightDesc::Area {
                    corner,
                    edge1,
                    edge2,
                    intensity,
                    samples,
                } => AreaLight::new(corner, edge1, edge2, intensity, samples).into(),
            })
            .collect();

        Ok(Self::new(shapes, lights))
    }

    pub fn world(&self) -> &BvhNode {
        &self.world
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Nearest hit among all shapes.
    #[inline]
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.world.hit(ray, ray_t)
    }

    /// Sum of every light's visibility-tested contribution at `rec`.
    pub fn direct_lighting(&self, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> Color {
        self.lights
            .iter()
            .map(|light| light.sample(rec, &self.world, rng))
            .sum()
    }
}

fn build_material(
    desc: &MaterialDesc,
    mode: RenderMode,
    textures: &mut TextureCache,
) -> TextureResult<Material> {
    let load = |textures: &mut TextureCache| match &desc.texture {
        Some(path) => textures.load(path).map(Some),
        None => Ok(None),
    };

    if mode == RenderMode::Phong {
        return Ok(BlinnPhong {
            diffuse_color: desc.diffuse_color,
            specular_color: desc.specular_color,
            specular_exponent: desc.specular_exponent,
            ks: desc.ks,
            kd: desc.kd,
            reflectivity: desc.reflectivity,
            refractive_index: desc.refractive_index,
            is_reflective: desc.is_reflective,
            is_refractive: desc.is_refractive,
            transparency: desc.transparency,
            texture: load(textures)?,
        }
        .into());
    }

    let material = match desc.brdf_type.as_deref() {
        Some("lambertian") => {
            let lambertian = Lambertian::new(desc.diffuse_color);
            match load(textures)? {
                Some(texture) => lambertian.with_texture(texture).into(),
                None => lambertian.into(),
            }
        }
        Some("schlick") => Schlick::new(desc.reflectance).into(),
        _ => SchlickRefractive::new(desc.reflectance).into(),
    };

    Ok(material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SCENE_RAY_T;
    use lux_core::{Texture, TextureError};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SCENE: &str = r#"{
        "rendermode": "pathtracer",
        "nbounces": 2,
        "camera": {
            "type": "pinhole", "width": 8, "height": 8,
            "position": [0, 0, 5], "lookAt": [0, 0, 0], "upVector": [0, 1, 0], "fov": 45
        },
        "scene": {
            "backgroundcolor": [0, 0, 0],
            "lightsources": [
                { "type": "pointlight", "position": [0, 5, 0], "intensity": [1, 1, 1] }
            ],
            "shapes": [
                { "type": "sphere", "center": [0, 0, 0], "radius": 1,
                  "material": { "brdfType": "lambertian", "diffusecolor": [0.2, 0.4, 0.6] } },
                { "type": "sphere", "center": [3, 0, 0], "radius": 1,
                  "material": { "brdfType": "schlick", "reflectance": 0.9 } },
                { "type": "triangle", "v0": [-5, -1, -5], "v1": [5, -1, -5], "v2": [0, -1, 5] }
            ]
        }
    }"#;

    #[test]
    fn test_build_brdf_materials() {
        let desc = SceneDescription::from_json_str(SCENE).unwrap();
        let scene = Scene::from_description(&desc, &mut TextureCache::new()).unwrap();

        assert_eq!(scene.world().len(), 3);
        assert_eq!(scene.lights().len(), 1);

        let hit_material = |origin: Vec3| {
            let ray = Ray::new(origin, Vec3::new(0.0, 0.0, -1.0));
            let rec = scene.hit(&ray, SCENE_RAY_T).expect("should hit");
            match rec.material {
                Material::Lambertian(_) => "lambertian",
                Material::Schlick(_) => "schlick",
                Material::SchlickRefractive(_) => "refractive",
                Material::BlinnPhong(_) => "phong",
            }
        };

        // The triangle's v2 at z = 5 in the file lands at z = -5; sphere
        // centres at z = 0 stay put, so rays from z = 5 down -z reach them
        let ShapeDesc::Triangle { v2, .. } = desc.scene.shapes[2] else {
            panic!("third shape should be the triangle");
        };
        assert_eq!(v2, Vec3::new(0.0, -1.0, -5.0));
        assert_eq!(hit_material(Vec3::new(0.0, 0.0, 5.0)), "lambertian");
        assert_eq!(hit_material(Vec3::new(3.0, 0.0, 5.0)), "schlick");
    }

    #[test]
    fn test_missing_brdf_type_is_refractive() {
        let material = build_material(
            &MaterialDesc::default(),
            RenderMode::Pathtracer,
            &mut TextureCache::new(),
        )
        .unwrap();
        assert!(matches!(material, Material::SchlickRefractive(_)));
    }

    #[test]
    fn test_phong_mode_uses_blinn_phong() {
        let text = SCENE.replace("\"pathtracer\"", "\"phong\"");
        let desc = SceneDescription::from_json_str(&text).unwrap();
        let scene = Scene::from_description(&desc, &mut TextureCache::new()).unwrap();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = scene.hit(&ray, SCENE_RAY_T).unwrap();
        assert!(matches!(rec.material, Material::BlinnPhong(_)));
    }

    #[test]
    fn test_textures_are_shared() {
        let mut cache = TextureCache::new();
        cache.insert("checker.ppm", Texture::from_rgb8(1, 1, &[[0, 255, 0]], "checker.ppm"));

        let desc = MaterialDesc {
            brdf_type: Some("lambertian".to_string()),
            texture: Some("checker.ppm".to_string()),
            ..Default::default()
        };
        let a = build_material(&desc, RenderMode::Pathtracer, &mut cache).unwrap();
        let b = build_material(&desc, RenderMode::Phong, &mut cache).unwrap();

        let (Some(ta), Some(tb)) = (a.texture(), b.texture()) else {
            panic!("both materials should be textured");
        };
        assert!(Arc::ptr_eq(ta, tb));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_texture_is_an_error() {
        let desc = MaterialDesc {
            texture: Some("/no/such/texture.ppm".to_string()),
            ..Default::default()
        };
        let err = build_material(&desc, RenderMode::Phong, &mut TextureCache::new());
        assert!(matches!(err, Err(TextureError::Io { .. })));
    }

    #[test]
    fn test_direct_lighting_sums_lights() {
        let material = Arc::new(Material::from(Lambertian::new(Color::ONE)));
        let light = PointLight::new(Vec3::new(0.0, 3.0, 0.0), Color::ONE);
        let scene = Scene::new(
            vec![Sphere::new(Vec3::ZERO, 1.0, material).into()],
            vec![light.clone().into(), light.into()],
        );

        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let rec = scene.hit(&ray, SCENE_RAY_T).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        // Each light: cos 1, d² = 4, so 2/4; two lights sum to 1
        let total = scene.direct_lighting(&rec, &mut rng);
        assert!((total - Color::ONE).length() < 1e-4);
    }
}
