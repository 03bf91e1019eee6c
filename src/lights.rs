use cgmath::{vec3, Vector3};

use crate::shaders::Uniform;

pub const POINT_LIGHT_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightColor {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 0.2,
            linear: 0.2,
            quadratic: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub color: LightColor,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: LightColor,
    pub attenuation: Attenuation,
    pub active: bool,
}

// Position and direction come from the camera every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub color: LightColor,
    pub cut_off: f32,       // cosine of the inner cone angle
    pub outer_cut_off: f32, // cosine of the outer cone angle
    pub attenuation: Attenuation,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lights {
    pub directional: DirectionalLight,
    pub points: [PointLight; POINT_LIGHT_COUNT],
    pub spot: SpotLight,
}

impl Default for Lights {
    fn default() -> Self {
        let point = |position| PointLight {
            position,
            color: LightColor {
                ambient: [0.5, 0.0, 0.0],
                diffuse: [0.0, 0.5, 0.0],
                specular: [0.0, 0.0, 0.5],
            },
            attenuation: Attenuation::default(),
            active: true,
        };

        Self {
            directional: DirectionalLight {
                direction: vec3(0.0, 1.0, 1.0),
                color: LightColor {
                    ambient: [0.0, 0.3, 0.0],
                    diffuse: [0.4, 0.0, 0.0],
                    specular: [0.0, 0.4, 0.4],
                },
                active: true,
            },
            points: [point(vec3(-21.0, 5.0, -30.0)), point(vec3(-21.0, 5.0, -2.0))],
            spot: SpotLight {
                color: LightColor {
                    ambient: [1.0; 3],
                    diffuse: [1.0; 3],
                    specular: [1.0; 3],
                },
                cut_off: 0.90,
                outer_cut_off: 0.80,
                attenuation: Attenuation::default(),
                active: true,
            },
        }
    }
}

impl Lights {
    pub fn uniforms(
        &self,
        eye_position: Vector3<f32>,
        eye_direction: Vector3<f32>,
    ) -> Vec<(String, Uniform)> {
        let mut uniforms = Vec::new();

        let dir = &self.directional;
        uniforms.push(("dirLight.direction".to_string(), Uniform::Vec3(dir.direction.into())));
        push_color(&mut uniforms, "dirLight", &dir.color);
        uniforms.push(("isActiveDirLight".to_string(), Uniform::Bool(dir.active)));

        let spot = &self.spot;
        uniforms.push(("spotLight.position".to_string(), Uniform::Vec3(eye_position.into())));
        uniforms.push(("spotLight.direction".to_string(), Uniform::Vec3(eye_direction.into())));
        push_color(&mut uniforms, "spotLight", &spot.color);
        uniforms.push(("spotLight.cutOff".to_string(), Uniform::Float(spot.cut_off)));
        uniforms.push(("spotLight.outerCutOff".to_string(), Uniform::Float(spot.outer_cut_off)));
        push_attenuation(&mut uniforms, "spotLight", &spot.attenuation);
        uniforms.push(("isActiveSpotLight".to_string(), Uniform::Bool(spot.active)));

        for (i, point) in self.points.iter().enumerate() {
            let prefix = format!("pointLights[{}]", i);
            uniforms.push((format!("{}.position", prefix), Uniform::Vec3(point.position.into())));
            push_color(&mut uniforms, &prefix, &point.color);
            push_attenuation(&mut uniforms, &prefix, &point.attenuation);
            uniforms.push((format!("isActivePointLight{}", i + 1), Uniform::Bool(point.active)));
        }

        uniforms
    }
}

fn push_color(uniforms: &mut Vec<(String, Uniform)>, prefix: &str, color: &LightColor) {
    uniforms.push((format!("{}.color.ambient", prefix), Uniform::Vec3(color.ambient)));
    uniforms.push((format!("{}.color.diffuse", prefix), Uniform::Vec3(color.diffuse)));
    uniforms.push((format!("{}.color.specular", prefix), Uniform::Vec3(color.specular)));
}

fn push_attenuation(uniforms: &mut Vec<(String, Uniform)>, prefix: &str, att: &Attenuation) {
    uniforms.push((format!("{}.attenuation.constant", prefix), Uniform::Float(att.constant)));
    uniforms.push((format!("{}.attenuation.linear", prefix), Uniform::Float(att.linear)));
    uniforms.push((format!("{}.attenuation.quadratic", prefix), Uniform::Float(att.quadratic)));
}
