use serde::Deserialize;

use crate::shaders::Uniform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaterialType {
    BlinnPhong,
    OrenNayar,
    CookTorrance,
}

impl MaterialType {
    pub const ALL: [MaterialType; 3] = [
        MaterialType::BlinnPhong,
        MaterialType::OrenNayar,
        MaterialType::CookTorrance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MaterialType::BlinnPhong => "Blinn-Phong",
            MaterialType::OrenNayar => "Oren-Nayar",
            MaterialType::CookTorrance => "Cook-Torrance",
        }
    }

    pub fn fragment_shader(self) -> &'static str {
        match self {
            MaterialType::BlinnPhong => "blinn_phong.frag",
            MaterialType::OrenNayar => "oren_nayar.frag",
            MaterialType::CookTorrance => "cook_torrance.frag",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub shininess: f32,
    pub roughness: f32,
    pub intensity: f32,
    pub reflectance: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            shininess: 32.0,
            roughness: 0.3,
            intensity: 1.0,
            reflectance: 0.8,
        }
    }
}

impl MaterialParams {
    pub fn uniforms(&self, material: MaterialType) -> Vec<(&'static str, Uniform)> {
        match material {
            MaterialType::BlinnPhong => vec![("shininess", Uniform::Float(self.shininess))],
            MaterialType::OrenNayar => vec![
                ("roughness", Uniform::Float(self.roughness)),
                ("intensity", Uniform::Float(self.intensity)),
            ],
            MaterialType::CookTorrance => vec![
                ("roughness", Uniform::Float(self.roughness)),
                ("intensity", Uniform::Float(self.intensity)),
                ("reflectance", Uniform::Float(self.reflectance)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_material_reads_its_own_parameters() {
        let params = MaterialParams::default();

        assert_eq!(
            params.uniforms(MaterialType::BlinnPhong),
            vec![("shininess", Uniform::Float(32.0))]
        );
        assert_eq!(params.uniforms(MaterialType::OrenNayar).len(), 2);
        assert_eq!(
            params.uniforms(MaterialType::CookTorrance).last(),
            Some(&("reflectance", Uniform::Float(0.8)))
        );
    }

    #[test]
    fn material_names_are_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            material: MaterialType,
        }

        let parsed: Wrapper = toml::from_str("material = \"cook-torrance\"").unwrap();
        assert_eq!(parsed.material, MaterialType::CookTorrance);
    }
}
