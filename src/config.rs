use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

use clap::{value_parser, Arg, Command};
use log::warn;
use serde::Deserialize;

use crate::material::MaterialType;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read scene file '{0}': {1}")]
    Io(PathBuf, #[source] io::Error),

    #[error("invalid scene file '{0}': {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("model '{model}' refers to unknown texture '{texture}'")]
    UnknownTexture { model: String, texture: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub scene: PathBuf,
    pub width: u32,
    pub height: u32,
}

fn command() -> Command {
    Command::new("lighting_demo")
        .about("Renders OBJ models under Blinn-Phong, Oren-Nayar and Cook-Torrance lighting")
        .arg(
            Arg::new("scene")
                .long("scene")
                .value_name("FILE")
                .help("TOML scene description")
                .default_value("assets/scene.toml")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .default_value("800")
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .default_value("600")
                .value_parser(value_parser!(u32).range(1..)),
        )
}

impl LaunchOptions {
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;

        // All three have defaults, so they are always present.
        let get_u32 = |id: &str| matches.get_one::<u32>(id).copied().unwrap_or(1);
        Ok(Self {
            scene: matches
                .get_one::<PathBuf>("scene")
                .cloned()
                .unwrap_or_default(),
            width: get_u32("width"),
            height: get_u32("height"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextureConfig {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub path: PathBuf,
    pub material: MaterialType,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub texture: Option<String>,
}

// Paths are relative to the working directory
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    pub shader_dir: PathBuf,
    pub light_marker: PathBuf,
    #[serde(default, rename = "texture")]
    pub textures: Vec<TextureConfig>,
    #[serde(default, rename = "model")]
    pub models: Vec<ModelConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let model = |name: &str, path: &str, material, position, texture: &str| ModelConfig {
            name: name.to_string(),
            path: PathBuf::from(path),
            material,
            position,
            texture: Some(texture.to_string()),
        };

        Self {
            shader_dir: PathBuf::from("shaders"),
            light_marker: PathBuf::from("assets/models/cube.obj"),
            textures: vec![
                TextureConfig {
                    name: "crate".to_string(),
                    path: PathBuf::from("assets/textures/crate.ppm"),
                },
                TextureConfig {
                    name: "ground".to_string(),
                    path: PathBuf::from("assets/textures/ground.ppm"),
                },
            ],
            models: vec![
                model(
                    "Blinn-Phong cube",
                    "assets/models/cube.obj",
                    MaterialType::BlinnPhong,
                    [0.0, 1.0, -30.0],
                    "crate",
                ),
                model(
                    "Oren-Nayar cube",
                    "assets/models/cube.obj",
                    MaterialType::OrenNayar,
                    [0.0, 1.0, 0.0],
                    "crate",
                ),
                model(
                    "Cook-Torrance cube",
                    "assets/models/cube.obj",
                    MaterialType::CookTorrance,
                    [0.0, 1.0, 30.0],
                    "crate",
                ),
                model(
                    "Ground",
                    "assets/models/plane.obj",
                    MaterialType::BlinnPhong,
                    [0.0, 0.0, 0.0],
                    "ground",
                ),
            ],
        }
    }
}

impl SceneConfig {
    pub fn parse(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: SceneConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(origin.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(source) => Self::parse(&source, path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Scene file {:?} not found, using the built-in scene", path);
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(path.to_path_buf(), e)),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for model in &self.models {
            if let Some(texture) = &model.texture {
                if !self.textures.iter().any(|t| &t.name == texture) {
                    return Err(ConfigError::UnknownTexture {
                        model: model.name.clone(),
                        texture: texture.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn texture_index(&self, name: &str) -> Option<usize> {
        self.textures.iter().position(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_defaults() {
        let options = LaunchOptions::from_args(["lighting_demo"]).unwrap();

        assert_eq!(options.scene, PathBuf::from("assets/scene.toml"));
        assert_eq!((options.width, options.height), (800, 600));
    }

    #[test]
    fn launch_overrides() {
        let options = LaunchOptions::from_args([
            "lighting_demo",
            "--scene",
            "other.toml",
            "--width",
            "1280",
            "--height",
            "720",
        ])
        .unwrap();

        assert_eq!(options.scene, PathBuf::from("other.toml"));
        assert_eq!((options.width, options.height), (1280, 720));
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(LaunchOptions::from_args(["lighting_demo", "--width", "0"]).is_err());
    }

    #[test]
    fn parses_scene_file() {
        let source = r#"
            shader_dir = "shaders"
            light_marker = "assets/models/cube.obj"

            [[texture]]
            name = "ground"
            path = "assets/textures/ground.ppm"

            [[model]]
            name = "Plane"
            path = "assets/models/plane.obj"
            material = "oren-nayar"
            position = [0.0, -1.0, 0.0]
            texture = "ground"

            [[model]]
            name = "Marker"
            path = "assets/models/cube.obj"
            material = "blinn-phong"
        "#;

        let config = SceneConfig::parse(source, Path::new("scene.toml")).unwrap();

        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].material, MaterialType::OrenNayar);
        assert_eq!(config.models[0].position, [0.0, -1.0, 0.0]);
        assert_eq!(config.models[1].position, [0.0, 0.0, 0.0]);
        assert_eq!(config.models[1].texture, None);
        assert_eq!(config.texture_index("ground"), Some(0));
    }

    #[test]
    fn unknown_texture_reference_is_rejected() {
        let source = r#"
            shader_dir = "shaders"
            light_marker = "cube.obj"

            [[model]]
            name = "Cube"
            path = "cube.obj"
            material = "cook-torrance"
            texture = "missing"
        "#;

        assert!(matches!(
            SceneConfig::parse(source, Path::new("scene.toml")),
            Err(ConfigError::UnknownTexture { .. })
        ));
    }

    #[test]
    fn unknown_material_is_a_parse_error() {
        let source = r#"
            shader_dir = "shaders"
            light_marker = "cube.obj"

            [[model]]
            name = "Cube"
            path = "cube.obj"
            material = "lambert"
        "#;

        assert!(matches!(
            SceneConfig::parse(source, Path::new("scene.toml")),
            Err(ConfigError::Parse(..))
        ));
    }

    #[test]
    fn missing_scene_file_falls_back_to_default() {
        let config = SceneConfig::load_or_default(Path::new("no/such/scene.toml")).unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.models.len(), 4);
    }
}
