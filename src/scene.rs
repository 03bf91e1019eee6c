use anyhow::Context;
use log::{error, info, warn};

use crate::{
    camera::FlyCamera,
    config::SceneConfig,
    handles::TextureHandle,
    lights::Lights,
    loader::load_obj,
    material::MaterialParams,
    mesh::Model,
    opengl::{GlMesh, GpuMesh},
    shaders::MaterialShaders,
    textures::Texture,
};

pub struct Scene {
    pub name: String,
    pub models: Vec<Model>,
    pub light_marker: Option<GlMesh>,
    pub textures: Vec<Texture>,
    pub shaders: MaterialShaders,
    pub lights: Lights,
    pub params: MaterialParams,
    pub camera: FlyCamera,
}

impl Scene {
    // Missing shaders abort; broken models, textures and markers are skipped
    pub fn load(gl: &glow::Context, config: &SceneConfig) -> anyhow::Result<Self> {
        let shaders = MaterialShaders::load(gl, &config.shader_dir)
            .with_context(|| format!("loading shaders from {:?}", config.shader_dir))?;

        let mut textures = Vec::new();
        let mut texture_handles: Vec<Option<TextureHandle>> = Vec::new();
        for texture_config in &config.textures {
            match Texture::load(gl, &texture_config.name, &texture_config.path) {
                Ok(texture) => {
                    texture_handles.push(Some(TextureHandle(textures.len())));
                    textures.push(texture);
                }
                Err(e) => {
                    warn!("Texture '{}' unavailable: {}", texture_config.name, e);
                    texture_handles.push(None);
                }
            }
        }

        let mut models = Vec::new();
        for model_config in &config.models {
            let texture = model_config
                .texture
                .as_deref()
                .and_then(|name| config.texture_index(name))
                .and_then(|index| texture_handles[index]);

            match Model::from_obj(gl, &model_config.name, &model_config.path, model_config.material)
            {
                Ok(model) => models.push(
                    model
                        .with_position(model_config.position.into())
                        .with_texture(texture),
                ),
                Err(e) => error!(
                    "Skipping model '{}' ({:?}): {}",
                    model_config.name, model_config.path, e
                ),
            }
        }

        let light_marker = match load_obj(&config.light_marker)
            .map_err(anyhow::Error::from)
            .and_then(|flat| GpuMesh::build(gl, &flat).map_err(anyhow::Error::from))
        {
            Ok(mesh) => Some(mesh),
            Err(e) => {
                warn!("Light markers disabled: {:#}", e);
                None
            }
        };

        info!(
            "Scene ready: {} models, {} textures",
            models.len(),
            textures.len()
        );

        Ok(Self {
            name: "Lighting demo".to_string(),
            models,
            light_marker,
            textures,
            shaders,
            lights: Lights::default(),
            params: MaterialParams::default(),
            camera: FlyCamera::default(),
        })
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.index())
    }

    pub fn destroy(self, gl: &glow::Context) {
        let model_count = self.models.len();
        for model in self.models {
            model.destroy(gl);
        }
        if let Some(marker) = self.light_marker {
            marker.release(gl);
        }
        for texture in self.textures {
            texture.destroy(gl);
        }
        self.shaders.destroy(gl);

        info!("Released {} models and scene resources", model_count);
    }
}
