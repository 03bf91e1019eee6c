use std::fmt::Debug;
use std::path::Path;

use crate::{
    handles::TextureHandle,
    loader::{load_obj, LoadError},
    material::MaterialType,
    opengl::{GeometryApi, GeometryError, GpuMesh},
};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[derive(Debug)]
pub struct ModelInstance<V: Copy + Debug, B: Copy + Debug> {
    pub name: String,
    pub mesh: GpuMesh<V, B>,
    pub position: cgmath::Vector3<f32>,
    pub material: MaterialType,
    pub texture: Option<TextureHandle>,
}

pub type Model = ModelInstance<glow::VertexArray, glow::Buffer>;

impl<V: Copy + Debug, B: Copy + Debug> ModelInstance<V, B> {
    pub fn from_obj<G>(
        api: &G,
        name: &str,
        path: &Path,
        material: MaterialType,
    ) -> Result<Self, ModelError>
    where
        G: GeometryApi<VertexArray = V, Buffer = B>,
    {
        let flat = load_obj(path)?;
        let mesh = GpuMesh::build(api, &flat)?;

        Ok(Self {
            name: name.to_string(),
            mesh,
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            material,
            texture: None,
        })
    }

    pub fn with_position(mut self, position: cgmath::Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn with_texture(mut self, texture: Option<TextureHandle>) -> Self {
        self.texture = texture;
        self
    }

    pub fn model_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
    }

    pub fn is_textured(&self) -> bool {
        self.texture.is_some() && self.mesh.has_uvs()
    }

    pub fn render<G>(&self, api: &G)
    where
        G: GeometryApi<VertexArray = V, Buffer = B>,
    {
        self.mesh.draw(api);
    }

    pub fn destroy<G>(self, api: &G)
    where
        G: GeometryApi<VertexArray = V, Buffer = B>,
    {
        self.mesh.release(api);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opengl::fake::{Call, RecordingGl};

    fn temp_obj(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "lighting_demo_model_{}_{}.obj",
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_builds_and_releases() {
        let path = temp_obj(
            "triangle",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\nf 1/0/1 2/0/2 3/0/3\n",
        );
        let gl = RecordingGl::default();

        let model = ModelInstance::from_obj(&gl, "tri", &path, MaterialType::OrenNayar)
            .unwrap()
            .with_position(cgmath::Vector3::new(0.0, 0.0, 30.0))
            .with_texture(Some(TextureHandle(0)));
        std::fs::remove_file(&path).ok();

        assert_eq!(model.mesh.triangle_count(), 1);
        assert!(model.mesh.uv_buffer().is_none());
        assert!(!model.is_textured());
        assert_eq!(model.model_matrix().w.z, 30.0);

        model.render(&gl);
        assert!(gl.calls().contains(&Call::Draw(3)));

        model.destroy(&gl);
        assert!(gl.live.borrow().is_empty());
    }

    #[test]
    fn faceless_file_allocates_nothing() {
        let path = temp_obj("empty", "v 0 0 0\nvn 0 0 1\n");
        let gl = RecordingGl::default();

        let result = ModelInstance::from_obj(&gl, "empty", &path, MaterialType::BlinnPhong);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ModelError::Geometry(GeometryError::EmptyMesh))));
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn missing_file_surfaces_load_error() {
        let gl = RecordingGl::default();

        let result = ModelInstance::from_obj(
            &gl,
            "missing",
            Path::new("no/such/model.obj"),
            MaterialType::CookTorrance,
        );

        assert!(matches!(result, Err(ModelError::Load(LoadError::FileNotFound(_)))));
    }
}
