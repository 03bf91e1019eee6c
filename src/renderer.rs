use std::fmt::Debug;

use cgmath::Vector3;
use glow::HasContext;

use crate::{
    material::MaterialType,
    mesh::{Model, ModelInstance},
    scene::Scene,
    shaders::{ShaderProgram, Uniform},
    viewport::Viewport,
};

const MARKER_COLOR: [f32; 3] = [0.0, 0.0, 1.0];
const CLEAR_COLOR: [f32; 4] = [0.3, 0.3, 0.3, 1.0];

pub struct Renderer;

impl Renderer {
    pub fn clear(context: &glow::Context) {
        let [r, g, b, a] = CLEAR_COLOR;
        unsafe {
            context.clear_color(r, g, b, a);
            context.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    pub fn render(context: &glow::Context, scene: &Scene, viewport: &Viewport) {
        if viewport.is_empty() {
            return;
        }

        unsafe {
            context.clear(glow::DEPTH_BUFFER_BIT);
            context.enable(glow::DEPTH_TEST);
            context.depth_func(glow::LESS);
            // Makes sure that everything is renderered in the central panel of the ui
            context.viewport(viewport.x, viewport.y, viewport.width, viewport.height);
            context.active_texture(glow::TEXTURE0);
        }

        let view = scene.camera.view();
        let projection = scene.camera.projection();
        let eye = scene.camera.position;
        let light_uniforms = scene.lights.uniforms(eye, scene.camera.direction());

        for (material, indices) in draw_batches(&scene.models) {
            let program = scene.shaders.get(material);
            program.bind(context);
            program.set_mat4(context, "view", &view);
            program.set_mat4(context, "proj", &projection);
            program.set_all(context, &light_uniforms);
            program.set_all(context, &scene.params.uniforms(material));
            program.set(context, "viewPos", Uniform::Vec3(eye.into()));
            program.set(context, "image", Uniform::Int(0));

            for index in indices {
                Self::draw_model(context, scene, program, &scene.models[index]);
            }
        }

        if let Some(marker) = &scene.light_marker {
            let program = &scene.shaders.light;
            program.bind(context);
            program.set(context, "colorIn", Uniform::Vec3(MARKER_COLOR));

            for light in &scene.lights.points {
                let mvp = projection * view * marker_matrix(light.position);
                program.set_mat4(context, "MVP", &mvp);
                marker.draw(context);
            }
        }

        unsafe {
            context.bind_texture(glow::TEXTURE_2D, None);
            context.use_program(None);
        }
    }

    fn draw_model(context: &glow::Context, scene: &Scene, program: &ShaderProgram, model: &Model) {
        let texture = model
            .texture
            .filter(|_| model.mesh.has_uvs())
            .and_then(|handle| scene.texture(handle));

        unsafe {
            context.bind_texture(glow::TEXTURE_2D, texture.map(|t| t.texture));
        }
        program.set(context, "hasTexture", Uniform::Bool(texture.is_some()));
        program.set_mat4(context, "model", &model.model_matrix());

        model.render(context);
    }
}

// Fixed material order, scene order within a group
pub fn draw_batches<V: Copy + Debug, B: Copy + Debug>(
    models: &[ModelInstance<V, B>],
) -> Vec<(MaterialType, Vec<usize>)> {
    MaterialType::ALL
        .iter()
        .map(|&material| {
            let indices = models
                .iter()
                .enumerate()
                .filter(|(_, model)| model.material == material)
                .map(|(i, _)| i)
                .collect::<Vec<_>>();
            (material, indices)
        })
        .filter(|(_, indices)| !indices.is_empty())
        .collect()
}

pub fn marker_matrix(position: Vector3<f32>) -> cgmath::Matrix4<f32> {
    cgmath::Matrix4::from_translation(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::FlatMesh, opengl::fake::RecordingGl, opengl::GpuMesh};

    fn model(gl: &RecordingGl, name: &str, material: MaterialType) -> ModelInstance<u32, u32> {
        let flat = FlatMesh {
            positions: vec![[0.0; 3]; 3],
            uvs: Vec::new(),
            normals: vec![[0.0, 0.0, 1.0]; 3],
        };
        ModelInstance {
            name: name.to_string(),
            mesh: GpuMesh::build(gl, &flat).unwrap(),
            position: Vector3::new(0.0, 0.0, 0.0),
            material,
            texture: None,
        }
    }

    #[test]
    fn batches_follow_material_order_and_skip_unused() {
        let gl = RecordingGl::default();
        let models = vec![
            model(&gl, "a", MaterialType::CookTorrance),
            model(&gl, "b", MaterialType::BlinnPhong),
            model(&gl, "c", MaterialType::CookTorrance),
        ];

        let batches = draw_batches(&models);

        assert_eq!(
            batches,
            vec![
                (MaterialType::BlinnPhong, vec![1]),
                (MaterialType::CookTorrance, vec![0, 2]),
            ]
        );

        for model in models {
            model.destroy(&gl);
        }
    }

    #[test]
    fn marker_is_translated_to_light() {
        let m = marker_matrix(Vector3::new(-21.0, 5.0, -30.0));
        assert_eq!((m.w.x, m.w.y, m.w.z), (-21.0, 5.0, -30.0));
    }
}
