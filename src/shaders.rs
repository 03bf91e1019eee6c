use std::{
    fs,
    path::{Path, PathBuf},
};

use glow::HasContext;
use log::{info, warn};

use crate::material::MaterialType;

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to compile '{path}':\n{log}")]
    Compile { path: PathBuf, log: String },

    #[error("failed to link program '{name}':\n{log}")]
    Link { name: String, log: String },

    #[error("failed to create GL object: {0}")]
    Create(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Float(f32),
    Bool(bool),
    Int(i32),
    Vec3([f32; 3]),
    Mat4([f32; 16]),
}

#[derive(Debug)]
pub struct ShaderProgram {
    pub name: String,
    pub program: glow::Program,
}

impl ShaderProgram {
    pub fn from_files(
        gl: &glow::Context,
        name: &str,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Self, ShaderError> {
        let vertex_shader = compile(gl, glow::VERTEX_SHADER, vertex_path)?;
        let fragment_shader = match compile(gl, glow::FRAGMENT_SHADER, fragment_path) {
            Ok(shader) => shader,
            Err(e) => {
                unsafe { gl.delete_shader(vertex_shader) };
                return Err(e);
            }
        };

        unsafe {
            let program = gl.create_program().map_err(ShaderError::Create)?;
            gl.attach_shader(program, vertex_shader);
            gl.attach_shader(program, fragment_shader);
            gl.link_program(program);

            gl.delete_shader(vertex_shader);
            gl.delete_shader(fragment_shader);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(ShaderError::Link {
                    name: name.to_string(),
                    log,
                });
            }

            Ok(Self {
                name: name.to_string(),
                program,
            })
        }
    }

    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) }
    }

    // Program must be bound; unknown names are ignored
    pub fn set(&self, gl: &glow::Context, name: &str, value: Uniform) {
        unsafe {
            let location = gl.get_uniform_location(self.program, name);
            let location = location.as_ref();
            match value {
                Uniform::Float(v) => gl.uniform_1_f32(location, v),
                Uniform::Bool(v) => gl.uniform_1_i32(location, v as i32),
                Uniform::Int(v) => gl.uniform_1_i32(location, v),
                Uniform::Vec3([x, y, z]) => gl.uniform_3_f32(location, x, y, z),
                Uniform::Mat4(m) => gl.uniform_matrix_4_f32_slice(location, false, &m),
            }
        }
    }

    pub fn set_all<S: AsRef<str>>(&self, gl: &glow::Context, uniforms: &[(S, Uniform)]) {
        for (name, value) in uniforms {
            self.set(gl, name.as_ref(), *value);
        }
    }

    pub fn set_mat4(&self, gl: &glow::Context, name: &str, matrix: &cgmath::Matrix4<f32>) {
        let m: &[f32; 16] = matrix.as_ref();
        self.set(gl, name, Uniform::Mat4(*m));
    }

    pub fn destroy(self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) }
    }
}

fn compile(gl: &glow::Context, kind: u32, path: &Path) -> Result<glow::Shader, ShaderError> {
    let source =
        fs::read_to_string(path).map_err(|e| ShaderError::Io(path.to_path_buf(), e))?;

    unsafe {
        let shader = gl.create_shader(kind).map_err(ShaderError::Create)?;
        gl.shader_source(shader, &source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(ShaderError::Compile {
                path: path.to_path_buf(),
                log,
            });
        }

        Ok(shader)
    }
}

pub struct MaterialShaders {
    directory: PathBuf,
    blinn_phong: ShaderProgram,
    oren_nayar: ShaderProgram,
    cook_torrance: ShaderProgram,
    pub light: ShaderProgram,
}

impl MaterialShaders {
    pub const LIGHTING_VERTEX: &'static str = "lighting.vert";
    pub const LIGHT_VERTEX: &'static str = "light.vert";
    pub const LIGHT_FRAGMENT: &'static str = "light.frag";

    pub fn load(gl: &glow::Context, directory: &Path) -> Result<Self, ShaderError> {
        let light = ShaderProgram::from_files(
            gl,
            "light",
            &directory.join(Self::LIGHT_VERTEX),
            &directory.join(Self::LIGHT_FRAGMENT),
        )?;

        match Self::load_materials(gl, directory) {
            Ok([blinn_phong, oren_nayar, cook_torrance]) => {
                info!("Loaded shaders from {:?}", directory);
                Ok(Self {
                    directory: directory.to_path_buf(),
                    blinn_phong,
                    oren_nayar,
                    cook_torrance,
                    light,
                })
            }
            Err(e) => {
                light.destroy(gl);
                Err(e)
            }
        }
    }

    fn load_materials(
        gl: &glow::Context,
        directory: &Path,
    ) -> Result<[ShaderProgram; 3], ShaderError> {
        let vertex = directory.join(Self::LIGHTING_VERTEX);
        let loaded = load_all(
            MaterialType::ALL,
            |material| {
                let fragment = directory.join(material.fragment_shader());
                ShaderProgram::from_files(gl, material.label(), &vertex, &fragment)
            },
            |program| program.destroy(gl),
        )?;

        <[ShaderProgram; 3]>::try_from(loaded).map_err(|programs| {
            let count = programs.len();
            for program in programs {
                program.destroy(gl);
            }
            ShaderError::Create(format!("expected 3 material programs, built {}", count))
        })
    }

    // Keeps the current programs if anything fails to compile
    pub fn reload(&mut self, gl: &glow::Context) {
        match Self::load_materials(gl, &self.directory) {
            Ok([blinn_phong, oren_nayar, cook_torrance]) => {
                std::mem::replace(&mut self.blinn_phong, blinn_phong).destroy(gl);
                std::mem::replace(&mut self.oren_nayar, oren_nayar).destroy(gl);
                std::mem::replace(&mut self.cook_torrance, cook_torrance).destroy(gl);
                info!("Reloaded material shaders");
            }
            Err(e) => warn!("Shader reload failed, keeping previous programs: {}", e),
        }
    }

    pub fn get(&self, material: MaterialType) -> &ShaderProgram {
        match material {
            MaterialType::BlinnPhong => &self.blinn_phong,
            MaterialType::OrenNayar => &self.oren_nayar,
            MaterialType::CookTorrance => &self.cook_torrance,
        }
    }

    pub fn destroy(self, gl: &glow::Context) {
        self.blinn_phong.destroy(gl);
        self.oren_nayar.destroy(gl);
        self.cook_torrance.destroy(gl);
        self.light.destroy(gl);
    }
}

// Loads every item in order. If one fails, the ones already loaded are handed
// to `discard` and the error is returned.
fn load_all<I, T, E>(
    items: impl IntoIterator<Item = I>,
    mut load: impl FnMut(I) -> Result<T, E>,
    mut discard: impl FnMut(T),
) -> Result<Vec<T>, E> {
    let mut loaded = Vec::new();
    for item in items {
        match load(item) {
            Ok(value) => loaded.push(value),
            Err(e) => {
                loaded.into_iter().for_each(&mut discard);
                return Err(e);
            }
        }
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_all_keeps_every_success_in_order() {
        let mut discarded = Vec::new();

        let loaded: Result<Vec<i32>, String> =
            load_all([1, 2, 3], |n| Ok(n * 10), |n| discarded.push(n));

        assert_eq!(loaded.unwrap(), vec![10, 20, 30]);
        assert!(discarded.is_empty());
    }

    #[test]
    fn load_all_discards_earlier_items_on_failure() {
        let mut discarded = Vec::new();
        let mut attempted = Vec::new();

        let loaded = load_all(
            MaterialType::ALL,
            |material| {
                attempted.push(material);
                match material {
                    MaterialType::CookTorrance => Err("link failed"),
                    other => Ok(other.label()),
                }
            },
            |label| discarded.push(label),
        );

        assert_eq!(loaded, Err("link failed"));
        assert_eq!(attempted, MaterialType::ALL.to_vec());
        assert_eq!(discarded, vec!["Blinn-Phong", "Oren-Nayar"]);
    }
}
