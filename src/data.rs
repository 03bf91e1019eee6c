use std::path::PathBuf;

// Indices are 1-based as written; uv 0 means none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceIndexTriple {
    pub position: u32,
    pub uv: u32,
    pub normal: u32,
    pub line: usize, // Source line, kept for error reporting
}

impl FaceIndexTriple {
    pub fn new(position: u32, uv: u32, normal: u32, line: usize) -> Self {
        Self {
            position,
            uv,
            normal,
            line,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatMesh {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>, // Empty when the source has no texture coordinates
    pub normals: Vec<[f32; 3]>,
}

impl FlatMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    pub fn is_textureless(&self) -> bool {
        self.uvs.is_empty()
    }
}

#[derive(Debug)]
pub struct LoadedTexture {
    pub name: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA8 pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_positions() {
        let mesh = FlatMesh {
            positions: vec![[0.0; 3]; 6],
            uvs: Vec::new(),
            normals: vec![[0.0, 0.0, 1.0]; 6],
        };

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.is_textureless());
        assert!(!mesh.is_empty());
    }

    #[test]
    fn default_mesh_is_empty() {
        let mesh = FlatMesh::default();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
    }
}
