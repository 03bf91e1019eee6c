use std::path::{Path, PathBuf};

use glow::HasContext;
use log::info;

use crate::data::LoadedTexture;

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode image '{0}': {1}")]
    Decode(PathBuf, #[source] image::ImageError),

    #[error("failed to create texture for '{0}': {1}")]
    Create(PathBuf, String),
}

#[derive(Debug)]
pub struct Texture {
    pub name: String,
    pub texture: glow::Texture,
    pub width: u32,
    pub height: u32,
}

// Flipped so that row 0 is the bottom row
pub fn decode_image(name: &str, path: &Path) -> Result<LoadedTexture, TextureError> {
    let img = image::open(path)
        .map_err(|e| TextureError::Decode(path.to_path_buf(), e))?
        .flipv()
        .to_rgba8();
    let (width, height) = img.dimensions();

    Ok(LoadedTexture {
        name: name.to_string(),
        path: path.to_path_buf(),
        width,
        height,
        data: img.into_raw(),
    })
}

impl Texture {
    pub fn load(context: &glow::Context, name: &str, path: &Path) -> Result<Self, TextureError> {
        let data = decode_image(name, path)?;
        Self::from_loaded_data(context, data)
    }

    pub fn from_loaded_data(
        context: &glow::Context,
        data: LoadedTexture,
    ) -> Result<Self, TextureError> {
        unsafe {
            let texture = context
                .create_texture()
                .map_err(|e| TextureError::Create(data.path.clone(), e))?;
            context.bind_texture(glow::TEXTURE_2D, Some(texture));

            context.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            context.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            context.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            context.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );

            context.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                data.width as i32,
                data.height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(&data.data)),
            );

            context.generate_mipmap(glow::TEXTURE_2D);
            context.bind_texture(glow::TEXTURE_2D, None);

            info!(
                "Loaded texture '{}' ({}x{}) from {:?}",
                data.name, data.width, data.height, data.path
            );

            Ok(Texture {
                name: data.name,
                texture,
                width: data.width,
                height: data.height,
            })
        }
    }

    pub fn destroy(self, context: &glow::Context) {
        unsafe { context.delete_texture(self.texture) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ascii_ppm_bottom_row_first() {
        let path = std::env::temp_dir().join(format!("lighting_demo_{}.ppm", std::process::id()));
        // 1x2 image: red on top, blue below.
        std::fs::write(&path, "P3\n1 2\n255\n255 0 0\n0 0 255\n").unwrap();

        let loaded = decode_image("test", &path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((loaded.width, loaded.height), (1, 2));
        assert_eq!(&loaded.data[0..4], &[0, 0, 255, 255]);
        assert_eq!(&loaded.data[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn missing_image_is_a_decode_error() {
        let path = Path::new("definitely/not/here.png");
        assert!(matches!(
            decode_image("missing", path),
            Err(TextureError::Decode(p, _)) if p == path
        ));
    }
}
