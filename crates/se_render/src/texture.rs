//! Earth material maps: decoding, fitting to the map resolution, and GPU upload.
//!
//! Each map is decoded with the `image` crate and scaled down to fit the
//! configured box with its aspect ratio kept and smooth filtering (an
//! 8192×4092 source becomes 4096×2046). Smaller images are used as-is. Any
//! failure here is fatal at startup; there is no fallback texture.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::DynamicImage;

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read texture '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("texture '{path}' is {width}x{height}, device limit is {limit}")]
    TooLarge {
        path: String,
        width: u32,
        height: u32,
        limit: u32,
    },
}

/// Largest size with the same aspect ratio that fits in `max_w` × `max_h`.
/// Never upscales.
pub fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width <= max_w && height <= max_h {
        return (width, height);
    }
    let scale = (max_w as f64 / width as f64).min(max_h as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Decoded RGBA8 pixels ready for upload.
pub struct MapImage {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl MapImage {
    pub fn load(path: &Path, max_w: u32, max_h: u32) -> Result<Self, TextureError> {
        let label = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| TextureError::Read {
            path: label.clone(),
            source,
        })?;
        Self::from_bytes(&label, &bytes, max_w, max_h)
    }

    pub fn from_bytes(label: &str, bytes: &[u8], max_w: u32, max_h: u32) -> Result<Self, TextureError> {
        let image = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
            path: label.to_string(),
            source,
        })?;
        Ok(Self::from_image(label, image, max_w, max_h))
    }

    pub fn from_image(label: &str, image: DynamicImage, max_w: u32, max_h: u32) -> Self {
        let (w, h) = fit_within(image.width(), image.height(), max_w, max_h);
        let fitted = if (w, h) == (image.width(), image.height()) {
            image
        } else {
            log::debug!(
                "Scaling '{}' from {}x{} to {}x{}",
                label,
                image.width(),
                image.height(),
                w,
                h
            );
            image.resize_exact(w, h, FilterType::Triangle)
        };
        let rgba = fitted.to_rgba8();
        Self {
            label: label.to_string(),
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        }
    }
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: (u32, u32),
}

impl Texture {
    pub fn from_map(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        map: &MapImage,
        format: wgpu::TextureFormat,
    ) -> Result<Self, TextureError> {
        let limit = device.limits().max_texture_dimension_2d;
        if map.width > limit || map.height > limit {
            return Err(TextureError::TooLarge {
                path: map.label.clone(),
                width: map.width,
                height: map.height,
                limit,
            });
        }

        let size = wgpu::Extent3d {
            width: map.width,
            height: map.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&map.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &map.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * map.width),
                rows_per_image: Some(map.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            size: (map.width, map.height),
        })
    }
}

#[derive(Debug, Clone)]
pub struct MaterialPaths {
    pub diffuse: PathBuf,
    pub normal: PathBuf,
    pub specular: PathBuf,
}

/// Diffuse, normal and specular maps, loaded once and shared by both globes.
pub struct EarthMaterial {
    pub diffuse: Texture,
    pub normal: Texture,
    pub specular: Texture,
}

impl EarthMaterial {
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        paths: &MaterialPaths,
        max_size: (u32, u32),
    ) -> Result<Self, TextureError> {
        let (max_w, max_h) = max_size;
        let load = |path: &Path, format| -> Result<Texture, TextureError> {
            let map = MapImage::load(path, max_w, max_h)?;
            log::info!("Loaded map '{}' ({}x{})", map.label, map.width, map.height);
            Texture::from_map(device, queue, &map, format)
        };
        // Colour is sRGB; normal and specular data are linear.
        Ok(Self {
            diffuse: load(&paths.diffuse, wgpu::TextureFormat::Rgba8UnormSrgb)?,
            normal: load(&paths.normal, wgpu::TextureFormat::Rgba8Unorm)?,
            specular: load(&paths.specular, wgpu::TextureFormat::Rgba8Unorm)?,
        })
    }

    pub fn memory_bytes(&self) -> u64 {
        [&self.diffuse, &self.normal, &self.specular]
            .iter()
            .map(|t| t.size.0 as u64 * t.size.1 as u64 * 4)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn fit_halves_full_resolution_source() {
        assert_eq!(fit_within(8192, 4092, 4096, 2046), (4096, 2046));
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        // 2:1 source is height-limited by the 4096x2046 box.
        assert_eq!(fit_within(8192, 4096, 4096, 2046), (4092, 2046));
        assert_eq!(fit_within(1000, 100, 500, 500), (500, 50));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_within(1024, 512, 4096, 2046), (1024, 512));
    }

    #[test]
    fn from_bytes_scales_down() {
        let map = MapImage::from_bytes("test", &png_bytes(8, 4), 4, 4).expect("decode");
        assert_eq!((map.width, map.height), (4, 2));
        assert_eq!(map.rgba.len(), 4 * 2 * 4);
        assert_eq!(&map.rgba[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let err = MapImage::from_bytes("junk", b"not an image", 16, 16).err();
        assert!(matches!(err, Some(TextureError::Decode { .. })));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let path = std::env::temp_dir().join(format!(
            "se_missing_map_{}.jpg",
            std::process::id()
        ));
        let err = MapImage::load(&path, 16, 16).err().expect("missing file should fail");
        assert!(matches!(err, TextureError::Read { .. }));
        assert!(err.to_string().contains("se_missing_map_"));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "se_map_{}.png",
            std::process::id()
        ));
        std::fs::write(&path, png_bytes(6, 3)).expect("write temp file");
        let map = MapImage::load(&path, 4096, 2046).expect("load");
        assert_eq!((map.width, map.height), (6, 3));
        let _ = std::fs::remove_file(path);
    }
}
