use {
    crate::{
        constants::{SNOW_TEXTURE_MARKER, WHITE_THRESHOLD},
        error::TextureError,
    },
    image::{DynamicImage, GrayImage, RgbaImage, imageops::FilterType},
    std::path::Path,
};

/// Pixel layout of a decoded image, chosen by its channel count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Red,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn from_channels(channels: u8) -> Result<Self, TextureError> {
        match channels {
            1 => Ok(Self::Red),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            other => Err(TextureError::UnsupportedChannels(other)),
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Self::Red => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Tightly packed 8-bit pixels, bottom row first.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = image::open(path)?.flipv();

        let channels = image.color().channel_count();
        let format = PixelFormat::from_channels(channels)?;
        let (width, height) = (image.width(), image.height());

        let pixels = match format {
            PixelFormat::Red => image.into_luma8().into_raw(),
            PixelFormat::Rgb => image.into_rgb8().into_raw(),
            PixelFormat::Rgba => image.into_rgba8().into_raw(),
        };

        log::info!(
            "Loaded texture {}: {}x{}, {} channels",
            path.display(),
            width,
            height,
            channels
        );

        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// Applies per-image processing: the snow image gets an alpha channel
    /// derived from brightness when it has none.
    pub fn prepare_for(self, path: impl AsRef<Path>) -> Self {
        if is_snow_texture(path) && self.format == PixelFormat::Rgb {
            self.with_synthesized_alpha()
        } else {
            self
        }
    }

    pub fn with_synthesized_alpha(self) -> Self {
        Self {
            pixels: synthesize_alpha(&self.pixels),
            format: PixelFormat::Rgba,
            ..self
        }
    }

    // Upload layout: single channel stays single, RGB gains opaque alpha.
    fn to_upload_image(&self) -> Result<DynamicImage, TextureError> {
        let expected = (self.width * self.height) as usize * self.format.channels();
        if self.pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: self.pixels.len(),
            });
        }

        let image = match self.format {
            PixelFormat::Red => {
                GrayImage::from_raw(self.width, self.height, self.pixels.clone())
                    .map(DynamicImage::ImageLuma8)
            }
            PixelFormat::Rgb => {
                let rgba = self
                    .pixels
                    .chunks_exact(3)
                    .flat_map(|p| [p[0], p[1], p[2], u8::MAX])
                    .collect();
                RgbaImage::from_raw(self.width, self.height, rgba).map(DynamicImage::ImageRgba8)
            }
            PixelFormat::Rgba => {
                RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
                    .map(DynamicImage::ImageRgba8)
            }
        };

        image.ok_or(TextureError::SizeMismatch {
            expected,
            actual: self.pixels.len(),
        })
    }
}

pub fn is_snow_texture(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(SNOW_TEXTURE_MARKER))
}

/// Near-white pixels become fully transparent; otherwise darker pixels are
/// more opaque.
pub fn snow_alpha(r: u8, g: u8, b: u8) -> u8 {
    if r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD {
        return 0;
    }

    let brightness = ((r as u16 + g as u16 + b as u16) / 3) as f32;
    let alpha = ((1.0 - brightness / 255.0 * 0.7) * 1.5).min(1.0);
    (alpha * 255.0) as u8
}

/// Expands packed RGB to RGBA with alpha from [`snow_alpha`].
pub fn synthesize_alpha(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .flat_map(|p| [p[0], p[1], p[2], snow_alpha(p[0], p[1], p[2])])
        .collect()
}

fn mip_chain(base: DynamicImage) -> Vec<DynamicImage> {
    let mut levels = vec![base];
    loop {
        let last = &levels[levels.len() - 1];
        if last.width() <= 1 && last.height() <= 1 {
            break;
        }
        let next = last.resize_exact(
            (last.width() / 2).max(1),
            (last.height() / 2).max(1),
            FilterType::Triangle,
        );
        levels.push(next);
    }
    levels
}

pub struct Texture {
    #[allow(unused)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl Texture {
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = DecodedImage::open(path)?.prepare_for(path);
        Self::from_image(device, queue, &image, &path.display().to_string())
    }

    /// 1x1 transparent stand-in for a texture that failed to load.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue, label: &str) -> Self {
        let levels = vec![DynamicImage::ImageRgba8(RgbaImage::new(1, 1))];
        Self::upload(device, queue, &levels, PixelFormat::Rgba, label)
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
        label: &str,
    ) -> Result<Self, TextureError> {
        let levels = mip_chain(image.to_upload_image()?);
        Ok(Self::upload(device, queue, &levels, image.format, label))
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        levels: &[DynamicImage],
        format: PixelFormat,
        label: &str,
    ) -> Self {
        let (format, bytes_per_pixel) = match format {
            PixelFormat::Red => (wgpu::TextureFormat::R8Unorm, 1),
            PixelFormat::Rgb | PixelFormat::Rgba => (wgpu::TextureFormat::Rgba8Unorm, 4),
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: levels[0].width(),
                height: levels[0].height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                level.as_bytes(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_pixel * level.width()),
                    rows_per_image: Some(level.height()),
                },
                wgpu::Extent3d {
                    width: level.width(),
                    height: level.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage},
    };

    #[test]
    fn near_white_is_transparent() {
        assert_eq!(snow_alpha(255, 255, 255), 0);
        assert_eq!(snow_alpha(246, 250, 246), 0);
        // One channel at the threshold keeps the pixel visible.
        assert_ne!(snow_alpha(245, 255, 255), 0);
    }

    #[test]
    fn black_is_opaque() {
        assert_eq!(snow_alpha(0, 0, 0), 255);
    }

    #[test]
    fn alpha_follows_inverse_brightness() {
        // brightness 200: (1 - 200/255*0.7) * 1.5 = 0.6765 -> 172
        assert_eq!(snow_alpha(200, 200, 200), 172);

        let mut previous = u8::MAX;
        for level in 0..=u8::MAX {
            let alpha = snow_alpha(level, level, level);
            assert!(alpha <= previous, "alpha rose at brightness {level}");
            previous = alpha;
        }
    }

    #[test]
    fn synthesize_expands_rgb() {
        let rgba = synthesize_alpha(&[0, 0, 0, 255, 255, 255, 10, 20, 30]);
        assert_eq!(
            rgba,
            vec![0, 0, 0, 255, 255, 255, 255, 0, 10, 20, 30, snow_alpha(10, 20, 30)]
        );
    }

    #[test]
    fn snow_marker_matches_file_name() {
        assert!(is_snow_texture("textures/snow.png"));
        assert!(is_snow_texture("snowflake.jpg"));
        assert!(!is_snow_texture("textures/background.png"));
        assert!(!is_snow_texture("snow/background.png"));
    }

    #[test]
    fn channel_counts() {
        assert_eq!(PixelFormat::from_channels(1).unwrap(), PixelFormat::Red);
        assert_eq!(PixelFormat::from_channels(3).unwrap(), PixelFormat::Rgb);
        assert_eq!(PixelFormat::from_channels(4).unwrap(), PixelFormat::Rgba);
        assert!(matches!(
            PixelFormat::from_channels(2),
            Err(TextureError::UnsupportedChannels(2))
        ));
    }

    #[test]
    fn open_flips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("background.png");

        // Top row red, bottom row blue.
        let mut image = RgbImage::new(1, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(0, 1, Rgb([0, 0, 255]));
        image.save(&path).unwrap();

        let decoded = DecodedImage::open(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (1, 2));
        assert_eq!(decoded.format, PixelFormat::Rgb);
        assert_eq!(decoded.pixels, vec![0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn open_keeps_gray_and_rgba() {
        let dir = tempfile::tempdir().unwrap();

        let gray_path = dir.path().join("mask.png");
        GrayImage::from_pixel(2, 2, Luma([7])).save(&gray_path).unwrap();
        let gray = DecodedImage::open(&gray_path).unwrap();
        assert_eq!(gray.format, PixelFormat::Red);
        assert_eq!(gray.pixels, vec![7; 4]);

        let rgba_path = dir.path().join("overlay.png");
        RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 4]))
            .save(&rgba_path)
            .unwrap();
        let rgba = DecodedImage::open(&rgba_path).unwrap();
        assert_eq!(rgba.format, PixelFormat::Rgba);
        assert_eq!(rgba.pixels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn snow_image_gets_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snow.png");

        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([255, 255, 255]));
        image.put_pixel(1, 0, Rgb([0, 0, 0]));
        image.save(&path).unwrap();

        let prepared = DecodedImage::open(&path).unwrap().prepare_for(&path);
        assert_eq!(prepared.format, PixelFormat::Rgba);
        assert_eq!(prepared.pixels, vec![255, 255, 255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn other_images_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("background.png");
        RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let prepared = DecodedImage::open(&path).unwrap().prepare_for(&path);
        assert_eq!(prepared.format, PixelFormat::Rgb);
        assert_eq!(prepared.pixels, vec![255, 255, 255]);
    }

    #[test]
    fn missing_or_corrupt_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DecodedImage::open(dir.path().join("absent.png")),
            Err(TextureError::Decode(_))
        ));

        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            DecodedImage::open(&path),
            Err(TextureError::Decode(_))
        ));
    }

    #[test]
    fn upload_image_adds_opaque_alpha() {
        let image = DecodedImage {
            width: 1,
            height: 1,
            format: PixelFormat::Rgb,
            pixels: vec![9, 8, 7],
        };
        let upload = image.to_upload_image().unwrap();
        assert_eq!(upload.as_bytes(), &[9, 8, 7, 255]);

        let short = DecodedImage {
            pixels: vec![1],
            ..image
        };
        assert!(matches!(
            short.to_upload_image(),
            Err(TextureError::SizeMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn mip_chain_halves_down_to_one() {
        let base = DynamicImage::ImageRgba8(RgbaImage::new(8, 2));
        let sizes: Vec<_> = mip_chain(base)
            .iter()
            .map(|level| (level.width(), level.height()))
            .collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }
}
