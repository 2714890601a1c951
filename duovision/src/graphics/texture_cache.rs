//! Per-screen GPU texture cache.
//!
//! One host texture per physical display surface (top-left eye, top-right
//! eye, bottom). A texture is reallocated only when the polled framebuffer
//! config disagrees with the cached width/height/format; the old image is
//! dropped before the replacement is created and wgpu defers the actual GPU
//! destruction until in-flight work referencing it has drained.

use duovision_shared::framebuffer::{FramebufferConfig, PixelFormat, decode_framebuffer};

/// Number of logical display surfaces.
pub const SCREEN_COUNT: usize = 3;

/// Visible sub-region and orientation of a screen, in normalized [0,1]
/// texture space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexCoords {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl TexCoords {
    pub const FULL: TexCoords = TexCoords {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };
}

/// Per-frame display state of one logical screen.
///
/// `display_view` is either the cache's own texture or a view installed by
/// the display accelerator; `width`/`height` are the source framebuffer
/// dimensions feeding the shader resolution uniforms.
pub struct ScreenInfo {
    pub texcoords: TexCoords,
    pub width: u32,
    pub height: u32,
    pub display_view: Option<wgpu::TextureView>,
    /// Set while `display_view` comes from the accelerator rather than the
    /// cache's own texture.
    pub accelerated: bool,
}

impl ScreenInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            texcoords: TexCoords::FULL,
            width,
            height,
            display_view: None,
            accelerated: false,
        }
    }
}

struct ScreenTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    format: PixelFormat,
}

/// Reallocation predicate: a cached (width, height, format) triple is only
/// good for configs that match it exactly.
pub(crate) fn needs_realloc(
    cached: Option<(u32, u32, PixelFormat)>,
    config: &FramebufferConfig,
) -> bool {
    match cached {
        None => true,
        Some((width, height, format)) => {
            width != config.width || height != config.height || format != config.format
        }
    }
}

pub struct ScreenTextureCache {
    textures: [Option<ScreenTexture>; SCREEN_COUNT],
    generation: u64,
}

impl ScreenTextureCache {
    pub fn new() -> Self {
        Self {
            textures: [None, None, None],
            generation: 0,
        }
    }

    /// Monotonic counter bumped on every reallocation; the binder uses it
    /// to decide when its bind group went stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Make the screen's texture match the framebuffer config, reallocating
    /// if needed. Returns whether a reallocation happened.
    ///
    /// Must not be called for the same screen from two threads; the whole
    /// cache lives on the render thread.
    pub fn ensure(
        &mut self,
        device: &wgpu::Device,
        screen: usize,
        config: &FramebufferConfig,
    ) -> bool {
        let cached = self.textures[screen]
            .as_ref()
            .map(|t| (t.width, t.height, t.format));
        if !needs_realloc(cached, config) {
            return false;
        }

        // Release the old image before allocating its replacement.
        self.textures[screen] = None;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Screen Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        tracing::debug!(
            "Reallocated screen {} texture: {}x{} {:?}",
            screen,
            config.width,
            config.height,
            config.format
        );

        self.textures[screen] = Some(ScreenTexture {
            texture,
            view,
            width: config.width,
            height: config.height,
            format: config.format,
        });
        self.generation += 1;
        true
    }

    /// Decode the guest framebuffer and upload it into the screen's texture.
    pub fn upload(
        &self,
        queue: &wgpu::Queue,
        screen: usize,
        config: &FramebufferConfig,
        source: &[u8],
    ) {
        let entry = self.textures[screen]
            .as_ref()
            .expect("upload to an unallocated screen texture");
        debug_assert_eq!((entry.width, entry.height), (config.width, config.height));

        let pixels = decode_framebuffer(
            source,
            config.width,
            config.height,
            config.stride,
            config.format,
        );
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &entry.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(config.width * 4),
                rows_per_image: Some(config.height),
            },
            wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn view(&self, screen: usize) -> Option<&wgpu::TextureView> {
        self.textures[screen].as_ref().map(|t| &t.view)
    }

    pub fn dimensions(&self, screen: usize) -> Option<(u32, u32)> {
        self.textures[screen].as_ref().map(|t| (t.width, t.height))
    }
}

impl Default for ScreenTextureCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: u32, height: u32, format: PixelFormat) -> FramebufferConfig {
        FramebufferConfig {
            width,
            height,
            stride: width * format.bytes_per_pixel(),
            format,
            ..Default::default()
        }
    }

    #[test]
    fn test_realloc_when_missing() {
        assert!(needs_realloc(None, &config(400, 240, PixelFormat::Rgb8)));
    }

    #[test]
    fn test_no_realloc_when_matching() {
        assert!(!needs_realloc(
            Some((400, 240, PixelFormat::Rgb8)),
            &config(400, 240, PixelFormat::Rgb8)
        ));
    }

    #[test]
    fn test_realloc_on_any_mismatch() {
        let cached = Some((400, 240, PixelFormat::Rgb8));
        assert!(needs_realloc(cached, &config(320, 240, PixelFormat::Rgb8)));
        assert!(needs_realloc(cached, &config(400, 480, PixelFormat::Rgb8)));
        assert!(needs_realloc(
            cached,
            &config(400, 240, PixelFormat::Rgb565)
        ));
    }
}
