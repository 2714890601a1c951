//! Presentable frames and window swap targets.
//!
//! A `Frame` is one GPU render target sized to the current output layout;
//! the compositor draws into it and presentation copies it to the window's
//! swap chain. Keeping the composite target separate from the swap chain
//! image lets the screenshot path reuse the compositor against a throwaway
//! frame and keeps resize handling in one place.

/// One presentable render target.
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// Submission of the composite pass that filled this frame; presentation
    /// waits on it before reusing the frame after a resize.
    pub render_ready: Option<wgpu::SubmissionIndex>,
}

impl Frame {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            width,
            height,
            texture,
            view,
            render_ready: None,
        }
    }
}

/// A window's surface plus its composite frame and present state.
pub struct PresentTarget {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    frame: Frame,
    last_present: Option<wgpu::SubmissionIndex>,
}

impl PresentTarget {
    /// Wrap a frontend-created surface. The configuration gains the copy
    /// usage presentation needs.
    pub fn new(
        device: &wgpu::Device,
        surface: wgpu::Surface<'static>,
        mut config: wgpu::SurfaceConfiguration,
    ) -> Self {
        config.usage |= wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST;
        surface.configure(device, &config);
        let frame = Frame::new(device, config.width, config.height, config.format, "Render Frame");

        Self {
            surface,
            config,
            frame,
            last_present: None,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    /// Block until the last presented frame's GPU work completed.
    pub fn wait_present(&self, device: &wgpu::Device) {
        if self.last_present.is_some() {
            device
                .poll(wgpu::PollType::wait_indefinitely())
                .expect("device lost while waiting for present");
        }
    }

    /// Reallocate the frame and swap chain for a new output size.
    ///
    /// Destructive: the caller must have drained in-flight GPU work first.
    pub fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(device, &self.config);
        self.frame = Frame::new(
            device,
            self.config.width,
            self.config.height,
            self.config.format,
            "Render Frame",
        );
        self.last_present = None;
        tracing::debug!("Recreated present frame: {}x{}", width, height);
    }

    /// Copy the composited frame to the swap chain and present it.
    pub fn present(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        debug_assert!(
            self.frame.render_ready.is_some(),
            "presenting a frame that was never composited"
        );
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                // The swap chain no longer matches the window; reconfigure
                // and drop this frame's present.
                tracing::debug!("Surface out of date, reconfiguring");
                self.surface.configure(device, &self.config);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("Timed out acquiring surface texture, skipping present");
                return;
            }
            Err(error) => {
                tracing::error!("Failed to acquire surface texture: {error}");
                panic!("unrecoverable surface error: {error}");
            }
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Present Copy Encoder"),
        });
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: &surface_texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: self.config.width,
                height: self.config.height,
                depth_or_array_layers: 1,
            },
        );

        self.last_present = Some(queue.submit(std::iter::once(encoder.finish())));
        surface_texture.present();
    }
}
