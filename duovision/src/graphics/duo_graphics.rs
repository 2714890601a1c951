//! DuoGraphics main implementation.
//!
//! Owns every GPU resource of the presentation stage and drives the
//! per-frame sequence: poll the emulated GPU's framebuffer registers,
//! refresh the screen textures, composite into the window frame, present.
//! The frontend calls [`DuoGraphics::swap_buffers`] once per emulation
//! frame boundary.

use anyhow::Result;

use duovision_shared::framebuffer::{ColorFill, FramebufferConfig};
use duovision_shared::layout::FramebufferLayout;
use duovision_shared::{
    BOTTOM_SCREEN_HEIGHT, BOTTOM_SCREEN_WIDTH, TOP_SCREEN_HEIGHT, TOP_SCREEN_WIDTH,
};

use crate::config::VideoConfig;

use super::binder::ScreenBinder;
use super::command::{CommandScheduler, ExecuteContext, PresentCommand};
use super::draw::{RenderView, ScreenCompositor};
use super::frame::PresentTarget;
use super::pipeline::{PipelineVariant, PresentPipelines};
use super::texture_cache::{SCREEN_COUNT, ScreenInfo, ScreenTextureCache, TexCoords};
use super::vertex::VertexStream;
use super::{
    DisplayAccelerator, DisplaySource, FrameEvents, PhysicalScreen, SCREEN_BOTTOM,
    SCREEN_TOP_RIGHT,
};

/// What the polled register state asks the renderer to do for one screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum ScreenAction {
    /// Drive the whole panel with a solid color; no pixel upload happens.
    Fill([f32; 4]),
    /// Display the framebuffer at this guest address.
    Upload { address: u32 },
}

pub(super) fn screen_action(
    config: &FramebufferConfig,
    fill: ColorFill,
    right_eye: bool,
) -> ScreenAction {
    if fill.enabled {
        ScreenAction::Fill([
            fill.r as f32 / 255.0,
            fill.g as f32 / 255.0,
            fill.b as f32 / 255.0,
            1.0,
        ])
    } else {
        ScreenAction::Upload {
            address: config.active_address(right_eye),
        }
    }
}

/// Duovision presentation renderer.
///
/// All composition and command recording happens sequentially on the thread
/// that calls `swap_buffers`; nothing here is shared across threads.
pub struct DuoGraphics {
    // Core wgpu objects
    pub(super) device: wgpu::Device,
    pub(super) queue: wgpu::Queue,
    pub(super) surface_format: wgpu::TextureFormat,

    // Command recording and submission
    pub(super) scheduler: CommandScheduler,

    // Present pipelines and the screen texture bindings they consume
    pub(super) pipelines: PresentPipelines,
    pub(super) binder: ScreenBinder,

    // Screen textures and per-frame screen state
    pub(super) textures: ScreenTextureCache,
    pub(super) screen_infos: [ScreenInfo; SCREEN_COUNT],
    pub(super) display_generation: u64,

    // Composition
    pub(super) compositor: ScreenCompositor,
    pub(super) vertex_buffer: wgpu::Buffer,
    pub(super) variant: PipelineVariant,
    pub(super) clear_color: [f32; 4],

    // Window targets (primary plus the optional secondary window)
    main_target: Option<PresentTarget>,
    second_target: Option<PresentTarget>,

    // Optional zero-copy display path
    accelerator: Option<Box<dyn DisplayAccelerator>>,
}

impl DuoGraphics {
    /// Wrap a frontend-created device and surface.
    ///
    /// The device must have been requested with `Features::PUSH_CONSTANTS`
    /// and a push constant budget covering the draw-info block.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    ) -> Result<Self> {
        anyhow::ensure!(
            device.features().contains(wgpu::Features::PUSH_CONSTANTS),
            "presentation requires a device with PUSH_CONSTANTS enabled"
        );

        let surface_format = config.format;
        let pipelines = PresentPipelines::new(&device, surface_format);
        let main_target = PresentTarget::new(&device, surface, config);
        let vertex_buffer = VertexStream::create_buffer(&device);
        let scheduler = CommandScheduler::new(device.clone(), queue.clone());

        tracing::info!(
            "Initialized presentation renderer ({}x{}, {:?})",
            main_target.frame().width,
            main_target.frame().height,
            surface_format
        );

        Ok(Self {
            device,
            queue,
            surface_format,
            scheduler,
            pipelines,
            binder: ScreenBinder::new(),
            textures: ScreenTextureCache::new(),
            screen_infos: [
                ScreenInfo::new(TOP_SCREEN_WIDTH, TOP_SCREEN_HEIGHT),
                ScreenInfo::new(TOP_SCREEN_WIDTH, TOP_SCREEN_HEIGHT),
                ScreenInfo::new(BOTTOM_SCREEN_WIDTH, BOTTOM_SCREEN_HEIGHT),
            ],
            display_generation: 0,
            compositor: ScreenCompositor::new(),
            vertex_buffer,
            variant: PipelineVariant::Standard,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            main_target: Some(main_target),
            second_target: None,
            accelerator: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Install the rasterizer's zero-copy display path.
    pub fn set_accelerator(&mut self, accelerator: Box<dyn DisplayAccelerator>) {
        self.accelerator = Some(accelerator);
    }

    /// Attach a second output window, composited after the primary one on
    /// the shared queue.
    pub fn add_secondary_window(
        &mut self,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    ) {
        self.second_target = Some(PresentTarget::new(&self.device, surface, config));
    }

    pub fn remove_secondary_window(&mut self) {
        self.second_target = None;
    }

    /// Advance one output frame.
    ///
    /// Consumes the event set exactly once, refreshes the screen textures
    /// from the polled framebuffer registers, runs any screenshot capture,
    /// then composites and presents the primary window followed by the
    /// secondary one.
    pub fn swap_buffers(
        &mut self,
        source: &dyn DisplaySource,
        video: &VideoConfig,
        layout: &FramebufferLayout,
        secondary_layout: Option<&FramebufferLayout>,
        events: FrameEvents,
    ) {
        let FrameEvents {
            background_color,
            reload_pipelines,
            screenshot,
        } = events;

        if let Some([r, g, b]) = background_color {
            self.clear_color = [r, g, b, 1.0];
        }
        if reload_pipelines {
            self.reload_pipeline(video);
        }

        self.prepare_rendertarget(source);

        if let Some(request) = screenshot {
            self.render_screenshot(request, video);
        }

        let mut window = self.main_target.take().expect("main present target missing");
        self.render_to_window(&mut window, layout, video, false);
        self.main_target = Some(window);

        if let Some(mut window) = self.second_target.take() {
            if let Some(layout) = secondary_layout {
                self.render_to_window(&mut window, layout, video, false);
            }
            self.second_target = Some(window);
        }
    }

    /// Submit everything recorded and block until the GPU is idle.
    pub fn finish(&mut self) {
        self.compositor
            .stream
            .upload(&self.queue, &self.vertex_buffer);
        self.scheduler.finish(&ExecuteContext {
            textures: &self.textures,
            pipelines: &self.pipelines,
            bind_group: self.binder.bind_group(),
            vertex_buffer: &self.vertex_buffer,
            frame: None,
            readback: None,
        });
    }

    fn reload_pipeline(&mut self, video: &VideoConfig) {
        let (variant, reverse) = PipelineVariant::from_mode(video.render_3d);
        self.variant = variant;
        self.compositor.draw_info.reverse_interlaced = reverse as u32;
        tracing::debug!("Present pipeline set to {:?}", variant);
    }

    /// Poll both framebuffer configs and bring every screen texture up to
    /// date: a solid-fill screen records a clear instead of an upload, any
    /// other screen reallocates on mismatch and uploads its pixels.
    fn prepare_rendertarget(&mut self, source: &dyn DisplaySource) {
        for screen in 0..SCREEN_COUNT {
            let physical = if screen == SCREEN_BOTTOM as usize {
                PhysicalScreen::Bottom
            } else {
                PhysicalScreen::Top
            };
            let config = source.framebuffer_config(physical);
            let fill = source.color_fill(physical);

            match screen_action(&config, fill, screen == SCREEN_TOP_RIGHT as usize) {
                ScreenAction::Fill(color) => {
                    let realloc = self.textures.ensure(&self.device, screen, &config);
                    self.refresh_own_view(screen, &config, realloc);
                    self.scheduler.end_rendering();
                    self.scheduler
                        .record(PresentCommand::ClearImage { screen, color });
                }
                ScreenAction::Upload { address } => {
                    let realloc = self.textures.ensure(&self.device, screen, &config);
                    self.load_framebuffer(source, screen, &config, address, realloc);
                }
            }
        }
    }

    /// Point the screen at the cache's own texture with the neutral full
    /// mapping. Only touches the binding state when the view actually went
    /// stale, so steady-state frames keep their cached bind group.
    fn refresh_own_view(&mut self, screen: usize, config: &FramebufferConfig, realloc: bool) {
        let info = &mut self.screen_infos[screen];
        if realloc || info.accelerated || info.display_view.is_none() {
            info.texcoords = TexCoords::FULL;
            info.display_view = self.textures.view(screen).cloned();
            info.accelerated = false;
            self.display_generation += 1;
        }
        info.width = config.width;
        info.height = config.height;
    }

    fn load_framebuffer(
        &mut self,
        source: &dyn DisplaySource,
        screen: usize,
        config: &FramebufferConfig,
        address: u32,
        realloc: bool,
    ) {
        let bytes_per_pixel = config.format.bytes_per_pixel();
        assert!(
            config.stride % bytes_per_pixel == 0,
            "framebuffer stride is not pixel aligned"
        );
        let pixel_stride = config.stride / bytes_per_pixel;

        if let Some(accelerator) = self.accelerator.as_mut() {
            if accelerator.accelerate_display(
                config,
                address,
                pixel_stride,
                &mut self.screen_infos[screen],
            ) {
                self.screen_infos[screen].accelerated = true;
                self.display_generation += 1;
                return;
            }
        }

        // Unaccelerated path: neutral mapping plus upload from guest memory.
        self.refresh_own_view(screen, config, realloc);
        tracing::trace!(
            "Screen {}: {}x{} {:?} from {:#010x}",
            screen,
            config.width,
            config.height,
            config.format,
            address
        );

        let len = (config.stride * config.height) as usize;
        match source.framebuffer_bytes(address, len) {
            Some(bytes) => self.textures.upload(&self.queue, screen, config, bytes),
            None => tracing::debug!(
                "Unmapped framebuffer address {address:#010x}; keeping previous screen contents"
            ),
        }
    }

    pub(super) fn bind_generation(&self) -> u64 {
        self.textures.generation() + self.display_generation
    }

    fn draw_screens(&mut self, layout: &FramebufferLayout, video: &VideoConfig, flipped: bool) {
        self.binder.update(
            &self.device,
            &self.pipelines,
            &self.screen_infos,
            self.bind_generation(),
            video.filter_mode,
        );
        self.compositor.draw_screens(
            self.scheduler.list_mut(),
            &self.screen_infos,
            layout,
            &RenderView::new(video),
            self.variant,
            self.clear_color,
            flipped,
        );
    }

    fn render_to_window(
        &mut self,
        window: &mut PresentTarget,
        layout: &FramebufferLayout,
        video: &VideoConfig,
        flipped: bool,
    ) {
        if layout.width != window.frame().width || layout.height != window.frame().height {
            // Resize is synchronous and blocking: no recorded command may
            // reference the frame being replaced.
            window.wait_present(&self.device);
            self.finish();
            window.recreate(&self.device, layout.width, layout.height);
        }

        self.draw_screens(layout, video, flipped);

        self.compositor
            .stream
            .upload(&self.queue, &self.vertex_buffer);
        let render_ready = self.scheduler.flush(&ExecuteContext {
            textures: &self.textures,
            pipelines: &self.pipelines,
            bind_group: self.binder.bind_group(),
            vertex_buffer: &self.vertex_buffer,
            frame: Some(window.frame()),
            readback: None,
        });
        window.frame_mut().render_ready = Some(render_ready);

        window.present(&self.device, &self.queue);
    }
}

impl Drop for DuoGraphics {
    fn drop(&mut self) {
        // Drain in-flight GPU work before owned resources are released.
        if let Err(error) = self.device.poll(wgpu::PollType::wait_indefinitely()) {
            tracing::warn!("Device wait failed during renderer teardown: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duovision_shared::framebuffer::PixelFormat;

    fn config() -> FramebufferConfig {
        FramebufferConfig {
            address_left1: 0x1800_0000,
            address_left2: 0x1808_0000,
            address_right1: 0x1810_0000,
            address_right2: 0x1818_0000,
            width: 400,
            height: 240,
            stride: 400 * 3,
            format: PixelFormat::Rgb8,
            ..Default::default()
        }
    }

    #[test]
    fn test_fill_never_uploads() {
        let fill = ColorFill {
            enabled: true,
            r: 255,
            g: 128,
            b: 0,
        };
        let action = screen_action(&config(), fill, false);
        assert_eq!(action, ScreenAction::Fill([1.0, 128.0 / 255.0, 0.0, 1.0]));
    }

    #[test]
    fn test_upload_uses_active_buffer_address() {
        let disabled = ColorFill::default();
        assert_eq!(
            screen_action(&config(), disabled, false),
            ScreenAction::Upload {
                address: 0x1800_0000
            }
        );
        assert_eq!(
            screen_action(&config(), disabled, true),
            ScreenAction::Upload {
                address: 0x1810_0000
            }
        );

        let flipped = FramebufferConfig {
            active_fb: 1,
            ..config()
        };
        assert_eq!(
            screen_action(&flipped, disabled, true),
            ScreenAction::Upload {
                address: 0x1818_0000
            }
        );
    }
}
