//! Duovision presentation renderer (wgpu)
//!
//! # Architecture
//!
//! **DisplaySource** (emulated GPU) → **ScreenTextureCache** → **ScreenCompositor** →
//! **CommandScheduler** → **Frame** → presentation
//!
//! - Once per output frame the renderer polls the emulated GPU's framebuffer
//!   registers and refreshes one host texture per screen (or records a solid
//!   color fill instead of an upload)
//! - The compositor records tagged `PresentCommand`s describing the composite
//!   pass; nothing touches the GPU until the scheduler flushes
//! - The scheduler encodes and submits the recorded commands against the
//!   target `Frame`, which is then handed to the window's swap chain
//!
//! Recording is kept free of GPU handles (commands reference screens and
//! frames by stable slot) so composition logic is testable without a device.

mod binder;
mod capture;
mod command;
mod draw;
mod duo_graphics;
mod frame;
mod pipeline;
mod texture_cache;
mod vertex;

pub use capture::{Screenshot, ScreenshotRequest, timestamped_filename};
pub use command::{CommandList, CommandScheduler, PresentCommand};
pub use duo_graphics::DuoGraphics;
pub use frame::{Frame, PresentTarget};
pub use pipeline::{DrawUniforms, PipelineVariant, PresentPipelines};
pub use texture_cache::{SCREEN_COUNT, ScreenInfo, ScreenTextureCache, TexCoords};
pub use vertex::{ScreenRectVertex, VERTEX_BUFFER_VERTICES, VertexStream};

use duovision_shared::framebuffer::{ColorFill, FramebufferConfig};

/// Logical screen indices as seen by the present shaders.
pub const SCREEN_TOP_LEFT: u32 = 0;
pub const SCREEN_TOP_RIGHT: u32 = 1;
pub const SCREEN_BOTTOM: u32 = 2;

/// One of the console's two physical displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalScreen {
    Top,
    Bottom,
}

/// Per-frame snapshot provider, implemented by the emulated GPU.
///
/// The renderer polls this once per output frame; nothing is ever pushed
/// back. `framebuffer_bytes` backs the unaccelerated upload path and may
/// return `None` for unmapped addresses, in which case the previous texture
/// contents are kept.
pub trait DisplaySource {
    fn framebuffer_config(&self, screen: PhysicalScreen) -> FramebufferConfig;
    fn color_fill(&self, screen: PhysicalScreen) -> ColorFill;
    fn framebuffer_bytes(&self, address: u32, len: usize) -> Option<&[u8]>;
}

/// Optional zero-copy display path supplied by a hardware rasterizer.
///
/// When the rasterizer already holds the frame in a GPU texture it can
/// install that texture's view and sub-region coordinates directly into the
/// `ScreenInfo`, skipping the guest-memory readback entirely. Returning
/// `false` makes the renderer fall back to the neutral mapping and upload
/// from `DisplaySource` memory.
pub trait DisplayAccelerator {
    fn accelerate_display(
        &mut self,
        config: &FramebufferConfig,
        address: u32,
        pixel_stride: u32,
        screen: &mut ScreenInfo,
    ) -> bool;
}

/// One-shot requests consumed by [`DuoGraphics::swap_buffers`].
///
/// The caller builds a fresh value every frame; each field is acted on
/// exactly once. This replaces the usual pattern of global "update
/// requested" flags read via atomic exchange.
#[derive(Default)]
pub struct FrameEvents {
    /// Change the letterbox clear color before compositing.
    pub background_color: Option<[f32; 3]>,
    /// Re-evaluate the present pipeline selection from the configured
    /// stereo mode. Send this whenever `render_3d` changes.
    pub reload_pipelines: bool,
    /// Capture an off-screen screenshot this frame.
    pub screenshot: Option<ScreenshotRequest>,
}

impl FrameEvents {
    /// Events for an ordinary frame with nothing pending.
    pub fn none() -> Self {
        Self::default()
    }
}
