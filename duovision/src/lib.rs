//! Duovision - presentation stack for a dual-screen handheld console.
//!
//! The emulated GPU produces two independently configured framebuffers (top
//! and bottom screen, the top one optionally stereoscopic). This crate turns
//! those into host GPU textures and composites them into one output frame
//! under the configured stereo mode, handling command submission, resource
//! lifetime, presentation timing, and screenshot readback.
//!
//! The frontend owns windowing and wgpu device bootstrap; the emulation core
//! owns guest memory and the framebuffer registers. Both are reached through
//! the seams in [`graphics`]: [`graphics::DisplaySource`] is polled once per
//! output frame, and [`DuoGraphics::swap_buffers`] drives everything else.

pub mod config;
pub mod graphics;

pub use config::{Config, EyeSelect, StereoRenderMode, TextureFilter, VideoConfig};
pub use graphics::{DisplayAccelerator, DisplaySource, DuoGraphics, FrameEvents, PhysicalScreen};

pub use duovision_shared::{ColorFill, FramebufferConfig, FramebufferLayout, PixelFormat};
