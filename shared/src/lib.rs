//! Shared display types for the Duovision platform.
//!
//! Everything that crosses the boundary between the emulated GPU and the
//! presentation renderer lives here: framebuffer descriptions, guest pixel
//! formats, and output window layout geometry. This crate has no GPU
//! dependencies so the emulation core and tooling can use it freely.

pub mod framebuffer;
pub mod layout;

pub use framebuffer::{ColorFill, FramebufferConfig, PixelFormat, PixelFormatError};
pub use layout::{CardboardSettings, DisplayOrientation, FramebufferLayout, Rect};

/// Native resolution of the top screen.
pub const TOP_SCREEN_WIDTH: u32 = 400;
pub const TOP_SCREEN_HEIGHT: u32 = 240;

/// Native resolution of the bottom screen.
pub const BOTTOM_SCREEN_WIDTH: u32 = 320;
pub const BOTTOM_SCREEN_HEIGHT: u32 = 240;
