//! Emulated display framebuffer descriptions.
//!
//! The GPU core exposes one `FramebufferConfig` per physical screen. The
//! presentation renderer polls these once per output frame and never writes
//! them back. Guest pixel data is stored in one of five packed formats; the
//! host GPU only sees RGBA8, so every format decodes to tightly packed RGBA8
//! rows before upload.

use thiserror::Error;

/// Guest framebuffer pixel format.
///
/// The discriminants match the register encoding used by the emulated GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum PixelFormat {
    #[default]
    Rgba8 = 0,
    Rgb8 = 1,
    Rgb565 = 2,
    Rgb5A1 = 3,
    Rgba4 = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid pixel format code {0}")]
pub struct PixelFormatError(pub u32);

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgb565 | PixelFormat::Rgb5A1 | PixelFormat::Rgba4 => 2,
        }
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = PixelFormatError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PixelFormat::Rgba8),
            1 => Ok(PixelFormat::Rgb8),
            2 => Ok(PixelFormat::Rgb565),
            3 => Ok(PixelFormat::Rgb5A1),
            4 => Ok(PixelFormat::Rgba4),
            other => Err(PixelFormatError(other)),
        }
    }
}

/// Solid color fill override for one LCD.
///
/// When enabled the display controller ignores the framebuffer contents and
/// drives the whole panel with a single color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorFill {
    pub enabled: bool,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Display source description for one physical screen.
///
/// Each screen is double buffered (`active_fb` selects buffer 1 or 2) and the
/// top screen additionally carries a right-eye pair for stereoscopic output.
/// A right-eye address of zero means the title renders mono only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramebufferConfig {
    pub address_left1: u32,
    pub address_left2: u32,
    pub address_right1: u32,
    pub address_right2: u32,
    pub width: u32,
    pub height: u32,
    /// Row pitch in bytes.
    pub stride: u32,
    pub format: PixelFormat,
    /// Active buffer selector: 0 picks the `*1` addresses, anything else `*2`.
    pub active_fb: u32,
}

impl FramebufferConfig {
    /// Whether the title provides a distinct right-eye image.
    pub fn has_right_eye(&self) -> bool {
        self.address_right1 != 0 && self.address_right2 != 0
    }

    /// Physical address of the buffer to display this frame.
    ///
    /// Falls back to the left eye when no right-eye buffers exist, matching
    /// the display controller behavior for mono titles.
    pub fn active_address(&self, right_eye: bool) -> u32 {
        let right = right_eye && self.has_right_eye();
        match (self.active_fb == 0, right) {
            (true, true) => self.address_right1,
            (true, false) => self.address_left1,
            (false, true) => self.address_right2,
            (false, false) => self.address_left2,
        }
    }
}

const fn expand4(v: u8) -> u8 {
    v * 0x11
}

const fn expand5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

const fn expand6(v: u8) -> u8 {
    (v << 2) | (v >> 4)
}

/// Decode one guest framebuffer into tightly packed RGBA8.
///
/// `source` must hold at least `stride * height` bytes. Rows are `stride`
/// bytes apart in the source; the output is `width * height * 4` bytes with
/// no padding.
pub fn decode_framebuffer(
    source: &[u8],
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
) -> Vec<u8> {
    let width = width as usize;
    let height = height as usize;
    let stride = stride as usize;
    let bpp = format.bytes_per_pixel() as usize;

    let mut out = Vec::with_capacity(width * height * 4);
    for row in 0..height {
        let line = &source[row * stride..row * stride + width * bpp];
        match format {
            PixelFormat::Rgba8 => out.extend_from_slice(line),
            PixelFormat::Rgb8 => {
                for px in line.chunks_exact(3) {
                    out.extend_from_slice(&[px[0], px[1], px[2], 0xff]);
                }
            }
            PixelFormat::Rgb565 => {
                for px in line.chunks_exact(2) {
                    let v = u16::from_le_bytes([px[0], px[1]]);
                    out.extend_from_slice(&[
                        expand5((v >> 11) as u8 & 0x1f),
                        expand6((v >> 5) as u8 & 0x3f),
                        expand5(v as u8 & 0x1f),
                        0xff,
                    ]);
                }
            }
            PixelFormat::Rgb5A1 => {
                for px in line.chunks_exact(2) {
                    let v = u16::from_le_bytes([px[0], px[1]]);
                    out.extend_from_slice(&[
                        expand5((v >> 11) as u8 & 0x1f),
                        expand5((v >> 6) as u8 & 0x1f),
                        expand5((v >> 1) as u8 & 0x1f),
                        if v & 1 != 0 { 0xff } else { 0x00 },
                    ]);
                }
            }
            PixelFormat::Rgba4 => {
                for px in line.chunks_exact(2) {
                    let v = u16::from_le_bytes([px[0], px[1]]);
                    out.extend_from_slice(&[
                        expand4((v >> 12) as u8 & 0xf),
                        expand4((v >> 8) as u8 & 0xf),
                        expand4((v >> 4) as u8 & 0xf),
                        expand4(v as u8 & 0xf),
                    ]);
                }
            }
        }
    }
    out
}
