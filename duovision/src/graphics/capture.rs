//! Off-screen screenshot capture.
//!
//! Reuses the compositor against a throwaway frame sized to the requested
//! layout, copies the result into a host-visible buffer behind a blocking
//! finish, and hands the tightly packed RGBA pixels to the request's
//! callback. The whole path is synchronous and stalls the render pipeline;
//! screenshots are rare user-triggered events, so that is fine.

use std::path::Path;
use std::sync::mpsc;

use anyhow::{Context, Result};
use duovision_shared::layout::FramebufferLayout;

use crate::config::VideoConfig;

use super::command::{ExecuteContext, PresentCommand};
use super::draw::RenderView;
use super::duo_graphics::DuoGraphics;
use super::frame::Frame;

/// A completed capture: tightly packed RGBA8, row-major, top-left origin.
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Screenshot {
    /// Encode the capture as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().context("Failed to write PNG header")?;
        writer
            .write_image_data(&self.pixels)
            .context("Failed to write PNG data")?;

        tracing::info!("Screenshot saved: {}", path.display());
        Ok(())
    }
}

/// Timestamped screenshot filename, e.g. `duovision_2026-08-06_21-03-54.png`.
pub fn timestamped_filename() -> String {
    format!(
        "duovision_{}.png",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    )
}

/// One-shot capture request carried in `FrameEvents`.
pub struct ScreenshotRequest {
    /// Output geometry to composite; independent of the window layout.
    pub layout: FramebufferLayout,
    /// Invoked with the finished capture before `swap_buffers` returns.
    pub on_complete: Box<dyn FnOnce(Screenshot) + Send>,
}

/// Row pitch for copying a `width`-pixel RGBA image into a mappable buffer.
pub(crate) fn aligned_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

pub(crate) fn bgra_to_rgba(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
}

/// Host-visible destination for a frame copy.
pub(crate) struct ReadbackBuffer {
    pub buffer: wgpu::Buffer,
    pub padded_bytes_per_row: u32,
    pub width: u32,
    pub height: u32,
}

impl ReadbackBuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let padded_bytes_per_row = aligned_bytes_per_row(width);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Screenshot Staging Buffer"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            padded_bytes_per_row,
            width,
            height,
        }
    }

    /// Map the buffer and return the pixels with row padding stripped.
    /// The GPU copy must already be complete.
    pub fn read(&self, device: &wgpu::Device) -> Vec<u8> {
        let slice = self.buffer.slice(..);

        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .expect("device lost while mapping screenshot buffer");
        rx.recv()
            .expect("map callback dropped")
            .expect("failed to map screenshot buffer");

        let mapped = slice.get_mapped_range();
        let row_bytes = (self.width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * self.height as usize);
        for row in 0..self.height as usize {
            let start = row * self.padded_bytes_per_row as usize;
            pixels.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        self.buffer.unmap();

        pixels
    }
}

impl DuoGraphics {
    /// Composite into a throwaway frame at the requested layout, read the
    /// result back, and deliver it. Steady-state presentation resources are
    /// untouched.
    pub(super) fn render_screenshot(&mut self, request: ScreenshotRequest, video: &VideoConfig) {
        let layout = request.layout;
        let width = layout.width;
        let height = layout.height;

        let frame = Frame::new(
            &self.device,
            width,
            height,
            self.surface_format,
            "Screenshot Frame",
        );
        let readback = ReadbackBuffer::new(&self.device, width, height);

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
            &layout,
            &RenderView::new(video),
            self.variant,
            self.clear_color,
            false,
        );
        self.scheduler.record(PresentCommand::CopyFrameToBuffer {
            width,
            height,
            bytes_per_row: readback.padded_bytes_per_row,
        });

        self.compositor.stream.upload(&self.queue, &self.vertex_buffer);
        self.scheduler.finish(&ExecuteContext {
            textures: &self.textures,
            pipelines: &self.pipelines,
            bind_group: self.binder.bind_group(),
            vertex_buffer: &self.vertex_buffer,
            frame: Some(&frame),
            readback: Some(&readback),
        });

        let mut pixels = readback.read(&self.device);
        if matches!(
            self.surface_format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            bgra_to_rgba(&mut pixels);
        }

        tracing::info!("Captured {}x{} screenshot", width, height);
        (request.on_complete)(Screenshot {
            width,
            height,
            pixels,
        });
    }
}
