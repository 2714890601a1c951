//! Deferred GPU command recording and submission.
//!
//! Composition builds a queue of tagged `PresentCommand`s without touching
//! the GPU; a single executor encodes the queue into a command encoder when
//! the scheduler flushes. Commands reference resources by stable slot
//! (screen index, the flush's target frame), never by GPU handle, which
//! decouples recording from execution in time and keeps the recording side
//! testable without a device.

use super::capture::ReadbackBuffer;
use super::frame::Frame;
use super::pipeline::{DrawUniforms, PipelineVariant, PresentPipelines};
use super::texture_cache::ScreenTextureCache;

/// One unit of deferred GPU work.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentCommand {
    /// Fill a screen texture with a solid color. Replaces the texture
    /// upload for screens in color-fill mode; must not be recorded while a
    /// render pass is open.
    ClearImage { screen: usize, color: [f32; 4] },
    /// Open the composite pass against the flush's target frame and bind
    /// the selected pipeline plus the current screen textures.
    BeginPass {
        pipeline: PipelineVariant,
        clear: [f32; 4],
        width: u32,
        height: u32,
    },
    /// Draw one screen quad staged in the stream vertex buffer.
    Draw {
        first_vertex: u32,
        uniforms: DrawUniforms,
    },
    EndPass,
    /// Copy the target frame into the flush's readback buffer.
    CopyFrameToBuffer {
        width: u32,
        height: u32,
        bytes_per_row: u32,
    },
}

/// Recorded commands plus the render-pass bracket state.
///
/// Recording outside the allowed bracket is a contract violation and
/// panics; there is no way to recover a frame once its command stream is
/// malformed.
#[derive(Debug, Default)]
pub struct CommandList {
    commands: Vec<PresentCommand>,
    rendering: bool,
}

impl CommandList {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(64),
            rendering: false,
        }
    }

    pub fn record(&mut self, command: PresentCommand) {
        match &command {
            PresentCommand::BeginPass { .. } => {
                assert!(!self.rendering, "render pass already open");
                self.rendering = true;
            }
            PresentCommand::EndPass => {
                assert!(self.rendering, "no render pass to end");
                self.rendering = false;
            }
            PresentCommand::Draw { .. } => {
                assert!(self.rendering, "draw recorded outside a render pass");
            }
            PresentCommand::ClearImage { .. } | PresentCommand::CopyFrameToBuffer { .. } => {
                assert!(
                    !self.rendering,
                    "transfer operation recorded inside a render pass"
                );
            }
        }
        self.commands.push(command);
    }

    /// Close the composite pass if one is open. Required before recording
    /// any transfer operation.
    pub fn end_rendering(&mut self) {
        if self.rendering {
            self.record(PresentCommand::EndPass);
        }
    }

    pub fn commands(&self) -> &[PresentCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn take(&mut self) -> Vec<PresentCommand> {
        debug_assert!(!self.rendering, "flush with an open render pass");
        std::mem::take(&mut self.commands)
    }
}

/// Renderer-owned resources the executor resolves command slots against.
pub(crate) struct ExecuteContext<'a> {
    pub textures: &'a ScreenTextureCache,
    pub pipelines: &'a PresentPipelines,
    pub bind_group: Option<&'a wgpu::BindGroup>,
    pub vertex_buffer: &'a wgpu::Buffer,
    pub frame: Option<&'a Frame>,
    pub readback: Option<&'a ReadbackBuffer>,
}

/// Serializes command recording and submission for the single GPU queue.
///
/// All recording happens on one logical thread, so the scheduler itself
/// needs no locking; the ordering guarantees come from submission order on
/// the shared queue.
pub struct CommandScheduler {
    device: wgpu::Device,
    queue: wgpu::Queue,
    list: CommandList,
}

impl CommandScheduler {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            list: CommandList::new(),
        }
    }

    pub fn record(&mut self, command: PresentCommand) {
        self.list.record(command);
    }

    pub fn end_rendering(&mut self) {
        self.list.end_rendering();
    }

    pub fn list_mut(&mut self) -> &mut CommandList {
        &mut self.list
    }

    pub fn commands(&self) -> &[PresentCommand] {
        self.list.commands()
    }

    /// Encode and submit everything recorded so far. Returns the submission
    /// index presentation can wait on.
    pub(crate) fn flush(&mut self, ctx: &ExecuteContext) -> wgpu::SubmissionIndex {
        self.list.end_rendering();
        let commands = self.list.take();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present Encoder"),
            });
        encode(&mut encoder, commands, ctx);
        self.queue.submit(std::iter::once(encoder.finish()))
    }

    /// Submit and block until the GPU has completed all outstanding work.
    /// Required before destructive operations (frame resize, readback,
    /// teardown) so no stale reference remains in flight.
    pub(crate) fn finish(&mut self, ctx: &ExecuteContext) {
        self.flush(ctx);
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .expect("device lost while draining GPU work");
    }
}

fn wgpu_color(color: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: color[0] as f64,
        g: color[1] as f64,
        b: color[2] as f64,
        a: color[3] as f64,
    }
}

fn encode(
    encoder: &mut wgpu::CommandEncoder,
    commands: Vec<PresentCommand>,
    ctx: &ExecuteContext,
) {
    let mut pass: Option<wgpu::RenderPass<'static>> = None;

    for command in commands {
        match command {
            PresentCommand::ClearImage { screen, color } => {
                let view = ctx
                    .textures
                    .view(screen)
                    .expect("color fill of an unallocated screen texture");
                let _fill_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Screen Fill Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu_color(color)),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            }
            PresentCommand::BeginPass {
                pipeline,
                clear,
                width,
                height,
            } => {
                let frame = ctx.frame.expect("composite pass without a target frame");
                let mut render_pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Composite Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &frame.view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu_color(clear)),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        depth_stencil_attachment: None,
                        timestamp_writes: None,
                        occlusion_query_set: None,
                    })
                    .forget_lifetime();

                render_pass.set_pipeline(ctx.pipelines.get(pipeline));
                render_pass.set_bind_group(
                    0,
                    ctx.bind_group.expect("composite pass without screen bindings"),
                    &[],
                );
                render_pass.set_vertex_buffer(0, ctx.vertex_buffer.slice(..));
                render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
                render_pass.set_scissor_rect(0, 0, width, height);
                pass = Some(render_pass);
            }
            PresentCommand::Draw {
                first_vertex,
                uniforms,
            } => {
                let render_pass = pass.as_mut().expect("draw outside an open render pass");
                render_pass.set_push_constants(
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    0,
                    bytemuck::bytes_of(&uniforms),
                );
                render_pass.draw(first_vertex..first_vertex + 4, 0..1);
            }
            PresentCommand::EndPass => {
                pass = None;
            }
            PresentCommand::CopyFrameToBuffer {
                width,
                height,
                bytes_per_row,
            } => {
                let frame = ctx.frame.expect("readback without a target frame");
                let readback = ctx.readback.expect("readback without a destination buffer");
                encoder.copy_texture_to_buffer(
                    wgpu::TexelCopyTextureInfo {
                        texture: &frame.texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    wgpu::TexelCopyBufferInfo {
                        buffer: &readback.buffer,
                        layout: wgpu::TexelCopyBufferLayout {
                            offset: 0,
                            bytes_per_row: Some(bytes_per_row),
                            rows_per_image: Some(height),
                        },
                    },
                    wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                );
            }
        }
    }

    debug_assert!(pass.is_none(), "command stream left a render pass open");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw() -> PresentCommand {
        PresentCommand::Draw {
            first_vertex: 0,
            uniforms: DrawUniforms::default(),
        }
    }

    fn begin_pass() -> PresentCommand {
        PresentCommand::BeginPass {
            pipeline: PipelineVariant::Standard,
            clear: [0.0; 4],
            width: 400,
            height: 480,
        }
    }

    #[test]
    fn test_record_pass_bracket() {
        let mut list = CommandList::new();
        list.record(PresentCommand::ClearImage {
            screen: 0,
            color: [1.0, 0.0, 0.0, 1.0],
        });
        list.record(begin_pass());
        list.record(draw());
        list.end_rendering();
        assert_eq!(list.commands().len(), 4);
        assert!(matches!(list.commands()[3], PresentCommand::EndPass));
    }

    #[test]
    fn test_end_rendering_without_pass_is_noop() {
        let mut list = CommandList::new();
        list.end_rendering();
        assert!(list.is_empty());
    }

    #[test]
    #[should_panic(expected = "outside a render pass")]
    fn test_draw_outside_pass_panics() {
        let mut list = CommandList::new();
        list.record(draw());
    }

    #[test]
    #[should_panic(expected = "inside a render pass")]
    fn test_clear_inside_pass_panics() {
        let mut list = CommandList::new();
        list.record(begin_pass());
        list.record(PresentCommand::ClearImage {
            screen: 0,
            color: [0.0; 4],
        });
    }

    #[test]
    #[should_panic(expected = "already open")]
    fn test_nested_pass_panics() {
        let mut list = CommandList::new();
        list.record(begin_pass());
        list.record(begin_pass());
    }

    #[test]
    fn test_take_resets_list() {
        let mut list = CommandList::new();
        list.record(begin_pass());
        list.end_rendering();
        let taken = list.take();
        assert_eq!(taken.len(), 2);
        assert!(list.is_empty());
    }
}
