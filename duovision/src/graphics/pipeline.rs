//! Present pipeline set.
//!
//! A small fixed set of graphics pipelines (standard, anaglyph, interlaced)
//! sharing a single layout and push-constant block. Which one is bound for
//! a frame is a pure function of the configured stereo mode, re-evaluated
//! whenever the frontend signals a mode change.

use crate::config::{StereoRenderMode, TextureFilter};

use super::vertex::ScreenRectVertex;

pub const PRESENT_PIPELINES: usize = 3;

/// Push-constant block shared by all present pipelines.
///
/// Rebuilt per draw; `i_resolution`/`o_resolution` are (w, h, 1/w, 1/h)
/// vectors for shader-side sampling math, with the output pair stored
/// height-first to match the rotated framebuffer convention.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub modelview: [[f32; 4]; 4],
    pub i_resolution: [f32; 4],
    pub o_resolution: [f32; 4],
    /// Eye layer this draw contributes (0 or 1).
    pub layer: u32,
    /// Swaps scanline parity in the interlaced shader.
    pub reverse_interlaced: u32,
    pub screen_id_l: u32,
    pub screen_id_r: u32,
}

/// The three present pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineVariant {
    Standard,
    Anaglyph,
    Interlaced,
}

impl PipelineVariant {
    /// Pipeline selection for a stereo mode, plus the reverse-interlace
    /// flag (only meaningful for the interlaced pipeline).
    pub fn from_mode(mode: StereoRenderMode) -> (Self, bool) {
        match mode {
            StereoRenderMode::Anaglyph => (PipelineVariant::Anaglyph, false),
            StereoRenderMode::Interlaced => (PipelineVariant::Interlaced, false),
            StereoRenderMode::ReverseInterlaced => (PipelineVariant::Interlaced, true),
            StereoRenderMode::Off
            | StereoRenderMode::SideBySide
            | StereoRenderMode::CardboardVr => (PipelineVariant::Standard, false),
        }
    }

    fn index(self) -> usize {
        match self {
            PipelineVariant::Standard => 0,
            PipelineVariant::Anaglyph => 1,
            PipelineVariant::Interlaced => 2,
        }
    }
}

/// The pipelines, their shared bind group layout, and the two samplers the
/// filter setting picks between.
pub struct PresentPipelines {
    bind_group_layout: wgpu::BindGroupLayout,
    pipelines: [wgpu::RenderPipeline; PRESENT_PIPELINES],
    sampler_linear: wgpu::Sampler,
    sampler_nearest: wgpu::Sampler,
}

impl PresentPipelines {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Present Shaders"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/present.wgsl").into()),
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Present Bind Group Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Present Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::VERTEX_FRAGMENT,
                range: 0..std::mem::size_of::<DrawUniforms>() as u32,
            }],
        });

        let entry_points = ["fs_present", "fs_anaglyph", "fs_interlaced"];
        let pipelines = entry_points.map(|entry_point| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(entry_point),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[ScreenRectVertex::layout()],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some(entry_point),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: target_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            })
        });

        let sampler = |label, filter| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                mipmap_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            })
        };

        Self {
            bind_group_layout,
            pipelines,
            sampler_linear: sampler("Linear Screen Sampler", wgpu::FilterMode::Linear),
            sampler_nearest: sampler("Nearest Screen Sampler", wgpu::FilterMode::Nearest),
        }
    }

    pub fn get(&self, variant: PipelineVariant) -> &wgpu::RenderPipeline {
        &self.pipelines[variant.index()]
    }

    pub fn sampler(&self, filter: TextureFilter) -> &wgpu::Sampler {
        match filter {
            TextureFilter::Linear => &self.sampler_linear,
            TextureFilter::Nearest => &self.sampler_nearest,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_selection_is_pure() {
        assert_eq!(
            PipelineVariant::from_mode(StereoRenderMode::Off),
            (PipelineVariant::Standard, false)
        );
        assert_eq!(
            PipelineVariant::from_mode(StereoRenderMode::SideBySide),
            (PipelineVariant::Standard, false)
        );
        assert_eq!(
            PipelineVariant::from_mode(StereoRenderMode::CardboardVr),
            (PipelineVariant::Standard, false)
        );
        assert_eq!(
            PipelineVariant::from_mode(StereoRenderMode::Anaglyph),
            (PipelineVariant::Anaglyph, false)
        );
        assert_eq!(
            PipelineVariant::from_mode(StereoRenderMode::Interlaced),
            (PipelineVariant::Interlaced, false)
        );
        assert_eq!(
            PipelineVariant::from_mode(StereoRenderMode::ReverseInterlaced),
            (PipelineVariant::Interlaced, true)
        );
    }

    #[test]
    fn test_draw_uniforms_push_constant_size() {
        // Must stay within the 128-byte push constant budget guaranteed by
        // every Vulkan implementation.
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 112);
    }
}
