//! Screen texture descriptor binding.
//!
//! All three screen textures plus the active sampler are bound as a single
//! bind group consumed by whichever present pipeline is active. The group
//! is rebuilt only when a screen view or the filter setting changed;
//! steady-state frames reuse the cached group.

use crate::config::TextureFilter;

use super::pipeline::PresentPipelines;
use super::texture_cache::{SCREEN_COUNT, ScreenInfo};

pub struct ScreenBinder {
    bind_group: Option<wgpu::BindGroup>,
    generation: u64,
    filter: TextureFilter,
}

impl ScreenBinder {
    pub fn new() -> Self {
        Self {
            bind_group: None,
            generation: 0,
            filter: TextureFilter::Linear,
        }
    }

    /// Rebuild the bind group if the screen views (tracked by `generation`)
    /// or the sampler filter changed since the last frame.
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        pipelines: &PresentPipelines,
        screens: &[ScreenInfo; SCREEN_COUNT],
        generation: u64,
        filter: TextureFilter,
    ) {
        if self.bind_group.is_some() && self.generation == generation && self.filter == filter {
            return;
        }

        let view = |screen: usize| {
            screens[screen]
                .display_view
                .as_ref()
                .expect("screen texture missing at bind time")
        };

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Present Bind Group"),
            layout: pipelines.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view(0)),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view(1)),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(view(2)),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(pipelines.sampler(filter)),
                },
            ],
        });

        self.bind_group = Some(bind_group);
        self.generation = generation;
        self.filter = filter;
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

impl Default for ScreenBinder {
    fn default() -> Self {
        Self::new()
    }
}
