//! Screen composition.
//!
//! Decides, per output layout and stereo mode, which screens to draw, at
//! which window rectangle, with which orientation transform and texture
//! coordinates. Everything here only records commands and stages vertices;
//! the GPU is not involved until the scheduler flushes.

use duovision_shared::layout::{DisplayOrientation, FramebufferLayout, Rect};
use glam::Mat4;

use crate::config::{EyeSelect, StereoRenderMode, VideoConfig};

use super::command::{CommandList, PresentCommand};
use super::pipeline::{DrawUniforms, PipelineVariant};
use super::texture_cache::{SCREEN_COUNT, ScreenInfo, TexCoords};
use super::vertex::{ScreenRectVertex, VERTEX_BUFFER_VERTICES, VertexStream};
use super::{SCREEN_BOTTOM, SCREEN_TOP_LEFT, SCREEN_TOP_RIGHT};

/// Orthographic projection mapping window pixels (origin top-left) onto
/// normalized device coordinates.
pub fn make_orthographic(width: f32, height: f32) -> [[f32; 4]; 4] {
    Mat4::orthographic_rh(0.0, width, height, 0.0, 0.0, 1.0).to_cols_array_2d()
}

/// The fixed per-orientation texture coordinate permutation. The emulated
/// framebuffers are stored rotated a quarter turn, so the u axis walks the
/// coordinate box top-to-bottom and the v axis left-to-right.
fn screen_quad(
    texcoords: &TexCoords,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    orientation: DisplayOrientation,
) -> [ScreenRectVertex; 4] {
    let t = texcoords;
    match orientation {
        DisplayOrientation::Landscape => [
            ScreenRectVertex::new(x, y, t.bottom, t.left),
            ScreenRectVertex::new(x + w, y, t.bottom, t.right),
            ScreenRectVertex::new(x, y + h, t.top, t.left),
            ScreenRectVertex::new(x + w, y + h, t.top, t.right),
        ],
        DisplayOrientation::Portrait => [
            ScreenRectVertex::new(x, y, t.bottom, t.right),
            ScreenRectVertex::new(x + w, y, t.top, t.right),
            ScreenRectVertex::new(x, y + h, t.bottom, t.left),
            ScreenRectVertex::new(x + w, y + h, t.top, t.left),
        ],
        DisplayOrientation::LandscapeFlipped => [
            ScreenRectVertex::new(x, y, t.top, t.right),
            ScreenRectVertex::new(x + w, y, t.top, t.left),
            ScreenRectVertex::new(x, y + h, t.bottom, t.right),
            ScreenRectVertex::new(x + w, y + h, t.bottom, t.left),
        ],
        DisplayOrientation::PortraitFlipped => [
            ScreenRectVertex::new(x, y, t.top, t.left),
            ScreenRectVertex::new(x + w, y, t.bottom, t.left),
            ScreenRectVertex::new(x, y + h, t.top, t.right),
            ScreenRectVertex::new(x + w, y + h, t.bottom, t.right),
        ],
    }
}

/// Per-frame snapshot of the settings composition depends on.
pub struct RenderView {
    pub render_3d: StereoRenderMode,
    pub mono_eye: EyeSelect,
    pub swap_screens: bool,
    pub scale_factor: u32,
}

impl RenderView {
    pub fn new(video: &VideoConfig) -> Self {
        Self {
            render_3d: video.render_3d,
            mono_eye: video.mono_eye,
            swap_screens: video.swap_screens,
            scale_factor: video.resolution_scale.max(1),
        }
    }
}

/// Builds the composite pass for one frame.
///
/// Owns the shared draw-info block (rebuilt per draw, last-known values
/// persist between draws) and the streaming vertex ring.
pub struct ScreenCompositor {
    pub draw_info: DrawUniforms,
    pub stream: VertexStream,
}

impl ScreenCompositor {
    pub fn new() -> Self {
        Self {
            draw_info: DrawUniforms::default(),
            stream: VertexStream::new(VERTEX_BUFFER_VERTICES),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_single_screen(
        &mut self,
        list: &mut CommandList,
        screens: &[ScreenInfo; SCREEN_COUNT],
        screen_id: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        orientation: DisplayOrientation,
        scale_factor: u32,
    ) {
        let info = &screens[screen_id as usize];
        let first_vertex = self
            .stream
            .push_quad(screen_quad(&info.texcoords, x, y, w, h, orientation));

        let in_w = (info.width * scale_factor) as f32;
        let in_h = (info.height * scale_factor) as f32;
        let (res_h, res_w) = match orientation {
            DisplayOrientation::Landscape | DisplayOrientation::LandscapeFlipped => (h, w),
            DisplayOrientation::Portrait | DisplayOrientation::PortraitFlipped => (w, h),
        };
        self.draw_info.i_resolution = [in_w, in_h, 1.0 / in_w, 1.0 / in_h];
        self.draw_info.o_resolution = [res_h, res_w, 1.0 / res_h, 1.0 / res_w];
        self.draw_info.screen_id_l = screen_id;

        list.record(PresentCommand::Draw {
            first_vertex,
            uniforms: self.draw_info,
        });
    }

    /// Like `draw_single_screen`, but records both screen ids for shaders
    /// that combine two eyes in one pass (anaglyph, interlaced).
    #[allow(clippy::too_many_arguments)]
    fn draw_single_screen_stereo(
        &mut self,
        list: &mut CommandList,
        screens: &[ScreenInfo; SCREEN_COUNT],
        screen_id_l: u32,
        screen_id_r: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        orientation: DisplayOrientation,
        scale_factor: u32,
    ) {
        self.draw_info.screen_id_r = screen_id_r;
        self.draw_single_screen(
            list, screens, screen_id_l, x, y, w, h, orientation, scale_factor,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_top_screen(
        &mut self,
        list: &mut CommandList,
        screens: &[ScreenInfo; SCREEN_COUNT],
        layout: &FramebufferLayout,
        view: &RenderView,
        rect: Rect,
        orientation: DisplayOrientation,
    ) {
        if !layout.top_screen_enabled {
            return;
        }

        let x = rect.left as f32;
        let y = rect.top as f32;
        let w = rect.width() as f32;
        let h = rect.height() as f32;
        let scale = view.scale_factor;

        match view.render_3d {
            StereoRenderMode::Off => {
                let eye = match view.mono_eye {
                    EyeSelect::Left => SCREEN_TOP_LEFT,
                    EyeSelect::Right => SCREEN_TOP_RIGHT,
                };
                self.draw_single_screen(list, screens, eye, x, y, w, h, orientation, scale);
            }
            StereoRenderMode::SideBySide => {
                let half_width = (layout.width / 2) as f32;
                self.draw_single_screen(
                    list,
                    screens,
                    SCREEN_TOP_LEFT,
                    x / 2.0,
                    y,
                    w / 2.0,
                    h,
                    orientation,
                    scale,
                );
                self.draw_info.layer = 1;
                self.draw_single_screen(
                    list,
                    screens,
                    SCREEN_TOP_RIGHT,
                    x / 2.0 + half_width,
                    y,
                    w / 2.0,
                    h,
                    orientation,
                    scale,
                );
            }
            StereoRenderMode::CardboardVr => {
                self.draw_single_screen(
                    list,
                    screens,
                    SCREEN_TOP_LEFT,
                    x,
                    y,
                    w,
                    h,
                    orientation,
                    scale,
                );
                self.draw_info.layer = 1;
                self.draw_single_screen(
                    list,
                    screens,
                    SCREEN_TOP_RIGHT,
                    (layout.cardboard.top_screen_right_eye + layout.width / 2) as f32,
                    y,
                    w,
                    h,
                    orientation,
                    scale,
                );
            }
            StereoRenderMode::Anaglyph
            | StereoRenderMode::Interlaced
            | StereoRenderMode::ReverseInterlaced => {
                self.draw_single_screen_stereo(
                    list,
                    screens,
                    SCREEN_TOP_LEFT,
                    SCREEN_TOP_RIGHT,
                    x,
                    y,
                    w,
                    h,
                    orientation,
                    scale,
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_bottom_screen(
        &mut self,
        list: &mut CommandList,
        screens: &[ScreenInfo; SCREEN_COUNT],
        layout: &FramebufferLayout,
        view: &RenderView,
        rect: Rect,
        orientation: DisplayOrientation,
    ) {
        if !layout.bottom_screen_enabled {
            return;
        }

        let x = rect.left as f32;
        let y = rect.top as f32;
        let w = rect.width() as f32;
        let h = rect.height() as f32;
        let scale = view.scale_factor;

        match view.render_3d {
            StereoRenderMode::Off => {
                self.draw_single_screen(
                    list,
                    screens,
                    SCREEN_BOTTOM,
                    x,
                    y,
                    w,
                    h,
                    orientation,
                    scale,
                );
            }
            StereoRenderMode::SideBySide => {
                let half_width = (layout.width / 2) as f32;
                self.draw_single_screen(
                    list,
                    screens,
                    SCREEN_BOTTOM,
                    x / 2.0,
                    y,
                    w / 2.0,
                    h,
                    orientation,
                    scale,
                );
                self.draw_info.layer = 1;
                self.draw_single_screen(
                    list,
                    screens,
                    SCREEN_BOTTOM,
                    x / 2.0 + half_width,
                    y,
                    w / 2.0,
                    h,
                    orientation,
                    scale,
                );
            }
            StereoRenderMode::CardboardVr => {
                self.draw_single_screen(
                    list,
                    screens,
                    SCREEN_BOTTOM,
                    x,
                    y,
                    w,
                    h,
                    orientation,
                    scale,
                );
                self.draw_info.layer = 1;
                self.draw_single_screen(
                    list,
                    screens,
                    SCREEN_BOTTOM,
                    (layout.cardboard.bottom_screen_right_eye + layout.width / 2) as f32,
                    y,
                    w,
                    h,
                    orientation,
                    scale,
                );
            }
            StereoRenderMode::Anaglyph
            | StereoRenderMode::Interlaced
            | StereoRenderMode::ReverseInterlaced => {
                self.draw_single_screen_stereo(
                    list,
                    screens,
                    SCREEN_BOTTOM,
                    SCREEN_BOTTOM,
                    x,
                    y,
                    w,
                    h,
                    orientation,
                    scale,
                );
            }
        }
    }

    /// Record the whole composite pass for one output frame.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_screens(
        &mut self,
        list: &mut CommandList,
        screens: &[ScreenInfo; SCREEN_COUNT],
        layout: &FramebufferLayout,
        view: &RenderView,
        pipeline: PipelineVariant,
        clear_color: [f32; 4],
        flipped: bool,
    ) {
        list.record(PresentCommand::BeginPass {
            pipeline,
            clear: clear_color,
            width: layout.width,
            height: layout.height,
        });

        let orientation = layout.orientation(flipped);
        self.draw_info.modelview =
            make_orthographic(layout.width as f32, layout.height as f32);

        self.draw_info.layer = 0;
        if !view.swap_screens {
            self.draw_top_screen(list, screens, layout, view, layout.top_screen, orientation);
            self.draw_info.layer = 0;
            self.draw_bottom_screen(
                list,
                screens,
                layout,
                view,
                layout.bottom_screen,
                orientation,
            );
        } else {
            self.draw_bottom_screen(
                list,
                screens,
                layout,
                view,
                layout.bottom_screen,
                orientation,
            );
            self.draw_info.layer = 0;
            self.draw_top_screen(list, screens, layout, view, layout.top_screen, orientation);
        }

        if let Some(additional) = layout.additional_screen {
            self.draw_info.layer = 0;
            if !view.swap_screens {
                self.draw_top_screen(list, screens, layout, view, additional, orientation);
            } else {
                self.draw_bottom_screen(list, screens, layout, view, additional, orientation);
            }
        }

        list.end_rendering();
    }
}

impl Default for ScreenCompositor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn screens() -> [ScreenInfo; SCREEN_COUNT] {
        [
            ScreenInfo::new(400, 240),
            ScreenInfo::new(400, 240),
            ScreenInfo::new(320, 240),
        ]
    }

    fn view(mode: StereoRenderMode) -> RenderView {
        RenderView {
            render_3d: mode,
            mono_eye: EyeSelect::Left,
            swap_screens: false,
            scale_factor: 1,
        }
    }

    fn stacked_layout() -> FramebufferLayout {
        FramebufferLayout::default_layout(400, 480, false)
    }

    fn draws(list: &CommandList) -> Vec<(u32, DrawUniforms)> {
        list.commands()
            .iter()
            .filter_map(|command| match command {
                PresentCommand::Draw {
                    first_vertex,
                    uniforms,
                } => Some((*first_vertex, *uniforms)),
                _ => None,
            })
            .collect()
    }

    fn compose(mode: StereoRenderMode) -> (ScreenCompositor, CommandList) {
        let mut compositor = ScreenCompositor::new();
        let mut list = CommandList::new();
        let (pipeline, _) = PipelineVariant::from_mode(mode);
        compositor.draw_screens(
            &mut list,
            &screens(),
            &stacked_layout(),
            &view(mode),
            pipeline,
            [0.0; 4],
            false,
        );
        (compositor, list)
    }

    #[test]
    fn test_orthographic_maps_window_corners() {
        let m = glam::Mat4::from_cols_array_2d(&make_orthographic(400.0, 480.0));
        let top_left = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let bottom_right = m * Vec4::new(400.0, 480.0, 0.0, 1.0);
        assert_eq!(top_left, Vec4::new(-1.0, 1.0, 0.0, 1.0));
        assert_eq!(bottom_right, Vec4::new(1.0, -1.0, 0.0, 1.0));
    }

    fn orientation_case(orientation: DisplayOrientation) -> ([ScreenRectVertex; 4], DrawUniforms) {
        let mut compositor = ScreenCompositor::new();
        let mut list = CommandList::new();
        list.record(PresentCommand::BeginPass {
            pipeline: PipelineVariant::Standard,
            clear: [0.0; 4],
            width: 400,
            height: 480,
        });

        let mut screen_infos = screens();
        screen_infos[0].texcoords = TexCoords {
            left: 0.1,
            top: 0.2,
            right: 0.9,
            bottom: 0.8,
        };
        compositor.draw_single_screen(
            &mut list,
            &screen_infos,
            SCREEN_TOP_LEFT,
            10.0,
            20.0,
            100.0,
            50.0,
            orientation,
            1,
        );

        let (first_vertex, uniforms) = draws(&list)[0];
        (compositor.stream.quad(first_vertex), uniforms)
    }

    #[test]
    fn test_landscape_permutation() {
        let (quad, uniforms) = orientation_case(DisplayOrientation::Landscape);
        assert_eq!(quad[0], ScreenRectVertex::new(10.0, 20.0, 0.8, 0.1));
        assert_eq!(quad[1], ScreenRectVertex::new(110.0, 20.0, 0.8, 0.9));
        assert_eq!(quad[2], ScreenRectVertex::new(10.0, 70.0, 0.2, 0.1));
        assert_eq!(quad[3], ScreenRectVertex::new(110.0, 70.0, 0.2, 0.9));
        assert_eq!(uniforms.o_resolution, [50.0, 100.0, 1.0 / 50.0, 1.0 / 100.0]);
    }

    #[test]
    fn test_portrait_permutation_swaps_output_resolution() {
        let (quad, uniforms) = orientation_case(DisplayOrientation::Portrait);
        assert_eq!(quad[0], ScreenRectVertex::new(10.0, 20.0, 0.8, 0.9));
        assert_eq!(quad[1], ScreenRectVertex::new(110.0, 20.0, 0.2, 0.9));
        assert_eq!(quad[2], ScreenRectVertex::new(10.0, 70.0, 0.8, 0.1));
        assert_eq!(quad[3], ScreenRectVertex::new(110.0, 70.0, 0.2, 0.1));
        // Destination rectangle is untouched, only the shader resolution
        // sees the swapped pair.
        assert_eq!(quad[3].position, [110.0, 70.0]);
        assert_eq!(uniforms.o_resolution, [100.0, 50.0, 1.0 / 100.0, 1.0 / 50.0]);
    }

    #[test]
    fn test_landscape_flipped_permutation() {
        let (quad, uniforms) = orientation_case(DisplayOrientation::LandscapeFlipped);
        assert_eq!(quad[0], ScreenRectVertex::new(10.0, 20.0, 0.2, 0.9));
        assert_eq!(quad[1], ScreenRectVertex::new(110.0, 20.0, 0.2, 0.1));
        assert_eq!(quad[2], ScreenRectVertex::new(10.0, 70.0, 0.8, 0.9));
        assert_eq!(quad[3], ScreenRectVertex::new(110.0, 70.0, 0.8, 0.1));
        assert_eq!(uniforms.o_resolution, [50.0, 100.0, 1.0 / 50.0, 1.0 / 100.0]);
    }

    #[test]
    fn test_portrait_flipped_permutation() {
        let (quad, uniforms) = orientation_case(DisplayOrientation::PortraitFlipped);
        assert_eq!(quad[0], ScreenRectVertex::new(10.0, 20.0, 0.2, 0.1));
        assert_eq!(quad[1], ScreenRectVertex::new(110.0, 20.0, 0.8, 0.1));
        assert_eq!(quad[2], ScreenRectVertex::new(10.0, 70.0, 0.2, 0.9));
        assert_eq!(quad[3], ScreenRectVertex::new(110.0, 70.0, 0.8, 0.9));
        assert_eq!(uniforms.o_resolution, [100.0, 50.0, 1.0 / 100.0, 1.0 / 50.0]);
    }

    #[test]
    fn test_draw_count_per_mode() {
        for (mode, per_frame) in [
            (StereoRenderMode::Off, 2),
            (StereoRenderMode::SideBySide, 4),
            (StereoRenderMode::CardboardVr, 4),
            (StereoRenderMode::Anaglyph, 2),
            (StereoRenderMode::Interlaced, 2),
            (StereoRenderMode::ReverseInterlaced, 2),
        ] {
            let (_, list) = compose(mode);
            assert_eq!(
                draws(&list).len(),
                per_frame,
                "wrong draw count for {mode:?}"
            );
        }
    }

    #[test]
    fn test_stacked_mono_end_to_end() {
        let (compositor, list) = compose(StereoRenderMode::Off);

        assert!(matches!(
            list.commands()[0],
            PresentCommand::BeginPass {
                pipeline: PipelineVariant::Standard,
                width: 400,
                height: 480,
                ..
            }
        ));
        assert!(matches!(
            list.commands().last().unwrap(),
            PresentCommand::EndPass
        ));

        let draws = draws(&list);
        assert_eq!(draws.len(), 2);

        // Top screen fills its layout rect exactly.
        let (first_vertex, uniforms) = draws[0];
        assert_eq!(uniforms.screen_id_l, SCREEN_TOP_LEFT);
        let quad = compositor.stream.quad(first_vertex);
        assert_eq!(quad[0].position, [0.0, 0.0]);
        assert_eq!(quad[3].position, [400.0, 240.0]);

        // Bottom screen lands centered below it.
        let (first_vertex, uniforms) = draws[1];
        assert_eq!(uniforms.screen_id_l, SCREEN_BOTTOM);
        let quad = compositor.stream.quad(first_vertex);
        assert_eq!(quad[0].position, [40.0, 240.0]);
        assert_eq!(quad[3].position, [360.0, 480.0]);
    }

    #[test]
    fn test_mono_eye_selects_screen() {
        let mut compositor = ScreenCompositor::new();
        let mut list = CommandList::new();
        let mut right_eye = view(StereoRenderMode::Off);
        right_eye.mono_eye = EyeSelect::Right;
        compositor.draw_screens(
            &mut list,
            &screens(),
            &stacked_layout(),
            &right_eye,
            PipelineVariant::Standard,
            [0.0; 4],
            false,
        );
        assert_eq!(draws(&list)[0].1.screen_id_l, SCREEN_TOP_RIGHT);
    }

    #[test]
    fn test_side_by_side_halves_and_layers() {
        let (compositor, list) = compose(StereoRenderMode::SideBySide);
        let draws = draws(&list);

        let layers: Vec<u32> = draws.iter().map(|(_, u)| u.layer).collect();
        assert_eq!(layers, [0, 1, 0, 1]);

        // Top screen: left eye in the left half, right eye half a window over.
        let left = compositor.stream.quad(draws[0].0);
        let right = compositor.stream.quad(draws[1].0);
        assert_eq!(left[0].position, [0.0, 0.0]);
        assert_eq!(left[3].position, [200.0, 240.0]);
        assert_eq!(right[0].position, [200.0, 0.0]);
        assert_eq!(right[3].position, [400.0, 240.0]);

        // Bottom screen shows the same texture in both halves.
        assert_eq!(draws[2].1.screen_id_l, SCREEN_BOTTOM);
        assert_eq!(draws[3].1.screen_id_l, SCREEN_BOTTOM);
        let bottom_left = compositor.stream.quad(draws[2].0);
        assert_eq!(bottom_left[0].position, [20.0, 240.0]);
        assert_eq!(bottom_left[3].position, [180.0, 480.0]);
    }

    #[test]
    fn test_cardboard_offsets_second_eye() {
        let layout = FramebufferLayout::cardboard_vr_layout(800, 480);
        let mut compositor = ScreenCompositor::new();
        let mut list = CommandList::new();
        compositor.draw_screens(
            &mut list,
            &screens(),
            &layout,
            &view(StereoRenderMode::CardboardVr),
            PipelineVariant::Standard,
            [0.0; 4],
            false,
        );

        let draws = draws(&list);
        assert_eq!(draws.len(), 4);
        assert_eq!(draws[1].1.layer, 1);

        let left = compositor.stream.quad(draws[0].0);
        let right = compositor.stream.quad(draws[1].0);
        let expected_x = (layout.cardboard.top_screen_right_eye + layout.width / 2) as f32;
        assert_eq!(right[0].position[0], expected_x);
        // Full-width eyes, not halves.
        assert_eq!(
            right[3].position[0] - right[0].position[0],
            left[3].position[0] - left[0].position[0]
        );
    }

    #[test]
    fn test_anaglyph_records_both_screen_ids() {
        let (_, list) = compose(StereoRenderMode::Anaglyph);
        let draws = draws(&list);
        assert_eq!(draws[0].1.screen_id_l, SCREEN_TOP_LEFT);
        assert_eq!(draws[0].1.screen_id_r, SCREEN_TOP_RIGHT);
        assert_eq!(draws[1].1.screen_id_l, SCREEN_BOTTOM);
        assert_eq!(draws[1].1.screen_id_r, SCREEN_BOTTOM);
    }

    #[test]
    fn test_layer_resets_between_screen_groups() {
        let (_, list) = compose(StereoRenderMode::SideBySide);
        let draws = draws(&list);
        // The bottom group starts back at layer 0 even though the top group
        // ended on layer 1.
        assert_eq!(draws[2].1.layer, 0);
    }

    #[test]
    fn test_swap_screens_draws_bottom_first() {
        let mut compositor = ScreenCompositor::new();
        let mut list = CommandList::new();
        let mut swapped = view(StereoRenderMode::Off);
        swapped.swap_screens = true;
        compositor.draw_screens(
            &mut list,
            &screens(),
            &FramebufferLayout::default_layout(400, 480, true),
            &swapped,
            PipelineVariant::Standard,
            [0.0; 4],
            false,
        );
        let draws = draws(&list);
        assert_eq!(draws[0].1.screen_id_l, SCREEN_BOTTOM);
        assert_eq!(draws[1].1.screen_id_l, SCREEN_TOP_LEFT);
    }

    #[test]
    fn test_disabled_screen_is_skipped() {
        let mut layout = stacked_layout();
        layout.top_screen_enabled = false;
        let mut compositor = ScreenCompositor::new();
        let mut list = CommandList::new();
        compositor.draw_screens(
            &mut list,
            &screens(),
            &layout,
            &view(StereoRenderMode::Off),
            PipelineVariant::Standard,
            [0.0; 4],
            false,
        );
        let draws = draws(&list);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].1.screen_id_l, SCREEN_BOTTOM);
    }

    #[test]
    fn test_additional_screen_draws_third_region() {
        let mut layout = stacked_layout();
        layout.additional_screen = Some(Rect::new(0, 0, 200, 120));
        let (_, list) = {
            let mut compositor = ScreenCompositor::new();
            let mut list = CommandList::new();
            compositor.draw_screens(
                &mut list,
                &screens(),
                &layout,
                &view(StereoRenderMode::Off),
                PipelineVariant::Standard,
                [0.0; 4],
                false,
            );
            (compositor, list)
        };
        assert_eq!(draws(&list).len(), 3);
    }

    #[test]
    fn test_input_resolution_scales() {
        let mut compositor = ScreenCompositor::new();
        let mut list = CommandList::new();
        let mut scaled = view(StereoRenderMode::Off);
        scaled.scale_factor = 2;
        compositor.draw_screens(
            &mut list,
            &screens(),
            &stacked_layout(),
            &scaled,
            PipelineVariant::Standard,
            [0.0; 4],
            false,
        );
        let uniforms = draws(&list)[0].1;
        assert_eq!(uniforms.i_resolution[0], 800.0);
        assert_eq!(uniforms.i_resolution[1], 480.0);
    }
}
