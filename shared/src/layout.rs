//! Output window layout geometry.
//!
//! A `FramebufferLayout` tells the renderer where each emulated screen lands
//! inside the host window. Layouts are recomputed on window resize or when
//! the user changes the layout option; the renderer only ever reads them.

use crate::{
    BOTTOM_SCREEN_HEIGHT, BOTTOM_SCREEN_WIDTH, TOP_SCREEN_HEIGHT, TOP_SCREEN_WIDTH,
};

/// Axis-aligned rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rect {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn width(&self) -> u32 {
        self.right - self.left
    }

    pub const fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Orientation transform applied when mapping a screen quad to the window.
///
/// The emulated framebuffers are stored rotated a quarter turn, so the
/// regular landscape presentation already applies one rotation; the portrait
/// variants present the raw buffer orientation instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOrientation {
    Landscape,
    Portrait,
    LandscapeFlipped,
    PortraitFlipped,
}

impl DisplayOrientation {
    /// Orientation for a layout's rotation flag plus the flipped-output flag.
    pub fn from_layout(is_rotated: bool, flipped: bool) -> Self {
        match (is_rotated, flipped) {
            (true, false) => DisplayOrientation::Landscape,
            (false, false) => DisplayOrientation::Portrait,
            (true, true) => DisplayOrientation::LandscapeFlipped,
            (false, true) => DisplayOrientation::PortraitFlipped,
        }
    }
}

/// Horizontal right-eye offsets for the cardboard VR layout, relative to the
/// right half of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CardboardSettings {
    pub top_screen_right_eye: u32,
    pub bottom_screen_right_eye: u32,
}

/// Where each emulated screen is presented inside the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferLayout {
    pub width: u32,
    pub height: u32,
    pub top_screen: Rect,
    pub bottom_screen: Rect,
    pub top_screen_enabled: bool,
    pub bottom_screen_enabled: bool,
    /// Extra region for multi-window layouts that show one screen twice.
    pub additional_screen: Option<Rect>,
    pub is_rotated: bool,
    pub cardboard: CardboardSettings,
}

/// Largest integer-position rectangle of the given aspect that fits `area`,
/// centered.
fn fit_within(area: Rect, screen_width: u32, screen_height: u32) -> Rect {
    let scale = (area.width() as f32 / screen_width as f32)
        .min(area.height() as f32 / screen_height as f32);
    let scaled_width = (screen_width as f32 * scale).round() as u32;
    let scaled_height = (screen_height as f32 * scale).round() as u32;
    let left = area.left + (area.width() - scaled_width) / 2;
    let top = area.top + (area.height() - scaled_height) / 2;
    Rect::new(left, top, left + scaled_width, top + scaled_height)
}

impl FramebufferLayout {
    /// Stacked layout: top screen above the bottom screen, each scaled to
    /// the largest size that fits its half of the window.
    ///
    /// With `swap_screens` the bottom screen takes the upper half.
    pub fn default_layout(width: u32, height: u32, swap_screens: bool) -> Self {
        let upper = Rect::new(0, 0, width, height / 2);
        let lower = Rect::new(0, height / 2, width, height);

        let (top_area, bottom_area) = if swap_screens {
            (lower, upper)
        } else {
            (upper, lower)
        };

        Self {
            width,
            height,
            top_screen: fit_within(top_area, TOP_SCREEN_WIDTH, TOP_SCREEN_HEIGHT),
            bottom_screen: fit_within(bottom_area, BOTTOM_SCREEN_WIDTH, BOTTOM_SCREEN_HEIGHT),
            top_screen_enabled: true,
            bottom_screen_enabled: true,
            additional_screen: None,
            is_rotated: true,
            cardboard: CardboardSettings::default(),
        }
    }

    /// One screen filling the whole window; shows the top screen unless
    /// `swap_screens` is set.
    pub fn single_screen_layout(width: u32, height: u32, swap_screens: bool) -> Self {
        let area = Rect::new(0, 0, width, height);
        let (top, bottom) = if swap_screens {
            (
                Rect::default(),
                fit_within(area, BOTTOM_SCREEN_WIDTH, BOTTOM_SCREEN_HEIGHT),
            )
        } else {
            (
                fit_within(area, TOP_SCREEN_WIDTH, TOP_SCREEN_HEIGHT),
                Rect::default(),
            )
        };

        Self {
            width,
            height,
            top_screen: top,
            bottom_screen: bottom,
            top_screen_enabled: !swap_screens,
            bottom_screen_enabled: swap_screens,
            additional_screen: None,
            is_rotated: true,
            cardboard: CardboardSettings::default(),
        }
    }

    /// Layout for one window of the separate-windows mode. The primary
    /// window shows the top screen, the secondary the bottom screen;
    /// `swap_screens` trades them.
    pub fn separate_windows_layout(
        width: u32,
        height: u32,
        is_secondary: bool,
        swap_screens: bool,
    ) -> Self {
        Self::single_screen_layout(width, height, is_secondary != swap_screens)
    }

    /// Cardboard VR layout: both screens stacked inside the left half of the
    /// window, with right-eye offsets pointing at the mirrored position in
    /// the right half.
    pub fn cardboard_vr_layout(width: u32, height: u32) -> Self {
        let eye = Rect::new(0, 0, width / 2, height);
        let upper = Rect::new(eye.left, eye.top, eye.right, eye.height() / 2);
        let lower = Rect::new(eye.left, eye.height() / 2, eye.right, eye.bottom);

        let top_screen = fit_within(upper, TOP_SCREEN_WIDTH, TOP_SCREEN_HEIGHT);
        let bottom_screen = fit_within(lower, BOTTOM_SCREEN_WIDTH, BOTTOM_SCREEN_HEIGHT);

        Self {
            width,
            height,
            top_screen,
            bottom_screen,
            top_screen_enabled: true,
            bottom_screen_enabled: true,
            additional_screen: None,
            is_rotated: true,
            cardboard: CardboardSettings {
                top_screen_right_eye: top_screen.left,
                bottom_screen_right_eye: bottom_screen.left,
            },
        }
    }

    pub fn orientation(&self, flipped: bool) -> DisplayOrientation {
        DisplayOrientation::from_layout(self.is_rotated, flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(40, 240, 360, 480);
        assert_eq!(r.width(), 320);
        assert_eq!(r.height(), 240);
    }

    #[test]
    fn test_default_layout_stacked() {
        let layout = FramebufferLayout::default_layout(400, 480, false);
        assert_eq!(layout.top_screen, Rect::new(0, 0, 400, 240));
        assert_eq!(layout.bottom_screen, Rect::new(40, 240, 360, 480));
        assert!(layout.top_screen_enabled);
        assert!(layout.bottom_screen_enabled);
        assert!(layout.is_rotated);
    }

    #[test]
    fn test_default_layout_swapped_puts_bottom_on_top() {
        let layout = FramebufferLayout::default_layout(400, 480, true);
        assert_eq!(layout.bottom_screen, Rect::new(40, 0, 360, 240));
        assert_eq!(layout.top_screen, Rect::new(0, 240, 400, 480));
    }

    #[test]
    fn test_default_layout_scales_up() {
        let layout = FramebufferLayout::default_layout(800, 960, false);
        assert_eq!(layout.top_screen, Rect::new(0, 0, 800, 480));
        assert_eq!(layout.bottom_screen, Rect::new(80, 480, 720, 960));
    }

    #[test]
    fn test_single_screen_layout() {
        let layout = FramebufferLayout::single_screen_layout(800, 480, false);
        assert_eq!(layout.top_screen, Rect::new(0, 0, 800, 480));
        assert!(layout.top_screen_enabled);
        assert!(!layout.bottom_screen_enabled);

        let swapped = FramebufferLayout::single_screen_layout(640, 480, true);
        assert!(!swapped.top_screen_enabled);
        assert!(swapped.bottom_screen_enabled);
        assert_eq!(swapped.bottom_screen, Rect::new(0, 0, 640, 480));
    }

    #[test]
    fn test_separate_windows_layout() {
        let primary = FramebufferLayout::separate_windows_layout(800, 480, false, false);
        assert!(primary.top_screen_enabled);
        let secondary = FramebufferLayout::separate_windows_layout(800, 480, true, false);
        assert!(secondary.bottom_screen_enabled);
        let swapped_primary = FramebufferLayout::separate_windows_layout(800, 480, false, true);
        assert!(swapped_primary.bottom_screen_enabled);
    }

    #[test]
    fn test_cardboard_layout_offsets() {
        let layout = FramebufferLayout::cardboard_vr_layout(800, 480);
        // Screens fit inside the left half; the right-eye offsets mirror the
        // left-eye positions into the right half.
        assert!(layout.top_screen.right <= 400);
        assert_eq!(layout.cardboard.top_screen_right_eye, layout.top_screen.left);
        assert_eq!(
            layout.cardboard.bottom_screen_right_eye,
            layout.bottom_screen.left
        );
    }

    #[test]
    fn test_orientation_from_layout() {
        assert_eq!(
            DisplayOrientation::from_layout(true, false),
            DisplayOrientation::Landscape
        );
        assert_eq!(
            DisplayOrientation::from_layout(false, false),
            DisplayOrientation::Portrait
        );
        assert_eq!(
            DisplayOrientation::from_layout(true, true),
            DisplayOrientation::LandscapeFlipped
        );
        assert_eq!(
            DisplayOrientation::from_layout(false, true),
            DisplayOrientation::PortraitFlipped
        );
    }
}
