//! Value to colour mapping for heatmap cells

use egui::Color32;

/// Colour of a zero cell
pub const LOW_COLOR: Color32 = Color32::from_rgb(80, 160, 220);

/// Colour of a cell at the running maximum
pub const HIGH_COLOR: Color32 = Color32::from_rgb(255, 90, 20);

/// Cell text over dark fills
pub const LIGHT_TEXT: Color32 = Color32::from_rgb(250, 250, 250);

/// Cell text over light fills
pub const DARK_TEXT: Color32 = Color32::from_rgb(24, 24, 24);

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
}

/// Interpolate between [`LOW_COLOR`] and [`HIGH_COLOR`]; `t` is clamped
/// to `[0, 1]`
pub fn heat_color(t: f32) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    Color32::from_rgb(
        lerp_channel(LOW_COLOR.r(), HIGH_COLOR.r(), t),
        lerp_channel(LOW_COLOR.g(), HIGH_COLOR.g(), t),
        lerp_channel(LOW_COLOR.b(), HIGH_COLOR.b(), t),
    )
}

/// Text colour that stays legible over `heat_color(t)`
pub fn text_color(t: f32, threshold: f32) -> Color32 {
    if t >= threshold {
        LIGHT_TEXT
    } else {
        DARK_TEXT
    }
}

/// Squared RGB distance, for "close to" checks
pub fn color_distance(a: Color32, b: Color32) -> u32 {
    let d = |x: u8, y: u8| (x as i32 - y as i32).pow(2) as u32;
    d(a.r(), b.r()) + d(a.g(), b.g()) + d(a.b(), b.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchors() {
        assert_eq!(heat_color(0.0), LOW_COLOR);
        assert_eq!(heat_color(1.0), HIGH_COLOR);
        assert_eq!(heat_color(7.0), HIGH_COLOR);
        assert_eq!(heat_color(f32::NAN), LOW_COLOR);
    }

    #[test]
    fn test_midpoint() {
        let mid = heat_color(0.5);
        assert_eq!(mid, Color32::from_rgb(168, 125, 120));
    }

    #[test]
    fn test_text_contrast_switches_at_threshold() {
        assert_eq!(text_color(0.2, 0.5), DARK_TEXT);
        assert_eq!(text_color(0.5, 0.5), LIGHT_TEXT);
        assert_eq!(text_color(0.9, 0.5), LIGHT_TEXT);
    }

    #[test]
    fn test_color_distance() {
        assert_eq!(color_distance(LOW_COLOR, LOW_COLOR), 0);
        assert!(color_distance(heat_color(0.04), LOW_COLOR) < color_distance(heat_color(0.04), HIGH_COLOR));
    }
}
