//! Layout unit conversions. Every width, height, margin and border
//! thickness in the emitted HTML goes through these.

const TWIPS_PER_INCH: i64 = 1440;
const PX_PER_INCH: i64 = 96;
const EMU_PER_PX: f64 = 9525.0;

/// Twentieths of a point to CSS pixels at 96 DPI, truncating.
pub fn twips_to_px(twips: i64) -> i64 {
    twips * PX_PER_INCH / TWIPS_PER_INCH
}

pub fn pt_to_px(pt: f64) -> i64 {
    (pt * 96.0 / 72.0).round() as i64
}

pub fn half_points_to_pt(half_points: u32) -> f32 {
    half_points as f32 / 2.0
}

/// Border `w:sz` is measured in eighths of a point. Visible borders never
/// collapse below one pixel.
pub fn eighth_points_to_px(sz: u32) -> u32 {
    pt_to_px(sz as f64 / 8.0).max(1) as u32
}

pub fn emu_to_px(emu: i64) -> i64 {
    (emu as f64 / EMU_PER_PX).round() as i64
}
