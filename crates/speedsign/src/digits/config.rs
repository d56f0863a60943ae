/// Tuning for digit segmentation, classification and validation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DigitConfig {
    /// Radius of the square that grows the region outside the sign polygon
    /// before it is cut from the edge map (2 -> 5x5). Removes the sign rim.
    pub outside_dilate_radius: u8,
    /// Radius of the square used to build the dilated variant (1 -> 3x3).
    pub dilated_variant_radius: u8,
    /// Absolute minimum glyph height in pixels.
    pub min_glyph_height_px: i32,
    /// Minimum glyph height as a fraction of the sign height.
    pub min_glyph_height_frac: f64,
    /// Maximum glyph bounding-box area as a fraction of the sign area.
    pub max_glyph_area_frac: f64,
    /// Rectification angles beyond this magnitude are ignored (degrees).
    pub max_rectify_angle_deg: f64,
    /// Seed nudging continues while the mask value is at least this.
    pub seed_intensity_threshold: u8,
    /// Maximum number of diagonal nudges applied to the seed.
    pub seed_max_steps: u32,
    /// Flood fill accepts values down to `seed - flood_lo_diff`.
    pub flood_lo_diff: u8,
    /// Flood fill accepts values up to `seed + flood_up_diff`.
    pub flood_up_diff: u8,
    /// Glyphs with `width <= thin_glyph_ratio * height` read as 1 without
    /// consulting the classifier.
    pub thin_glyph_ratio: f64,
    /// Resampled glyph pixels above this become 1.0 in the classifier input.
    pub binarize_threshold: u8,
    /// Three-digit readings above this are flagged.
    pub max_plausible_speed: u32,
}

impl Default for DigitConfig {
    fn default() -> Self {
        Self {
            outside_dilate_radius: 2,
            dilated_variant_radius: 1,
            min_glyph_height_px: 20,
            min_glyph_height_frac: 0.25,
            max_glyph_area_frac: 0.5,
            max_rectify_angle_deg: 45.0,
            seed_intensity_threshold: 20,
            seed_max_steps: 10,
            flood_lo_diff: 20,
            flood_up_diff: 100,
            thin_glyph_ratio: 0.3,
            binarize_threshold: 20,
            max_plausible_speed: 130,
        }
    }
}
