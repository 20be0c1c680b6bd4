/// Confidence colors for the class buttons
///
/// A confidence in [0, 1] is mapped onto the viridis colormap (dark purple
/// for 0, yellow for 1) by linear interpolation between evenly spaced stops.

/// viridis sampled at 10 evenly spaced points
const VIRIDIS_STOPS: [[u8; 3]; 10] = [
    [0x44, 0x01, 0x54],
    [0x48, 0x28, 0x78],
    [0x3e, 0x49, 0x89],
    [0x31, 0x68, 0x8e],
    [0x26, 0x82, 0x8e],
    [0x1f, 0x9e, 0x89],
    [0x35, 0xb7, 0x79],
    [0x6e, 0xce, 0x58],
    [0xb5, 0xde, 0x2b],
    [0xfd, 0xe7, 0x25],
];

/// Below this confidence the fill is dark enough for white text
const LIGHT_TEXT_THRESHOLD: f32 = 0.5;

/// Fill and text color for a class button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceColor {
    pub fill: [u8; 3],
    /// White text when true, black otherwise
    pub light_text: bool,
}

/// Map a confidence onto viridis. NaN is treated as 0.
pub fn viridis(value: f32) -> [u8; 3] {
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    let scaled = value * (VIRIDIS_STOPS.len() - 1) as f32;
    let lower = (scaled.floor() as usize).min(VIRIDIS_STOPS.len() - 2);
    let t = scaled - lower as f32;

    let (a, b) = (VIRIDIS_STOPS[lower], VIRIDIS_STOPS[lower + 1]);
    let mut rgb = [0u8; 3];
    for channel in 0..3 {
        let mixed = a[channel] as f32 + (b[channel] as f32 - a[channel] as f32) * t;
        rgb[channel] = mixed.round() as u8;
    }
    rgb
}

pub fn confidence_color(value: f32) -> ConfidenceColor {
    ConfidenceColor {
        fill: viridis(value),
        light_text: !(value >= LIGHT_TEXT_THRESHOLD),
    }
}
