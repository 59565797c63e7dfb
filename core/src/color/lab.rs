//! sRGB → CIE XYZ → CIE L*a*b*
//!
//! Two stages: gamma expansion of the 0-255 channels followed by the sRGB
//! primaries matrix, then the Lab companding (cube root above the CIE
//! threshold, linear segment below it).

use super::palette::Rgb;
use crate::overlay::FeatureVector;

/// Reference white (X, Y, Z) the Lab coordinates are relative to
pub const REFERENCE_WHITE: [f64; 3] = [94.811, 100.0, 107.304];

const SRGB_THRESHOLD: f64 = 0.04045;
const LAB_EPSILON: f64 = 0.008856;
const LAB_KAPPA: f64 = 7.787;

const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124, 0.3576, 0.1805],
    [0.2126, 0.7152, 0.0722],
    [0.0193, 0.1192, 0.9505],
];

fn expand_channel(c: u8) -> f64 {
    let v = f64::from(c) / 255.0;
    let linear = if v > SRGB_THRESHOLD {
        ((v + 0.055) / 1.055).powf(2.4)
    } else {
        v / 12.92
    };
    linear * 100.0
}

fn compand(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_KAPPA * t + 16.0 / 116.0
    }
}

/// sRGB to CIE XYZ, scaled so that Y of white is 100
pub fn rgb_to_xyz(rgb: Rgb) -> [f64; 3] {
    let linear = [expand_channel(rgb.r), expand_channel(rgb.g), expand_channel(rgb.b)];
    let mut xyz = [0.0; 3];
    for (out, row) in xyz.iter_mut().zip(RGB_TO_XYZ.iter()) {
        *out = row.iter().zip(linear.iter()).map(|(m, c)| m * c).sum();
    }
    xyz
}

/// CIE XYZ to CIE L*a*b* against [`REFERENCE_WHITE`]
pub fn xyz_to_lab(xyz: [f64; 3]) -> FeatureVector {
    let fx = compand(xyz[0] / REFERENCE_WHITE[0]);
    let fy = compand(xyz[1] / REFERENCE_WHITE[1]);
    let fz = compand(xyz[2] / REFERENCE_WHITE[2]);

    FeatureVector::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

pub fn rgb_to_lab(rgb: Rgb) -> FeatureVector {
    xyz_to_lab(rgb_to_xyz(rgb))
}
