//! Color assignment and perceptual feature space
//!
//! Every node carries a display color. Distance ranking never looks at the
//! raw sRGB triple: colors are mapped into CIE L*a*b*, where Euclidean
//! distance roughly tracks perceived difference.

pub mod lab;
pub mod palette;

pub use lab::{rgb_to_lab, rgb_to_xyz, xyz_to_lab};
pub use palette::{group_counts, ColorGroup, ColorPolicy, Rgb};
