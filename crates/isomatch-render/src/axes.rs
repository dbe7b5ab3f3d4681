//! Coordinate axes actor.

use glam::Vec3;

use crate::scene::LineActor;

/// Unit-length axes at the origin: +x red, +y green, +z blue.
#[must_use]
pub fn axes_actor() -> LineActor {
    let mut positions = Vec::with_capacity(6);
    let mut colors = Vec::with_capacity(6);
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        positions.extend([Vec3::ZERO, axis]);
        colors.extend([axis, axis]);
    }
    LineActor {
        name: "axes".to_string(),
        positions,
        colors,
        visible: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_colors_match_directions() {
        let axes = axes_actor();
        assert_eq!(axes.num_segments(), 3);
        for segment in 0..3 {
            let tip = axes.positions[2 * segment + 1];
            assert_eq!(axes.positions[2 * segment], Vec3::ZERO);
            assert_eq!(axes.colors[2 * segment + 1], tip);
            assert_eq!(tip.length(), 1.0);
        }
        assert_eq!(axes.bounds(), Some((Vec3::ZERO, Vec3::ONE)));
    }
}
