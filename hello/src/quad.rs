//! Fixed data for the rectangle, uploaded once at startup.

#[rustfmt::skip]
pub const VERTICES: [f32; 12] = [
     0.5,  0.5, 0.0, // top right
     0.5, -0.5, 0.0, // bottom right
    -0.5, -0.5, 0.0, // bottom left
    -0.5,  0.5, 0.0, // top left
];

/// Two triangles sharing the 1-3 diagonal.
pub const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

pub const CLEAR_COLOR: [f32; 3] = [0.2, 0.3, 0.3];

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(i: u32) -> (f32, f32) {
        let i = i as usize * 3;
        (VERTICES[i], VERTICES[i + 1])
    }

    fn area(triangle: &[u32]) -> f32 {
        let (ax, ay) = corner(triangle[0]);
        let (bx, by) = corner(triangle[1]);
        let (cx, cy) = corner(triangle[2]);

        ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay)).abs() / 2.0
    }

    #[test]
    fn every_index_references_a_vertex() {
        let vertices = VERTICES.len() / 3;

        assert!(INDICES.iter().all(|i| (*i as usize) < vertices));
    }

    #[test]
    fn all_four_corners_are_drawn() {
        for corner in 0..4 {
            assert!(INDICES.contains(&corner));
        }
    }

    #[test]
    fn two_triangles_cover_the_rectangle() {
        let (first, second) = INDICES.split_at(3);

        // Half the unit rectangle each.
        assert_eq!(area(first), 0.5);
        assert_eq!(area(second), 0.5);

        // Both share the 1-3 diagonal.
        for i in [1, 3] {
            assert!(first.contains(&i));
            assert!(second.contains(&i));
        }
    }

    #[test]
    fn vertices_stay_inside_the_unit_rectangle() {
        for chunk in VERTICES.chunks(3) {
            assert!(chunk[0].abs() <= 0.5);
            assert!(chunk[1].abs() <= 0.5);
            assert_eq!(chunk[2], 0.0);
        }
    }
}
