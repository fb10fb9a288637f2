use macroquad::prelude::*;

/// Rotated coordinate frame of a tile, pivoting on its top-left corner.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub origin: Vec2,
    pub x_axis: Vec2,
    pub y_axis: Vec2,
}

impl Frame {
    /// Positive angles turn clockwise on screen, since y points down.
    pub fn new(origin: Vec2, angle_deg: f32) -> Self {
        if angle_deg == 0.0 {
            return Self {
                origin,
                x_axis: Vec2::X,
                y_axis: Vec2::Y,
            };
        }
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        Self {
            origin,
            x_axis: vec2(cos, sin),
            y_axis: vec2(-sin, cos),
        }
    }

    #[inline]
    pub fn is_axis_aligned(&self) -> bool {
        self.x_axis == Vec2::X && self.y_axis == Vec2::Y
    }

    /// Maps a tile-local point to scene space.
    #[inline]
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        if self.is_axis_aligned() {
            return self.origin + local;
        }
        self.origin + self.x_axis * local.x + self.y_axis * local.y
    }

    #[inline]
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        let d = world - self.origin;
        vec2(d.dot(self.x_axis), d.dot(self.y_axis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quarter_turn_maps_x_to_y() {
        let frame = Frame::new(vec2(10.0, 10.0), 90.0);
        let p = frame.to_world(vec2(5.0, 0.0));
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(p.y, 15.0, epsilon = 1e-4);

        let back = frame.to_local(p);
        assert_relative_eq!(back.x, 5.0, epsilon = 1e-4);
        assert_relative_eq!(back.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn zero_angle_is_a_plain_translation() {
        let frame = Frame::new(vec2(3.0, 4.0), 0.0);
        assert_eq!(frame.to_world(vec2(1.5, 2.5)), vec2(4.5, 6.5));
    }
}
