use glam::DVec2;

/// World units moved per translate event.
pub const MOVE_SPEED: f64 = 2.0;
/// Radians turned per rotate event.
pub const TURN_STEP: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

/// Movable first-person viewpoint: a world position, a facing vector, and a
/// field-of-view plane perpendicular to it. The plane's magnitude relative to
/// the facing vector sets how wide the view fans out; equal magnitudes give a
/// 90 degree field of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub position: DVec2,
    pub facing: DVec2,
    pub fov_plane: DVec2,
}

impl Viewpoint {
    pub fn new(position: DVec2, facing: DVec2, fov_plane: DVec2) -> Self {
        Self {
            position,
            facing,
            fov_plane,
        }
    }

    /// Cardinal translation in world space. Up and Left move toward negative
    /// Y and X. The grid is not consulted: callers that want wall collision
    /// must clamp the position themselves.
    pub fn translate(&mut self, direction: Direction, speed: f64) {
        self.position += match direction {
            Direction::Up => DVec2::new(0.0, -speed),
            Direction::Down => DVec2::new(0.0, speed),
            Direction::Left => DVec2::new(-speed, 0.0),
            Direction::Right => DVec2::new(speed, 0.0),
        };
    }

    /// Rotate the facing vector and the fov plane together by `angle_step`
    /// radians, negated for a left turn. Both vectors turn by the same angle,
    /// which keeps the plane perpendicular to the facing vector.
    pub fn rotate(&mut self, turn: Turn, angle_step: f64) {
        let theta = match turn {
            Turn::Left => -angle_step,
            Turn::Right => angle_step,
        };
        let rotation = DVec2::from_angle(theta);
        self.facing = rotation.rotate(self.facing);
        self.fov_plane = rotation.rotate(self.fov_plane);
    }

    /// Ray direction for a screen column, sweeping the fov plane from -1 at
    /// column 0 to +1 at column `screen_width`.
    #[inline]
    pub fn ray_direction(&self, column: usize, screen_width: usize) -> DVec2 {
        let camera_x = 2.0 * column as f64 / screen_width as f64 - 1.0;
        self.facing + self.fov_plane * camera_x
    }
}
