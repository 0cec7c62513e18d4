use std::ops::{Add, AddAssign, Mul, Sub};

/// Plain 2D vector used for positions, velocities and steering forces.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Unit vector for a heading angle in radians.
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        Vec2::new(angle.cos(), angle.sin())
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn distance_to(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    /// Scales to unit length. A zero vector is returned unchanged rather
    /// than dividing by zero.
    #[inline]
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            Vec2::new(self.x / len, self.y / len)
        } else {
            self
        }
    }

    /// Clamps the magnitude to `max`, preserving direction.
    #[inline]
    pub fn limited(self, max: f32) -> Vec2 {
        let len = self.length();
        if len > max {
            Vec2::new(self.x / len * max, self.y / len * max)
        } else {
            self
        }
    }

    /// Facing angle so a sprite drawn pointing "up" looks along the vector.
    #[inline]
    pub fn heading(self) -> f32 {
        self.y.atan2(self.x) + std::f32::consts::FRAC_PI_2
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}
