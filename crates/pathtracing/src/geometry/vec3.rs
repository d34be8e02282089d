use std::ops;

#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, PartialOrd)]
pub struct Vec3(pub f32, pub f32, pub f32);

impl Vec3 {
    pub const fn zero() -> Vec3 {
        Vec3(0.0, 0.0, 0.0)
    }

    pub const fn splat(value: f32) -> Vec3 {
        Vec3(value, value, value)
    }

    pub fn square_magnitude(&self) -> f32 {
        self.0 * self.0
            + self.1 * self.1
            + self.2 * self.2
    }

    pub fn length(&self) -> f32 {
        self.square_magnitude().sqrt()
    }

    pub fn dot(a: Vec3, b: Vec3) -> f32 {
        a.0 * b.0 + a.1 * b.1 + a.2 * b.2
    }

    pub fn cross(u: Vec3, v: Vec3) -> Vec3 {
        Vec3(u.1 * v.2 - u.2 * v.1,
            u.2 * v.0 - u.0 * v.2,
            u.0 * v.1 - u.1 * v.0)
    }

    pub fn unit(self) -> Vec3 {
        self / self.length()
    }

    pub fn near_zero(&self) -> bool {
        const EPSILON: f32 = 1e-8;
        self.0.abs() < EPSILON && self.1.abs() < EPSILON && self.2.abs() < EPSILON
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite() && self.1.is_finite() && self.2.is_finite()
    }

    /// Packs into a vec4 slot with `w` in the last lane
    pub fn extend(self, w: f32) -> [f32; 4] {
        [self.0, self.1, self.2, w]
    }
}

impl ops::Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Self) -> Self::Output {
        Vec3(self.0 + rhs.0,
            self.1 + rhs.1,
            self.2 + rhs.2)
    }
}

impl ops::Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        Vec3(self.0 - rhs.0,
            self.1 - rhs.1,
            self.2 - rhs.2)
    }
}

impl ops::Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Self::Output {
        Vec3(self.0 * rhs,
            self.1 * rhs,
            self.2 * rhs)
    }
}

impl ops::Div<f32> for Vec3 {
    type Output = Vec3;
    fn div(self, rhs: f32) -> Self::Output {
        self * (1.0 / rhs)
    }
}

impl From<[f32; 4]> for Vec3 {
    // drops the w lane
    fn from(value: [f32; 4]) -> Self {
        Vec3(value[0], value[1], value[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Vec3(1.0, 0.0, 0.0);
        let y = Vec3(0.0, 1.0, 0.0);
        assert_eq!(Vec3::cross(x, y), Vec3(0.0, 0.0, 1.0));
        assert_eq!(Vec3::cross(y, x), Vec3(0.0, 0.0, -1.0));
    }

    #[test]
    fn is_finite_catches_each_lane() {
        assert!(Vec3(1.0, -2.0, 3.0).is_finite());
        assert!(!Vec3(f32::NAN, 0.0, 0.0).is_finite());
        assert!(!Vec3(0.0, f32::INFINITY, 0.0).is_finite());
        assert!(!Vec3(0.0, 0.0, f32::NEG_INFINITY).is_finite());
    }

    #[test]
    fn extend_keeps_components_in_order() {
        assert_eq!(Vec3(1.0, 2.0, 3.0).extend(4.0), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(Vec3::from([1.0, 2.0, 3.0, 4.0]), Vec3(1.0, 2.0, 3.0));
    }
}
