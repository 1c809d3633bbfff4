//! Small value types shared by the data model and the runtime.

use std::f32::consts::{PI, TAU};

/// Wraps an angle in radians into `(-PI, PI]`.
pub fn normalize_radian(value: f32) -> f32 {
    let mut value = (value + PI) % TAU;
    if value < 0.0 {
        value += TAU;
    }
    let value = value - PI;
    if value <= -PI { value + TAU } else { value }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
        }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Local bone transform. Skews are radians; a skew pair of equal values is a rotation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub skew_x: f32,
    pub skew_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        skew_x: 0.0,
        skew_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn from_translation(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(radians: f32) -> Self {
        Self {
            skew_x: radians,
            skew_y: radians,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Interpolates position and scale linearly and skews along the shortest arc.
    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        Self {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
            skew_x: self.skew_x + normalize_radian(to.skew_x - self.skew_x) * t,
            skew_y: self.skew_y + normalize_radian(to.skew_y - self.skew_y) * t,
            scale_x: lerp(self.scale_x, to.scale_x, t),
            scale_y: lerp(self.scale_y, to.scale_y, t),
        }
    }

    pub fn to_matrix(&self) -> Matrix {
        let (sin_x, cos_x) = self.skew_x.sin_cos();
        let (sin_y, cos_y) = self.skew_y.sin_cos();
        Matrix {
            a: self.scale_x * cos_y,
            b: self.scale_x * sin_y,
            c: -self.scale_y * sin_x,
            d: self.scale_y * cos_x,
            tx: self.x,
            ty: self.y,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 2x3 affine matrix: `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Returns `self * local`, i.e. `local` expressed in the space `self` maps into.
    pub fn concat(&self, local: &Matrix) -> Matrix {
        Matrix {
            a: self.a * local.a + self.c * local.b,
            b: self.b * local.a + self.d * local.b,
            c: self.a * local.c + self.c * local.d,
            d: self.b * local.c + self.d * local.d,
            tx: self.a * local.tx + self.c * local.ty + self.tx,
            ty: self.b * local.tx + self.d * local.ty + self.ty,
        }
    }

    pub fn transform_point(&self, point: Point) -> Point {
        Point {
            x: self.a * point.x + self.c * point.y + self.tx,
            y: self.b * point.x + self.d * point.y + self.ty,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorTransform {
    pub alpha_multiplier: f32,
    pub red_multiplier: f32,
    pub green_multiplier: f32,
    pub blue_multiplier: f32,
    pub alpha_offset: f32,
    pub red_offset: f32,
    pub green_offset: f32,
    pub blue_offset: f32,
}

impl ColorTransform {
    pub const IDENTITY: Self = Self {
        alpha_multiplier: 1.0,
        red_multiplier: 1.0,
        green_multiplier: 1.0,
        blue_multiplier: 1.0,
        alpha_offset: 0.0,
        red_offset: 0.0,
        green_offset: 0.0,
        blue_offset: 0.0,
    };

    pub fn from_multipliers(alpha: f32, red: f32, green: f32, blue: f32) -> Self {
        Self {
            alpha_multiplier: alpha,
            red_multiplier: red,
            green_multiplier: green,
            blue_multiplier: blue,
            ..Self::IDENTITY
        }
    }

    fn to_array(self) -> [f32; 8] {
        [
            self.alpha_multiplier,
            self.red_multiplier,
            self.green_multiplier,
            self.blue_multiplier,
            self.alpha_offset,
            self.red_offset,
            self.green_offset,
            self.blue_offset,
        ]
    }

    fn from_array(v: [f32; 8]) -> Self {
        Self {
            alpha_multiplier: v[0],
            red_multiplier: v[1],
            green_multiplier: v[2],
            blue_multiplier: v[3],
            alpha_offset: v[4],
            red_offset: v[5],
            green_offset: v[6],
            blue_offset: v[7],
        }
    }

    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        let from = self.to_array();
        let to = to.to_array();
        Self::from_array(std::array::from_fn(|i| lerp(from[i], to[i], t)))
    }

    /// Adds `value`'s deviation from identity, scaled by `weight`.
    pub fn add_weighted(&self, value: &Self, weight: f32) -> Self {
        let base = self.to_array();
        let value = value.to_array();
        let identity = Self::IDENTITY.to_array();
        Self::from_array(std::array::from_fn(|i| {
            base[i] + (value[i] - identity[i]) * weight
        }))
    }
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(feature = "glam")]
impl From<Matrix> for glam::Affine2 {
    fn from(m: Matrix) -> Self {
        glam::Affine2::from_cols_array(&[m.a, m.b, m.c, m.d, m.tx, m.ty])
    }
}

#[cfg(feature = "glam")]
impl From<glam::Affine2> for Matrix {
    fn from(m: glam::Affine2) -> Self {
        let [a, b, c, d, tx, ty] = m.to_cols_array();
        Self { a, b, c, d, tx, ty }
    }
}

#[cfg(feature = "glam")]
impl From<Point> for glam::Vec2 {
    fn from(p: Point) -> Self {
        glam::Vec2::new(p.x, p.y)
    }
}

#[cfg(feature = "glam")]
impl From<glam::Vec2> for Point {
    fn from(v: glam::Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}
