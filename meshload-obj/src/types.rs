//
// Vec3
//

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct V3(pub f32, pub f32, pub f32); // x, y, z

impl V3 {
    pub const ZERO: V3 = V3(0.0, 0.0, 0.0);
    pub const ONE: V3  = V3(1.0, 1.0, 1.0);

    pub fn x(&self) -> f32 {
        self.0
    }

    pub fn y(&self) -> f32 {
        self.1
    }

    pub fn z(&self) -> f32 {
        self.2
    }
}

//
// Vec4
//

/// A homogeneous coordinate. Positions and normals carry an optional weight
/// which defaults to 1.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct V4(pub f32, pub f32, pub f32, pub f32); // x, y, z, w

impl V4 {
    pub fn xyz(&self) -> V3 {
        V3(self.0, self.1, self.2)
    }

    pub fn w(&self) -> f32 {
        self.3
    }
}

impl Default for V4 {
    fn default() -> Self {
        V4(0.0, 0.0, 0.0, 1.0)
    }
}
