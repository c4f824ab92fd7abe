//! Object transforms.

use serde::{Deserialize, Serialize};

/// Location, XYZ Euler rotation (radians) and scale of an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub location: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Transform {
    /// Transform with only a location.
    pub fn at(location: [f32; 3]) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }

    /// Sets the scale.
    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the rotation.
    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn has_unit_scale(&self) -> bool {
        self.scale == [1.0; 3]
    }

    /// Rotation matrix (row-major) for an XYZ Euler rotation: `Rz * Ry * Rx`.
    pub fn rotation_matrix(&self) -> [[f32; 3]; 3] {
        let [x, y, z] = self.rotation;
        let (sx, cx) = x.sin_cos();
        let (sy, cy) = y.sin_cos();
        let (sz, cz) = z.sin_cos();
        [
            [cy * cz, sx * sy * cz - cx * sz, cx * sy * cz + sx * sz],
            [cy * sz, sx * sy * sz + cx * cz, cx * sy * sz - sx * cz],
            [-sy, sx * cy, cx * cy],
        ]
    }

    /// Maps an object-space point to world space.
    pub fn to_world(&self, p: [f32; 3]) -> [f32; 3] {
        let s = [p[0] * self.scale[0], p[1] * self.scale[1], p[2] * self.scale[2]];
        let r = mul(&self.rotation_matrix(), s);
        [
            r[0] + self.location[0],
            r[1] + self.location[1],
            r[2] + self.location[2],
        ]
    }

    /// Maps a world-space point into this object's space.
    ///
    /// Zero scale components collapse to zero instead of dividing by zero.
    pub fn to_local(&self, p: [f32; 3]) -> [f32; 3] {
        let t = [
            p[0] - self.location[0],
            p[1] - self.location[1],
            p[2] - self.location[2],
        ];
        let m = self.rotation_matrix();
        let r = [
            m[0][0] * t[0] + m[1][0] * t[1] + m[2][0] * t[2],
            m[0][1] * t[0] + m[1][1] * t[1] + m[2][1] * t[2],
            m[0][2] * t[0] + m[1][2] * t[1] + m[2][2] * t[2],
        ];
        let inv = |v: f32, s: f32| if s == 0.0 { 0.0 } else { v / s };
        [
            inv(r[0], self.scale[0]),
            inv(r[1], self.scale[1]),
            inv(r[2], self.scale[2]),
        ]
    }
}

fn mul(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_world_local_inverse() {
        let t = Transform::at([1.0, -2.0, 3.0])
            .with_rotation([0.3, -1.1, 2.0])
            .with_scale([2.0, 0.5, 3.0]);
        let p = [0.25, 4.0, -1.5];
        assert!(close(t.to_local(t.to_world(p)), p));
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let t = Transform::default().with_rotation([0.0, 0.0, std::f32::consts::FRAC_PI_2]);
        assert!(close(t.to_world([1.0, 0.0, 0.0]), [0.0, 1.0, 0.0]));
    }
}
