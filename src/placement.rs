//! Placement of a positioned object relative to the aircraft origin.

use crate::util::DVec3;

/// Rotation and offset of one positioned object.
///
/// Angles are degrees, offsets are metres. Produced by
/// [`crate::acf::find_placement`] and read-only afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    /// Yaw, about Y.
    pub psi: f64,
    /// Pitch, about X.
    pub theta: f64,
    /// Roll, about Z.
    pub phi: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub offset_z: f64,
}

impl Placement {
    /// Placement that leaves every vertex where it is.
    pub const IDENTITY: Self = Self {
        psi: 0.0,
        theta: 0.0,
        phi: 0.0,
        offset_x: 0.0,
        offset_y: 0.0,
        offset_z: 0.0,
    };

    /// Translation as a vector.
    #[inline]
    pub fn offset(&self) -> DVec3 {
        DVec3::new(self.offset_x, self.offset_y, self.offset_z)
    }

    /// False only when all three angles are exactly zero.
    #[inline]
    pub fn has_rotation(&self) -> bool {
        self.psi != 0.0 || self.theta != 0.0 || self.phi != 0.0
    }

    /// False only when all three offsets are exactly zero.
    #[inline]
    pub fn has_offset(&self) -> bool {
        self.offset_x != 0.0 || self.offset_y != 0.0 || self.offset_z != 0.0
    }
}
