//! `VT` vertex records.

use std::fmt;

use super::TAG_VERTEX;
use crate::placement::Placement;
use crate::util::math::rotate_roll_pitch_yaw;
use crate::util::{DVec2, DVec3, Error, Result};

/// Number of numeric fields following the `VT` tag.
pub const VERTEX_FIELDS: usize = 8;

/// One entry of the shared vertex table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: DVec3,
    pub normal: DVec3,
    pub uv: DVec2,
}

impl Vertex {
    pub fn new(position: DVec3, normal: DVec3, uv: DVec2) -> Self {
        Self { position, normal, uv }
    }

    /// Parse `VT x y z nx ny nz u v`.
    ///
    /// Fields may be separated by any whitespace. A trailing `#` comment is
    /// dropped; anything else beyond the eight values is an error.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(TAG_VERTEX) {
            return Err(Error::parse(line_no, "not a VT line"));
        }

        let mut values = [0.0_f64; VERTEX_FIELDS];
        let mut count = 0;
        for tok in tokens {
            if tok.starts_with('#') {
                break;
            }
            if count == VERTEX_FIELDS {
                return Err(Error::parse(
                    line_no,
                    format!("VT has more than {VERTEX_FIELDS} values"),
                ));
            }
            values[count] = tok
                .parse()
                .map_err(|_| Error::parse(line_no, format!("VT value '{tok}' is not a number")))?;
            count += 1;
        }
        if count != VERTEX_FIELDS {
            return Err(Error::parse(
                line_no,
                format!("VT needs {VERTEX_FIELDS} values, found {count}"),
            ));
        }

        let [x, y, z, nx, ny, nz, u, v] = values;
        Ok(Self {
            position: DVec3::new(x, y, z),
            normal: DVec3::new(nx, ny, nz),
            uv: DVec2::new(u, v),
        })
    }

    /// Rotate (roll, pitch, yaw) then translate the position.
    ///
    /// Normal and uv are left as they are. Each step is skipped when its
    /// parameters are all exactly zero.
    pub fn transformed(self, placement: &Placement) -> Self {
        let mut position = self.position;
        if placement.has_rotation() {
            position = rotate_roll_pitch_yaw(position, placement.psi, placement.theta, placement.phi);
        }
        if placement.has_offset() {
            position += placement.offset();
        }
        Self { position, ..self }
    }
}

/// Canonical form: tag, tab, eight values at 8 decimals, tab separated.
impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { position: p, normal: n, uv } = self;
        write!(
            f,
            "{TAG_VERTEX}\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.8}",
            p.x, p.y, p.z, n.x, n.y, n.z, uv.x, uv.y
        )
    }
}
