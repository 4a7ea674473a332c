//! ACF aircraft descriptor lookup.
//!
//! Positioned objects live in the descriptor's `_obja` group, one slot per
//! object:
//!
//! ```text
//! P _obja/3/_v10_att_file_stl wiper1.obj
//! P _obja/3/_v10_att_phi_ref 0.000000
//! P _obja/3/_v10_att_psi_ref 45.000000
//! P _obja/3/_v10_att_the_ref -10.000000
//! P _obja/3/_v10_att_x_acf_prt_ref 1.250000
//! P _obja/3/_v10_att_y_acf_prt_ref 3.100000
//! P _obja/3/_v10_att_z_acf_prt_ref -7.500000
//! ```
//!
//! The object is located by name, its slot index taken from that line, and
//! the six placement keys for the slot are read from that line onward.
//! Offsets are stored in feet and converted to metres.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::placement::Placement;
use crate::util::{Error, Result, FEET_TO_METERS};

/// Group holding positioned objects.
const OBJA_GROUP: &str = "_obja";

/// Which placement field a key assigns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Psi,
    Theta,
    Phi,
    OffsetX,
    OffsetY,
    OffsetZ,
}

/// Key suffix, field, and the name reported when the key is missing.
const KEYS: [(&str, Field, &str); 6] = [
    ("_v10_att_phi_ref", Field::Phi, "phi"),
    ("_v10_att_psi_ref", Field::Psi, "psi"),
    ("_v10_att_the_ref", Field::Theta, "theta"),
    ("_v10_att_x_acf_prt_ref", Field::OffsetX, "offset_x"),
    ("_v10_att_y_acf_prt_ref", Field::OffsetY, "offset_y"),
    ("_v10_att_z_acf_prt_ref", Field::OffsetZ, "offset_z"),
];

/// Placement fields seen so far; any `None` left at the end is an error.
#[derive(Default, Debug)]
struct PlacementBuilder {
    psi: Option<f64>,
    theta: Option<f64>,
    phi: Option<f64>,
    offset_x: Option<f64>,
    offset_y: Option<f64>,
    offset_z: Option<f64>,
}

impl PlacementBuilder {
    fn set(&mut self, field: Field, value: f64) {
        let slot = match field {
            Field::Psi => &mut self.psi,
            Field::Theta => &mut self.theta,
            Field::Phi => &mut self.phi,
            Field::OffsetX => &mut self.offset_x,
            Field::OffsetY => &mut self.offset_y,
            Field::OffsetZ => &mut self.offset_z,
        };
        *slot = Some(value);
    }

    fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Psi => self.psi,
            Field::Theta => self.theta,
            Field::Phi => self.phi,
            Field::OffsetX => self.offset_x,
            Field::OffsetY => self.offset_y,
            Field::OffsetZ => self.offset_z,
        }
    }

    fn build(self, name: &str) -> Result<Placement> {
        let missing: Vec<&'static str> = KEYS
            .iter()
            .filter(|(_, field, _)| self.get(*field).is_none())
            .map(|&(_, _, label)| label)
            .collect();

        match (self.psi, self.theta, self.phi, self.offset_x, self.offset_y, self.offset_z) {
            (Some(psi), Some(theta), Some(phi), Some(offset_x), Some(offset_y), Some(offset_z)) => {
                Ok(Placement { psi, theta, phi, offset_x, offset_y, offset_z })
            }
            _ => Err(Error::IncompletePlacement { name: name.to_string(), missing }),
        }
    }
}

/// Slot index from a lowercased line such as `p _obja/3/_v10_att_file_stl x.obj`.
fn slot_of(line: &str) -> Option<&str> {
    let path = line.split_whitespace().nth(1)?;
    let mut parts = path.split('/');
    if parts.next()? != OBJA_GROUP {
        return None;
    }
    let slot = parts.next()?;
    (!slot.is_empty() && slot.bytes().all(|b| b.is_ascii_digit())).then_some(slot)
}

/// Find the placement of positioned object `name` in descriptor text.
///
/// Matching is case-insensitive and the first line naming the object with
/// a slot index wins. Fails with [`Error::NotFound`] when no such line
/// exists and [`Error::IncompletePlacement`] when any of the six keys is
/// never assigned.
pub fn find_placement(text: &str, name: &str) -> Result<Placement> {
    let needle = name.to_lowercase();
    let mut prefix: Option<String> = None;
    let mut builder = PlacementBuilder::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.to_lowercase();

        if prefix.is_none() {
            if !line.contains(&needle) {
                continue;
            }
            match slot_of(&line) {
                Some(slot) => {
                    debug!(line = line_no, slot, "found {name} in descriptor");
                    prefix = Some(format!("{OBJA_GROUP}/{slot}/"));
                }
                None => {
                    debug!(line = line_no, "{name} mentioned outside an {OBJA_GROUP} slot, skipping");
                    continue;
                }
            }
        }

        let Some(scope) = prefix.as_deref() else { continue };
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.nth(1).and_then(|path| path.strip_prefix(scope)) else {
            continue;
        };
        let Some(&(_, field, label)) = KEYS.iter().find(|(suffix, _, _)| *suffix == key) else {
            continue;
        };

        let token = tokens
            .next()
            .ok_or_else(|| Error::parse(line_no, format!("{label} has no value")))?;
        let value: f64 = token
            .parse()
            .map_err(|_| Error::parse(line_no, format!("{label} value '{token}' is not a number")))?;
        let value = match field {
            Field::OffsetX | Field::OffsetY | Field::OffsetZ => value * FEET_TO_METERS,
            _ => value,
        };
        debug!(line = line_no, field = label, value, "placement key");
        builder.set(field, value);
    }

    if prefix.is_none() {
        return Err(Error::NotFound(name.to_string()));
    }
    builder.build(name)
}

/// Read a descriptor file and look up `name` in it.
#[instrument(skip_all, fields(path = %path.as_ref().display(), object = %name))]
pub fn read_placement(path: impl AsRef<Path>, name: &str) -> Result<Placement> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let placement = find_placement(&text, name)?;
    info!(
        psi = placement.psi,
        theta = placement.theta,
        phi = placement.phi,
        x = placement.offset_x,
        y = placement.offset_y,
        z = placement.offset_z,
        "{name} found in descriptor"
    );
    Ok(placement)
}
