//! The eight symmetries of a square block.
//!
//! A [`Transform`] is a reflection followed by a rotation. The same order is used when
//! building search candidates and when reconstructing blocks, so an Atom's transform
//! means the same thing on both sides of the codec.

use crate::foundation::error::{FractalError, FractalResult};

/// Mirror applied before rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Reflection {
    /// Leave the block as is.
    #[default]
    None,
    /// Mirror columns (`x -> width - 1 - x`).
    Horizontal,
}

impl Reflection {
    /// Both reflections, in wire-byte order.
    pub const ALL: [Reflection; 2] = [Reflection::None, Reflection::Horizontal];

    /// Wire byte: 0 or 1.
    pub fn to_byte(self) -> u8 {
        match self {
            Reflection::None => 0,
            Reflection::Horizontal => 1,
        }
    }

    /// Parse the wire byte.
    pub fn from_byte(b: u8) -> FractalResult<Self> {
        match b {
            0 => Ok(Reflection::None),
            1 => Ok(Reflection::Horizontal),
            other => Err(FractalError::format(format!(
                "reflection byte must be 0 or 1, got {other}"
            ))),
        }
    }
}

/// Clockwise rotation in quarter turns, applied after reflection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// 0°.
    #[default]
    None,
    /// 90° clockwise.
    Quarter,
    /// 180°.
    Half,
    /// 270° clockwise (90° counter-clockwise).
    ThreeQuarter,
}

impl Rotation {
    /// All rotations, in wire-byte order.
    pub const ALL: [Rotation; 4] = [
        Rotation::None,
        Rotation::Quarter,
        Rotation::Half,
        Rotation::ThreeQuarter,
    ];

    /// Number of clockwise quarter turns (0..=3), also the wire byte.
    pub fn quarter_turns(self) -> u8 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 1,
            Rotation::Half => 2,
            Rotation::ThreeQuarter => 3,
        }
    }

    /// Rotation by `turns` clockwise quarter turns, modulo 4.
    pub fn from_quarter_turns(turns: u8) -> Self {
        Self::ALL[usize::from(turns % 4)]
    }

    /// Parse the wire byte (0..=3).
    pub fn from_byte(b: u8) -> FractalResult<Self> {
        if b > 3 {
            return Err(FractalError::format(format!(
                "rotation byte must be in 0..=3, got {b}"
            )));
        }
        Ok(Self::from_quarter_turns(b))
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        Self::from_quarter_turns(4 - self.quarter_turns())
    }
}

/// An element of the dihedral group of the square: reflect, then rotate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Transform {
    pub reflection: Reflection,
    pub rotation: Rotation,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        reflection: Reflection::None,
        rotation: Rotation::None,
    };

    /// All eight transforms, reflection outer and rotation inner.
    ///
    /// Candidate pools are built in this order; ties in the block search resolve to the
    /// earliest entry.
    pub const ALL: [Transform; 8] = {
        let mut all = [Transform::IDENTITY; 8];
        let mut i = 0;
        while i < 8 {
            all[i] = Transform {
                reflection: Reflection::ALL[i / 4],
                rotation: Rotation::ALL[i % 4],
            };
            i += 1;
        }
        all
    };

    pub fn new(reflection: Reflection, rotation: Rotation) -> Self {
        Self {
            reflection,
            rotation,
        }
    }

    /// Position of this transform in [`Transform::ALL`].
    pub fn index(self) -> usize {
        usize::from(self.reflection.to_byte()) * 4 + usize::from(self.rotation.quarter_turns())
    }

    /// The transform that undoes this one.
    ///
    /// With `h` the mirror and `r` a rotation, `h` is its own inverse and
    /// `h . r^-k = r^k . h`, so a reflected transform is an involution and an
    /// unreflected one inverts its rotation.
    pub fn inverse(self) -> Self {
        match self.reflection {
            Reflection::None => Self::new(Reflection::None, self.rotation.inverse()),
            Reflection::Horizontal => self,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/dihedral.rs"]
mod tests;
