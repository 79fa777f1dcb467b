#![forbid(unsafe_code)]

//! Layout axes, position bias, and caret navigation directions.
//!
//! Hosts that carry integer constants decode them with `from_raw`, which is
//! the only place an unrecognized axis or direction can appear.

use crate::error::LayoutError;
use std::fmt;

/// One of the two layout dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    /// Raw code for [`Axis::X`].
    pub const X_RAW: i32 = 0;
    /// Raw code for [`Axis::Y`].
    pub const Y_RAW: i32 = 1;

    /// Both axes in X-then-Y order.
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    /// Decode a raw axis code.
    pub fn from_raw(raw: i32) -> Result<Self, LayoutError> {
        match raw {
            Self::X_RAW => Ok(Axis::X),
            Self::Y_RAW => Ok(Axis::Y),
            _ => Err(LayoutError::InvalidAxis { raw }),
        }
    }

    /// Raw code of this axis.
    #[must_use]
    pub const fn raw(self) -> i32 {
        match self {
            Axis::X => Self::X_RAW,
            Axis::Y => Self::Y_RAW,
        }
    }

    /// The perpendicular axis.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
        })
    }
}

/// Disambiguates an offset shared by two adjacent views.
///
/// `Forward` binds to the view that starts at the offset, `Backward` to the
/// view that ends there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bias {
    #[default]
    Forward,
    Backward,
}

impl Bias {
    /// The opposite bias.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Bias::Forward => Bias::Backward,
            Bias::Backward => Bias::Forward,
        }
    }
}

/// Caret navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Raw code for [`Direction::North`].
    pub const NORTH_RAW: i32 = 1;
    /// Raw code for [`Direction::East`].
    pub const EAST_RAW: i32 = 3;
    /// Raw code for [`Direction::South`].
    pub const SOUTH_RAW: i32 = 5;
    /// Raw code for [`Direction::West`].
    pub const WEST_RAW: i32 = 7;

    /// Decode a raw direction code.
    pub fn from_raw(raw: i32) -> Result<Self, LayoutError> {
        match raw {
            Self::NORTH_RAW => Ok(Direction::North),
            Self::EAST_RAW => Ok(Direction::East),
            Self::SOUTH_RAW => Ok(Direction::South),
            Self::WEST_RAW => Ok(Direction::West),
            _ => Err(LayoutError::InvalidDirection { raw }),
        }
    }

    /// True for east and west.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }

    /// The opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_raw_round_trip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_raw(axis.raw()), Ok(axis));
        }
        assert_eq!(
            Axis::from_raw(2),
            Err(LayoutError::InvalidAxis { raw: 2 })
        );
        assert_eq!(
            Axis::from_raw(-1),
            Err(LayoutError::InvalidAxis { raw: -1 })
        );
    }

    #[test]
    fn axis_other() {
        assert_eq!(Axis::X.other(), Axis::Y);
        assert_eq!(Axis::Y.other(), Axis::X);
    }

    #[test]
    fn direction_decoding() {
        assert_eq!(Direction::from_raw(1), Ok(Direction::North));
        assert_eq!(Direction::from_raw(3), Ok(Direction::East));
        assert_eq!(Direction::from_raw(5), Ok(Direction::South));
        assert_eq!(Direction::from_raw(7), Ok(Direction::West));
        assert_eq!(
            Direction::from_raw(0),
            Err(LayoutError::InvalidDirection { raw: 0 })
        );
    }

    #[test]
    fn direction_helpers() {
        assert!(Direction::East.is_horizontal());
        assert!(!Direction::South.is_horizontal());
        assert_eq!(Direction::West.reversed(), Direction::East);
        assert_eq!(Bias::Forward.flipped(), Bias::Backward);
    }
}
