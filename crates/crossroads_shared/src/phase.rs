//! # Traffic Light Phase
//!
//! A light is either RED or GREEN. There is no amber and no ordering.
//!
//! The `u8` encoding exists so that the controller can keep the current
//! phase in an `AtomicU8` and readers never see a torn value.

use std::fmt;

/// One of the two traffic-light states.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Stop.
    #[default]
    Red = 0,
    /// Go.
    Green = 1,
}

impl Phase {
    /// Returns the other phase.
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Red => Self::Green,
            Self::Green => Self::Red,
        }
    }

    /// Returns true for [`Phase::Green`].
    #[inline]
    #[must_use]
    pub const fn is_green(self) -> bool {
        matches!(self, Self::Green)
    }

    /// Compact encoding for atomic storage.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a value produced by [`Phase::as_u8`].
    ///
    /// Any non-zero value decodes as green.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Red,
            _ => Self::Green,
        }
    }

    /// Lowercase name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
        }
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        phase.as_u8()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_alternates() {
        assert_eq!(Phase::Red.toggled(), Phase::Green);
        assert_eq!(Phase::Green.toggled(), Phase::Red);
        assert_eq!(Phase::Red.toggled().toggled(), Phase::Red);
    }

    #[test]
    fn test_default_is_red() {
        assert_eq!(Phase::default(), Phase::Red);
        assert!(!Phase::default().is_green());
    }

    #[test]
    fn test_u8_encoding() {
        assert_eq!(Phase::Red.as_u8(), 0);
        assert_eq!(Phase::Green.as_u8(), 1);
        assert_eq!(Phase::from_u8(Phase::Red.as_u8()), Phase::Red);
        assert_eq!(Phase::from_u8(Phase::Green.as_u8()), Phase::Green);
        assert_eq!(Phase::from_u8(7), Phase::Green);
        assert_eq!(u8::from(Phase::Green), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Phase::Red.to_string(), "red");
        assert_eq!(format!("{}", Phase::Green), "green");
    }
}
