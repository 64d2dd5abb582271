//! Compile-time unit safety for line-rating quantities.
//!
//! Thermal rating mixes temperatures, wind speeds, compass bearings, currents and
//! powers. Keeping them as bare `f64` makes it easy to pass a wind direction where
//! a line azimuth or an ambient temperature is expected. The newtypes below are
//! `#[repr(transparent)]` so they cost nothing at runtime.
//!
//! ```
//! use dlr_core::units::{Celsius, Degrees, Megawatts};
//!
//! let flow = Megawatts(120.0) * 1.15;
//! assert!((flow.value() - 138.0).abs() < 1e-9);
//!
//! let bearing = Degrees(-30.0).normalized();
//! assert_eq!(bearing.value(), 330.0);
//!
//! let ambient = Celsius(25.0);
//! assert!((ambient.to_kelvin() - 298.15).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Macro to implement common arithmetic operations for unit types
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.1} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Maximum of two values
            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }
    };
}

// =============================================================================
// Power and voltage
// =============================================================================

/// Active power in megawatts (MW). Line flows are signed; direction is irrelevant
/// to heating so the engine works on the magnitude.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

/// Apparent power in megavolt-amperes (MVA)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MegavoltAmperes(pub f64);

impl_unit_ops!(MegavoltAmperes, "MVA");

/// Line-to-line voltage in kilovolts (kV)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

impl_unit_ops!(Kilovolts, "kV");

/// Phase current in amperes (A)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Amperes(pub f64);

impl_unit_ops!(Amperes, "A");

impl Megawatts {
    /// Balanced three-phase current at unity power factor: I = P / (√3 · V).
    ///
    /// Returns zero current for a non-positive voltage instead of dividing by it.
    #[inline]
    pub fn three_phase_current(self, voltage: Kilovolts) -> Amperes {
        if voltage.0 <= 0.0 || !voltage.0.is_finite() {
            return Amperes(0.0);
        }
        Amperes(self.0.abs() * 1000.0 / (3.0_f64.sqrt() * voltage.0))
    }
}

// =============================================================================
// Weather
// =============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Celsius(pub f64);

impl_unit_ops!(Celsius, "°C");

impl Celsius {
    /// Absolute temperature in kelvin
    #[inline]
    pub fn to_kelvin(self) -> f64 {
        self.0 + 273.15
    }
}

/// Wind speed in metres per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MetersPerSecond(pub f64);

impl_unit_ops!(MetersPerSecond, "m/s");

// =============================================================================
// Angles
// =============================================================================

/// Compass angle in degrees (0 = north, clockwise).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°");

impl Degrees {
    /// Wrap into `[0, 360)`. Non-finite input maps to zero.
    #[inline]
    pub fn normalized(self) -> Self {
        if !self.0.is_finite() {
            return Degrees(0.0);
        }
        let wrapped = self.0.rem_euclid(360.0);
        // rem_euclid can return 360.0 for tiny negative inputs
        if wrapped >= 360.0 {
            Degrees(0.0)
        } else {
            Degrees(wrapped)
        }
    }

    /// Convert to radians
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }
}

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians, "rad");

impl Radians {
    /// Convert to degrees
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }

    /// Sine of the angle
    #[inline]
    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    /// Cosine of the angle
    #[inline]
    pub fn cos(self) -> f64 {
        self.0.cos()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_megawatts_arithmetic() {
        let p1 = Megawatts(100.0);
        let p2 = Megawatts(50.0);

        assert_eq!((p1 + p2).value(), 150.0);
        assert_eq!((p1 - p2).value(), 50.0);
        assert_eq!((-p1).value(), -100.0);
        assert_eq!((p1 * 2.0).value(), 200.0);
        assert_eq!((p1 / 2.0).value(), 50.0);
        assert_eq!(p1 / p2, 2.0);
    }

    #[test]
    fn test_three_phase_current() {
        // 100 MW at 230 kV: 100e3 / (sqrt(3) * 230) = 251.02 A
        let i = Megawatts(100.0).three_phase_current(Kilovolts(230.0));
        assert!((i.value() - 251.0218).abs() < 1e-3);

        // Sign of the flow does not matter
        let reverse = Megawatts(-100.0).three_phase_current(Kilovolts(230.0));
        assert_eq!(i, reverse);
    }

    #[test]
    fn test_three_phase_current_zero_voltage() {
        assert_eq!(
            Megawatts(50.0).three_phase_current(Kilovolts(0.0)).value(),
            0.0
        );
        assert_eq!(
            Megawatts(50.0).three_phase_current(Kilovolts(f64::NAN)).value(),
            0.0
        );
    }

    #[test]
    fn test_degrees_normalized() {
        assert_eq!(Degrees(370.0).normalized().value(), 10.0);
        assert_eq!(Degrees(-90.0).normalized().value(), 270.0);
        assert_eq!(Degrees(360.0).normalized().value(), 0.0);
        assert_eq!(Degrees(f64::NAN).normalized().value(), 0.0);
        let tiny = Degrees(-1e-15).normalized().value();
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_angle_conversion() {
        let rad = Degrees(180.0).to_radians();
        assert!((rad.value() - std::f64::consts::PI).abs() < 1e-12);
        assert!((rad.to_degrees().value() - 180.0).abs() < 1e-12);
        assert!((Degrees(90.0).to_radians().sin() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_kelvin() {
        assert!((Celsius(100.0).to_kelvin() - 373.15).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Amperes(812.345)), "812.3 A");
        assert_eq!(format!("{}", Celsius(25.0)), "25.0 °C");
    }
}
