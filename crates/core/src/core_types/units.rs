//! Semantic unit types for type-safe photometric quantity handling
//!
//! This module provides newtype wrappers for the quantities that flow between
//! the parser and the calculation engines, so that a luminous flux can't be
//! passed where an illuminance is expected (or months where years are).
//!
//! # Design Philosophy
//! - All quantities use f64; the flux integral and the ceiling division are
//!   sensitive to rounding near integer boundaries
//! - Implements the arithmetic that is physically meaningful (m × m = m²,
//!   lm / m² = lx) and nothing else
//! - Total ordering via Ord trait (NaN handled as greater than all values)
//! - Serde support for serialization
//!
//! # Usage
//! ```
//! use lumicalc_core::core_types::units::{Lumens, Meters, Months};
//!
//! let area = Meters::new(4.0) * Meters::new(4.0);
//! let lux = Lumens::new(4800.0) / area;
//! assert!((*lux - 300.0).abs() < 1e-9);
//!
//! let years = Months::new(18.0).to_years();
//! assert!((*years - 1.5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Div, Mul, Sub};

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

// ============================================================================
// SPATIAL TYPES
// ============================================================================

/// Length in meters
///
/// Not restricted to non-negative values: an effective cavity height is a
/// difference of two heights and may legitimately come out negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(f64);

impl Eq for Meters {}

impl PartialOrd for Meters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meters {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Meters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Meters {
    /// Create a new length in meters
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Meters(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Meters {
    fn from(v: f64) -> Self {
        Meters(v)
    }
}

impl From<Meters> for f64 {
    fn from(m: Meters) -> f64 {
        m.0
    }
}

impl Add for Meters {
    type Output = Meters;
    fn add(self, rhs: Meters) -> Meters {
        Meters(self.0 + rhs.0)
    }
}

impl Sub for Meters {
    type Output = Meters;
    fn sub(self, rhs: Meters) -> Meters {
        Meters(self.0 - rhs.0)
    }
}

// Cross-type operation: length × length = area
impl Mul for Meters {
    type Output = SquareMeters;
    fn mul(self, rhs: Meters) -> SquareMeters {
        SquareMeters(self.0 * rhs.0)
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m", self.0)
    }
}

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SquareMeters(f64);

impl Eq for SquareMeters {}

impl PartialOrd for SquareMeters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SquareMeters {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for SquareMeters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl SquareMeters {
    /// Create a new area in square meters
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        SquareMeters(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for SquareMeters {
    fn from(v: f64) -> Self {
        SquareMeters(v)
    }
}

impl From<SquareMeters> for f64 {
    fn from(a: SquareMeters) -> f64 {
        a.0
    }
}

impl fmt::Display for SquareMeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m²", self.0)
    }
}

// ============================================================================
// PHOTOMETRIC TYPES
// ============================================================================

/// Luminous flux in lumens (lm)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Lumens(f64);

impl Eq for Lumens {}

impl PartialOrd for Lumens {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Lumens {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Lumens {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Lumens {
    /// Create a new luminous flux in lumens
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Lumens(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Lumens {
    fn from(v: f64) -> Self {
        Lumens(v)
    }
}

impl From<Lumens> for f64 {
    fn from(l: Lumens) -> f64 {
        l.0
    }
}

impl Add for Lumens {
    type Output = Lumens;
    fn add(self, rhs: Lumens) -> Lumens {
        Lumens(self.0 + rhs.0)
    }
}

impl Mul<f64> for Lumens {
    type Output = Lumens;
    fn mul(self, rhs: f64) -> Lumens {
        Lumens(self.0 * rhs)
    }
}

// Ratio of two fluxes is dimensionless (used for utilization coefficients)
impl Div for Lumens {
    type Output = f64;
    fn div(self, rhs: Lumens) -> f64 {
        self.0 / rhs.0
    }
}

// Cross-type operation: flux / area = illuminance
impl Div<SquareMeters> for Lumens {
    type Output = Lux;
    fn div(self, rhs: SquareMeters) -> Lux {
        Lux(self.0 / rhs.0)
    }
}

impl fmt::Display for Lumens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} lm", self.0)
    }
}

/// Illuminance in lux (lm/m²)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Lux(f64);

impl Eq for Lux {}

impl PartialOrd for Lux {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Lux {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Lux {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Lux {
    /// Create a new illuminance in lux
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Lux(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Lux {
    fn from(v: f64) -> Self {
        Lux(v)
    }
}

impl From<Lux> for f64 {
    fn from(l: Lux) -> f64 {
        l.0
    }
}

// Cross-type operation: illuminance × area = flux
impl Mul<SquareMeters> for Lux {
    type Output = Lumens;
    fn mul(self, rhs: SquareMeters) -> Lumens {
        Lumens(self.0 * rhs.0)
    }
}

impl fmt::Display for Lux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} lx", self.0)
    }
}

// ============================================================================
// ANGLE TYPES
// ============================================================================

/// Angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(f64);

impl Eq for Degrees {}

impl PartialOrd for Degrees {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Degrees {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Degrees {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Degrees {
    /// Create a new angle in degrees
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Degrees(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to radians
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }
}

impl From<f64> for Degrees {
    fn from(v: f64) -> Self {
        Degrees(v)
    }
}

impl From<Degrees> for f64 {
    fn from(d: Degrees) -> f64 {
        d.0
    }
}

impl From<Degrees> for Radians {
    fn from(d: Degrees) -> Radians {
        d.to_radians()
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(f64);

impl Deref for Radians {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Radians {
    /// Create a new angle in radians
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Radians(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Compute sine
    #[inline]
    #[must_use]
    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    /// Compute cosine
    #[inline]
    #[must_use]
    pub fn cos(self) -> f64 {
        self.0.cos()
    }
}

impl fmt::Display for Radians {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} rad", self.0)
    }
}

// ============================================================================
// TIME TYPES
// ============================================================================

/// Operating time in months
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Months(f64);

impl Deref for Months {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Months {
    /// Create a new duration in months
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Months(value)
    }

    /// Convert to years (12 months per year)
    #[inline]
    #[must_use]
    pub fn to_years(self) -> Years {
        Years(self.0 / 12.0)
    }
}

impl From<Months> for Years {
    fn from(m: Months) -> Years {
        m.to_years()
    }
}

impl fmt::Display for Months {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} months", self.0)
    }
}

/// Operating time in years
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Years(f64);

impl Deref for Years {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Years {
    /// Create a new duration in years
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Years(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Years {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} years", self.0)
    }
}
