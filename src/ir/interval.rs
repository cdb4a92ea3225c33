// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use std::fmt::{Display, Formatter};

/// Tolerance used when deciding whether an interval is a single point.
pub const COMPARE_TOL: f64 = 1e-10;

/// Closed numeric interval, used as the value of a constant.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// # Panics
    ///
    /// If `min > max` or either bound is NaN. Use [`Interval::try_new`] for bounds that come
    /// from user input.
    pub fn new(min: f64, max: f64) -> Self {
        match Self::try_new(min, max) {
            Some(interval) => interval,
            None => panic!("invalid interval [{min}, {max}]"),
        }
    }

    /// Returns `None` unless `min <= max`.
    pub fn try_new(min: f64, max: f64) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn is_point(&self) -> bool {
        (self.max - self.min).abs() < COMPARE_TOL
    }

    /// Returns the value if the interval is a point.
    pub fn as_constant(&self) -> Option<f64> {
        if self.is_point() {
            Some(self.min)
        } else {
            None
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl From<f64> for Interval {
    fn from(value: f64) -> Self {
        Interval::point(value)
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_point() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "[{}, {}]", self.min, self.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_intervals() {
        assert_eq!(Interval::point(5.0).as_constant(), Some(5.0));
        assert_eq!(Interval::new(1.0, 2.0).as_constant(), None);
        assert!(Interval::new(1.0, 1.0 + 1e-12).is_point());
        assert_eq!(Interval::point(5.0).to_string(), "5");
        assert_eq!(Interval::new(0.5, 2.0).to_string(), "[0.5, 2]");
    }

    #[test]
    fn reversed_bounds() {
        assert_eq!(Interval::try_new(2.0, 1.0), None);
        assert_eq!(Interval::try_new(f64::NAN, 1.0), None);
        assert_eq!(Interval::try_new(1.0, 2.0), Some(Interval::new(1.0, 2.0)));
    }

    #[test]
    #[should_panic(expected = "invalid interval")]
    fn new_panics_on_reversed_bounds() {
        Interval::new(2.0, 1.0);
    }
}
