//! Traffic classes and per-class storage

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// The two traffic types contending for pilots
///
/// Class A is the low-latency / high-reliability class (URLLC-like), class B
/// the delay-tolerant / low-reliability class (mMTC-like). Class A is always
/// considered first by every allocation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrafficClass {
    A,
    B,
}

impl TrafficClass {
    /// Both classes in allocation order
    pub const ALL: [TrafficClass; 2] = [TrafficClass::A, TrafficClass::B];

    /// Label used in result file names and logs
    pub fn label(self) -> &'static str {
        match self {
            TrafficClass::A => "URLLC",
            TrafficClass::B => "mMTC",
        }
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per traffic class, indexable by `TrafficClass`
///
/// # Example
/// ```
/// use pilot_simulator_core_rs::models::{PerClass, TrafficClass};
///
/// let mut missed = PerClass::new(0u32, 0u32);
/// missed[TrafficClass::B] += 1;
/// assert_eq!(missed[TrafficClass::A], 0);
/// assert_eq!(missed[TrafficClass::B], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerClass<T> {
    pub a: T,
    pub b: T,
}

impl<T> PerClass<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    /// Build both entries from a function of the class
    pub fn from_fn(mut f: impl FnMut(TrafficClass) -> T) -> Self {
        Self {
            a: f(TrafficClass::A),
            b: f(TrafficClass::B),
        }
    }

    /// Iterate `(class, value)` pairs in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (TrafficClass, &T)> {
        [(TrafficClass::A, &self.a), (TrafficClass::B, &self.b)].into_iter()
    }
}

impl<T> Index<TrafficClass> for PerClass<T> {
    type Output = T;

    fn index(&self, class: TrafficClass) -> &T {
        match class {
            TrafficClass::A => &self.a,
            TrafficClass::B => &self.b,
        }
    }
}

impl<T> IndexMut<TrafficClass> for PerClass<T> {
    fn index_mut(&mut self, class: TrafficClass) -> &mut T {
        match class {
            TrafficClass::A => &mut self.a,
            TrafficClass::B => &mut self.b,
        }
    }
}
