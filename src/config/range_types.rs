use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// A movement speed value constrained to [0.1, 50.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct MovementSpeed(f32);

impl MovementSpeed {
    const MIN: f32 = 0.1;
    const MAX: f32 = 50.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self::new(5.0)
    }
}

/// A reach or tolerance distance constrained to [0.05, 5.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct ReachDistance(f32);

impl ReachDistance {
    const MIN: f32 = 0.05;
    const MAX: f32 = 5.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ReachDistance {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// An angular turn rate in radians per second constrained to [0.5, 20.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct TurnRate(f32);

impl TurnRate {
    const MIN: f32 = 0.5;
    const MAX: f32 = 20.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for TurnRate {
    fn default() -> Self {
        Self::new(6.0)
    }
}

/// A neighbor separation radius constrained to [0.5, 10.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct SeparationRadius(f32);

impl SeparationRadius {
    const MIN: f32 = 0.5;
    const MAX: f32 = 10.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for SeparationRadius {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// A timer interval in seconds constrained to [0.05, 30.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct ReplanInterval(f32);

impl ReplanInterval {
    const MIN: f32 = 0.05;
    const MAX: f32 = 30.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ReplanInterval {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// A tactical distance threshold constrained to [0.5, 100.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct TacticDistance(f32);

impl TacticDistance {
    const MIN: f32 = 0.5;
    const MAX: f32 = 100.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for TacticDistance {
    fn default() -> Self {
        Self::new(6.0)
    }
}
