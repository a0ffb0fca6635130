use bevy::prelude::*;
use derive_more::{Display, From, Mul};

use crate::steering::StuckTracker;
use crate::tactics::Tactic;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Mul, Display, From)]
pub struct Speed(pub f32);

impl Speed {
    pub fn new(value: f32) -> Self {
        Self(value.max(0.0))
    }
    pub const ZERO: Speed = Speed(0.0);
}

/// Ordered world-space waypoints with a cursor. Replaced wholesale on
/// replan, never mutated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavPath {
    waypoints: Vec<Vec3>,
    current: usize,
}

impl NavPath {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self {
            waypoints,
            current: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.current).copied()
    }

    /// Move the cursor to the next waypoint. Returns false once the cursor
    /// has passed the final waypoint (path complete).
    pub fn advance(&mut self) -> bool {
        self.current += 1;
        self.current < self.waypoints.len()
    }

    pub fn final_destination(&self) -> Option<Vec3> {
        self.waypoints.last().copied()
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.current = 0;
    }
}

/// Per-agent steering strategy, selected at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteeringMode {
    /// Plain path-following
    Basic,
    /// Path-following plus neighbor separation and stuck recovery
    Avoidant,
    /// Avoidant steering with tactical destination selection
    Tactical,
}

/// Navigation state for one agent: its destination, active path, replan
/// throttling, and the smoothed heading retained between ticks.
#[derive(Debug, Clone, Component)]
pub struct NavAgent {
    pub destination: Option<Vec3>,
    pub nav_path: NavPath,
    pub speed: Speed,
    pub mode: SteeringMode,
    /// Run the line-of-sight smoothing pass on freshly planned paths
    pub smooth_paths: bool,
    pub waypoint_reach_distance: f32,
    /// Replan when the destination drifts this far from the path's end
    pub path_stale_distance: f32,
    pub last_replan_time: f32,
    /// Smoothed movement direction, interpolated rather than snapped
    pub heading: Vec3,
    pub stuck: StuckTracker,
}

impl NavAgent {
    pub fn new(speed: Speed, mode: SteeringMode) -> Self {
        Self {
            destination: None,
            nav_path: NavPath::default(),
            speed,
            mode,
            smooth_paths: true,
            waypoint_reach_distance: 0.5,
            path_stale_distance: 1.0,
            last_replan_time: 0.0,
            heading: Vec3::ZERO,
            stuck: StuckTracker::default(),
        }
    }

    pub fn basic(speed: Speed) -> Self {
        Self::new(speed, SteeringMode::Basic)
    }

    pub fn avoidant(speed: Speed) -> Self {
        Self::new(speed, SteeringMode::Avoidant)
    }

    pub fn tactical(speed: Speed) -> Self {
        Self::new(speed, SteeringMode::Tactical)
    }

    pub fn set_path(&mut self, waypoints: Vec<Vec3>) {
        self.nav_path = NavPath::new(waypoints);
    }

    pub fn clear_path(&mut self) {
        self.nav_path.clear();
    }

    pub fn has_path(&self) -> bool {
        self.current_waypoint().is_some()
    }

    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.nav_path.current_waypoint()
    }

    pub fn advance_waypoint(&mut self) -> bool {
        self.nav_path.advance()
    }
}

/// Tactical state carried by elite/boss agents. Mutated only by the
/// tactical planner on its own cadence; readable by external animation and
/// VFX selection.
#[derive(Debug, Clone, Component)]
pub struct TacticalUnit {
    pub tactic: Tactic,
    pub last_decision_time: f32,
    /// Retreat grants a temporary speed bonus until this timestamp
    pub boost_expires_at: f32,
}

impl TacticalUnit {
    pub fn new() -> Self {
        Self {
            tactic: Tactic::Approach,
            last_decision_time: f32::NEG_INFINITY,
            boost_expires_at: f32::NEG_INFINITY,
        }
    }

    pub fn current_tactic(&self) -> Tactic {
        self.tactic
    }

    pub fn should_decide(&self, now: f32, interval: f32) -> bool {
        now - self.last_decision_time >= interval
    }

    pub fn speed_multiplier(&self, now: f32, boost: f32) -> f32 {
        if now < self.boost_expires_at { boost } else { 1.0 }
    }
}

impl Default for TacticalUnit {
    fn default() -> Self {
        Self::new()
    }
}

/// Marker for the unit tactical agents track (the player, typically)
#[derive(Debug, Clone, Copy, Component)]
pub struct NavTarget;
