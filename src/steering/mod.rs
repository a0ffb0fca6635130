use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{PI, TAU};

use crate::components::{NavAgent, SteeringMode, TacticalUnit};
use crate::resources::NavConfig;

/// Configuration for one steering step
#[derive(Debug, Clone, Copy)]
pub struct SteeringConfig {
    pub speed: f32,
    pub waypoint_reach_distance: f32,
    pub separation_radius: f32,
    pub separation_weight: f32,
    /// Maximum turn rate in radians per second
    pub turn_rate: f32,
    pub delta_time: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            waypoint_reach_distance: 0.5,
            separation_radius: 2.0,
            separation_weight: 0.5,
            turn_rate: 6.0,
            delta_time: 1.0 / 60.0, // 60 FPS
        }
    }
}

/// Configuration for stuck detection and recovery
#[derive(Debug, Clone, Copy)]
pub struct StuckConfig {
    /// Seconds between displacement samples
    pub sample_interval: f32,
    /// Displacement below this over one window counts as no progress
    pub min_displacement: f32,
    /// Consecutive no-progress samples before recovery kicks in
    pub samples_to_trigger: u32,
    /// How long the randomized detour heading is held
    pub detour_duration: f32,
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            sample_interval: 0.5,
            min_displacement: 0.15,
            samples_to_trigger: 3,
            detour_duration: 1.2,
        }
    }
}

/// Detects agents that stopped making progress and injects a randomized
/// detour heading for a cooldown period. Escapes the local minima around
/// concave obstacles that pure local avoidance cannot resolve.
#[derive(Debug, Clone, Default)]
pub struct StuckTracker {
    sample_timer: f32,
    last_sample: Option<Vec3>,
    low_move_streak: u32,
    detour_heading: Option<Vec3>,
    detour_remaining: f32,
}

impl StuckTracker {
    /// Advance timers. Returns the detour heading while recovery is active.
    pub fn update(
        &mut self,
        position: Vec3,
        delta_time: f32,
        config: &StuckConfig,
        rng: &mut impl Rng,
    ) -> Option<Vec3> {
        if let Some(detour) = self.detour_heading {
            self.detour_remaining -= delta_time;
            if self.detour_remaining > 0.0 {
                return Some(detour);
            }
            self.reset();
            return None;
        }

        self.sample_timer += delta_time;
        if self.sample_timer < config.sample_interval {
            return None;
        }
        self.sample_timer = 0.0;

        let position = flatten(position);
        if let Some(previous) = self.last_sample {
            if previous.distance(position) < config.min_displacement {
                self.low_move_streak += 1;
            } else {
                self.low_move_streak = 0;
            }
        }
        self.last_sample = Some(position);

        if self.low_move_streak >= config.samples_to_trigger {
            let angle = rng.gen_range(0.0..TAU);
            let detour = Vec3::new(angle.cos(), 0.0, angle.sin());
            self.detour_heading = Some(detour);
            self.detour_remaining = config.detour_duration;
            return Some(detour);
        }
        None
    }

    pub fn is_detouring(&self) -> bool {
        self.detour_heading.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of one steering step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringOutput {
    pub position: Vec3,
    pub heading: Vec3,
    /// The agent has passed the final waypoint; no movement was produced
    pub completed: bool,
}

fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Repulsion away from every neighbor within the separation radius, with
/// closer neighbors weighted stronger. Exactly zero when no neighbor is in
/// range.
pub fn separation_force(position: Vec3, others: &[Vec3], separation_radius: f32) -> Vec3 {
    let position = flatten(position);
    let mut force = Vec3::ZERO;

    for other in others {
        let other = flatten(*other);
        let distance = position.distance(other);

        if distance < separation_radius && distance > 0.1 {
            let away_from_other = (position - other).normalize();
            let strength = (separation_radius - distance) / separation_radius;
            force += away_from_other * strength;
        }
    }
    force
}

/// Rotate `current` toward `desired` by at most `max_delta` radians.
/// Snaps when the agent has no heading yet.
pub fn turn_toward(current: Vec3, desired: Vec3, max_delta: f32) -> Vec3 {
    let desired = flatten(desired).normalize_or_zero();
    if desired == Vec3::ZERO {
        return current;
    }
    let current = flatten(current).normalize_or_zero();
    if current == Vec3::ZERO {
        return desired;
    }

    let current_angle = current.z.atan2(current.x);
    let desired_angle = desired.z.atan2(desired.x);
    let mut diff = desired_angle - current_angle;

    while diff > PI {
        diff -= TAU;
    }
    while diff < -PI {
        diff += TAU;
    }

    let angle = current_angle + diff.clamp(-max_delta, max_delta);
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// One steering step for an agent with an active path: advance waypoints
/// within the arrival threshold, blend path-seek with neighbor separation
/// (and the stuck-recovery detour when active), turn the stored heading at
/// a limited angular rate, and integrate position.
pub fn steer(
    position: Vec3,
    agent: &mut NavAgent,
    neighbors: &[Vec3],
    config: &SteeringConfig,
    stuck_config: &StuckConfig,
    rng: &mut impl Rng,
) -> SteeringOutput {
    let position_2d = flatten(position);

    let waypoint = loop {
        let Some(waypoint) = agent.current_waypoint() else {
            return SteeringOutput {
                position,
                heading: agent.heading,
                completed: true,
            };
        };
        if position_2d.distance(flatten(waypoint)) > config.waypoint_reach_distance {
            break waypoint;
        }
        agent.advance_waypoint();
    };

    let seek = (flatten(waypoint) - position_2d).normalize_or_zero();

    let desired = if agent.mode == SteeringMode::Basic {
        seek
    } else if let Some(detour) = agent
        .stuck
        .update(position, config.delta_time, stuck_config, rng)
    {
        detour
    } else {
        let separation = separation_force(position, neighbors, config.separation_radius);
        (seek + separation * config.separation_weight).normalize_or_zero()
    };

    let heading = turn_toward(agent.heading, desired, config.turn_rate * config.delta_time);
    agent.heading = heading;

    SteeringOutput {
        position: position + heading * config.speed * config.delta_time,
        heading,
        completed: false,
    }
}

/// Advance every agent with an active path by one frame
pub fn steer_agents(
    mut agents: Query<(Entity, &mut Transform, &mut NavAgent, Option<&TacticalUnit>)>,
    config: Res<NavConfig>,
    time: Res<Time>,
) {
    let delta_time = time.delta_secs();
    if delta_time <= 0.0 {
        return;
    }
    let now = time.elapsed_secs();
    let settings = &config.settings;
    let stuck_config = settings.stuck_config();
    let mut rng = rand::thread_rng();

    // First pass: collect agent positions for separation
    let positions: Vec<(Entity, Vec3)> = agents
        .iter()
        .map(|(entity, transform, _, _)| (entity, transform.translation))
        .collect();

    for (entity, mut transform, mut agent, tactical) in agents.iter_mut() {
        if !agent.has_path() {
            continue;
        }

        let neighbors: Vec<Vec3> = if agent.mode == SteeringMode::Basic {
            Vec::new()
        } else {
            positions
                .iter()
                .filter(|(other, _)| *other != entity)
                .map(|(_, position)| *position)
                .collect()
        };

        let boost = tactical
            .map(|unit| unit.speed_multiplier(now, settings.retreat_boost_multiplier))
            .unwrap_or(1.0);

        let steering_config = SteeringConfig {
            speed: agent.speed.0 * boost,
            waypoint_reach_distance: agent.waypoint_reach_distance,
            separation_radius: settings.separation_radius.get(),
            separation_weight: settings.separation_weight,
            turn_rate: settings.turn_rate.get(),
            delta_time,
        };

        let output = steer(
            transform.translation,
            &mut agent,
            &neighbors,
            &steering_config,
            &stuck_config,
            &mut rng,
        );

        if output.completed {
            debug!("Path completed - clearing destination");
            agent.destination = None;
            agent.clear_path();
            agent.stuck.reset();
            continue;
        }

        transform.translation = output.position;
        if output.heading.length_squared() > 1e-6 {
            transform.rotation = Quat::from_rotation_y(output.heading.x.atan2(output.heading.z));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Speed;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    #[test]
    fn test_separation_zero_without_neighbors_in_radius() {
        let position = Vec3::ZERO;

        assert_eq!(separation_force(position, &[], 2.0), Vec3::ZERO);

        // Neighbor exactly on and beyond the radius contributes nothing
        let far = vec![Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 5.0)];
        assert_eq!(separation_force(position, &far, 2.0), Vec3::ZERO);
    }

    #[test]
    fn test_separation_pushes_away_from_neighbor() {
        let force = separation_force(Vec3::ZERO, &[Vec3::new(1.0, 0.0, 0.0)], 2.0);

        assert!(force.x < 0.0);
        assert_eq!(force.y, 0.0);
        assert_eq!(force.z, 0.0);
    }

    #[test]
    fn test_separation_distance_falloff() {
        let close = separation_force(Vec3::ZERO, &[Vec3::new(0.5, 0.0, 0.0)], 2.0);
        let far = separation_force(Vec3::ZERO, &[Vec3::new(1.5, 0.0, 0.0)], 2.0);

        assert!(close.length() > far.length());
    }

    #[test]
    fn test_separation_symmetric_neighbors_cancel() {
        let others = vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ];
        let force = separation_force(Vec3::ZERO, &others, 2.0);

        assert!(force.length() < 1e-5);
    }

    #[test]
    fn test_turn_toward_snaps_from_zero_heading() {
        let heading = turn_toward(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 0.1);
        assert!((heading - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_turn_toward_is_rate_limited() {
        let current = Vec3::new(1.0, 0.0, 0.0);
        let desired = Vec3::new(0.0, 0.0, 1.0); // 90 degrees away
        let heading = turn_toward(current, desired, 0.1);

        let expected = Vec3::new(0.1f32.cos(), 0.0, 0.1f32.sin());
        assert!((heading - expected).length() < 1e-5);
    }

    #[test]
    fn test_turn_toward_reaches_within_limit() {
        let current = Vec3::new(1.0, 0.0, 0.0);
        let desired = Vec3::new(1.0, 0.0, 0.2).normalize();
        let heading = turn_toward(current, desired, 1.0);

        assert!((heading - desired).length() < 1e-5);
    }

    #[test]
    fn test_turn_toward_wraps_across_pi() {
        // Just past the +-PI seam; must take the short way, not spin 350deg
        let current = Vec3::new(-1.0, 0.0, 0.01).normalize();
        let desired = Vec3::new(-1.0, 0.0, -0.01).normalize();
        let heading = turn_toward(current, desired, 0.5);

        assert!((heading - desired).length() < 1e-4);
    }

    #[test]
    fn test_steer_moves_toward_waypoint() {
        let mut agent = NavAgent::basic(Speed::new(5.0));
        agent.set_path(vec![Vec3::new(10.0, 0.0, 0.0)]);
        let config = SteeringConfig::default();

        let output = steer(
            Vec3::ZERO,
            &mut agent,
            &[],
            &config,
            &StuckConfig::default(),
            &mut rng(),
        );

        assert!(!output.completed);
        assert!(output.position.x > 0.0);
        assert_eq!(output.position.y, 0.0);
        let step = config.speed * config.delta_time;
        assert!((output.position.length() - step).abs() < 1e-4);
    }

    #[test]
    fn test_steer_advances_waypoint_within_threshold() {
        let mut agent = NavAgent::basic(Speed::new(5.0));
        agent.set_path(vec![Vec3::new(0.1, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)]);

        let output = steer(
            Vec3::ZERO,
            &mut agent,
            &[],
            &SteeringConfig::default(),
            &StuckConfig::default(),
            &mut rng(),
        );

        assert!(!output.completed);
        assert_eq!(agent.nav_path.current_index(), 1);
    }

    #[test]
    fn test_steer_completes_past_final_waypoint() {
        let mut agent = NavAgent::basic(Speed::new(5.0));
        agent.set_path(vec![Vec3::new(0.2, 0.0, 0.0)]);

        let position = Vec3::ZERO;
        let output = steer(
            position,
            &mut agent,
            &[],
            &SteeringConfig::default(),
            &StuckConfig::default(),
            &mut rng(),
        );

        assert!(output.completed);
        assert_eq!(output.position, position);
    }

    #[test]
    fn test_steer_separation_bends_course() {
        let config = SteeringConfig::default();
        let waypoint = vec![Vec3::new(10.0, 0.0, 0.0)];

        let mut alone = NavAgent::avoidant(Speed::new(5.0));
        alone.set_path(waypoint.clone());
        let straight = steer(
            Vec3::ZERO,
            &mut alone,
            &[],
            &config,
            &StuckConfig::default(),
            &mut rng(),
        );

        let mut crowded = NavAgent::avoidant(Speed::new(5.0));
        crowded.set_path(waypoint);
        let bent = steer(
            Vec3::ZERO,
            &mut crowded,
            &[Vec3::new(0.5, 0.0, 0.3)],
            &config,
            &StuckConfig::default(),
            &mut rng(),
        );

        // The neighbor sits ahead-left, so the crowded agent veers off -z
        assert_eq!(straight.heading.z, 0.0);
        assert!(bent.heading.z < 0.0);
    }

    #[test]
    fn test_basic_mode_ignores_neighbors() {
        let mut agent = NavAgent::basic(Speed::new(5.0));
        agent.set_path(vec![Vec3::new(10.0, 0.0, 0.0)]);

        let output = steer(
            Vec3::ZERO,
            &mut agent,
            &[Vec3::new(0.5, 0.0, 0.3)],
            &SteeringConfig::default(),
            &StuckConfig::default(),
            &mut rng(),
        );

        assert_eq!(output.heading.z, 0.0);
    }

    #[test]
    fn test_stuck_tracker_triggers_after_streak() {
        let config = StuckConfig {
            sample_interval: 0.5,
            min_displacement: 0.1,
            samples_to_trigger: 3,
            detour_duration: 1.0,
        };
        let mut tracker = StuckTracker::default();
        let mut rng = rng();
        let position = Vec3::new(3.0, 0.0, 3.0);

        // Baseline sample plus three no-progress windows
        let mut detour = None;
        for _ in 0..4 {
            detour = tracker.update(position, 0.5, &config, &mut rng);
        }

        let detour = detour.expect("stuck recovery should trigger");
        assert!(tracker.is_detouring());
        assert!((detour.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stuck_tracker_detour_expires_and_resets() {
        let config = StuckConfig {
            sample_interval: 0.5,
            min_displacement: 0.1,
            samples_to_trigger: 2,
            detour_duration: 1.0,
        };
        let mut tracker = StuckTracker::default();
        let mut rng = rng();
        let position = Vec3::ZERO;

        for _ in 0..3 {
            tracker.update(position, 0.5, &config, &mut rng);
        }
        assert!(tracker.is_detouring());

        // Detour heading is held for its duration, then cleared
        assert!(tracker.update(position, 0.5, &config, &mut rng).is_some());
        assert!(tracker.update(position, 0.6, &config, &mut rng).is_none());
        assert!(!tracker.is_detouring());
        assert_eq!(tracker.low_move_streak, 0);
    }

    #[test]
    fn test_stuck_tracker_progress_clears_streak() {
        let config = StuckConfig {
            sample_interval: 0.5,
            min_displacement: 0.1,
            samples_to_trigger: 2,
            detour_duration: 1.0,
        };
        let mut tracker = StuckTracker::default();
        let mut rng = rng();

        // Alternate stalls with real movement: recovery must never trigger
        let mut position = Vec3::ZERO;
        for step in 0..8 {
            if step % 2 == 1 {
                position += Vec3::new(1.0, 0.0, 0.0);
            }
            let detour = tracker.update(position, 0.5, &config, &mut rng);
            assert!(detour.is_none());
        }
    }
}
