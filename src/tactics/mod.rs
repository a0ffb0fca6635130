use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use crate::components::{NavAgent, NavTarget, TacticalUnit};
use crate::resources::NavConfig;

/// Discrete positioning mode for elite agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tactic {
    /// Close toward the target's current position
    Approach,
    /// Hold a point on the ring inside the ideal distance band
    Maintain,
    /// Back out beyond the maintain band, with a temporary speed bonus
    Retreat,
    /// Swing to a point 90 degrees lateral to the target
    Flank,
}

/// Distance thresholds and cadences for tactical decisions
#[derive(Debug, Clone, Copy)]
pub struct TacticsConfig {
    pub retreat_distance: f32,
    pub maintain_min: f32,
    pub maintain_max: f32,
    pub flank_probability: f32,
    pub decide_interval: f32,
    pub retreat_boost_multiplier: f32,
    pub retreat_boost_duration: f32,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            retreat_distance: 3.0,
            maintain_min: 6.0,
            maintain_max: 12.0,
            flank_probability: 0.35,
            decide_interval: 1.5,
            retreat_boost_multiplier: 1.5,
            retreat_boost_duration: 2.0,
        }
    }
}

fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Classify the distance to the target into a tactic. `flank_roll` is a
/// uniform [0, 1) sample that settles the Flank-or-Maintain choice inside
/// the ideal band.
pub fn classify(distance: f32, config: &TacticsConfig, flank_roll: f32) -> Tactic {
    if distance < config.retreat_distance {
        Tactic::Retreat
    } else if distance < config.maintain_min {
        Tactic::Maintain
    } else if distance > config.maintain_max {
        Tactic::Approach
    } else if flank_roll < config.flank_probability {
        Tactic::Flank
    } else {
        Tactic::Maintain
    }
}

/// Resolve a tactic to a concrete world destination. May land outside the
/// grid; path planning clamps it via the grid's coordinate conversion.
pub fn resolve_destination(
    tactic: Tactic,
    agent_position: Vec3,
    target_position: Vec3,
    config: &TacticsConfig,
    rng: &mut impl Rng,
) -> Vec3 {
    let target = flatten(target_position);
    let to_agent = flatten(agent_position) - target;
    let distance = to_agent.length();

    // Agent standing on the target has no defined bearing; pick one
    let away = if distance > 1e-4 {
        to_agent / distance
    } else {
        let angle = rng.gen_range(0.0..TAU);
        Vec3::new(angle.cos(), 0.0, angle.sin())
    };

    match tactic {
        Tactic::Approach => target,
        Tactic::Retreat => {
            let beyond_band = config.maintain_max + (config.maintain_max - config.maintain_min) * 0.5;
            target + away * beyond_band
        }
        Tactic::Maintain => {
            let ring_radius = (config.maintain_min + config.maintain_max) * 0.5;
            let offsets = [-FRAC_PI_2, -FRAC_PI_4, FRAC_PI_4, FRAC_PI_2];
            let offset = offsets[rng.gen_range(0..offsets.len())];
            let angle = away.z.atan2(away.x) + offset;
            target + Vec3::new(angle.cos(), 0.0, angle.sin()) * ring_radius
        }
        Tactic::Flank => {
            let lateral = Vec3::new(-away.z, 0.0, away.x);
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            target + lateral * sign * distance.max(1.0)
        }
    }
}

/// Re-evaluate each elite agent's tactic on its decision cadence and feed
/// the resolved destination into its navigation agent. Paths toward that
/// destination are replanned on the (shorter) tactical replan interval, so
/// the tactic itself never changes faster than `decide_interval`.
pub fn decide_tactics(
    mut agents: Query<(&Transform, &mut NavAgent, &mut TacticalUnit)>,
    target_query: Query<&Transform, (With<NavTarget>, Without<TacticalUnit>)>,
    config: Res<NavConfig>,
    time: Res<Time>,
) {
    let Ok(target_transform) = target_query.single() else {
        return;
    };
    let now = time.elapsed_secs();
    let tactics = config.settings.tactics_config();
    let mut rng = rand::thread_rng();

    for (transform, mut agent, mut unit) in agents.iter_mut() {
        if !unit.should_decide(now, tactics.decide_interval) {
            continue;
        }

        let distance = flatten(transform.translation)
            .distance(flatten(target_transform.translation));
        let tactic = classify(distance, &tactics, rng.r#gen::<f32>());

        if tactic != unit.tactic {
            debug!("Tactic change {:?} -> {:?} at distance {:.1}", unit.tactic, tactic, distance);
        }
        unit.tactic = tactic;
        unit.last_decision_time = now;
        if tactic == Tactic::Retreat {
            unit.boost_expires_at = now + tactics.retreat_boost_duration;
        }

        agent.destination = Some(resolve_destination(
            tactic,
            transform.translation,
            target_transform.translation,
            &tactics,
            &mut rng,
        ));
    }
}
