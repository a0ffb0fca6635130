use crate::components::{NavAgent, Speed, SteeringMode};
use crate::config::range_types::*;
use crate::steering::StuckConfig;
use crate::tactics::TacticsConfig;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default)]
pub struct NavConfig {
    pub settings: NavSettings,
}

#[derive(Serialize, Deserialize, Validate, Clone, Debug)]
// NOTE: When adding new fields, update the default nav.toml example in the project root
pub struct NavSettings {
    // Movement settings
    pub agent_speed: MovementSpeed,
    pub waypoint_reach_distance: ReachDistance,
    pub turn_rate: TurnRate,

    // Separation settings
    pub separation_radius: SeparationRadius,
    #[validate(range(min = 0.0, max = 1.0))]
    pub separation_weight: f32,

    // Replan settings
    pub replan_interval: ReplanInterval,
    pub tactical_replan_interval: ReplanInterval,
    pub path_stale_distance: ReachDistance,
    pub smooth_paths: bool,

    // Stuck detection settings
    pub stuck_sample_interval: ReplanInterval,
    pub stuck_min_displacement: ReachDistance,
    pub stuck_samples_to_trigger: u32,
    pub stuck_detour_duration: ReplanInterval,

    // Tactical settings
    pub retreat_distance: TacticDistance,
    pub maintain_min_distance: TacticDistance,
    pub maintain_max_distance: TacticDistance,
    #[validate(range(min = 0.0, max = 1.0))]
    pub flank_probability: f32,
    pub tactic_decide_interval: ReplanInterval,
    pub retreat_boost_multiplier: f32,
    pub retreat_boost_duration: ReplanInterval,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            // Movement settings
            agent_speed: MovementSpeed::new(5.0),
            waypoint_reach_distance: ReachDistance::new(0.5),
            turn_rate: TurnRate::new(6.0),

            // Separation settings
            separation_radius: SeparationRadius::new(2.0),
            separation_weight: 0.5,

            // Replan settings
            replan_interval: ReplanInterval::new(2.0),
            tactical_replan_interval: ReplanInterval::new(0.5),
            path_stale_distance: ReachDistance::new(1.0),
            smooth_paths: true,

            // Stuck detection settings
            stuck_sample_interval: ReplanInterval::new(0.5),
            stuck_min_displacement: ReachDistance::new(0.15),
            stuck_samples_to_trigger: 3,
            stuck_detour_duration: ReplanInterval::new(1.2),

            // Tactical settings
            retreat_distance: TacticDistance::new(3.0),
            maintain_min_distance: TacticDistance::new(6.0),
            maintain_max_distance: TacticDistance::new(12.0),
            flank_probability: 0.35,
            tactic_decide_interval: ReplanInterval::new(1.5),
            retreat_boost_multiplier: 1.5,
            retreat_boost_duration: ReplanInterval::new(2.0),
        }
    }
}

impl NavSettings {
    /// Build a nav agent carrying this config's movement tunables, for use
    /// at spawn time.
    pub fn agent(&self, mode: SteeringMode) -> NavAgent {
        let mut agent = NavAgent::new(Speed::new(self.agent_speed.get()), mode);
        agent.smooth_paths = self.smooth_paths;
        agent.waypoint_reach_distance = self.waypoint_reach_distance.get();
        agent.path_stale_distance = self.path_stale_distance.get();
        agent
    }

    pub fn stuck_config(&self) -> StuckConfig {
        StuckConfig {
            sample_interval: self.stuck_sample_interval.get(),
            min_displacement: self.stuck_min_displacement.get(),
            samples_to_trigger: self.stuck_samples_to_trigger,
            detour_duration: self.stuck_detour_duration.get(),
        }
    }

    pub fn tactics_config(&self) -> TacticsConfig {
        TacticsConfig {
            retreat_distance: self.retreat_distance.get(),
            maintain_min: self.maintain_min_distance.get(),
            maintain_max: self.maintain_max_distance.get(),
            flank_probability: self.flank_probability,
            decide_interval: self.tactic_decide_interval.get(),
            retreat_boost_multiplier: self.retreat_boost_multiplier,
            retreat_boost_duration: self.retreat_boost_duration.get(),
        }
    }
}
