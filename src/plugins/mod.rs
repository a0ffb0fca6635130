use crate::config;
use crate::pathfinding::{PathPlanner, plan_paths};
use crate::steering::steer_agents;
use crate::tactics::decide_tactics;
use bevy::prelude::*;

/// Registers the navigation resources and the per-frame pipeline:
/// tactic decisions feed destinations, path planning turns destinations
/// into waypoints, steering turns waypoints into motion.
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(config::load_config())
            .init_resource::<PathPlanner>()
            .add_systems(Update, (decide_tactics, plan_paths, steer_agents).chain());
    }
}
