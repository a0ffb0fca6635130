use crate::components::{NavAgent, TacticalUnit};
use crate::resources::NavConfig;
use bevy::prelude::*;

pub mod astar;
pub mod frontier;
pub mod grid;
pub mod smoothing;

pub use astar::PathPlanner;
pub use grid::{CellCoord, NavGrid};
pub use smoothing::smooth_path;

fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Decide whether an agent's path should be recomputed this frame.
/// Replans when the interval has elapsed, when the destination drifted
/// further than the stale distance from the path's endpoint, or when a
/// destination is set but no path exists yet.
///
/// Drift is measured on the ground plane: waypoints sit at the grid's
/// ground height while destinations may carry y = 0, and that fixed offset
/// is not drift.
pub fn should_replan(agent: &NavAgent, now: f32, interval: f32) -> bool {
    let Some(destination) = agent.destination else {
        return false;
    };

    let Some(endpoint) = agent.nav_path.final_destination() else {
        return true;
    };

    if flatten(destination).distance(flatten(endpoint)) > agent.path_stale_distance {
        return true;
    }

    now - agent.last_replan_time >= interval
}

/// Recompute paths for agents whose replan condition fires. Elite agents
/// replan on the shorter tactical interval. Without a baked grid every
/// agent falls back to walking straight at its destination.
pub fn plan_paths(
    mut planner: ResMut<PathPlanner>,
    grid: Option<Res<NavGrid>>,
    config: Res<NavConfig>,
    time: Res<Time>,
    mut warned_no_grid: Local<bool>,
    mut agents: Query<(Entity, &Transform, &mut NavAgent, Option<&TacticalUnit>)>,
) {
    let now = time.elapsed_secs();
    let settings = &config.settings;

    for (entity, transform, mut agent, tactical) in agents.iter_mut() {
        let interval = if tactical.is_some() {
            settings.tactical_replan_interval.get()
        } else {
            settings.replan_interval.get()
        };
        if !should_replan(&agent, now, interval) {
            continue;
        }
        let Some(destination) = agent.destination else {
            continue;
        };

        let Some(grid) = grid.as_deref() else {
            if !*warned_no_grid {
                warn!("No navigation grid available, agents fall back to straight-line movement");
                *warned_no_grid = true;
            }
            agent.set_path(vec![destination]);
            agent.last_replan_time = now;
            continue;
        };

        match planner.request_path(grid, transform.translation, destination, agent.smooth_paths) {
            Some(waypoints) => {
                agent.set_path(waypoints);
                agent.last_replan_time = now;
            }
            None => {
                // Unreachable: head straight at the destination so the agent
                // is never stranded; the next replan tries the search again
                warn!("No path found for {entity:?} to {destination:?}, using direct line");
                agent.set_path(vec![destination]);
                agent.last_replan_time = now;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Speed;

    #[test]
    fn test_no_destination_never_replans() {
        let agent = NavAgent::basic(Speed::new(5.0));
        assert!(!should_replan(&agent, 100.0, 2.0));
    }

    #[test]
    fn test_destination_without_path_replans_immediately() {
        let mut agent = NavAgent::basic(Speed::new(5.0));
        agent.destination = Some(Vec3::new(4.0, 0.0, 4.0));
        assert!(should_replan(&agent, 0.0, 2.0));
    }

    #[test]
    fn test_interval_gates_repeat_replans() {
        let mut agent = NavAgent::basic(Speed::new(5.0));
        agent.destination = Some(Vec3::new(4.0, 0.0, 4.0));
        agent.set_path(vec![Vec3::new(4.0, 0.0, 4.0)]);
        agent.last_replan_time = 10.0;

        assert!(!should_replan(&agent, 10.5, 2.0));
        assert!(should_replan(&agent, 12.0, 2.0));
    }

    #[test]
    fn test_stale_destination_forces_replan_before_interval() {
        let mut agent = NavAgent::basic(Speed::new(5.0));
        agent.destination = Some(Vec3::new(4.0, 0.0, 4.0));
        agent.set_path(vec![Vec3::new(4.0, 0.0, 4.0)]);
        agent.last_replan_time = 10.0;

        // Destination moved beyond the stale distance from the path endpoint
        agent.destination = Some(Vec3::new(8.0, 0.0, 4.0));
        assert!(should_replan(&agent, 10.1, 2.0));
    }

    #[test]
    fn test_ground_height_offset_is_not_drift() {
        // Waypoints from a grid baked at ground height y = 1.5; the flat
        // destination must not register as stale one frame after a replan
        let mut agent = NavAgent::basic(Speed::new(5.0));
        agent.destination = Some(Vec3::new(4.0, 0.0, 4.0));
        agent.set_path(vec![Vec3::new(4.0, 1.5, 4.0)]);
        agent.last_replan_time = 10.0;

        assert!(!should_replan(&agent, 10.016, 2.0));
        assert!(should_replan(&agent, 12.0, 2.0));

        // Real ground-plane drift still fires immediately
        agent.destination = Some(Vec3::new(8.0, 0.0, 4.0));
        assert!(should_replan(&agent, 10.016, 2.0));
    }

    fn planning_app(grid: Option<NavGrid>) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(NavConfig::default())
            .init_resource::<PathPlanner>()
            .add_systems(Update, plan_paths);
        if let Some(grid) = grid {
            app.insert_resource(grid);
        }
        app
    }

    #[test]
    fn test_unreachable_destination_falls_back_to_direct_line() {
        // Full wall at x in [4, 5) seals the right half off
        let grid = NavGrid::bake(Vec3::ZERO, 1.0, 10, 10, |p| !(4.0..5.0).contains(&p.x)).unwrap();
        let mut app = planning_app(Some(grid));

        let destination = Vec3::new(8.5, 0.0, 5.5);
        let mut agent = NavAgent::avoidant(Speed::new(5.0));
        agent.destination = Some(destination);
        let entity = app
            .world_mut()
            .spawn((Transform::from_xyz(1.5, 0.0, 5.5), agent))
            .id();

        app.update();

        let agent = app.world().get::<NavAgent>(entity).unwrap();
        assert!(agent.has_path());
        assert_eq!(agent.nav_path.len(), 1);
        assert_eq!(agent.current_waypoint(), Some(destination));
    }

    #[test]
    fn test_missing_grid_falls_back_to_direct_line() {
        let mut app = planning_app(None);

        let destination = Vec3::new(6.0, 0.0, 2.0);
        let mut agent = NavAgent::basic(Speed::new(5.0));
        agent.destination = Some(destination);
        let entity = app
            .world_mut()
            .spawn((Transform::default(), agent))
            .id();

        app.update();

        let agent = app.world().get::<NavAgent>(entity).unwrap();
        assert_eq!(agent.current_waypoint(), Some(destination));
    }
}
