//! Pairwise soft collisions: overlapping characters push each other apart.
//!
//! One resolver pass per tick walks every ordered pair in roster order and
//! converts a fraction of the positional overlap into opposing velocity
//! corrections. Corrections applied early in a pass are visible to later
//! pairs in the same pass; that in-pass ordering is part of the behavior,
//! which is why the ECS wrapper sorts by [`RosterIndex`] before running.
//! Positions are never written here, so separation converges over the
//! following integration steps instead of snapping.

use bevy::prelude::*;

use crate::simulation::characters::{CharacterConfig, CharacterState, Kinematics, RosterIndex};
use crate::simulation::TickScale;

/// Fraction of the positional correction converted to velocity each pass.
const PUSH_STRENGTH: f32 = 0.05;

/// Snapshot of one character inside a resolver pass.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Anchored bodies (sitting characters) never receive corrections;
    /// their partners still do, so overlap keeps draining.
    pub anchored: bool,
}

/// Run one resolver pass over `bodies` in slice order.
///
/// For every ordered pair (i, j) closer than `min_separation`, j's target
/// position is placed exactly `min_separation` away from i along the line
/// between them, and `strength` times the remaining correction is applied
/// to j's velocity and subtracted from i's. Exactly coincident bodies have
/// no line between them; such a pair is corrected once, from the lower
/// index's point of view along +x, so a stacked pair still separates
/// instead of the two orderings cancelling out.
pub fn resolve_pass(bodies: &mut [Body], min_separation: f32, strength: f32) {
    for i in 0..bodies.len() {
        for j in 0..bodies.len() {
            if i == j {
                continue;
            }
            let delta = bodies[j].position - bodies[i].position;
            if delta.length() >= min_separation {
                continue;
            }
            if delta == Vec2::ZERO && i > j {
                continue;
            }

            let angle = delta.y.atan2(delta.x);
            let target = bodies[i].position + Vec2::from_angle(angle) * min_separation;
            let correction = (target - bodies[j].position) * strength;

            if !bodies[j].anchored {
                bodies[j].velocity += correction;
            }
            if !bodies[i].anchored {
                bodies[i].velocity -= correction;
            }
        }
    }
}

pub fn resolve_collisions(
    tick: Res<TickScale>,
    config: Res<CharacterConfig>,
    mut characters: Query<(Entity, &RosterIndex, &mut Kinematics, &CharacterState)>,
) {
    if tick.0 == 0.0 {
        return;
    }

    let mut order: Vec<(usize, Entity)> = characters
        .iter()
        .map(|(entity, index, _, _)| (index.0, entity))
        .collect();
    if order.len() < 2 {
        return;
    }
    order.sort_unstable_by_key(|(index, _)| *index);

    let snapshot: Vec<(Entity, Body)> = order
        .iter()
        .filter_map(|&(_, entity)| {
            let (_, _, kin, state) = characters.get(entity).ok()?;
            Some((
                entity,
                Body {
                    position: kin.position,
                    velocity: kin.velocity,
                    anchored: matches!(state, CharacterState::Sitting { .. }),
                },
            ))
        })
        .collect();

    let mut bodies: Vec<Body> = snapshot.iter().map(|(_, body)| *body).collect();
    resolve_pass(&mut bodies, config.hitbox_radius * 2.0, PUSH_STRENGTH);

    for ((entity, before), after) in snapshot.iter().zip(&bodies) {
        if after.velocity != before.velocity {
            if let Ok((_, _, mut kin, _)) = characters.get_mut(*entity) {
                kin.velocity = after.velocity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN_SEP: f32 = 40.0;

    fn body(x: f32, y: f32) -> Body {
        Body {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            anchored: false,
        }
    }

    #[test]
    fn overlapping_pair_gains_separating_velocities() {
        let mut bodies = vec![body(100.0, 100.0), body(110.0, 100.0)];
        resolve_pass(&mut bodies, MIN_SEP, 0.05);

        // The pair straddles the x axis: the right body is pushed right,
        // the left body left.
        assert!(bodies[1].velocity.x > 0.0);
        assert!(bodies[0].velocity.x < 0.0);
        assert_eq!(bodies[0].velocity.y, 0.0);
        assert_eq!(bodies[1].velocity.y, 0.0);
    }

    #[test]
    fn exactly_stacked_pair_splits_along_x() {
        let mut bodies = vec![body(50.0, 50.0), body(50.0, 50.0)];
        resolve_pass(&mut bodies, MIN_SEP, 0.05);
        assert!(bodies[1].velocity.x > 0.0);
        assert!(bodies[0].velocity.x < 0.0);
        assert_eq!(bodies[0].velocity.y, 0.0);

        // And the split actually drains the overlap.
        for _ in 0..200 {
            resolve_pass(&mut bodies, MIN_SEP, 0.05);
            for body in bodies.iter_mut() {
                let step = body.velocity;
                body.position += step;
            }
        }
        assert!(bodies[0].position.distance(bodies[1].position) >= MIN_SEP);
    }

    #[test]
    fn anchored_bodies_never_move_but_partners_do() {
        let mut bodies = vec![body(100.0, 100.0), body(112.0, 100.0)];
        bodies[0].anchored = true;
        resolve_pass(&mut bodies, MIN_SEP, 0.05);
        assert_eq!(bodies[0].velocity, Vec2::ZERO);
        assert!(bodies[1].velocity.x > 0.0);
    }

    #[test]
    fn repeated_passes_separate_without_reoverlapping() {
        let mut bodies = vec![body(100.0, 100.0), body(115.0, 108.0)];
        let mut previous = bodies[0].position.distance(bodies[1].position);
        let mut separated_at = None;

        for step in 0..2000 {
            resolve_pass(&mut bodies, MIN_SEP, 0.05);
            for body in bodies.iter_mut() {
                let step_vec = body.velocity;
                body.position += step_vec;
            }
            let distance = bodies[0].position.distance(bodies[1].position);
            match separated_at {
                None => {
                    // Every converging step widens the gap.
                    assert!(
                        distance > previous,
                        "separation shrank from {previous} to {distance} at step {step}"
                    );
                    if distance >= MIN_SEP {
                        separated_at = Some(step);
                    }
                }
                // Once apart, the pass stops correcting and the pair drifts
                // on diverging velocities; it must not fall back in.
                Some(_) => assert!(distance >= MIN_SEP),
            }
            previous = distance;
        }

        assert!(separated_at.is_some(), "pair never reached min separation");
    }
}
