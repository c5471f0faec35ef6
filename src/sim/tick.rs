//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically:
//! timers → input → collision scan → commit → cleanup → motion → phase.

use glam::{IVec2, Vec2};
use rand::Rng;
use std::f32::consts::TAU;

use super::collision::intersects;
use super::entity::{Entity, EntityKind, Owner, Tier};
use super::state::{GamePhase, GameState};
use crate::consts::*;
use crate::error::SimError;
use crate::{heading_vector, wave_size};

/// Craft rotation intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    Left,
    Right,
    #[default]
    None,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held rotation
    pub rotation: Rotation,
    /// Held thrust
    pub thrust: bool,
    /// Shots requested since the last tick (one per key press)
    pub fire: u32,
    /// Enter hyperspace
    pub hyperspace: bool,
}

/// A structural change found during the read-only collision scan
#[derive(Debug, Clone, Copy)]
enum Impact {
    /// Projectile struck an asteroid
    ShotAsteroid {
        shot: usize,
        target: usize,
        owner: Owner,
    },
    /// Hostile projectile struck the craft
    ShotCraft { shot: usize, craft: usize },
    /// Craft flew into a hostile body
    Rammed { craft: usize, hostile: usize },
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) -> Result<(), SimError> {
    // Don't tick if idle, paused or game over
    match state.phase {
        GamePhase::NotStarted | GamePhase::Paused | GamePhase::GameOver => return Ok(()),
        _ => {}
    }

    state.time_ticks += 1;

    expire_timers(state)?;
    if state.phase == GamePhase::GameOver {
        state.remove_destroyed();
        return Ok(());
    }

    // Once the craft is gone nothing can score or fragment; the field just drifts
    if matches!(state.phase, GamePhase::Playing | GamePhase::LevelTransition) {
        apply_input(state, input);
        let impacts = scan_collisions(state.entities());
        commit_impacts(state, &impacts)?;
    }

    state.remove_destroyed();

    let world = state.world();
    for entity in state.entities_mut() {
        entity.advance(world);
    }

    evaluate_phase(state);

    // Ensure deterministic ordering
    state.normalize_order();
    Ok(())
}

/// Fire every deadline that has been reached
fn expire_timers(state: &mut GameState) -> Result<(), SimError> {
    let now = state.time_ticks;

    for idx in 0..state.entities().len() {
        let entity = &state.entities()[idx];
        if entity.is_destroyed() {
            continue;
        }
        let kind = entity.kind;
        match kind {
            EntityKind::Projectile { expires_at, .. } if now >= expires_at => {
                state.destroy_at(idx)?;
            }
            EntityKind::Craft {
                hyperspace_until: Some(until),
            } if now >= until => {
                exit_hyperspace(state, idx);
            }
            _ => {}
        }
    }

    match (state.phase, state.phase_deadline) {
        (GamePhase::LevelTransition, Some(deadline)) if now >= deadline => {
            state.level += 1;
            state.phase_deadline = None;
            generate_wave(state);
            state.phase = GamePhase::Playing;
            log::info!("Level {} begins", state.level);
        }
        (GamePhase::CraftDestroyed, Some(deadline)) if now >= deadline => {
            state.phase_deadline = None;
            state.phase = GamePhase::GameOver;
            log::info!(
                "Game over: score {}, level {}",
                state.score(),
                state.level
            );
        }
        _ => {}
    }
    Ok(())
}

/// Reappear somewhere random, at rest and vulnerable again
fn exit_hyperspace(state: &mut GameState, idx: usize) {
    let world = state.world();
    let pos = IVec2::new(
        state.rng.random_range(0..world.x),
        state.rng.random_range(0..world.y),
    );
    let craft = &mut state.entities_mut()[idx];
    craft.pos = pos;
    craft.vel = Vec2::ZERO;
    craft.kind = EntityKind::Craft {
        hyperspace_until: None,
    };
    log::debug!("Craft left hyperspace at {}", pos);
}

/// Apply held and queued intents to the craft
fn apply_input(state: &mut GameState, input: &TickInput) {
    let Some(idx) = state.craft_index() else {
        return;
    };
    if state.entities()[idx].is_destroyed() {
        return;
    }

    let craft = &mut state.entities_mut()[idx];
    match input.rotation {
        Rotation::Left => craft.rotate(-1.0),
        Rotation::Right => craft.rotate(1.0),
        Rotation::None => {}
    }
    if input.thrust {
        craft.thrust();
    }

    for _ in 0..input.fire {
        let craft = &state.entities()[idx];
        if craft.is_invulnerable() {
            break;
        }
        let muzzle = craft.pos + (heading_vector(craft.heading) * MUZZLE_OFFSET).round().as_ivec2();
        let heading = craft.heading;
        if state.spawn_projectile(muzzle, heading, Owner::Player).is_none() {
            break;
        }
    }

    if input.hyperspace && !state.entities()[idx].is_invulnerable() {
        let until = state.time_ticks + state.settings.ticks_for(state.settings.hyperspace_ms);
        state.entities_mut()[idx].kind = EntityKind::Craft {
            hyperspace_until: Some(until),
        };
        log::debug!("Craft entered hyperspace until tick {}", until);
    }
}

/// Find every impact this tick without mutating anything.
///
/// Every projectile is resolved first, then the craft. An entity claimed by
/// one impact is skipped by all later checks, so nothing is destroyed twice.
fn scan_collisions(entities: &[Entity]) -> Vec<Impact> {
    let mut doomed = vec![false; entities.len()];
    let mut impacts = Vec::new();

    for (i, shot) in entities.iter().enumerate() {
        let EntityKind::Projectile { owner, .. } = shot.kind else {
            continue;
        };
        if shot.is_destroyed() || doomed[i] {
            continue;
        }

        for (j, target) in entities.iter().enumerate() {
            if i == j || target.is_destroyed() || doomed[j] || !intersects(shot, target) {
                continue;
            }
            let impact = match target.kind {
                EntityKind::Asteroid { .. } => Impact::ShotAsteroid {
                    shot: i,
                    target: j,
                    owner,
                },
                EntityKind::Craft { .. } if owner == Owner::Hostile => Impact::ShotCraft {
                    shot: i,
                    craft: j,
                },
                _ => continue,
            };
            doomed[i] = true;
            doomed[j] = true;
            impacts.push(impact);
            break;
        }
    }

    let craft = entities
        .iter()
        .position(|e| e.is_craft() && !e.is_destroyed());
    if let Some(c) = craft.filter(|&c| !doomed[c]) {
        let hit = entities.iter().enumerate().position(|(j, e)| {
            e.is_hostile() && !e.is_destroyed() && !doomed[j] && intersects(e, &entities[c])
        });
        if let Some(hostile) = hit {
            impacts.push(Impact::Rammed { craft: c, hostile });
        }
    }

    impacts
}

/// Apply the scanned impacts: destroy, score, then merge fragments
fn commit_impacts(state: &mut GameState, impacts: &[Impact]) -> Result<(), SimError> {
    let mut fragments: Vec<(Tier, IVec2)> = Vec::new();

    for &impact in impacts {
        match impact {
            Impact::ShotAsteroid {
                shot,
                target,
                owner,
            } => {
                state.destroy_at(shot)?;
                state.destroy_at(target)?;
                let rock = &state.entities()[target];
                let tier = rock.tier()?;
                fragments.push((tier, rock.pos));
                if owner == Owner::Player {
                    state.add_score(tier.score());
                }
            }
            Impact::ShotCraft { shot, craft } => {
                state.destroy_at(shot)?;
                state.destroy_at(craft)?;
                log::info!("Craft destroyed by hostile fire");
            }
            Impact::Rammed { craft, hostile } => {
                state.destroy_at(hostile)?;
                state.destroy_at(craft)?;
                let body = &state.entities()[hostile];
                let (pos, score) = (body.pos, body.score_value()?);
                if let EntityKind::Asteroid { tier } = body.kind {
                    fragments.push((tier, pos));
                }
                state.add_score(score);
                log::info!("Craft destroyed in collision");
            }
        }
    }

    // Fragments join after the scan, so they cannot be hit until next tick
    for (tier, pos) in fragments {
        spawn_fragments(state, tier, pos);
    }
    Ok(())
}

/// Replace a destroyed asteroid with its smaller pieces (none for Small)
pub fn spawn_fragments(state: &mut GameState, parent: Tier, pos: IVec2) -> usize {
    let Some(tier) = parent.fragment_tier() else {
        return 0;
    };
    for _ in 0..FRAGMENTS_PER_BREAK {
        let heading = state.rng.random_range(0.0..TAU);
        state.spawn_asteroid(pos, tier, heading);
    }
    log::debug!("{:?} asteroid broke into {} {:?}", parent, FRAGMENTS_PER_BREAK, tier);
    FRAGMENTS_PER_BREAK
}

/// Move to the timed phases when the craft is lost or the field is clear
fn evaluate_phase(state: &mut GameState) {
    let now = state.time_ticks;
    match state.phase {
        GamePhase::Playing | GamePhase::LevelTransition if state.craft_destroyed() => {
            state.phase = GamePhase::CraftDestroyed;
            state.phase_deadline =
                Some(now + state.settings.ticks_for(state.settings.game_over_delay_ms));
            log::info!("Craft lost at tick {}", now);
        }
        GamePhase::Playing if state.live_hostiles() == 0 => {
            state.phase = GamePhase::LevelTransition;
            state.phase_deadline =
                Some(now + state.settings.ticks_for(state.settings.level_transition_ms));
            log::info!("Level {} cleared", state.level);
        }
        _ => {}
    }
}

/// Generate the wave for the current level around the craft
pub fn generate_wave(state: &mut GameState) {
    let count = wave_size(state.level, state.settings.max_wave_size);
    let center = state
        .craft()
        .map(|c| c.pos)
        .unwrap_or_else(|| state.world() / 2);

    for _ in 0..count {
        let angle = state.rng.random_range(0.0..TAU);
        let distance = state
            .rng
            .random_range(SPAWN_MIN_DISTANCE..=SPAWN_MAX_DISTANCE);
        let offset = (Vec2::new(angle.cos(), angle.sin()) * distance)
            .round()
            .as_ivec2();
        let heading = state.rng.random_range(0.0..TAU);
        state.spawn_asteroid(center + offset, Tier::Large, heading);
    }

    log::info!("Wave {}: {} asteroids", state.level, count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use proptest::prelude::*;

    /// Started state with the generated wave removed
    fn empty_field() -> GameState {
        let mut state = GameState::new(Settings::default()).unwrap();
        state.start();
        let ids: Vec<_> = state
            .entities()
            .iter()
            .filter(|e| e.is_hostile())
            .map(|e| e.id)
            .collect();
        for id in ids {
            state.destroy(id).unwrap();
        }
        state.remove_destroyed();
        state
    }

    fn craft_pos(state: &GameState) -> IVec2 {
        state.craft().expect("craft alive").pos
    }

    fn count_tier(state: &GameState, tier: Tier) -> usize {
        state
            .entities()
            .iter()
            .filter(|e| e.kind == EntityKind::Asteroid { tier })
            .count()
    }

    /// Park a still asteroid somewhere safe from the craft
    fn park_rock(state: &mut GameState, pos: IVec2, tier: Tier) {
        let id = state.spawn_asteroid(pos, tier, 0.0);
        let rock = state.entities_mut().iter_mut().find(|e| e.id == id).unwrap();
        rock.vel = Vec2::ZERO;
    }

    #[test]
    fn test_tick_noop_when_idle() {
        let mut state = GameState::new(Settings::default()).unwrap();
        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.phase(), GamePhase::NotStarted);
    }

    #[test]
    fn test_tick_frozen_while_paused() {
        let mut state = GameState::new(Settings::default()).unwrap();
        state.start();
        state.pause();
        let before: Vec<_> = state.entities().iter().map(|e| e.pos).collect();
        for _ in 0..10 {
            tick(&mut state, &TickInput::default()).unwrap();
        }
        let after: Vec<_> = state.entities().iter().map(|e| e.pos).collect();
        assert_eq!(before, after);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_large_breaks_into_two_medium_at_same_spot() {
        let mut state = empty_field();
        let pos = IVec2::new(100, 100);
        spawn_fragments(&mut state, Tier::Large, pos);
        assert_eq!(count_tier(&state, Tier::Medium), 2);
        assert!(state
            .entities()
            .iter()
            .filter(|e| e.is_hostile())
            .all(|e| e.pos == pos));
        assert_eq!(spawn_fragments(&mut state, Tier::Small, pos), 0);
        assert_eq!(state.live_hostiles(), 2);
    }

    #[test]
    fn test_full_chain_yields_four_small() {
        let mut state = empty_field();
        let pos = IVec2::new(300, 300);
        spawn_fragments(&mut state, Tier::Large, pos);
        let mediums: Vec<_> = state
            .entities()
            .iter()
            .filter(|e| e.is_hostile())
            .map(|e| e.id)
            .collect();
        for id in mediums {
            state.destroy(id).unwrap();
            spawn_fragments(&mut state, Tier::Medium, pos);
        }
        state.remove_destroyed();
        assert_eq!(count_tier(&state, Tier::Small), 4);
        assert_eq!(count_tier(&state, Tier::Medium), 0);
        state.validate_invariants().unwrap();
    }

    #[test]
    fn test_player_shot_scores_and_fragments() {
        for (tier, expected_fragments) in [(Tier::Large, 2), (Tier::Medium, 2), (Tier::Small, 0)] {
            let mut state = empty_field();
            // A second rock keeps the level from clearing
            park_rock(&mut state, IVec2::new(20, 20), Tier::Small);
            park_rock(&mut state, IVec2::new(500, 100), tier);
            state.spawn_projectile(IVec2::new(500, 100), 0.0, Owner::Player);

            tick(&mut state, &TickInput::default()).unwrap();

            assert_eq!(state.score(), tier.score());
            assert_eq!(state.live_player_projectiles(), 0);
            assert_eq!(state.live_hostiles(), 1 + expected_fragments);
            if let Some(frag) = tier.fragment_tier() {
                assert_eq!(count_tier(&state, frag), expected_fragments + usize::from(frag == Tier::Small));
            }
            state.validate_invariants().unwrap();
        }
    }

    #[test]
    fn test_hostile_shot_gives_no_score() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(20, 20), Tier::Small);
        park_rock(&mut state, IVec2::new(500, 100), Tier::Medium);
        state.spawn_projectile(IVec2::new(500, 100), 0.0, Owner::Hostile);
        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(state.score(), 0);
        assert_eq!(count_tier(&state, Tier::Small), 3);
    }

    #[test]
    fn test_projectile_destroys_at_most_one_target() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(500, 100), Tier::Small);
        park_rock(&mut state, IVec2::new(502, 100), Tier::Small);
        state.spawn_projectile(IVec2::new(501, 100), 0.0, Owner::Player);
        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(state.live_hostiles(), 1);
        assert_eq!(state.score(), SMALL_SCORE);
    }

    #[test]
    fn test_fragments_survive_their_birth_tick() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(500, 100), Tier::Large);
        // Two shots on the same rock: the second finds nothing left to hit this tick
        state.spawn_projectile(IVec2::new(500, 100), 0.0, Owner::Player);
        state.spawn_projectile(IVec2::new(500, 101), 0.0, Owner::Player);
        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(count_tier(&state, Tier::Medium), 2);
        assert_eq!(state.score(), LARGE_SCORE);
        assert_eq!(state.live_player_projectiles(), 1);
    }

    #[test]
    fn test_player_shot_does_not_hit_craft() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(20, 20), Tier::Small);
        let pos = craft_pos(&state);
        state.spawn_projectile(pos, 0.0, Owner::Player);
        tick(&mut state, &TickInput::default()).unwrap();
        assert!(!state.craft_destroyed());
        assert_eq!(state.live_player_projectiles(), 1);
    }

    #[test]
    fn test_hostile_shot_destroys_craft() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(20, 20), Tier::Small);
        let pos = craft_pos(&state);
        state.spawn_projectile(pos, 0.0, Owner::Hostile);
        tick(&mut state, &TickInput::default()).unwrap();
        assert!(state.craft_destroyed());
        assert_eq!(state.phase(), GamePhase::CraftDestroyed);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_player_shot_resolves_in_same_tick_as_craft_hit() {
        let mut state = empty_field();
        let pos = craft_pos(&state);
        // Lower id: resolved before the player shot
        state.spawn_projectile(pos, 0.0, Owner::Hostile);
        park_rock(&mut state, IVec2::new(500, 100), Tier::Large);
        state.spawn_projectile(IVec2::new(500, 100), 0.0, Owner::Player);

        tick(&mut state, &TickInput::default()).unwrap();

        assert!(state.craft_destroyed());
        assert_eq!(state.phase(), GamePhase::CraftDestroyed);
        assert_eq!(state.score(), LARGE_SCORE);
        assert_eq!(count_tier(&state, Tier::Large), 0);
        assert_eq!(count_tier(&state, Tier::Medium), 2);
        assert_eq!(state.live_player_projectiles(), 0);
        state.validate_invariants().unwrap();
    }

    #[test]
    fn test_ramming_destroys_both_and_scores() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(20, 20), Tier::Small);
        let pos = craft_pos(&state);
        park_rock(&mut state, pos, Tier::Medium);
        tick(&mut state, &TickInput::default()).unwrap();
        assert!(state.craft_destroyed());
        assert!(state.craft().is_none());
        assert_eq!(state.score(), MEDIUM_SCORE);
        assert_eq!(count_tier(&state, Tier::Small), 3);
        assert_eq!(state.phase(), GamePhase::CraftDestroyed);
    }

    #[test]
    fn test_hyperspace_grants_immunity() {
        let mut state = empty_field();
        let pos = craft_pos(&state);
        park_rock(&mut state, pos, Tier::Large);
        let input = TickInput {
            hyperspace: true,
            ..Default::default()
        };
        tick(&mut state, &input).unwrap();
        assert!(!state.craft_destroyed());
        assert!(state.craft().unwrap().is_invulnerable());

        // Immune for the whole hyperspace window
        let window = state.settings.ticks_for(state.settings.hyperspace_ms);
        for _ in 1..window {
            tick(&mut state, &TickInput::default()).unwrap();
            assert!(!state.craft_destroyed());
            assert!(state.craft().unwrap().is_invulnerable());
        }
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_hyperspace_exit_relocates_craft_at_rest() {
        // Empty field: the craft can reappear anywhere without hitting a rock
        let mut state = empty_field();
        let idx = state.craft_index().unwrap();
        state.entities_mut()[idx].vel = Vec2::new(3.0, 0.0);
        let input = TickInput {
            hyperspace: true,
            ..Default::default()
        };
        tick(&mut state, &input).unwrap();
        let window = state.settings.ticks_for(state.settings.hyperspace_ms);
        for _ in 0..window {
            tick(&mut state, &TickInput::default()).unwrap();
        }
        let craft = state.craft().unwrap();
        assert!(!craft.is_invulnerable());
        assert_eq!(craft.vel, Vec2::ZERO);
    }

    #[test]
    fn test_no_firing_in_hyperspace() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(20, 20), Tier::Small);
        let input = TickInput {
            hyperspace: true,
            ..Default::default()
        };
        tick(&mut state, &input).unwrap();
        let input = TickInput {
            fire: 1,
            ..Default::default()
        };
        tick(&mut state, &input).unwrap();
        assert_eq!(state.live_player_projectiles(), 0);
    }

    #[test]
    fn test_fire_respects_cap() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(20, 20), Tier::Small);
        let fire = TickInput {
            fire: 1,
            ..Default::default()
        };
        for _ in 0..5 {
            tick(&mut state, &fire).unwrap();
        }
        assert_eq!(state.live_player_projectiles(), MAX_PLAYER_PROJECTILES);
        state.validate_invariants().unwrap();
    }

    #[test]
    fn test_projectile_expires_after_ttl() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(20, 20), Tier::Small);
        let fire = TickInput {
            fire: 1,
            ..Default::default()
        };
        tick(&mut state, &fire).unwrap();
        assert_eq!(state.live_player_projectiles(), 1);

        let ttl = state.settings.ticks_for(state.settings.projectile_ttl_ms);
        for _ in 1..ttl {
            tick(&mut state, &TickInput::default()).unwrap();
        }
        assert_eq!(state.live_player_projectiles(), 1);
        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(state.live_player_projectiles(), 0);
        assert!(!state
            .entities()
            .iter()
            .any(|e| matches!(e.kind, EntityKind::Projectile { .. })));
    }

    #[test]
    fn test_projectile_ttl_frozen_while_paused() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(20, 20), Tier::Small);
        let fire = TickInput {
            fire: 1,
            ..Default::default()
        };
        tick(&mut state, &fire).unwrap();
        state.pause();
        for _ in 0..100 {
            tick(&mut state, &TickInput::default()).unwrap();
        }
        state.resume();
        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(state.live_player_projectiles(), 1);
    }

    #[test]
    fn test_level_transition_and_next_wave() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(500, 100), Tier::Small);
        state.spawn_projectile(IVec2::new(500, 100), 0.0, Owner::Player);
        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(state.live_hostiles(), 0);
        assert_eq!(state.phase(), GamePhase::LevelTransition);
        assert_eq!(state.level, 1);

        let delay = state.settings.ticks_for(state.settings.level_transition_ms);
        for _ in 1..delay {
            tick(&mut state, &TickInput::default()).unwrap();
            assert_eq!(state.phase(), GamePhase::LevelTransition);
        }
        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.level, 2);
        assert_eq!(count_tier(&state, Tier::Large), 5);
        state.validate_invariants().unwrap();
    }

    #[test]
    fn test_game_over_after_delay_is_terminal() {
        let mut state = empty_field();
        park_rock(&mut state, IVec2::new(20, 20), Tier::Small);
        let pos = craft_pos(&state);
        park_rock(&mut state, pos, Tier::Small);
        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(state.phase(), GamePhase::CraftDestroyed);
        let score = state.score();

        // A player shot still in flight must not score once the craft is gone
        state.spawn_projectile(IVec2::new(20, 20), 0.0, Owner::Player);
        let delay = state.settings.ticks_for(state.settings.game_over_delay_ms);
        for _ in 0..delay {
            tick(&mut state, &TickInput::default()).unwrap();
        }
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert_eq!(state.score(), score);
        assert_eq!(state.level, 1);

        let frozen = state.time_ticks;
        for _ in 0..50 {
            tick(&mut state, &TickInput::default()).unwrap();
        }
        assert_eq!(state.time_ticks, frozen);
        assert_eq!(state.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_generate_wave_spawns_around_craft() {
        let mut state = empty_field();
        state.level = 20;
        generate_wave(&mut state);
        assert_eq!(count_tier(&state, Tier::Large), MAX_WAVE_SIZE as usize);

        let craft = craft_pos(&state).as_vec2();
        for rock in state.entities().iter().filter(|e| e.is_hostile()) {
            let d = rock.pos.as_vec2() - craft;
            let world = state.world().as_vec2();
            let dx = d.x.abs().min(world.x - d.x.abs());
            let dy = d.y.abs().min(world.y - d.y.abs());
            let dist = Vec2::new(dx, dy).length();
            assert!(dist >= SPAWN_MIN_DISTANCE - 1.5, "rock too close: {dist}");
        }
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(Settings::default()).unwrap();
        let mut state2 = GameState::new(Settings::default()).unwrap();
        state1.start();
        state2.start();

        let inputs = [
            TickInput {
                rotation: Rotation::Left,
                thrust: true,
                ..Default::default()
            },
            TickInput {
                fire: 1,
                ..Default::default()
            },
            TickInput {
                hyperspace: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..50 {
            for input in &inputs {
                tick(&mut state1, input).unwrap();
                tick(&mut state2, input).unwrap();
            }
        }

        assert_eq!(state1.snapshot(), state2.snapshot());
    }

    fn arb_input() -> impl Strategy<Value = TickInput> {
        (0u8..3, any::<bool>(), 0u32..3, prop::bool::weighted(0.05)).prop_map(
            |(rot, thrust, fire, hyperspace)| TickInput {
                rotation: match rot {
                    0 => Rotation::Left,
                    1 => Rotation::Right,
                    _ => Rotation::None,
                },
                thrust,
                fire,
                hyperspace,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_score_monotonic_and_invariants_hold(
            seed in any::<u64>(),
            inputs in prop::collection::vec(arb_input(), 1..300),
        ) {
            let settings = Settings { seed, ..Settings::default() };
            let mut state = GameState::new(settings).unwrap();
            state.start();
            let mut last_score = 0;
            for input in &inputs {
                tick(&mut state, input).unwrap();
                prop_assert!(state.score() >= last_score);
                last_score = state.score();
                prop_assert!(state.live_player_projectiles() <= MAX_PLAYER_PROJECTILES);
                prop_assert!(state.validate_invariants().is_ok());
            }
        }

        #[test]
        fn prop_advance_stays_in_bounds(
            x in 0..WORLD_WIDTH,
            y in 0..WORLD_HEIGHT,
            vx in -12.0f32..12.0,
            vy in -12.0f32..12.0,
        ) {
            let mut e = Entity::projectile(1, IVec2::new(x, y), 0.0, Owner::Player, 100);
            e.vel = Vec2::new(vx, vy);
            e.advance(IVec2::new(WORLD_WIDTH, WORLD_HEIGHT));
            prop_assert!((0..WORLD_WIDTH).contains(&e.pos.x));
            prop_assert!((0..WORLD_HEIGHT).contains(&e.pos.y));
            let raw = (x as f32 + vx) as i32;
            prop_assert_eq!(e.pos.x, raw.rem_euclid(WORLD_WIDTH));
        }
    }
}
