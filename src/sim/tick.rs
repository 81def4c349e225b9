//! Fixed timestep simulation tick
//!
//! One call advances a session by exactly one tick. Order within a playing
//! tick: input -> difficulty -> actor -> spawner -> entities -> collision ->
//! cull, then particles and shake (every phase), then the terminal check.

use super::game::{Game, spawn_progress};
use super::lifecycle::{Phase, Transition};
use super::state::World;
use crate::consts::TICK_MS;

/// Advance the session by one fixed timestep
pub fn tick<G: Game>(game: &mut G, world: &mut World<G::Kind>) {
    world.time_ticks += 1;

    match world.phase() {
        Phase::Playing => play_tick(game, world),
        Phase::Countdown => {
            world.take_gestures();
            if world.lifecycle.advance(TICK_MS) == Some(Transition::CountdownEnded) {
                log::info!("{}: countdown over, playing", game.id().as_str());
            }
        }
        Phase::Success => {
            world.take_gestures();
            game.step_success(world);
            if world.lifecycle.advance(TICK_MS) == Some(Transition::SuccessEnded) {
                game.on_success_end(world);
                if world.phase() == Phase::Success {
                    world.lifecycle.resume_playing();
                }
            }
        }
        Phase::Menu | Phase::GameOver => {
            world.take_gestures();
        }
    }

    // Cosmetic, keeps animating on the last frame
    world.particles.step();
    world.shake.step();

    if world.phase().runs_simulation() && (world.is_terminal() || game.is_lost(world)) {
        world.lifecycle.game_over();
        game.on_game_over(world);
        log::info!(
            "{}: game over, score {} after {:.1}s",
            game.id().as_str(),
            world.score,
            world.elapsed_ms / 1000.0
        );
    }
}

fn play_tick<G: Game>(game: &mut G, world: &mut World<G::Kind>) {
    for gesture in world.take_gestures() {
        game.on_gesture(world, gesture);
        if !world.phase().runs_simulation() {
            // Input ended the level (trace finished, failed)
            return;
        }
    }

    world.elapsed_ms += TICK_MS;
    world.difficulty.advance(TICK_MS);

    game.step_actor(world);

    world.distance += game.scroll_speed(world);
    let progress = spawn_progress(game, world);
    let interval = game.spawn_interval(world);
    let intensity = world.difficulty.intensity.value();
    if world.spawner.due(progress, interval, intensity, &mut world.rng) {
        game.spawn(world);
    }

    game.step_entities(world);
    game.collide(world);
    world.cull();
}
