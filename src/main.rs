//! Agro Arcade entry point
//!
//! On the web: mounts the game named by the canvas `data-game` attribute and
//! drives it from requestAnimationFrame. Natively: plays every game headless
//! for a few simulated seconds and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PointerEvent};

    use agro_arcade::audio::{Mixer, WebAudioSynth};
    use agro_arcade::highscores::PendingScore;
    use agro_arcade::renderer::CanvasSurface;
    use agro_arcade::sim::{Phase, Playable, Pointer, SessionOptions, SurfaceRect};
    use agro_arcade::{Branding, GameId, LocalLeaderboard, Settings, launch, platform};

    /// A mounted game and everything the frame loop needs
    struct Runner {
        id: GameId,
        session: Box<dyn Playable>,
        surface: CanvasSurface,
        canvas: HtmlCanvasElement,
        leaderboard: LocalLeaderboard,
        pending: PendingScore,
        /// Branding company, used when the host confirms without one
        company: String,
        last_phase: Phase,
        frame_id: Option<i32>,
    }

    impl Runner {
        fn frame(&mut self, now_ms: f64) {
            if let Some(window) = web_sys::window() {
                self.surface.resize(window.device_pixel_ratio());
            }
            self.surface.begin_frame();
            self.session.frame(now_ms, &mut self.surface);

            let phase = self.session.phase();
            let score = self.session.score();
            self.pending.observe(phase, score);
            if phase != self.last_phase {
                if phase == Phase::GameOver {
                    self.session.set_best(self.leaderboard.best(self.id).max(score));
                    if let Some(rank) = self.leaderboard.potential_rank(self.id, score) {
                        log::info!("{}: score {score} would place #{rank}", self.id.as_str());
                    }
                }
                self.last_phase = phase;
            }
        }

        /// Send the finished run once the player has confirmed it
        fn confirm_score(&self, player: String, company: Option<String>) {
            let company = company.unwrap_or_else(|| self.company.clone());
            let id = self.id;
            let leaderboard = self.leaderboard.clone();
            let pending = self.pending.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match pending.confirm(&leaderboard, &player, &company).await {
                    Ok(()) => log::info!("{}: score submitted", id.as_str()),
                    Err(e) => log::warn!("{}: score not submitted: {e}", id.as_str()),
                }
            });
        }

        fn pointer(&mut self, pointer: Pointer) {
            let r = self.canvas.get_bounding_client_rect();
            let rect = SurfaceRect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32);
            self.session.pointer(pointer, &rect);
        }

        fn stop(&mut self) {
            if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
            self.session.teardown();
        }
    }

    thread_local! {
        static RUNNER: RefCell<Option<Rc<RefCell<Runner>>>> = const { RefCell::new(None) };
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        // Fails only if a logger is already installed
        let _ = console_log::init_with_level(log::Level::Info);

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document, nothing to mount");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        let id = canvas
            .get_attribute("data-game")
            .and_then(|name| GameId::from_str(&name))
            .unwrap_or(GameId::WeedControl);
        let branding = canvas
            .get_attribute("data-branding")
            .and_then(|json| match Branding::from_json(&json) {
                Ok(branding) => Some(branding),
                Err(e) => {
                    log::warn!("Ignoring unreadable branding: {e}");
                    None
                }
            })
            .unwrap_or_default();
        let Some(mut surface) = CanvasSurface::new(canvas.clone()) else {
            log::error!("Canvas has no 2D context");
            return;
        };
        if let (Some(key), Some(url)) = (&branding.logo_key, &branding.logo_url) {
            surface.load_image(key, url);
        }

        let settings = Settings::load();
        let seed = platform::random_seed();
        let synth = WebAudioSynth::new(Mixer::from_settings(&settings), seed);
        let mut session = launch(id, seed, Box::new(synth), SessionOptions::from_settings(&settings));
        let leaderboard = LocalLeaderboard::load();
        session.set_best(leaderboard.best(id));
        let company = branding.company_name.clone();
        session.set_branding(branding);
        log::info!("Mounted {} (seed {seed})", id.title());

        let runner = Rc::new(RefCell::new(Runner {
            id,
            session,
            surface,
            canvas: canvas.clone(),
            leaderboard,
            pending: PendingScore::new(id),
            company,
            last_phase: Phase::Menu,
            frame_id: None,
        }));

        install_pointer_listeners(&canvas, &runner);
        RUNNER.with(|cell| *cell.borrow_mut() = Some(runner.clone()));
        schedule(runner);
    }

    fn install_pointer_listeners(canvas: &HtmlCanvasElement, runner: &Rc<RefCell<Runner>>) {
        let events: [(&str, fn(f32, f32) -> Pointer); 4] = [
            ("pointerdown", Pointer::down),
            ("pointermove", Pointer::moved),
            ("pointerup", Pointer::up),
            ("pointercancel", Pointer::up),
        ];
        for (name, make) in events {
            let runner = runner.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                runner
                    .borrow_mut()
                    .pointer(make(event.client_x() as f32, event.client_y() as f32));
            });
            if canvas
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
                .is_err()
            {
                log::warn!("Could not listen for {name}");
            }
            closure.forget();
        }
    }

    fn schedule(runner: Rc<RefCell<Runner>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if runner.borrow().session.is_torn_down() {
            return;
        }
        let next = runner.clone();
        let closure = Closure::once(move |time: f64| {
            next.borrow_mut().frame(time);
            schedule(next);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => runner.borrow_mut().frame_id = Some(id),
            Err(_) => log::warn!("requestAnimationFrame failed, loop stopped"),
        }
        closure.forget();
    }

    /// Submit the current run after the player confirmed the save form
    pub fn confirm_score(player: String, company: Option<String>) {
        RUNNER.with(|cell| match cell.borrow().as_ref() {
            Some(runner) => runner.borrow().confirm_score(player, company),
            None => log::warn!("No game mounted, score dropped"),
        });
    }

    /// Cancel the frame loop and tear the mounted session down
    pub fn stop() {
        RUNNER.with(|cell| {
            if let Some(runner) = cell.borrow_mut().take() {
                runner.borrow_mut().stop();
                log::info!("Runner stopped");
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Submit the finished run; the host calls this from its confirm button
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn confirm_score(player: String, company: Option<String>) {
    wasm_game::confirm_score(player, company);
}

/// Stop the running game (host page navigation, unmount)
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stop() {
    wasm_game::stop();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Agro Arcade (native) starting...");
    log::info!("Native mode is a headless demo - build for wasm32 to play");

    for id in agro_arcade::GameId::ALL {
        demo(id);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play `id` for twenty simulated seconds, tapping the middle of the field
#[cfg(not(target_arch = "wasm32"))]
fn demo(id: agro_arcade::GameId) {
    use agro_arcade::audio::RecordingSynth;
    use agro_arcade::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH, TICK_MS};
    use agro_arcade::renderer::CommandRecorder;
    use agro_arcade::sim::{Playable, Pointer, SessionOptions, SurfaceRect};

    let synth = RecordingSynth::new();
    let mut session = agro_arcade::launch(id, 42, Box::new(synth.clone()), SessionOptions::default());
    let mut surface = CommandRecorder::new();
    let rect = SurfaceRect::logical();
    let (cx, cy) = (LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT / 2.0);

    session.pointer(Pointer::down(cx, cy), &rect);
    session.pointer(Pointer::up(cx, cy), &rect);

    let mut now = 0.0;
    let mut ticks = 0;
    for frame in 0..1200u32 {
        now += TICK_MS;
        ticks += session.frame(now, &mut surface);
        if frame % 30 == 0 {
            // Sweep across the field so aimers and tappers both get input
            let x = (frame / 30 % 5) as f32 * LOGICAL_WIDTH / 4.0;
            session.pointer(Pointer::down(x, cy), &rect);
            session.pointer(Pointer::moved(cx, cy + 100.0), &rect);
            session.pointer(Pointer::up(cx, cy + 100.0), &rect);
        }
        surface.clear_log();
    }

    log::info!(
        "{}: {} ticks, phase {}, score {}, {} sounds",
        id.title(),
        ticks,
        session.phase().as_str(),
        session.score(),
        synth.play_count()
    );
    session.teardown();
}
