//! Pong Arena entry point
//!
//! In the browser this wires the DOM (canvas, dashboard, game-over form,
//! leaderboard drawer) to the game loop. Natively it plays a headless match
//! with an autopilot standing in for the player.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement, MouseEvent,
        TouchEvent,
    };

    use pong_arena::audio::{AudioManager, SoundEffect, SoundPlayer};
    use pong_arena::game_loop::{FrameScheduler, LevelSink, LivesSink, ScoreSink};
    use pong_arena::input::client_to_field;
    use pong_arena::leaderboard::{HttpLeaderboard, LeaderboardError, LeaderboardView, SubmitForm};
    use pong_arena::renderer::{Blend, Canvas, DrawCommand, css_color};
    use pong_arena::sim::field::{Field, Orientation, Side};
    use pong_arena::{GameLoop, LoopPhase, Settings, TickToken};

    /// Browser side of the game loop's collaborators
    struct WebHost {
        document: Document,
        ctx: CanvasRenderingContext2d,
        audio: AudioManager,
        /// Token the loop asked for, not yet handed to the browser
        requested: Option<TickToken>,
        /// Token and `requestAnimationFrame` handle currently queued
        queued: Option<(TickToken, i32)>,
    }

    impl WebHost {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force("hidden", hidden);
            }
        }

        fn stroke_dashed(&self, dash: [f32; 2], width: f32, color: [f32; 4]) {
            let pattern = js_sys::Array::of2(&JsValue::from(dash[0]), &JsValue::from(dash[1]));
            let _ = self.ctx.set_line_dash(&pattern);
            self.ctx.set_stroke_style_str(&css_color(color));
            self.ctx.set_line_width(width as f64);
            self.ctx.stroke();
            let _ = self.ctx.set_line_dash(&js_sys::Array::new());
        }
    }

    impl ScoreSink for WebHost {
        fn set_score(&mut self, side: Side, score: u32) {
            if side == Side::Player {
                self.set_text("score", &score.to_string());
            }
        }
    }

    impl LevelSink for WebHost {
        fn set_level(&mut self, side: Side, level: u32) {
            if side == Side::Player {
                self.set_text("level", &level.to_string());
            }
        }
    }

    impl LivesSink for WebHost {
        fn set_lives(&mut self, lives: u8) {
            self.set_text("lives", &"\u{2764}".repeat(lives as usize));
        }
    }

    impl SoundPlayer for WebHost {
        fn play(&mut self, effect: SoundEffect, cooldown_ms: f64) {
            self.audio.play(effect, cooldown_ms);
        }
    }

    impl Canvas for WebHost {
        fn draw(&mut self, command: &DrawCommand) {
            let ctx = &self.ctx;
            match command {
                DrawCommand::Clear { width, height } => {
                    ctx.clear_rect(0.0, 0.0, *width as f64, *height as f64);
                }
                DrawCommand::DashedLine { from, to, dash, width, color } => {
                    ctx.begin_path();
                    ctx.move_to(from.x as f64, from.y as f64);
                    ctx.line_to(to.x as f64, to.y as f64);
                    self.stroke_dashed(*dash, *width, *color);
                }
                DrawCommand::StrokeCircle { center, radius, dash, width, color } => {
                    ctx.begin_path();
                    let _ = ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU);
                    self.stroke_dashed(*dash, *width, *color);
                }
                DrawCommand::FillCircle { center, radius, color, blend } => {
                    ctx.save();
                    if *blend == Blend::Additive {
                        let _ = ctx.set_global_composite_operation("lighter");
                    }
                    ctx.set_fill_style_str(&css_color(*color));
                    ctx.begin_path();
                    let _ = ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU);
                    ctx.fill();
                    ctx.restore();
                }
                DrawCommand::FillRect { pos, size, color } => {
                    ctx.set_fill_style_str(&css_color(*color));
                    ctx.fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
                }
            }
        }
    }

    impl FrameScheduler for WebHost {
        fn request_frame(&mut self, token: TickToken) {
            self.requested = Some(token);
        }

        fn cancel_frame(&mut self, token: TickToken) {
            if self.requested == Some(token) {
                self.requested = None;
            }
            if let Some((queued, handle)) = self.queued {
                if queued == token {
                    if let Some(window) = web_sys::window() {
                        let _ = window.cancel_animation_frame(handle);
                    }
                    self.queued = None;
                }
            }
        }
    }

    struct App {
        game: GameLoop,
        host: WebHost,
        canvas: HtmlCanvasElement,
        form: Option<SubmitForm>,
        leaderboard: Option<HttpLeaderboard>,
        view: LeaderboardView,
    }

    type Shared = Rc<RefCell<App>>;

    /// Size the canvas backing store to the element and build the matching field
    fn fit_canvas(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d) -> Field {
        let Some(window) = web_sys::window() else {
            return Field::for_viewport(canvas.client_width() as f32, canvas.client_height() as f32);
        };
        let dpr = window.device_pixel_ratio();
        let w = canvas.client_width() as f64;
        let h = canvas.client_height() as f64;
        canvas.set_width((w * dpr) as u32);
        canvas.set_height((h * dpr) as u32);
        let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

        let viewport_width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(w) as f32;
        Field::new(w as f32, h as f32, Orientation::classify(viewport_width))
    }

    /// Hand any frame the loop requested to `requestAnimationFrame`
    fn pump(app: &Shared) {
        let Some(token) = app.borrow_mut().host.requested.take() else {
            return;
        };
        let Some(window) = web_sys::window() else { return };

        let shared = app.clone();
        let closure = Closure::once(move |_time: f64| frame(shared, token));
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => app.borrow_mut().host.queued = Some((token, handle)),
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn frame(app: Shared, token: TickToken) {
        {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            if a.host.queued.is_some_and(|(t, _)| t == token) {
                a.host.queued = None;
            }
            a.game.on_frame(token, &mut a.host);

            if a.game.phase() == LoopPhase::GameOver && a.form.is_none() {
                let score = a.game.score();
                a.form = Some(SubmitForm::new(score));
                a.host.set_text("final-score", &score.to_string());
                a.host.set_text("submit-message", "");
                a.host.set_hidden("game-over", false);
            }
        }
        pump(&app);
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(el) = document.get_element_by_id(id) else {
            log::debug!("No #{} element", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn render_leaderboard(app: &App) {
        let document = &app.host.document;
        let Some(list) = document.get_element_by_id("leaderboard-list") else {
            return;
        };
        list.set_text_content(None);
        for (label, score) in app.view.rows() {
            if let Ok(li) = document.create_element("li") {
                li.set_text_content(Some(&format!("{label}  {score}")));
                let _ = list.append_child(&li);
            }
        }
        app.host
            .set_text("leaderboard-status", &app.view.status_text().unwrap_or_default());
        let retryable = matches!(app.view, LeaderboardView::Failed { retryable: true, .. });
        app.host.set_hidden("leaderboard-retry", !retryable);
    }

    fn load_leaderboard(app: &Shared) {
        let client = {
            let mut a = app.borrow_mut();
            a.view = LeaderboardView::Loading;
            render_leaderboard(&a);
            a.leaderboard.clone()
        };
        let app = app.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = match client {
                Some(client) => client.fetch_scores().await,
                None => Err(LeaderboardError::Transport("leaderboard not configured".into())),
            };
            let mut a = app.borrow_mut();
            a.view = LeaderboardView::from_result(result);
            render_leaderboard(&a);
        });
    }

    fn submit_score(app: &Shared) {
        let (name, score, client) = {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            let raw = a
                .host
                .document
                .get_element_by_id("playerName")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();
            let Some(form) = a.form.as_mut() else { return };
            let name = form.begin(&raw);
            let message = form.message().unwrap_or_default().to_string();
            a.host.set_text("submit-message", &message);
            match name {
                Some(name) => (name, form.score, a.leaderboard.clone()),
                None => return,
            }
        };

        let app = app.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = match client {
                Some(client) => client.submit_score(&name, score).await,
                None => Err(LeaderboardError::Transport("leaderboard not configured".into())),
            };
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            if let Some(form) = a.form.as_mut() {
                form.finish(result);
                let message = form.message().unwrap_or_default().to_string();
                a.host.set_text("submit-message", &message);
            }
        });
    }

    fn setup_input_handlers(app: &Shared) {
        let (canvas, document, slot) = {
            let a = app.borrow();
            (a.canvas.clone(), a.host.document.clone(), a.game.pointer())
        };

        // Mouse move: pointer position relative to the canvas
        {
            let slot = slot.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                slot.write(client_to_field(client, Vec2::new(rect.left() as f32, rect.top() as f32)));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start/move
        for kind in ["touchstart", "touchmove"] {
            let slot = slot.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let client = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                    slot.write(client_to_field(
                        client,
                        Vec2::new(rect.left() as f32, rect.top() as f32),
                    ));
                }
            });
            let _ = canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // First click anywhere unlocks audio
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().host.audio.unlock();
            });
            let _ = document
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Viewport changes
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut a = app.borrow_mut();
                let field = fit_canvas(&a.canvas, &a.host.ctx);
                a.game.resize(field);
            });
            if let Some(window) = web_sys::window() {
                let _ = window
                    .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }
    }

    fn setup_buttons(app: &Shared) {
        let document = app.borrow().host.document.clone();

        {
            let app = app.clone();
            on_click(&document, "start-btn", move || {
                {
                    let mut guard = app.borrow_mut();
                    let a = &mut *guard;
                    a.host.set_hidden("start-btn", true);
                    a.host.set_hidden("canvas", false);
                    let field = fit_canvas(&a.canvas, &a.host.ctx);
                    a.game.resize(field);
                    a.game.start(&mut a.host);
                }
                pump(&app);
            });
        }

        {
            let app = app.clone();
            on_click(&document, "restart-btn", move || {
                {
                    let mut guard = app.borrow_mut();
                    let a = &mut *guard;
                    a.form = None;
                    a.host.set_hidden("game-over", true);
                    a.game.restart(&mut a.host);
                }
                pump(&app);
            });
        }

        {
            let app = app.clone();
            on_click(&document, "sound-toggle", move || {
                let mut guard = app.borrow_mut();
                let a = &mut *guard;
                let muted = a.host.audio.gate.toggle_muted();
                log::info!("Sound {}", if muted { "off" } else { "on" });
                if let Some(el) = a.host.document.get_element_by_id("sound-toggle") {
                    let classes = el.class_list();
                    let _ = classes.toggle_with_force("fa-volume-high", !muted);
                    let _ = classes.toggle_with_force("fa-volume-xmark", muted);
                }
            });
        }

        {
            let app = app.clone();
            on_click(&document, "submit-btn", move || submit_score(&app));
        }

        {
            let app = app.clone();
            on_click(&document, "leaderboard-btn", move || {
                app.borrow().host.set_hidden("leaderboard", false);
                load_leaderboard(&app);
            });
        }

        {
            let app = app.clone();
            on_click(&document, "leaderboard-retry", move || load_leaderboard(&app));
        }

        {
            let app = app.clone();
            on_click(&document, "leaderboard-close", move || {
                app.borrow().host.set_hidden("leaderboard", true);
            });
        }
    }

    fn build() -> Option<Shared> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let canvas: HtmlCanvasElement = document.get_element_by_id("canvas")?.dyn_into().ok()?;
        let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        log::info!("Seed: {}", seed);

        let field = fit_canvas(&canvas, &ctx);
        let game = GameLoop::new(field, settings.tuning, seed);
        let leaderboard = settings.leaderboard_url.clone().map(HttpLeaderboard::new);
        if leaderboard.is_none() {
            log::warn!("No leaderboard_url configured - scores will not be saved");
        }

        Some(Rc::new(RefCell::new(App {
            game,
            host: WebHost {
                document,
                ctx,
                audio: AudioManager::new(settings.muted, settings.master_volume),
                requested: None,
                queued: None,
            },
            canvas,
            form: None,
            leaderboard,
            view: LeaderboardView::Loading,
        })))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }

        log::info!("Pong Arena starting...");

        let Some(app) = build() else {
            log::error!("Page is missing the game canvas");
            return;
        };

        setup_input_handlers(&app);
        setup_buttons(&app);

        log::info!("Pong Arena ready");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::{SystemTime, UNIX_EPOCH};

    use pong_arena::audio::{HeadlessAudio, SoundEffect, SoundPlayer};
    use pong_arena::game_loop::{FrameScheduler, LevelSink, LivesSink, ScoreSink};
    use pong_arena::leaderboard::{LocalLeaderboard, SubmitForm};
    use pong_arena::renderer::{Canvas, DrawCommand};
    use pong_arena::sim::field::{Field, Side};
    use pong_arena::{GameLoop, LoopPhase, Settings, TickToken};

    /// Simulated frame length for the audio clock
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// How quickly the autopilot pointer catches up with the ball
    const AUTOPILOT_LAG: f32 = 0.12;

    #[derive(Default)]
    struct HeadlessHost {
        audio: HeadlessAudio,
        score: u32,
        level: u32,
        lives: u8,
        draw_calls: u64,
        pending: Option<TickToken>,
    }

    impl ScoreSink for HeadlessHost {
        fn set_score(&mut self, side: Side, score: u32) {
            if side == Side::Player {
                self.score = score;
            }
        }
    }

    impl LevelSink for HeadlessHost {
        fn set_level(&mut self, side: Side, level: u32) {
            if side == Side::Player {
                if level > self.level && self.level > 0 {
                    log::info!("Level {}", level);
                }
                self.level = level;
            }
        }
    }

    impl LivesSink for HeadlessHost {
        fn set_lives(&mut self, lives: u8) {
            self.lives = lives;
        }
    }

    impl SoundPlayer for HeadlessHost {
        fn play(&mut self, effect: SoundEffect, cooldown_ms: f64) {
            self.audio.play(effect, cooldown_ms);
        }
    }

    impl Canvas for HeadlessHost {
        fn draw(&mut self, _command: &DrawCommand) {
            self.draw_calls += 1;
        }
    }

    impl FrameScheduler for HeadlessHost {
        fn request_frame(&mut self, token: TickToken) {
            self.pending = Some(token);
        }

        fn cancel_frame(&mut self, token: TickToken) {
            if self.pending == Some(token) {
                self.pending = None;
            }
        }
    }

    pub fn run(settings: Settings, max_frames: u64) {
        let seed = settings.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
        log::info!("Seed: {}", seed);

        let field = Field::for_viewport(1200.0, 600.0);
        let mut game = GameLoop::new(field, settings.tuning, seed);
        let mut host = HeadlessHost {
            audio: HeadlessAudio::new(settings.muted),
            ..HeadlessHost::default()
        };
        let pointer = game.pointer();

        game.start(&mut host);

        let mut aim = field.primary_extent() / 2.0;
        let mut frames = 0u64;
        while let Some(token) = host.pending.take() {
            if frames >= max_frames {
                log::info!("Frame cap {} reached", max_frames);
                break;
            }
            if let Some(state) = game.state() {
                let target = field.primary_axis().of(state.ball.pos);
                aim += (target - aim) * AUTOPILOT_LAG;
                pointer.write(field.compose(field.goal_line(Side::Player), aim));
            }
            host.audio.advance(FRAME_MS);
            game.on_frame(token, &mut host);
            frames += 1;
        }

        let game_over = game.phase() == LoopPhase::GameOver;
        let summary = serde_json::json!({
            "seed": seed,
            "epoch": game.epoch(),
            "frames": frames,
            "score": host.score,
            "level": host.level,
            "lives": host.lives,
            "game_over": game_over,
            "sounds": host.audio.played.len(),
            "draw_calls": host.draw_calls,
        });
        log::info!("Summary: {}", summary);
        println!("{summary}");

        let mut board = LocalLeaderboard::new();
        let mut form = SubmitForm::new(game.score());
        form.submit_with(&mut board, "autopilot");
        if let Some(message) = form.message() {
            log::info!("{}", message);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use pong_arena::Settings;

    /// Default frame cap (about five minutes at 60 fps)
    const DEFAULT_MAX_FRAMES: u64 = 18_000;

    env_logger::init();
    log::info!("Pong Arena (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => {
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| Settings::from_json(&json).map_err(|e| e.to_string()));
            match loaded {
                Ok(settings) => settings,
                Err(e) => {
                    log::error!("Could not load {}: {}", path, e);
                    std::process::exit(1);
                }
            }
        }
        None => Settings::default(),
    };
    let max_frames = match args.next() {
        Some(raw) => match raw.parse() {
            Ok(n) => n,
            Err(_) => {
                log::error!("max_frames must be a number, got {:?}", raw);
                std::process::exit(1);
            }
        },
        None => DEFAULT_MAX_FRAMES,
    };

    headless::run(settings, max_frames);
}
