//! Lane Racer entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Document, Element, HtmlInputElement, KeyboardEvent, MouseEvent, Response};

    use lane_racer::assets::{AssetError, VEHICLE_MODEL_URL, VehicleModel, parse_vehicle_model};
    use lane_racer::persistence::{KeyValueStore, LocalStorage, MemoryStore};
    use lane_racer::platform::{clock_seed, now_ms};
    use lane_racer::sim::{KeyEvent, Round};
    use lane_racer::ui::{format_time, parse_player_count, validate_nickname};
    use lane_racer::world::{FrameRenderer, ResourceId, SceneBuilder, WorldArena, WorldLayout};
    use lane_racer::{Game, SessionEvent, Settings};

    type BrowserGame = Game<DomScene, HudRenderer, Box<dyn KeyValueStore>>;

    /// Map a lane position onto the track minimap (percent from left/top)
    fn track_percent(left: f32, right: f32, finish: f32, x: f32, z: f32) -> (f32, f32) {
        let across = (x - left) / (right - left) * 100.0;
        let along = (z / finish).clamp(0.0, 1.0);
        (across, 100.0 - along * 100.0)
    }

    fn place(el: &Element, left: f32, top: f32) {
        let _ = el.set_attribute("style", &format!("left:{:.2}%;top:{:.2}%", left, top));
    }

    /// Draws obstacles as markers on the `#track` minimap. Trees sit outside
    /// the lane and have no marker.
    struct DomScene {
        document: Document,
        next_id: ResourceId,
        nodes: HashMap<ResourceId, Element>,
    }

    impl DomScene {
        fn new(document: Document) -> Self {
            Self {
                document,
                next_id: 0,
                nodes: HashMap::new(),
            }
        }

        fn spawn(&mut self, track: &Element, class: &str, arena: &mut WorldArena) -> Option<Element> {
            let el = self.document.create_element("div").ok()?;
            el.set_class_name(class);
            track.append_child(&el).ok()?;
            self.next_id += 1;
            self.nodes.insert(self.next_id, el.clone());
            arena.track(self.next_id);
            Some(el)
        }
    }

    impl SceneBuilder for DomScene {
        fn build_world(&mut self, layout: &WorldLayout, arena: &mut WorldArena) {
            let Some(track) = self.document.get_element_by_id("track") else {
                log::warn!("No #track element, world not drawn");
                return;
            };

            if let Some(el) = self.spawn(&track, "finish-line", arena) {
                place(&el, 0.0, 0.0);
            }
            for obstacle in &layout.obstacles {
                if let Some(el) = self.spawn(&track, "obstacle", arena) {
                    let (left, top) = track_percent(
                        layout.left_boundary,
                        layout.right_boundary,
                        layout.finish_line_distance,
                        obstacle.position.x,
                        obstacle.position.z,
                    );
                    place(&el, left, top);
                }
            }
        }

        fn release(&mut self, id: ResourceId) {
            if let Some(el) = self.nodes.remove(&id) {
                el.remove();
            }
        }
    }

    /// Moves the vehicle marker and updates the HUD readouts
    struct HudRenderer {
        document: Document,
        settings: Settings,
    }

    impl HudRenderer {
        fn set_text(&self, selector: &str, text: &str) {
            if let Some(el) = self.document.query_selector(selector).ok().flatten() {
                el.set_text_content(Some(text));
            }
        }
    }

    impl FrameRenderer for HudRenderer {
        fn render_frame(&mut self, round: &Round) {
            self.set_text("#hud-distance .hud-value", &format!("{:.0}", round.distance));
            let elapsed = ((now_ms() - round.start_ms) / 1000.0).max(0.0);
            self.set_text("#hud-time .hud-value", &format_time(elapsed));

            if let (Some(vehicle), Some(marker)) =
                (round.vehicle, self.document.get_element_by_id("vehicle-marker"))
            {
                let (left, top) = track_percent(
                    self.settings.left_boundary,
                    self.settings.right_boundary,
                    self.settings.finish_line_distance,
                    vehicle.position.x,
                    vehicle.position.z,
                );
                let _ = marker.set_attribute(
                    "style",
                    &format!(
                        "left:{:.2}%;top:{:.2}%;transform:rotate({:.3}rad)",
                        left, top, -vehicle.tilt
                    ),
                );
            }
        }
    }

    /// Game plus frame-timing state
    struct Shell {
        game: BrowserGame,
        last_time: f64,
        total_players: usize,
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn input_value(document: &Document, id: &str) -> String {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn clear_input(document: &Document, id: &str) {
        if let Some(input) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value("");
        }
    }

    fn alert(message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    /// Rebuild the `#scoreboard table` rows, best first
    fn render_scoreboard(game: &BrowserGame) {
        let Some(document) = document() else { return };
        let Some(table) = document.query_selector("#scoreboard table").ok().flatten() else {
            return;
        };

        table.set_inner_html("<tr><th>#</th><th>Player</th><th>Time</th><th>Distance</th></tr>");
        for ranked in game.session().scoreboard().ranked() {
            let Ok(row) = document.create_element("tr") else { continue };
            if ranked.highlight {
                row.set_class_name("best");
            }
            let cells = [
                ranked.rank.to_string(),
                ranked.entry.name.clone(),
                format_time(ranked.entry.score.time),
                format!("{:.0}", ranked.entry.score.distance),
            ];
            for text in cells {
                if let Ok(cell) = document.create_element("td") {
                    cell.set_text_content(Some(&text));
                    let _ = row.append_child(&cell);
                }
            }
            let _ = table.append_child(&row);
        }
    }

    fn on_session_event(game: &BrowserGame, event: &SessionEvent) {
        let Some(document) = document() else { return };
        match event {
            SessionEvent::ReadyToStart => {
                set_hidden(&document, "add-player-button", true);
                set_hidden(&document, "nickname", true);
                set_hidden(&document, "play-button", false);
            }
            SessionEvent::StartRound { name, .. } => {
                set_hidden(&document, "ui-container", true);
                set_hidden(&document, "hud", false);
                if let Some(el) = document.get_element_by_id("current-player") {
                    el.set_text_content(Some(name));
                }
                render_scoreboard(game);
            }
            SessionEvent::SessionComplete | SessionEvent::FinalScores => {
                set_hidden(&document, "hud", true);
                set_hidden(&document, "ui-container", false);
                set_hidden(&document, "play-button", true);
                set_hidden(&document, "reset-button", false);
                render_scoreboard(game);
            }
        }
    }

    async fn load_vehicle_model(url: &str) -> Result<VehicleModel, AssetError> {
        let window = web_sys::window().ok_or(AssetError::NoWindow)?;
        let value = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
        let response: Response = value
            .dyn_into()
            .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
        if !response.ok() {
            return Err(AssetError::Status(response.status()));
        }
        let text = response
            .text()
            .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
        let text = JsFuture::from(text)
            .await
            .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
        let json = text
            .as_string()
            .ok_or_else(|| AssetError::Fetch("response body is not text".into()))?;
        parse_vehicle_model(&json)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Lane Racer starting...");

        let Some(document) = document() else {
            log::error!("No document, cannot start");
            return;
        };

        let store: Box<dyn KeyValueStore> = match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{}; scores will not persist", e);
                Box::new(MemoryStore::new())
            }
        };
        let settings = Settings::load(&store);

        let seed = clock_seed();
        let game = Game::new(
            settings.clone(),
            DomScene::new(document.clone()),
            HudRenderer {
                document: document.clone(),
                settings,
            },
            store,
            seed,
        );
        log::info!("Game initialized with seed: {}", seed);

        let shell = Rc::new(RefCell::new(Shell {
            game,
            last_time: 0.0,
            total_players: 0,
        }));
        render_scoreboard(&shell.borrow().game);

        // Vehicle model loads in the background; rounds may start without it
        {
            let shell = shell.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match load_vehicle_model(VEHICLE_MODEL_URL).await {
                    Ok(model) => {
                        log::info!("Vehicle model loaded ({} meshes)", model.meshes);
                        shell.borrow_mut().game.attach_vehicle();
                    }
                    Err(e) => log::error!("Vehicle model failed to load: {}", e),
                }
            });
        }

        setup_keyboard(shell.clone());
        setup_registration(shell.clone());
        setup_session_buttons(shell);

        set_hidden(&document, "loading", true);
        log::info!("Lane Racer ready!");
    }

    fn setup_keyboard(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key().starts_with("Arrow") {
                    event.prevent_default();
                }
                shell.borrow_mut().game.key_event(KeyEvent::down(&event.key()));
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                shell.borrow_mut().game.key_event(KeyEvent::up(&event.key()));
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        let Some(document) = document() else { return };
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_registration(shell: Rc<RefCell<Shell>>) {
        // Player count
        {
            let shell = shell.clone();
            on_click("set-players-button", move || {
                let Some(document) = document() else { return };
                match parse_player_count(&input_value(&document, "player-count")) {
                    Ok(count) => {
                        shell.borrow_mut().total_players = count;
                        set_hidden(&document, "nickname", false);
                        set_hidden(&document, "add-player-button", false);
                        set_hidden(&document, "set-players-button", true);
                        set_hidden(&document, "player-count", true);
                    }
                    Err(e) => alert(&e.to_string()),
                }
            });
        }

        // Nicknames
        {
            let shell = shell.clone();
            on_click("add-player-button", move || {
                let Some(document) = document() else { return };
                let raw = input_value(&document, "nickname");
                let name = match validate_nickname(&raw) {
                    Ok(name) => name,
                    Err(e) => {
                        alert(&e.to_string());
                        return;
                    }
                };
                let mut s = shell.borrow_mut();
                let total = s.total_players;
                let event = s.game.register_player(name, total);
                clear_input(&document, "nickname");
                if let Some(event) = event {
                    on_session_event(&s.game, &event);
                }
            });
        }

        // Play
        on_click("play-button", move || {
            let event = shell.borrow_mut().game.start(now_ms());
            if let Some(event) = event {
                on_session_event(&shell.borrow().game, &event);
            }
            if shell.borrow().game.is_running() {
                request_animation_frame(shell.clone());
            }
        });
    }

    fn setup_session_buttons(shell: Rc<RefCell<Shell>>) {
        {
            let shell = shell.clone();
            on_click("reset-button", move || {
                let Some(document) = document() else { return };
                {
                    let mut s = shell.borrow_mut();
                    s.game.reset_session();
                    s.total_players = 0;
                }
                set_hidden(&document, "reset-button", true);
                set_hidden(&document, "player-count", false);
                set_hidden(&document, "set-players-button", false);
                clear_input(&document, "player-count");
            });
        }

        on_click("clear-scores-button", move || {
            let mut s = shell.borrow_mut();
            if let Err(e) = s.game.clear_scoreboard() {
                log::warn!("Failed to clear scoreboard: {}", e);
            }
            render_scoreboard(&s.game);
        });
    }

    fn request_animation_frame(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(shell, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// One frame; reschedules itself only while a round is running
    fn game_loop(shell: Rc<RefCell<Shell>>, time: f64) {
        let running = {
            let mut s = shell.borrow_mut();

            // First frame of a run has no elapsed time
            let dt = if s.last_time > 0.0 {
                ((time - s.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            s.last_time = time;

            if let Some(event) = s.game.frame(dt, now_ms()) {
                on_session_event(&s.game, &event);
            }

            let running = s.game.is_running();
            if !running {
                s.last_time = 0.0;
            }
            running
        };

        if running {
            request_animation_frame(shell);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lane_racer::persistence::MemoryStore;
    use lane_racer::platform::clock_seed;
    use lane_racer::sim::KeyEvent;
    use lane_racer::ui::format_time;
    use lane_racer::world::{HeadlessScene, LogRenderer};
    use lane_racer::{Game, SessionEvent, Settings};

    env_logger::init();
    log::info!("Lane Racer (native) starting...");
    log::info!("Native mode runs a scripted headless session - run with `trunk serve` for web version");

    const DT: f32 = 1.0 / 60.0;
    const MAX_FRAMES: usize = 200_000;

    let seed = clock_seed();
    let mut game = Game::new(
        Settings::default(),
        HeadlessScene::new(),
        LogRenderer::new(),
        MemoryStore::new(),
        seed,
    );
    game.attach_vehicle();

    let names = ["ana", "bo", "cy"];
    for name in names {
        game.register_player(name, names.len());
    }

    // Each player weaves with a different rhythm
    let mut now = 0.0;
    let mut weave = 45;
    game.start(now);
    for frame in 0..MAX_FRAMES {
        if !game.is_running() {
            break;
        }
        if frame % weave == 0 {
            let (press, release) = if (frame / weave) % 2 == 0 {
                ("d", "a")
            } else {
                ("a", "d")
            };
            game.key_event(KeyEvent::up(release));
            game.key_event(KeyEvent::down(press));
        }

        now += DT as f64 * 1000.0;
        if let Some(SessionEvent::StartRound { name, .. }) = game.frame(DT, now) {
            weave += 20;
            log::info!("Next up: {}", name);
        }
    }

    println!("\nFinal standings:");
    for ranked in game.session().scoreboard().ranked() {
        println!(
            "{}{:>2}. {:<8} {:>8} {:>7.0}",
            if ranked.highlight { "*" } else { " " },
            ranked.rank,
            ranked.entry.name,
            format_time(ranked.entry.score.time),
            ranked.entry.score.distance
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
