//! Motion Sim entry point
//!
//! Web: WebGPU canvas with DOM controls, driven by requestAnimationFrame.
//! Native: headless run of one launch to landing, saved to the graph store.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlInputElement, HtmlSelectElement, KeyboardEvent,
        MouseEvent,
    };

    use glam::DVec2;
    use motion_sim::persistence::{LocalStorage, MemoryStorage, Storage};
    use motion_sim::renderer::{Label, RenderState};
    use motion_sim::sim::{AnimationLoop, LaunchInput, TickEvent};
    use motion_sim::{SavedGraphs, Settings};

    /// Maximum engine steps per display frame
    const MAX_SUBSTEPS: u32 = 4;

    /// App instance holding all state
    struct App {
        anim: AnimationLoop,
        settings: Settings,
        graphs: SavedGraphs,
        storage: Box<dyn Storage>,
        render_state: Option<RenderState>,
        accumulator: f64,
        last_time: f64,
        /// Labels currently in the DOM overlay
        shown_labels: Vec<Label>,
    }

    impl App {
        fn new(storage: Box<dyn Storage>) -> Self {
            let settings = Settings::load(storage.as_ref());
            let graphs = SavedGraphs::load(storage.as_ref()).unwrap_or_else(|e| {
                log::warn!("Could not load saved graphs: {e}");
                SavedGraphs::new()
            });
            Self {
                anim: AnimationLoop::new(&settings),
                settings,
                graphs,
                storage,
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                shown_labels: Vec::new(),
            }
        }

        /// Run engine steps for the elapsed wall time
        fn update(&mut self, dt: f64) {
            if !self.anim.is_running() {
                self.accumulator = 0.0;
                return;
            }
            let step = self
                .anim
                .engine()
                .map(|e| e.time_step())
                .unwrap_or_else(|| self.settings.time_step());
            self.accumulator += dt.min(0.25);

            let mut substeps = 0;
            while self.accumulator >= step && substeps < MAX_SUBSTEPS {
                self.accumulator -= step;
                substeps += 1;
                match self.anim.tick() {
                    TickEvent::Landed { range, flight_time } => {
                        show_message(&format!(
                            "Landed after {flight_time:.2} s, {range:.2} m downrange"
                        ));
                        break;
                    }
                    TickEvent::Plotted(_) | TickEvent::Idle => {}
                }
            }
        }

        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            match render_state.render(self.anim.mapper().frame()) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update statistics and the axis label overlay
        fn update_hud(&mut self) {
            let stats = *self.anim.stats();
            set_text("stat-height", &stats.height_text());
            set_text("stat-velocity", &stats.velocity_text());
            set_text("stat-time", &stats.time_text());
            set_text("stat-phase", self.anim.phase().as_str());

            let labels = &self.anim.mapper().frame().labels;
            if *labels != self.shown_labels {
                draw_labels(labels);
                self.shown_labels = labels.clone();
            }
        }

        fn launch(&mut self) {
            let input = LaunchInput {
                velocity: input_value("velocity"),
                angle: input_value("angle"),
                gravity: select_value("gravity"),
                custom_gravity: input_value("custom-gravity"),
            };
            match self.anim.launch_from_input(&input) {
                Ok(()) => {
                    self.accumulator = 0.0;
                    show_message("");
                }
                Err(e) => show_message(&e.to_string()),
            }
        }

        fn save_graph(&mut self) {
            let Some(graph) = self.anim.current_graph() else {
                show_message("No trajectory to save yet: launch and let it land first.");
                return;
            };
            match self.graphs.save_graph(graph, self.storage.as_ref()) {
                Ok(()) => {
                    refresh_graph_select(&self.graphs);
                    show_message("Graph saved");
                }
                Err(e) => show_message(&format!("Could not save graph: {e}")),
            }
        }

        fn load_graph(&mut self) {
            let Some(graph) = selected_index().and_then(|i| self.graphs.get(i)) else {
                show_message("Select a saved graph first");
                return;
            };
            match self.anim.show_graph(graph) {
                Ok(()) => show_message("Graph loaded"),
                Err(e) => show_message(&e.to_string()),
            }
        }

        fn preview_graph(&self) {
            let text = selected_index()
                .and_then(|i| self.graphs.get(i))
                .map(|g| g.summary().lines().join("\n"))
                .unwrap_or_default();
            set_text("graph-summary", &text);
        }

        /// Mirror chart toggles into settings and persist them
        fn store_visuals(&mut self) {
            let mapper = self.anim.mapper();
            self.settings.show_grid = mapper.show_grid();
            self.settings.show_axes = mapper.show_axes();
            self.settings.show_tooltips = mapper.show_tooltips();
            self.settings.line_style = mapper.line_style();
            self.save_settings();
        }

        fn save_settings(&self) {
            if let Err(e) = self.settings.save(self.storage.as_ref()) {
                log::warn!("Could not save settings: {e}");
            }
        }

        fn toggle_fps(&mut self) {
            self.settings.toggle_fps();
            self.anim.set_fps(self.settings.fps);
            set_text("fps-btn", &format!("FPS: {}", self.settings.fps));
            self.save_settings();
        }

        fn hover(&self, chart_pos: DVec2) {
            match self.anim.mapper().hover(chart_pos) {
                Some(point) => {
                    set_text("tooltip", &point.tooltip_text());
                    set_style(
                        "tooltip",
                        &format!(
                            "left:{:.0}px;top:{:.0}px",
                            chart_pos.x + 10.0,
                            chart_pos.y + 10.0
                        ),
                    );
                }
                None => set_style("tooltip", "display:none"),
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn input_value(id: &str) -> String {
        document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn select_value(id: &str) -> String {
        document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|e| e.dyn_into::<HtmlSelectElement>().ok())
            .map(|select| select.value())
            .unwrap_or_default()
    }

    fn selected_index() -> Option<usize> {
        let select = document()?
            .get_element_by_id("graph-select")?
            .dyn_into::<HtmlSelectElement>()
            .ok()?;
        usize::try_from(select.selected_index()).ok()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_style(id: &str, style: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("style", style);
        }
    }

    fn show_message(text: &str) {
        if !text.is_empty() {
            log::info!("{text}");
        }
        set_text("message", text);
    }

    /// Replace the axis label overlay (text is not drawn on the GPU)
    fn draw_labels(labels: &[Label]) {
        let Some(document) = document() else {
            return;
        };
        let Some(layer) = document.get_element_by_id("labels") else {
            return;
        };
        layer.set_inner_html("");
        for label in labels {
            if let Ok(span) = document.create_element("span") {
                span.set_text_content(Some(&label.text));
                let _ = span.set_attribute(
                    "style",
                    &format!(
                        "position:absolute;left:{:.1}px;top:{:.1}px",
                        label.pos.x, label.pos.y
                    ),
                );
                let _ = layer.append_child(&span);
            }
        }
    }

    fn refresh_graph_select(graphs: &SavedGraphs) {
        let Some(document) = document() else {
            return;
        };
        let Some(select) = document.get_element_by_id("graph-select") else {
            return;
        };
        select.set_inner_html("");
        for (i, name) in graphs.names().iter().enumerate() {
            if let Ok(option) = document.create_element("option") {
                option.set_text_content(Some(name));
                let _ = option.set_attribute("value", &i.to_string());
                let _ = select.append_child(&option);
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Motion Sim starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let storage: Box<dyn Storage> = match LocalStorage::open() {
            Some(storage) => Box::new(storage),
            None => {
                log::warn!("LocalStorage unavailable, saved graphs will not persist");
                Box::new(MemoryStorage::new())
            }
        };
        let app = Rc::new(RefCell::new(App::new(storage)));

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        // Chart is drawn in logical pixels; the backing store follows the DPR
        let (chart_w, chart_h) = {
            let settings = &app.borrow().settings;
            (settings.canvas_width, settings.canvas_height)
        };
        let dpr = window.device_pixel_ratio();
        let width = (chart_w as f64 * dpr) as u32;
        let height = (chart_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {e}");
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {e}");
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height, (chart_w as f32, chart_h as f32))
            .await
        {
            Ok(render_state) => app.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                log::error!("Failed to create device: {e}");
                return;
            }
        }

        {
            let a = app.borrow();
            if let Some(select) = document
                .get_element_by_id("gravity")
                .and_then(|e| e.dyn_into::<HtmlSelectElement>().ok())
            {
                select.set_value(a.settings.planet.as_str());
            }
            set_text("fps-btn", &format!("FPS: {}", a.settings.fps));
            refresh_graph_select(&a.graphs);
        }

        setup_buttons(&document, &app);
        setup_canvas_hover(&canvas, &app);
        setup_keyboard(&app);

        request_animation_frame(app);

        log::info!("Motion Sim running!");
    }

    fn on_event(
        document: &Document,
        id: &str,
        event: &str,
        app: &Rc<RefCell<App>>,
        mut handler: impl FnMut(&mut App) + 'static,
    ) {
        let Some(element) = document.get_element_by_id(id) else {
            log::warn!("Missing element #{id}");
            return;
        };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            handler(&mut app.borrow_mut());
        });
        let _ = element.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, app: &Rc<RefCell<App>>) {
        on_event(document, "launch-btn", "click", app, |a| a.launch());
        on_event(document, "play-btn", "click", app, |a| {
            if let Err(e) = a.anim.resume() {
                log::debug!("{e}");
            }
        });
        on_event(document, "pause-btn", "click", app, |a| {
            if let Err(e) = a.anim.pause() {
                log::debug!("{e}");
            }
        });
        on_event(document, "reset-btn", "click", app, |a| {
            a.anim.reset();
            show_message("");
        });
        on_event(document, "save-btn", "click", app, |a| a.save_graph());
        on_event(document, "load-btn", "click", app, |a| a.load_graph());
        on_event(document, "graph-select", "change", app, |a| a.preview_graph());
        on_event(document, "grid-btn", "click", app, |a| {
            a.anim.mapper_mut().toggle_grid();
            a.store_visuals();
        });
        on_event(document, "axes-btn", "click", app, |a| {
            a.anim.mapper_mut().toggle_axes();
            a.store_visuals();
        });
        on_event(document, "line-btn", "click", app, |a| {
            a.anim.mapper_mut().toggle_line_style();
            a.store_visuals();
        });
        on_event(document, "tooltip-btn", "click", app, |a| {
            a.anim.mapper_mut().toggle_tooltips();
            a.store_visuals();
        });
        on_event(document, "fps-btn", "click", app, |a| a.toggle_fps());
        on_event(document, "gravity", "change", app, |_| {
            let custom = select_value("gravity").eq_ignore_ascii_case("custom");
            set_style(
                "custom-gravity",
                if custom { "" } else { "visibility:hidden" },
            );
        });
    }

    fn setup_canvas_hover(canvas: &HtmlCanvasElement, app: &Rc<RefCell<App>>) {
        let app = app.clone();
        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let a = app.borrow();
            // CSS size may differ from the chart's logical size
            let client_w = canvas_clone.client_width().max(1) as f64;
            let client_h = canvas_clone.client_height().max(1) as f64;
            let x = event.offset_x() as f64 * a.settings.canvas_width as f64 / client_w;
            let y = event.offset_y() as f64 * a.settings.canvas_height as f64 / client_h;
            a.hover(DVec2::new(x, y));
        });
        let _ = canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(app: &Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.key().eq_ignore_ascii_case("e") {
                let mut a = app.borrow_mut();
                if let Err(e) = a.anim.toggle_pause() {
                    log::debug!("{e}");
                }
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            let dt = if a.last_time > 0.0 {
                (time - a.last_time) / 1000.0
            } else {
                0.0
            };
            a.last_time = time;

            a.update(dt);
            a.render();
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    web::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Motion Sim (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = native::run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::thread;
    use std::time::Duration;

    use motion_sim::persistence::FileStorage;
    use motion_sim::sim::{AnimationLoop, LaunchInput, TickEvent};
    use motion_sim::{Result, SavedGraphs, Settings};

    /// `motion-sim [--fast] [velocity] [angle] [earth|mars|moon|<g>]`
    pub fn run(args: &[String]) -> Result<()> {
        let fast = args.iter().any(|a| a == "--fast");
        let positional: Vec<&str> = args
            .iter()
            .filter(|a| !a.starts_with("--"))
            .map(String::as_str)
            .collect();

        let storage = FileStorage::default();
        let settings = Settings::load(&storage);

        let input = LaunchInput {
            velocity: positional.first().copied().unwrap_or("50").to_string(),
            angle: positional.get(1).copied().unwrap_or("45").to_string(),
            gravity: positional
                .get(2)
                .copied()
                .unwrap_or(settings.planet.as_str())
                .to_string(),
            custom_gravity: String::new(),
        };

        let mut anim = AnimationLoop::new(&settings);
        anim.launch_from_input(&input)?;

        let frame = Duration::from_secs_f64(settings.time_step());
        let mut frames: u64 = 0;
        loop {
            match anim.tick() {
                TickEvent::Plotted(point) => {
                    frames += 1;
                    if frames % settings.fps as u64 == 0 {
                        let stats = anim.stats();
                        log::info!(
                            "{} | {} | {}",
                            stats.time_text(),
                            stats.height_text(),
                            stats.velocity_text()
                        );
                    }
                    log::trace!("({:.2}, {:.2})", point.x, point.y);
                }
                TickEvent::Landed { range, flight_time } => {
                    log::info!("Landed after {flight_time:.2} s, {range:.2} m downrange");
                    break;
                }
                TickEvent::Idle => break,
            }
            if !fast {
                thread::sleep(frame);
            }
        }

        if let Some(graph) = anim.current_graph() {
            for line in graph.summary().lines() {
                println!("{line}");
            }
            let mut graphs = SavedGraphs::load(&storage)?;
            graphs.save_graph(graph, &storage)?;
            log::info!(
                "Graph saved to {} ({} stored)",
                storage.path_for(SavedGraphs::STORAGE_KEY).display(),
                graphs.len()
            );
        }

        Ok(())
    }
}
