//! Tower Stack entry point
//!
//! Handles platform-specific initialization and runs the frame loop. On the
//! web the game renders to a canvas and is driven by requestAnimationFrame;
//! the native binary runs a headless autopilot demo as a smoke scenario.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlElement};

    use tower_stack::Game;
    use tower_stack::renderer::RenderState;
    use tower_stack::sim::GameEvent;

    /// Game instance plus its render surface
    struct App {
        game: Game,
        render_state: Option<RenderState>,
    }

    impl App {
        fn new(seed: u64) -> Self {
            Self {
                game: Game::new(seed),
                render_state: None,
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(self.game.scene(), &self.game.camera) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Mirror this frame's events into the DOM overlays
        fn update_hud(&self) {
            for event in self.game.events() {
                match *event {
                    GameEvent::Scored { score } => set_text("score", &score.to_string()),
                    GameEvent::Ended { show_results } => {
                        if show_results {
                            set_display("results", "flex");
                        }
                    }
                    GameEvent::SessionReset => {
                        set_display("instructions", "none");
                        set_display("results", "none");
                        set_text("score", "0");
                    }
                    _ => {}
                }
            }
        }
    }

    fn set_text(id: &str, text: &str) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_display(id: &str, value: &str) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(el) = document.get_element_by_id(id) {
            if let Ok(el) = el.dyn_into::<HtmlElement>() {
                let _ = el.style().set_property("display", value);
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Tower Stack starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // The attract-mode session starts immediately
        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed)));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await;
        app.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(app.clone());
        setup_resize_handler(&canvas, app.clone());

        // Start the frame loop
        request_animation_frame(app);

        log::info!("Tower Stack running!");
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();

        // Mouse press drops the block (or takes over from the autopilot)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().game.queue_action();
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start behaves like a mouse press
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::TouchEvent| {
                app.borrow_mut().game.queue_action();
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: Space drops, R restarts
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                match event.key().as_str() {
                    " " => {
                        event.prevent_default();
                        app.borrow_mut().game.queue_action();
                    }
                    "r" | "R" => {
                        event.prevent_default();
                        app.borrow_mut().game.queue_restart();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let window = web_sys::window().unwrap();
            let dpr = window.device_pixel_ratio();
            let width = (canvas.client_width() as f64 * dpr) as u32;
            let height = (canvas.client_height() as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            log::debug!("resize {width}x{height}");

            let mut app = app.borrow_mut();
            if let Some(ref mut render_state) = app.render_state {
                render_state.resize(width, height);
            }
            // Re-render once with the new projection extents
            app.render();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            app_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn app_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut app = app.borrow_mut();
            app.game.frame(time);
            app.update_hud();
            app.render();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use tower_stack::Game;
    use tower_stack::sim::GameEvent;

    env_logger::init();
    log::info!("Tower Stack (native) starting...");
    log::info!("Running a headless autopilot demo - open the web build to play");

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_millis() as u64;
    let mut game = Game::new(seed);

    // One minute of simulated attract mode at 60 fps
    let mut now = 0.0;
    for _ in 0..3600 {
        now += 1000.0 / 60.0;
        game.frame(now);
        for event in game.events() {
            if let GameEvent::Scored { score } = event {
                log::info!("robot placed a layer, score {score}");
            }
        }
    }

    println!("Autopilot demo finished with score {}", game.score());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
