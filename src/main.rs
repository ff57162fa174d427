//! Plinko Board entry point
//!
//! On the web: canvas, drop button, ball-count input, FPS readout and the
//! animation-frame loop. Natively: a headless run that drops balls until they
//! settle and prints the slot tally as JSON.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement};

    use plinko_board::BoardConfig;
    use plinko_board::renderer::{RenderState, ShapeBatch};
    use plinko_board::sim::Simulation;

    /// Canvas attribute holding an optional JSON board config
    const CONFIG_ATTRIBUTE: &str = "data-board-config";

    /// Everything the frame callback needs
    struct App {
        sim: Simulation,
        batch: ShapeBatch,
        render_state: Option<RenderState>,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            self.sim.frame(time, &mut self.batch);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.batch) {
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

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("fps") {
                el.set_text_content(Some(&self.sim.fps().to_string()));
            }
        }

        /// Drop button handler; new balls start from fresh timing
        fn drop_balls(&mut self, count: usize) {
            self.sim.reset_clock();
            let width = self.sim.state.board.width;
            self.sim.spawn(count, width);
        }
    }

    fn js_err(msg: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&msg.to_string())
    }

    /// Board config from the canvas attribute, defaults when absent or invalid
    fn read_config(canvas: &HtmlCanvasElement) -> BoardConfig {
        match canvas.get_attribute(CONFIG_ATTRIBUTE) {
            Some(json) => match BoardConfig::from_json(&json) {
                Ok(config) => {
                    log::info!("Using board config from {}", CONFIG_ATTRIBUTE);
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", CONFIG_ATTRIBUTE, e);
                    BoardConfig::default()
                }
            },
            None => BoardConfig::default(),
        }
    }

    async fn init_renderer(
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<RenderState, JsValue> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(js_err)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(js_err)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(js_err)
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Plinko Board starting...");

        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let document = window.document().ok_or_else(|| js_err("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("plinkoCanvas")
            .ok_or_else(|| js_err("no #plinkoCanvas element"))?
            .dyn_into()?;

        let config = read_config(&canvas);

        // Canvas matches the field, scaled for the display
        let dpr = window.device_pixel_ratio();
        let width = (config.layout.field_width() as f64 * dpr) as u32;
        let height = (config.layout.field_height as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App {
            sim: Simulation::new(config, seed),
            batch: ShapeBatch::new(),
            render_state: None,
        }));
        log::info!("Simulation initialized with seed: {}", seed);

        match init_renderer(&canvas, width, height).await {
            Ok(render_state) => app.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("WebGPU unavailable, running without drawing: {:?}", e),
        }

        setup_drop_button(app.clone());
        request_animation_frame(app);

        log::info!("Plinko Board running!");
        Ok(())
    }

    fn setup_drop_button(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(btn) = document.get_element_by_id("drop-btn") else {
            log::warn!("No #drop-btn element, balls can't be dropped");
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let count = read_ball_count();
            log::info!("Dropping {} balls", count);
            app.borrow_mut().drop_balls(count);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Value of the #numBalls input, 0 when missing or not a number
    fn read_ball_count() -> usize {
        let input = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("numBalls"))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());

        match input {
            Some(input) => {
                let value = input.value();
                value.trim().parse().unwrap_or_else(|_| {
                    log::warn!("Ball count {:?} is not a number", value);
                    0
                })
            }
            None => 0,
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.frame(time);
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_app::run().await
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde::Serialize;

    use plinko_board::BoardConfig;
    use plinko_board::renderer::NullRenderer;
    use plinko_board::sim::{BallState, Simulation};

    const DEFAULT_BALLS: usize = 100;
    /// Frame rate the headless clock pretends to run at
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after two simulated minutes
    const MAX_FRAMES: u32 = 60 * 120;

    /// Printed when the run ends
    #[derive(Debug, Serialize)]
    struct Summary {
        seed: u64,
        balls: usize,
        frames: u32,
        settled: bool,
        lost: usize,
        slot_counts: Vec<usize>,
    }

    /// `plinko-board [count] [config.json]`
    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let mut args = std::env::args().skip(1);
        let count = match args.next() {
            Some(arg) => arg.parse::<usize>()?,
            None => DEFAULT_BALLS,
        };
        let config = match args.next() {
            Some(path) => BoardConfig::load(path)?,
            None => BoardConfig::default(),
        };

        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        let mut sim = Simulation::new(config, seed);
        let width = sim.state.board.width;
        sim.spawn(count, width);

        let mut frames = 0;
        while !sim.state.settled() && frames < MAX_FRAMES {
            sim.frame(frames as f64 * FRAME_MS, &mut NullRenderer);
            frames += 1;
        }

        let settled = sim.state.settled();
        if !settled {
            log::warn!("Stopped after {} frames with balls still falling", frames);
        }

        let summary = Summary {
            seed: sim.state.seed,
            balls: count,
            frames,
            settled,
            lost: sim
                .state
                .balls
                .iter()
                .filter(|b| b.state == BallState::Lost)
                .count(),
            slot_counts: sim.state.slot_counts(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Plinko Board (native) starting headless run...");

    if let Err(e) = headless::run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
