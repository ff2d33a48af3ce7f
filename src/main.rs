//! M33T scrollytelling entry point
//!
//! On the web: wires scroll/resize events and a requestAnimationFrame loop
//! into the hero sequencer and renders the orb over the DOM text.
//! Natively: runs the sequence headless and prints its phase timeline.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_hero {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use m33t_scrolly::renderer::{FrameData, SdfRenderState};
    use m33t_scrolly::sim::{Geometry, Rect, StatementView, WordRef};
    use m33t_scrolly::{Scrollytelling, Settings, StoryEvent};

    /// Reads word boxes straight from the DOM, in CSS pixels
    struct DomGeometry {
        document: Document,
    }

    impl Geometry for DomGeometry {
        fn word_rect(&self, word: WordRef) -> Option<Rect> {
            let el = self.document.get_element_by_id(&word.element_id())?;
            let r = el.get_bounding_client_rect();
            let rect = Rect::new(
                r.left() as f32,
                r.top() as f32,
                r.width() as f32,
                r.height() as f32,
            );
            (!rect.is_empty()).then_some(rect)
        }

        fn content_anchor(&self) -> Option<Vec2> {
            let el = self.document.get_element_by_id("hero-content")?;
            let r = el.get_bounding_client_rect();
            Some(Vec2::new((r.left() + r.width() / 2.0) as f32, r.top() as f32))
        }
    }

    /// Hero instance holding all state
    struct Hero {
        story: Scrollytelling,
        settings: Settings,
        render_state: Option<SdfRenderState>,
        geometry: DomGeometry,
        /// Device pixels per CSS pixel
        dpr: f32,
        last_time: f64,
        start_time: f64,
        last_phase: &'static str,
    }

    impl Hero {
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, 100.0)
            } else {
                0.0
            };
            self.last_time = time;
            self.story.advance(dt.round() as u64, &self.geometry);
        }

        fn render(&mut self, time: f64) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let resolution = [render_state.size.0 as f32, render_state.size.1 as f32];
            let elapsed = ((time - self.start_time) / 1000.0) as f32;
            let frame = FrameData::build(
                &self.story,
                resolution,
                elapsed,
                self.settings.particle_count(),
                self.dpr,
            );
            match render_state.render(&frame) {
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

        /// Push phase, statement styles and story events into the DOM
        fn update_dom(&mut self) {
            let document = &self.geometry.document;
            let sequencer = self.story.sequencer();

            let phase = sequencer.phase().as_str();
            if phase != self.last_phase {
                if let Some(el) = document.get_element_by_id("sequence") {
                    let _ = el.set_attribute("data-phase", phase);
                }
                self.last_phase = phase;
            }

            if let Some(view) = sequencer.statement_view() {
                apply_statement_view(document, &view);
            }

            if let Some(el) = document.get_element_by_id("reveal") {
                let class = if sequencer.reveal_visible() { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }

            for event in self.story.drain_events() {
                match event {
                    StoryEvent::SlideChanged(slide) => {
                        if let Some(body) = document.body() {
                            let _ = body.set_attribute("data-slide", &slide.to_string());
                        }
                    }
                    StoryEvent::Converged(converged) => {
                        if let Some(el) = document.get_element_by_id("converge") {
                            let _ = el.class_list().toggle_with_force("merged", converged);
                        }
                    }
                    StoryEvent::ScrollComplete => log::info!("Hero scrolled through"),
                    StoryEvent::SequenceComplete => {
                        if let Some(el) = document.get_element_by_id("hero-content") {
                            let _ = el.class_list().remove_1("locked");
                        }
                    }
                }
            }
        }
    }

    fn apply_statement_view(document: &Document, view: &StatementView) {
        if let Some(el) = document.get_element_by_id(&format!("stmt-{}", view.index)) {
            let _ = el.set_attribute("style", &format!("opacity:{:.3}", view.opacity));
        }
        for (w, opacity) in view.word_opacity.iter().enumerate() {
            let Some(el) = document.get_element_by_id(&WordRef::new(view.index, w).element_id())
            else {
                continue;
            };
            // Only the key words drift and snap
            let offset = if w == view.left {
                view.left_offset
            } else if w == view.right {
                view.right_offset
            } else {
                0.0
            };
            let _ = el.set_attribute(
                "style",
                &format!("opacity:{:.3};transform:translateX({:.2}px)", opacity, offset),
            );
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {e}").into());
        }

        log::info!("M33T hero starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let dpr = window.device_pixel_ratio();

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("hero-canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let mut story = Scrollytelling::new(&settings, seed);
        story.on_resize(viewport_height(&window));
        story.on_scroll(window.scroll_y().unwrap_or(0.0) as f32);

        let hero = Rc::new(RefCell::new(Hero {
            story,
            settings,
            render_state: None,
            geometry: DomGeometry {
                document: document.clone(),
            },
            dpr: dpr as f32,
            last_time: 0.0,
            start_time: js_sys::Date::now(),
            last_phase: "",
        }));

        match init_renderer(canvas.clone(), width, height).await {
            Ok(render_state) => hero.borrow_mut().render_state = Some(render_state),
            Err(e) => log::warn!("WebGPU unavailable, running without orb rendering: {}", e),
        }

        setup_scroll_handlers(hero.clone(), canvas);
        request_animation_frame(hero);

        log::info!("M33T hero running");
    }

    async fn init_renderer(
        canvas: HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<SdfRenderState, m33t_scrolly::renderer::RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);
        SdfRenderState::new(surface, &adapter, width, height).await
    }

    fn viewport_height(window: &web_sys::Window) -> f32 {
        window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .map(|h| h as f32)
            .unwrap_or(m33t_scrolly::consts::DEFAULT_VIEWPORT_HEIGHT)
    }

    fn setup_scroll_handlers(hero: Rc<RefCell<Hero>>, canvas: HtmlCanvasElement) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Scroll
        {
            let hero = hero.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(window) = web_sys::window() {
                    let y = window.scroll_y().unwrap_or(0.0) as f32;
                    hero.borrow_mut().story.on_scroll(y);
                }
            });
            let _ = window
                .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let dpr = window.device_pixel_ratio();
                let width = (canvas.client_width() as f64 * dpr) as u32;
                let height = (canvas.client_height() as f64 * dpr) as u32;
                canvas.set_width(width);
                canvas.set_height(height);

                let mut h = hero.borrow_mut();
                h.dpr = dpr as f32;
                h.story.on_resize(viewport_height(&window));
                if let Some(render_state) = h.render_state.as_mut() {
                    render_state.resize(width, height);
                }
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(hero: Rc<RefCell<Hero>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(hero, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(hero: Rc<RefCell<Hero>>, time: f64) {
        {
            let mut h = hero.borrow_mut();
            h.update(time);
            h.render(time);
            h.update_dom();
        }

        request_animation_frame(hero);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_hero::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use m33t_scrolly::consts::SEQUENCE_SLIDE;
    use m33t_scrolly::sim::{Phase, Script, StaticLayout};
    use m33t_scrolly::{QualityPreset, Scrollytelling, Settings};

    env_logger::init();

    let preset = std::env::args()
        .nth(1)
        .and_then(|arg| QualityPreset::parse(&arg))
        .unwrap_or_default();
    let settings = Settings::from_preset(preset);
    log::info!("M33T hero (native) running headless, quality {}", preset.as_str());

    let viewport = Vec2::new(1280.0, 800.0);
    let layout = StaticLayout::centered(&Script::default(), viewport);
    let mut story = Scrollytelling::new(&settings, 0x4d33);
    story.on_resize(viewport.y);
    story.on_scroll(SEQUENCE_SLIDE as f32 * viewport.y);

    const FRAME_MS: u64 = 16;
    let mut elapsed = 0;
    let mut last = Phase::Idle;
    while !story.content_unlocked() && elapsed < 60_000 {
        story.advance(FRAME_MS, &layout);
        elapsed += FRAME_MS;

        let phase = story.sequencer().phase();
        if phase != last {
            let orb = story.sequencer().orb();
            println!(
                "{}",
                serde_json::json!({
                    "t_ms": elapsed,
                    "phase": phase,
                    "orb": { "x": orb.position.x, "y": orb.position.y, "visible": orb.visible },
                    "particles": story.sequencer().particles().particles().len(),
                })
            );
            last = phase;
        }
    }

    for event in story.drain_events() {
        log::info!("{:?}", event);
    }
}
