use crate::browser;
use anyhow::{anyhow, Error, Result};
// wasm is single threaded, so Rc RefCell/Cell over Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{
    // unchecked_ref casts a JS value to the expected closure type, we built
    // the closure ourselves so the cast holds
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, Event, HtmlImageElement, KeyboardEvent};

/// A game the loop can drive
/// - `update` runs once per fixed simulation step
/// - `draw` runs once per animation frame, after the updates
/// - `is_running` decides whether the loop schedules another frame
#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self, viewport: Size) -> Result<Box<dyn Game>>;
    fn update(&mut self, now: f64);
    fn draw(&self, renderer: &Renderer);
    fn activate(&mut self, now: f64);
    fn resize(&mut self, viewport: Size);
    fn is_running(&self) -> bool;
}

// length of a frame in milliseconds
const FRAME_SIZE: f64 = 1.0 / 60.0 * 1000.0;

// keys that count as a click on the canvas
const ACTIVATE_KEYS: [&str; 2] = ["Space", "ArrowUp"];

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f64,
}

impl GameLoop {
    fn new(now: f64) -> Self {
        GameLoop {
            last_frame: now,
            accumulated_delta: 0.0,
        }
    }

    /// Accumulate elapsed time and return how many fixed steps are due
    fn advance(&mut self, perf: f64) -> u32 {
        self.accumulated_delta += perf - self.last_frame;
        self.last_frame = perf;
        let mut steps = 0;
        while self.accumulated_delta > FRAME_SIZE {
            self.accumulated_delta -= FRAME_SIZE;
            steps += 1;
        }
        steps
    }

    /// Forget time spent paused so it is not replayed on resume
    fn resume(&mut self, now: f64) {
        self.last_frame = now;
        self.accumulated_delta = 0.0;
    }

    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let (width, height) = browser::fit_canvas_to_window()?;
        let game = game
            .initialize(Size {
                width: width.into(),
                height: height.into(),
            })
            .await?;
        let frames = Rc::new(FrameLoop {
            game: RefCell::new(game),
            timing: RefCell::new(GameLoop::new(browser::now()?)),
            renderer: Renderer {
                context: browser::context()?,
            },
            frame: RefCell::new(None),
            schedule: Cell::new(FrameSchedule::default()),
        });

        let looped = frames.clone();
        *frames.frame.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            looped.tick(perf);
        }));

        Self::listen(&frames)?;
        frames.schedule()
    }

    fn listen(frames: &Rc<FrameLoop>) -> Result<()> {
        let canvas = browser::canvas()?;
        let window = browser::window()?;

        let on_click = frames.clone();
        browser::add_event_listener(
            &canvas,
            "click",
            browser::closure_wrap(Box::new(move |_event: Event| on_click.activate())
                as Box<dyn FnMut(Event)>),
        )?;

        let on_key = frames.clone();
        browser::add_event_listener(
            &window,
            "keydown",
            browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
                if ACTIVATE_KEYS.contains(&event.code().as_str()) {
                    event.prevent_default();
                    on_key.activate();
                }
            }) as Box<dyn FnMut(KeyboardEvent)>),
        )?;

        let on_resize = frames.clone();
        browser::add_event_listener(
            &window,
            "resize",
            browser::closure_wrap(Box::new(move |_event: Event| on_resize.resize())
                as Box<dyn FnMut(Event)>),
        )?;

        Ok(())
    }
}

/// Everything the animation frame callback and the input listeners share
struct FrameLoop {
    game: RefCell<Box<dyn Game>>,
    timing: RefCell<GameLoop>,
    renderer: Renderer,
    frame: RefCell<Option<browser::LoopClosure>>,
    schedule: Cell<FrameSchedule>,
}

/// Tracks whether a requestAnimationFrame callback is pending, so the loop
/// is never requested twice for the same frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FrameSchedule {
    pending: bool,
}

impl FrameSchedule {
    /// True when the caller should request a frame, false if one is pending
    fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// The pending callback is running
    fn fired(&mut self) {
        self.pending = false;
    }

    fn is_pending(&self) -> bool {
        self.pending
    }

    /// A paused loop resumes only once the game runs again
    fn should_resume(&self, running: bool) -> bool {
        running && !self.pending
    }
}

impl FrameLoop {
    fn schedule(&self) -> Result<()> {
        let mut schedule = self.schedule.get();
        if !schedule.request() {
            return Ok(());
        }
        let frame = self.frame.borrow();
        let closure = frame
            .as_ref()
            .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?;
        browser::request_animation_frame(closure)?;
        self.schedule.set(schedule);
        Ok(())
    }

    fn tick(&self, perf: f64) {
        let mut schedule = self.schedule.get();
        schedule.fired();
        self.schedule.set(schedule);
        let mut game = self.game.borrow_mut();
        let steps = self.timing.borrow_mut().advance(perf);
        for _ in 0..steps {
            if !game.is_running() {
                break;
            }
            game.update(perf);
        }
        game.draw(&self.renderer);

        if game.is_running() {
            if let Err(err) = self.schedule() {
                error!("Could not schedule next frame : {:#?}", err);
            }
        } else {
            log!("Game loop paused");
        }
    }

    fn activate(&self) {
        let now = match browser::now() {
            Ok(now) => now,
            Err(err) => {
                error!("Could not read the clock : {:#?}", err);
                return;
            }
        };
        let mut game = self.game.borrow_mut();
        game.activate(now);
        if self.schedule.get().should_resume(game.is_running()) {
            log!("Game loop resumed");
            self.timing.borrow_mut().resume(now);
            if let Err(err) = self.schedule() {
                error!("Could not resume game loop : {:#?}", err);
            }
        }
    }

    fn resize(&self) {
        match browser::fit_canvas_to_window() {
            Ok((width, height)) => {
                let viewport = Size {
                    width: width.into(),
                    height: height.into(),
                };
                let mut game = self.game.borrow_mut();
                game.resize(viewport);
                // a paused game keeps its last frame on screen
                if !self.schedule.get().is_pending() {
                    game.draw(&self.renderer);
                }
            }
            Err(err) => error!("Could not resize canvas : {:#?}", err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    /// Strict overlap, rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x() < other.right()
            && self.right() > other.x()
            && self.y() < other.bottom()
            && self.bottom() > other.y()
    }
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context
            .clear_rect(rect.x(), rect.y(), rect.size.width, rect.size.height);
    }

    /// Draw the whole image stretched over `destination`
    pub fn draw_entire_image(&self, image: &HtmlImageElement, destination: &Rect) {
        if let Err(err) = self.context.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            destination.x(),
            destination.y(),
            destination.size.width,
            destination.size.height,
        ) {
            error!("Drawing image failed : {:#?}", err);
        }
    }

    pub fn draw_text(&self, text: &str, position: &Point, font: &str, color: &str) {
        self.context.set_font(font);
        self.context.set_fill_style_str(color);
        if let Err(err) = self.context.fill_text(text, position.x, position.y) {
            error!("Drawing text '{}' failed : {:#?}", text, err);
        }
    }

    pub fn draw_rect(&self, rect: &Rect) {
        self.context.set_stroke_style_str("#FF0000");
        self.context
            .stroke_rect(rect.x(), rect.y(), rect.size.width, rect.size.height);
    }
}

/// Bounding boxes drawn over sprites in debug builds
#[cfg(debug_assertions)]
pub trait DebugDraw {
    fn draw_debug(&self, renderer: &Renderer);
}

#[cfg(debug_assertions)]
impl DebugDraw for Rect {
    fn draw_debug(&self, renderer: &Renderer) {
        renderer.draw_rect(self);
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::create_html_image_element()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = Closure::once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = Closure::once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!("Error loading image: {:#?}", err)));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callbacks alive until the image loads or errors
    success_callback.forget();
    error_callback.forget();

    // Result<Result<(), Error>, oneshot::Canceled>
    // - first ? is the channel, second ? is the load itself
    rx.await??;

    Ok(image)
}
