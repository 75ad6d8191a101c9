use self::state::{Crashed, FlightContext, FlightOutcome, FlightState, Flying};
use crate::engine::{self, Game, Renderer, Size};
use crate::settings::{AssetSettings, Settings};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::join;
use rand::rngs::StdRng;
use rand::SeedableRng;
use web_sys::HtmlImageElement;

pub mod background;
pub mod bird;
pub mod obstacle;
pub mod state;

/// ┌──────────────────── Frame Flow ────────────────────┐
/// │  GameLoop tick                                     │
/// │   ├─► FlappyFighter::update  (per fixed step)      │
/// │   │    └─► FlightStateMachine::transition(Update)  │
/// │   │         └─► background, bird, obstacles        │
/// │   └─► FlappyFighter::draw    (once per frame)      │
/// │                                                    │
/// │  click / Space  ─► Activate  (flap or restart)     │
/// │  window resize  ─► Resize                          │
/// └────────────────────────────────────────────────────┘
pub enum FlappyFighter {
    /// Assets are loading, nothing is drawn yet
    Loading(Settings),

    /// Assets are ready, the flight state machine is live
    Loaded(Flight),
}

impl FlappyFighter {
    pub fn new(settings: Settings) -> Self {
        FlappyFighter::Loading(settings)
    }

    fn flight_mut(&mut self) -> Option<&mut Flight> {
        match self {
            FlappyFighter::Loaded(flight) => Some(flight),
            FlappyFighter::Loading(_) => None,
        }
    }
}

#[async_trait(?Send)]
impl Game for FlappyFighter {
    async fn initialize(&self, viewport: Size) -> Result<Box<dyn Game>> {
        match self {
            FlappyFighter::Loading(settings) => {
                let sprites = Sprites::load(&settings.assets).await?;
                let context = FlightContext::new(settings, viewport, StdRng::from_entropy());
                log!(
                    "Assets loaded, starting at {}x{}",
                    viewport.width,
                    viewport.height
                );
                Ok(Box::new(FlappyFighter::Loaded(Flight {
                    sprites,
                    machine: Some(FlightState::new(context).into()),
                })))
            }
            FlappyFighter::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, now: f64) {
        if let Some(flight) = self.flight_mut() {
            flight.transition(Event::Update(now));
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let FlappyFighter::Loaded(flight) = self {
            flight.draw(renderer);
        }
    }

    fn activate(&mut self, now: f64) {
        if let Some(flight) = self.flight_mut() {
            flight.transition(Event::Activate(now));
        }
    }

    fn resize(&mut self, viewport: Size) {
        if let Some(flight) = self.flight_mut() {
            log!("Resized to {}x{}", viewport.width, viewport.height);
            flight.transition(Event::Resize(viewport));
        }
    }

    fn is_running(&self) -> bool {
        match self {
            FlappyFighter::Loaded(flight) => flight.is_flying(),
            FlappyFighter::Loading(_) => false,
        }
    }
}

/// The three images a session draws with
pub struct Sprites {
    pub bird: HtmlImageElement,
    pub background: HtmlImageElement,
    pub obstacle: HtmlImageElement,
}

impl Sprites {
    async fn load(assets: &AssetSettings) -> Result<Self> {
        // all three load concurrently, the slowest one decides when we start
        let (bird, background, obstacle) = join!(
            Self::load_one(&assets.bird),
            Self::load_one(&assets.background),
            Self::load_one(&assets.obstacle),
        );
        Ok(Sprites {
            bird: bird?,
            background: background?,
            obstacle: obstacle?,
        })
    }

    async fn load_one(path: &str) -> Result<HtmlImageElement> {
        engine::load_image(path)
            .await
            .with_context(|| format!("Failed to load image resource from : {}", path))
    }
}

pub struct Flight {
    sprites: Sprites,
    // only None for the instant a transition holds the state
    machine: Option<FlightStateMachine>,
}

impl Flight {
    fn transition(&mut self, event: Event) {
        if let Some(machine) = self.machine.take() {
            self.machine.replace(machine.transition(event));
        }
    }

    fn is_flying(&self) -> bool {
        matches!(self.machine, Some(FlightStateMachine::Flying(_)))
    }

    fn draw(&self, renderer: &Renderer) {
        if let Some(machine) = &self.machine {
            machine.draw(renderer, &self.sprites);
        }
    }
}

/// ┌──────────── State Transition Flow ────────────┐
/// │  From State  →  Event     →  To State         │
/// ├───────────────────────────────────────────────┤
/// │  Flying      →  Update    →  Flying / Crashed │
/// │  Flying      →  Activate  →  Flying (flap)    │
/// │  Crashed     →  Activate  →  Flying (restart) │
/// │  any         →  Resize    →  same state       │
/// └───────────────────────────────────────────────┘
#[derive(Debug, Clone, Copy)]
pub enum Event {
    Update(f64),
    Activate(f64),
    Resize(Size),
}

pub enum FlightStateMachine {
    Flying(FlightState<Flying>),
    Crashed(FlightState<Crashed>),
}

impl From<FlightState<Flying>> for FlightStateMachine {
    fn from(state: FlightState<Flying>) -> Self {
        FlightStateMachine::Flying(state)
    }
}

impl From<FlightState<Crashed>> for FlightStateMachine {
    fn from(state: FlightState<Crashed>) -> Self {
        FlightStateMachine::Crashed(state)
    }
}

impl From<FlightOutcome> for FlightStateMachine {
    fn from(outcome: FlightOutcome) -> Self {
        match outcome {
            FlightOutcome::InFlight(flying) => flying.into(),
            FlightOutcome::Crashed(crashed) => crashed.into(),
        }
    }
}

impl FlightStateMachine {
    // consumes the current state so a stale one can never be used again
    pub fn transition(self, event: Event) -> Self {
        use FlightStateMachine::*;
        match (self, event) {
            (Flying(state), Event::Update(now)) => state.update(now).into(),
            (Flying(state), Event::Activate(_)) => state.flap().into(),
            (Crashed(state), Event::Activate(now)) => state.restart(now).into(),
            (Flying(state), Event::Resize(viewport)) => state.resize(viewport).into(),
            (Crashed(state), Event::Resize(viewport)) => state.resize(viewport).into(),
            // a crashed flight stays frozen until activated
            (this @ Crashed(_), Event::Update(_)) => this,
        }
    }

    pub fn context(&self) -> &FlightContext {
        match self {
            FlightStateMachine::Flying(state) => state.context(),
            FlightStateMachine::Crashed(state) => state.context(),
        }
    }

    fn draw(&self, renderer: &Renderer, sprites: &Sprites) {
        self.context().draw(renderer, sprites);
        if let FlightStateMachine::Crashed(state) = self {
            state.draw_game_over(renderer);
        }
    }
}
