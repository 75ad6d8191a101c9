//! All code relating to individual flight states lives here. Transitions are
//! only reachable through the methods below:
//! - PUBLIC  : FlightState and FlightContext are public
//! - PRIVATE : fields and the frame simulation are private
use crate::engine::{Point, Rect, Renderer, Size};
use crate::game::background::Background;
use crate::game::bird::{Altitude, Bird};
use crate::game::obstacle::Obstacle;
use crate::game::Sprites;
use crate::settings::{HudSettings, ObstacleSettings, Settings};
use rand::rngs::StdRng;

/// Marker for a session in progress
#[derive(Debug, Clone, Copy)]
pub struct Flying;

/// Marker for a finished session, remembers what ended it
#[derive(Debug, Clone, Copy)]
pub struct Crashed {
    pub cause: Hazard,
}

/// What a frame of simulation ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    Clear,
    OutOfBounds,
    Collision,
}

/// Result of updating a flying state, a frame either keeps flying or ends
pub enum FlightOutcome {
    InFlight(FlightState<Flying>),
    Crashed(FlightState<Crashed>),
}

pub struct FlightState<S> {
    context: FlightContext,
    // type-level tag, Crashed also carries what ended the flight
    state: S,
}

impl<S> FlightState<S> {
    pub fn context(&self) -> &FlightContext {
        &self.context
    }

    pub fn resize(mut self, viewport: Size) -> Self {
        self.context = self.context.with_viewport(viewport);
        self
    }
}

impl FlightState<Flying> {
    pub fn new(context: FlightContext) -> Self {
        FlightState {
            context,
            state: Flying,
        }
    }

    pub fn update(mut self, now: f64) -> FlightOutcome {
        match self.context.advance(now) {
            Hazard::Clear => FlightOutcome::InFlight(self),
            cause => FlightOutcome::Crashed(self.crash(cause)),
        }
    }

    pub fn flap(mut self) -> Self {
        self.context.bird.flap();
        self
    }

    fn crash(self, cause: Hazard) -> FlightState<Crashed> {
        log!(
            "Game over ({:?}) with score {}",
            cause,
            self.context.score
        );
        FlightState {
            context: self.context,
            state: Crashed { cause },
        }
    }
}

impl FlightState<Crashed> {
    pub fn cause(&self) -> Hazard {
        self.state.cause
    }

    pub fn restart(self, now: f64) -> FlightState<Flying> {
        log!("Restarting after a score of {}", self.context.score);
        FlightState {
            context: self.context.reset(now),
            state: Flying,
        }
    }

    pub fn draw_game_over(&self, renderer: &Renderer) {
        let hud = &self.context.hud;
        renderer.draw_text(
            "Game Over",
            &Point {
                x: self.context.viewport.width / 2.0 - hud.game_over_offset,
                y: self.context.viewport.height / 2.0,
            },
            &hud.game_over_font,
            &hud.color,
        );
    }
}

/// Shared data for every flight state:
/// - world : viewport, bird, background, obstacles
/// - session : score, spawn timer, obstacle randomness
pub struct FlightContext {
    score: u32,
    viewport: Size,
    bird: Bird,
    background: Background,
    obstacles: Vec<Obstacle>,
    // None until the first spawn, so a new session spawns on its first frame
    last_spawn: Option<f64>,
    obstacle_settings: ObstacleSettings,
    hud: HudSettings,
    rng: StdRng,
}

impl FlightContext {
    pub fn new(settings: &Settings, viewport: Size, rng: StdRng) -> Self {
        FlightContext {
            score: 0,
            viewport,
            bird: Bird::new(settings.bird, viewport),
            background: Background::new(settings.background.speed, viewport),
            obstacles: Vec::new(),
            last_spawn: None,
            obstacle_settings: settings.obstacles,
            hud: settings.hud.clone(),
            rng,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// One frame of simulation, in draw order:
    /// background -> bird -> spawn -> obstacles -> cull
    fn advance(&mut self, now: f64) -> Hazard {
        self.background.update();

        let mut hazard = match self.bird.update(self.viewport) {
            Altitude::InBounds => Hazard::Clear,
            Altitude::OutOfBounds => Hazard::OutOfBounds,
        };

        self.spawn_if_due(now);

        for obstacle in self.obstacles.iter_mut() {
            obstacle.update();
            if hazard == Hazard::Clear && obstacle.collides_with(&self.bird) {
                hazard = Hazard::Collision;
            }
        }

        self.cull_obstacles();
        hazard
    }

    fn spawn_if_due(&mut self, now: f64) {
        let due = self
            .last_spawn
            .map_or(true, |last| now - last > self.obstacle_settings.spawn_interval_ms);
        if due {
            self.obstacles.push(Obstacle::spawn(
                &self.obstacle_settings,
                self.viewport,
                &mut self.rng,
            ));
            self.last_spawn = Some(now);
        }
    }

    /// Drop every obstacle past the left edge after the whole pass, so
    /// removing one never skips its neighbour. One point per obstacle.
    fn cull_obstacles(&mut self) {
        let before = self.obstacles.len();
        self.obstacles.retain(|obstacle| !obstacle.is_off_screen());
        self.score += (before - self.obstacles.len()) as u32;
    }

    fn reset(mut self, now: f64) -> Self {
        self.score = 0;
        self.bird.reset(self.viewport);
        self.obstacles.clear();
        self.last_spawn = Some(now);
        self
    }

    fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self.background.resize(viewport);
        self
    }

    pub fn draw(&self, renderer: &Renderer, sprites: &Sprites) {
        renderer.clear(&Rect::new(Point::default(), self.viewport));
        // back to front
        self.background.draw(renderer, &sprites.background);
        self.bird.draw(renderer, &sprites.bird);
        for obstacle in self.obstacles.iter() {
            obstacle.draw(renderer, &sprites.obstacle);
        }
        renderer.draw_text(
            &format!("Score: {}", self.score),
            &self.hud.score_position(),
            &self.hud.score_font,
            &self.hud.color,
        );
    }

    #[cfg(test)]
    pub(crate) fn bird_mut(&mut self) -> &mut Bird {
        &mut self.bird
    }

    #[cfg(test)]
    pub(crate) fn push_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    #[cfg(test)]
    pub(crate) fn last_spawn(&self) -> Option<f64> {
        self.last_spawn
    }
}
