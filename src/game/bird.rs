#[cfg(debug_assertions)]
use crate::engine::DebugDraw;
use crate::engine::{Point, Rect, Renderer, Size};
use crate::settings::BirdSettings;
use web_sys::HtmlImageElement;

/// Where the bird was at the start of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Altitude {
    InBounds,
    OutOfBounds,
}

/// The player: fixed x, falls under gravity, flaps upward
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    settings: BirdSettings,
    position: Point,
    velocity: f64,
}

impl Bird {
    pub fn new(settings: BirdSettings, viewport: Size) -> Self {
        Bird {
            settings,
            position: Point {
                x: settings.x,
                y: Self::start_y(&settings, viewport),
            },
            velocity: 0.0,
        }
    }

    fn start_y(settings: &BirdSettings, viewport: Size) -> f64 {
        viewport.height / 2.0 - settings.height / 2.0
    }

    fn floor(&self, viewport: Size) -> f64 {
        viewport.height - self.settings.height
    }

    /// ::update per frame
    /// - bounds are checked against the position left by the previous frame
    /// - then gravity -> velocity -> position
    /// - then the floor is resolved
    pub fn update(&mut self, viewport: Size) -> Altitude {
        let altitude = if self.position.y < 0.0 || self.bounding_box().bottom() > viewport.height
        {
            Altitude::OutOfBounds
        } else {
            Altitude::InBounds
        };

        self.velocity += self.settings.gravity;
        self.position.y += self.velocity;

        if self.bounding_box().bottom() > viewport.height {
            self.position.y = self.floor(viewport);
            self.velocity = 0.0;
        }

        altitude
    }

    pub fn flap(&mut self) {
        self.velocity = self.settings.flap_impulse;
    }

    pub fn reset(&mut self, viewport: Size) {
        self.position.y = Self::start_y(&self.settings, viewport);
        self.velocity = 0.0;
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::new(
            self.position,
            Size {
                width: self.settings.width,
                height: self.settings.height,
            },
        )
    }

    pub fn draw(&self, renderer: &Renderer, image: &HtmlImageElement) {
        renderer.draw_entire_image(image, &self.bounding_box());

        #[cfg(debug_assertions)]
        self.bounding_box().draw_debug(renderer);
    }

    #[cfg(test)]
    pub(crate) fn set_y(&mut self, y: f64) {
        self.position.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const VIEWPORT: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    fn bird() -> Bird {
        Bird::new(BirdSettings::default(), VIEWPORT)
    }

    #[test]
    fn spawns_centered_and_still() {
        let bird = bird();
        assert_relative_eq!(bird.position().x, 200.0);
        assert_relative_eq!(bird.position().y, 250.0);
        assert_relative_eq!(bird.velocity(), 0.0);
    }

    #[test]
    fn flap_then_twenty_frames_comes_to_rest() {
        let mut bird = bird();
        bird.flap();

        let mut y = 250.0;
        let mut velocity = -8.0;
        let mut lowest = y;
        for _ in 0..20 {
            assert_eq!(bird.update(VIEWPORT), Altitude::InBounds);
            velocity += 0.4;
            y += velocity;
            lowest = f64::min(lowest, y);
            assert_relative_eq!(bird.position().y, y, epsilon = 1e-9);
        }

        assert_relative_eq!(bird.velocity(), 0.0, epsilon = 1e-9);
        assert!(lowest < 250.0);
        assert!(bird.position().y < 250.0);

        // velocity is zero at the apex, the next frame starts the descent
        bird.update(VIEWPORT);
        assert!(bird.velocity() > 0.0);
        assert!(bird.position().y > lowest + 0.1);
    }

    #[test]
    fn flap_overrides_any_velocity() {
        let mut bird = bird();
        for _ in 0..30 {
            bird.update(VIEWPORT);
        }
        bird.flap();
        assert_relative_eq!(bird.velocity(), -8.0);
        bird.flap();
        assert_relative_eq!(bird.velocity(), -8.0);
    }

    #[test]
    fn falls_monotonically_once_velocity_is_positive() {
        let mut bird = bird();
        let mut previous = bird.position().y;
        for _ in 0..25 {
            bird.update(VIEWPORT);
            assert!(bird.velocity() > 0.0);
            assert!(bird.position().y >= previous);
            previous = bird.position().y;
        }
    }

    #[test]
    fn floor_clamps_and_stops() {
        let mut bird = bird();
        for _ in 0..200 {
            assert_eq!(bird.update(VIEWPORT), Altitude::InBounds);
        }
        assert_relative_eq!(bird.position().y, 500.0);
        assert_relative_eq!(bird.velocity(), 0.0);
    }

    #[test]
    fn above_top_is_reported_before_moving() {
        let mut bird = bird();
        bird.set_y(-1.0);
        assert_eq!(bird.update(VIEWPORT), Altitude::OutOfBounds);
        // integration still ran in the same frame
        assert_relative_eq!(bird.position().y, -0.6, epsilon = 1e-9);
    }

    #[test]
    fn below_floor_is_reported_then_clamped() {
        let mut bird = bird();
        bird.set_y(520.0);
        assert_eq!(bird.update(VIEWPORT), Altitude::OutOfBounds);
        assert_relative_eq!(bird.position().y, 500.0);
        assert_relative_eq!(bird.velocity(), 0.0);
    }

    #[test]
    fn reset_recenters_for_current_viewport() {
        let mut bird = bird();
        bird.flap();
        bird.update(VIEWPORT);
        bird.reset(Size {
            width: 1024.0,
            height: 768.0,
        });
        assert_relative_eq!(bird.position().y, 334.0);
        assert_relative_eq!(bird.velocity(), 0.0);
    }
}
