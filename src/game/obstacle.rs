#[cfg(debug_assertions)]
use crate::engine::DebugDraw;
use crate::engine::{Point, Rect, Renderer, Size};
use crate::game::bird::Bird;
use crate::settings::ObstacleSettings;
use rand::Rng;
use web_sys::HtmlImageElement;

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    bounding_box: Rect,
    speed: f64,
}

impl Obstacle {
    pub fn new(bounding_box: Rect, speed: f64) -> Self {
        Obstacle {
            bounding_box,
            speed,
        }
    }

    /// A fresh obstacle at the right edge of the viewport with a random
    /// height, placed at a random height that keeps it on screen
    pub fn spawn(settings: &ObstacleSettings, viewport: Size, rng: &mut impl Rng) -> Self {
        let height = rng.gen_range(settings.min_height..=settings.max_height);
        // a viewport shorter than the obstacle pins it to the top
        let free_space = (viewport.height - height).max(0.0);
        let y = rng.gen_range(0.0..=free_space);
        Obstacle::new(
            Rect::new(
                Point {
                    x: viewport.width,
                    y,
                },
                Size {
                    width: settings.width,
                    height,
                },
            ),
            settings.speed,
        )
    }

    pub fn update(&mut self) {
        self.bounding_box.position.x -= self.speed;
    }

    pub fn is_off_screen(&self) -> bool {
        self.bounding_box.right() < 0.0
    }

    pub fn collides_with(&self, bird: &Bird) -> bool {
        bird.bounding_box().intersects(&self.bounding_box)
    }

    pub fn bounding_box(&self) -> &Rect {
        &self.bounding_box
    }

    pub fn draw(&self, renderer: &Renderer, image: &HtmlImageElement) {
        renderer.draw_entire_image(image, &self.bounding_box);

        #[cfg(debug_assertions)]
        self.bounding_box.draw_debug(renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BirdSettings;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const VIEWPORT: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    fn at(x: f64, y: f64, height: f64) -> Obstacle {
        Obstacle::new(
            Rect::new(
                Point { x, y },
                Size {
                    width: 150.0,
                    height,
                },
            ),
            5.0,
        )
    }

    #[test]
    fn spawned_obstacles_fit_the_viewport() {
        let settings = ObstacleSettings::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let obstacle = Obstacle::spawn(&settings, VIEWPORT, &mut rng);
            let rect = obstacle.bounding_box();
            assert!((50.0..=250.0).contains(&rect.size.height));
            assert!(rect.y() >= 0.0);
            assert!(rect.bottom() <= VIEWPORT.height);
            assert_eq!(rect.x(), VIEWPORT.width);
            assert_eq!(rect.size.width, 150.0);
        }
    }

    #[test]
    fn short_viewport_pins_obstacle_to_the_top() {
        let settings = ObstacleSettings::default();
        let mut rng = StdRng::seed_from_u64(1);
        let viewport = Size {
            width: 320.0,
            height: 40.0,
        };
        for _ in 0..100 {
            let obstacle = Obstacle::spawn(&settings, viewport, &mut rng);
            assert_eq!(obstacle.bounding_box().y(), 0.0);
        }
    }

    #[test]
    fn moves_left_by_its_speed() {
        let mut obstacle = at(800.0, 0.0, 100.0);
        obstacle.update();
        obstacle.update();
        assert_eq!(obstacle.bounding_box().x(), 790.0);
    }

    #[test]
    fn off_screen_only_once_right_edge_passes_zero() {
        let mut obstacle = at(-145.0, 0.0, 100.0);
        assert!(!obstacle.is_off_screen());
        obstacle.update();
        // right edge exactly at 0 is still on screen
        assert!(!obstacle.is_off_screen());
        obstacle.update();
        assert!(obstacle.is_off_screen());
    }

    #[test]
    fn collides_with_overlapping_bird_only() {
        let bird = Bird::new(BirdSettings::default(), VIEWPORT);
        // bird occupies x 200..300, y 250..350
        assert!(at(250.0, 300.0, 100.0).collides_with(&bird));
        assert!(!at(300.0, 250.0, 100.0).collides_with(&bird));
        assert!(!at(200.0, 350.0, 100.0).collides_with(&bird));
        assert!(!at(200.0, 50.0, 200.0).collides_with(&bird));
    }

    #[test]
    fn collides_with_identical_geometry() {
        let bird = Bird::new(BirdSettings::default(), VIEWPORT);
        let twin = Obstacle::new(bird.bounding_box(), 5.0);
        assert!(twin.collides_with(&bird));
    }
}
