use crate::engine::{Point, Rect, Renderer, Size};
use web_sys::HtmlImageElement;

/// One image drawn twice side by side, scrolled and wrapped every frame
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    offset: f64,
    // where this frame draws, the offset before the frame moved it
    drawn_offset: f64,
    speed: f64,
    size: Size,
}

impl Background {
    pub fn new(speed: f64, size: Size) -> Self {
        Background {
            offset: 0.0,
            drawn_offset: 0.0,
            speed,
            size,
        }
    }

    pub fn update(&mut self) {
        self.drawn_offset = self.offset;
        self.offset += self.speed;
        if self.offset <= -self.size.width {
            self.offset = 0.0;
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Destinations for both copies of the image
    fn tiles(&self) -> [Rect; 2] {
        [
            Rect::new(
                Point {
                    x: self.drawn_offset,
                    y: 0.0,
                },
                self.size,
            ),
            Rect::new(
                Point {
                    x: self.drawn_offset + self.size.width,
                    y: 0.0,
                },
                self.size,
            ),
        ]
    }

    pub fn draw(&self, renderer: &Renderer, image: &HtmlImageElement) {
        for tile in self.tiles().iter() {
            renderer.draw_entire_image(image, tile);
        }
    }
}
