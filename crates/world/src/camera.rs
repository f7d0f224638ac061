/// 2D camera: scroll offset plus viewport size, in world pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Camera {
    /// Camera at the world origin.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    pub fn set_scroll(&mut self, x: f32, y: f32) {
        self.scroll_x = x;
        self.scroll_y = y;
    }

    /// Midpoint of the viewport.
    pub fn center(&self) -> (f32, f32) {
        (
            self.scroll_x + self.width / 2.0,
            self.scroll_y + self.height / 2.0,
        )
    }

    /// Scroll so that `(x, y)` sits in the middle of the viewport.
    pub fn center_on(&mut self, x: f32, y: f32) {
        self.scroll_x = x - self.width / 2.0;
        self.scroll_y = y - self.height / 2.0;
    }
}
