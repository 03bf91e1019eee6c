// GL pixel coordinates, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_ui_rect(rect: egui::Rect, pixels_per_point: f32, window_height: u32) -> Self {
        let x = (rect.min.x * pixels_per_point) as i32;
        let top = (rect.min.y * pixels_per_point) as i32;
        let width = (rect.width() * pixels_per_point) as i32;
        let height = (rect.height() * pixels_per_point) as i32;

        // Reverse the y since OpenGL uses a different origin
        Self::new(x, window_height as i32 - top - height, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_rect_is_flipped_and_scaled() {
        let rect = egui::Rect::from_min_size(egui::pos2(100.0, 20.0), egui::vec2(400.0, 300.0));

        let viewport = Viewport::from_ui_rect(rect, 2.0, 1000);

        assert_eq!(viewport, Viewport::new(200, 1000 - 40 - 600, 800, 600));
        assert!((viewport.aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn collapsed_panel_is_empty() {
        assert!(Viewport::new(0, 0, 0, 300).is_empty());
    }
}
