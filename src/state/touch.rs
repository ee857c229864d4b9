// Pointer drag tracking: tells a pan apart from a click

#[derive(Default, Debug, Clone)]
pub struct DragGesture {
    pub pressed: bool,
    pub start_x: f64,
    pub start_y: f64,
    pub last_x: f64,
    pub last_y: f64,
    /// Latched once the pointer has travelled past the threshold since
    /// mouse-down.
    pub dragging: bool,
    pub threshold: f64,
}

impl DragGesture {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    pub fn press(&mut self, x: f64, y: f64) {
        self.pressed = true;
        self.dragging = false;
        self.start_x = x;
        self.start_y = y;
        self.last_x = x;
        self.last_y = y;
    }

    /// Returns the delta to pan by, if the gesture is a drag. The first
    /// pan delta is measured from the press point.
    pub fn motion(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !self.pressed {
            return None;
        }
        if !self.dragging {
            let dx = x - self.start_x;
            let dy = y - self.start_y;
            if (dx * dx + dy * dy).sqrt() <= self.threshold {
                return None;
            }
            self.dragging = true;
        }
        let delta = (x - self.last_x, y - self.last_y);
        self.last_x = x;
        self.last_y = y;
        Some(delta)
    }

    /// Ends the gesture. `true` means it should count as a click.
    pub fn release(&mut self) -> bool {
        let was_click = self.pressed && !self.dragging;
        self.pressed = false;
        self.dragging = false;
        was_click
    }
}
