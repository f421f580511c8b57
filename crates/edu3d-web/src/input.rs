// Pointer and wheel mapping for the orbit controls.
// Kept free of web-sys so the host-side tests can include it directly.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragMode {
    Rotate,
    Pan,
}

/// Gesture the control surface should apply for one pointer move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Rotate { dx: f32, dy: f32 },
    Pan { dx: f32, dy: f32 },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PointerDrag {
    active: Option<(i32, DragMode)>,
    last: (f64, f64),
}

impl PointerDrag {
    /// Start a drag. Only the first pointer down is tracked.
    pub fn begin(
        &mut self,
        pointer_id: i32,
        button: i16,
        shift: bool,
        pan_allowed: bool,
        x: f64,
        y: f64,
    ) {
        if self.active.is_some() {
            return;
        }
        let wants_pan = button == crate::constants::PAN_BUTTON || shift;
        let mode = if wants_pan && pan_allowed {
            DragMode::Pan
        } else {
            DragMode::Rotate
        };
        self.active = Some((pointer_id, mode));
        self.last = (x, y);
    }

    pub fn moved(&mut self, pointer_id: i32, x: f64, y: f64) -> Option<Gesture> {
        let (id, mode) = self.active?;
        if id != pointer_id {
            return None;
        }
        let dx = (x - self.last.0) as f32;
        let dy = (y - self.last.1) as f32;
        self.last = (x, y);
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(match mode {
            DragMode::Rotate => Gesture::Rotate { dx, dy },
            DragMode::Pan => Gesture::Pan { dx, dy },
        })
    }

    pub fn end(&mut self, pointer_id: i32) {
        if matches!(self.active, Some((id, _)) if id == pointer_id) {
            self.active = None;
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Convert a wheel delta to zoom steps; positive zooms out.
/// `delta_mode` follows DOM WheelEvent: 0 pixels, 1 lines, 2 pages.
pub fn wheel_steps(delta_y: f64, delta_mode: u32) -> f32 {
    use crate::constants::{WHEEL_LINES_PER_STEP, WHEEL_PIXELS_PER_STEP};
    let steps = match delta_mode {
        0 => delta_y / WHEEL_PIXELS_PER_STEP,
        1 => delta_y / WHEEL_LINES_PER_STEP,
        _ if delta_y == 0.0 => 0.0,
        _ => delta_y.signum(),
    };
    if steps.is_finite() {
        steps.clamp(-3.0, 3.0) as f32
    } else {
        0.0
    }
}
