//! Mouse and keyboard mapping onto the shared camera and session toggles.

use scan_core::CameraController;
use std::time::{Duration, Instant};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// How long the left button must stay down to count as a long-press.
pub const LONG_PRESS: Duration = Duration::from_millis(500);
/// Cursor travel, in pixels, that turns a press into a drag.
pub const LONG_PRESS_SLOP_PX: f64 = 6.0;
/// Display ratio change per bracket key.
pub const RATIO_STEP: f32 = 0.1;

/// Something the app must do in response to input, beyond camera motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Pick { x: f32, y: f32 },
    ResetView,
    ToggleGrid,
    ToggleAxes,
    ToggleLegend,
    CycleColorMode,
    AdjustRatio(f32),
    Quit,
}

/// Keyboard shortcuts.
pub fn key_action(key: KeyCode) -> Option<InputAction> {
    match key {
        KeyCode::KeyR => Some(InputAction::ResetView),
        KeyCode::KeyG => Some(InputAction::ToggleGrid),
        KeyCode::KeyA => Some(InputAction::ToggleAxes),
        KeyCode::KeyL => Some(InputAction::ToggleLegend),
        KeyCode::KeyC => Some(InputAction::CycleColorMode),
        KeyCode::BracketLeft => Some(InputAction::AdjustRatio(-RATIO_STEP)),
        KeyCode::BracketRight => Some(InputAction::AdjustRatio(RATIO_STEP)),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

/// Wheel notches to a multiplicative scale factor. Scrolling up zooms in.
pub fn scroll_factor(delta: &MouseScrollDelta) -> f32 {
    let lines = match delta {
        MouseScrollDelta::LineDelta(_, y) => *y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
    };
    1.1_f32.powf(lines)
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: (f64, f64),
    at: Instant,
    fired: bool,
}

/// Detects a held, stationary left press.
#[derive(Debug, Default)]
pub struct LongPressDetector {
    press: Option<Press>,
}

impl LongPressDetector {
    pub fn press(&mut self, origin: (f64, f64), at: Instant) {
        self.press = Some(Press {
            origin,
            at,
            fired: false,
        });
    }

    /// Moving past the slop radius cancels the pending press.
    pub fn moved(&mut self, to: (f64, f64)) {
        if let Some(p) = self.press {
            let (dx, dy) = (to.0 - p.origin.0, to.1 - p.origin.1);
            if (dx * dx + dy * dy).sqrt() >= LONG_PRESS_SLOP_PX {
                self.press = None;
            }
        }
    }

    pub fn release(&mut self) {
        self.press = None;
    }

    /// A press is held and has not yet moved past the slop radius.
    pub fn is_pending(&self) -> bool {
        self.press.is_some()
    }

    /// Fires once per press, at the press origin.
    pub fn poll(&mut self, now: Instant) -> Option<(f64, f64)> {
        let p = self.press.as_mut()?;
        if p.fired || now.saturating_duration_since(p.at) < LONG_PRESS {
            return None;
        }
        p.fired = true;
        Some(p.origin)
    }
}

/// Tracks buttons and cursor between events.
#[derive(Debug, Default)]
pub struct InputState {
    left_down: bool,
    right_down: bool,
    last_cursor: Option<(f64, f64)>,
    long_press: LongPressDetector,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies camera motion directly and returns any other action.
    pub fn handle_event(
        &mut self,
        event: &WindowEvent,
        camera: &CameraController,
    ) -> Option<InputAction> {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => {
                        self.left_down = pressed;
                        match (pressed, self.last_cursor) {
                            (true, Some(pos)) => self.long_press.press(pos, Instant::now()),
                            _ => self.long_press.release(),
                        }
                    }
                    MouseButton::Right => self.right_down = pressed,
                    _ => {}
                }
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let xy = (position.x, position.y);
                self.long_press.moved(xy);
                if let Some(last) = self.last_cursor {
                    let dx = (xy.0 - last.0) as f32;
                    let dy = (xy.1 - last.1) as f32;
                    // A held press only becomes a drag once it leaves the slop radius.
                    if self.left_down && !self.long_press.is_pending() {
                        camera.rotate(dx, dy);
                    } else if self.right_down {
                        // Screen Y grows downward; model Y grows upward.
                        camera.translate(dx, -dy);
                    }
                }
                self.last_cursor = Some(xy);
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                self.long_press.release();
                None
            }
            WindowEvent::MouseWheel { delta, .. } => {
                camera.scale(scroll_factor(delta));
                None
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                match event.physical_key {
                    PhysicalKey::Code(code) => key_action(code),
                    PhysicalKey::Unidentified(_) => None,
                }
            }
            _ => None,
        }
    }

    /// Checked once per frame; reports a long-press pick when one matures.
    pub fn poll(&mut self, now: Instant) -> Option<InputAction> {
        self.long_press.poll(now).map(|(x, y)| InputAction::Pick {
            x: x as f32,
            y: y as f32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    fn device() -> DeviceId {
        // SAFETY: only used to build synthetic events.
        unsafe { DeviceId::dummy() }
    }

    fn cursor(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn left(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn small_travel_during_press_does_not_rotate() {
        let camera = CameraController::new();
        let mut input = InputState::new();
        input.handle_event(&cursor(100.0, 100.0), &camera);
        input.handle_event(&left(ElementState::Pressed), &camera);

        input.handle_event(&cursor(103.0, 102.0), &camera);
        assert_eq!(camera.state(), Default::default());

        input.handle_event(&cursor(120.0, 102.0), &camera);
        assert!(camera.state().rotation_y > 0.0);

        input.handle_event(&left(ElementState::Released), &camera);
        let settled = camera.state();
        input.handle_event(&cursor(130.0, 102.0), &camera);
        assert_eq!(camera.state(), settled);
    }

    #[test]
    fn long_press_fires_once_after_hold() {
        let t0 = Instant::now();
        let mut d = LongPressDetector::default();
        d.press((100.0, 50.0), t0);

        assert_eq!(d.poll(t0 + Duration::from_millis(100)), None);
        d.moved((103.0, 52.0));
        assert_eq!(d.poll(t0 + LONG_PRESS), Some((100.0, 50.0)));
        assert_eq!(d.poll(t0 + LONG_PRESS * 2), None);
    }

    #[test]
    fn drag_or_release_cancels_long_press() {
        let t0 = Instant::now();
        let mut d = LongPressDetector::default();
        d.press((0.0, 0.0), t0);
        d.moved((6.0, 0.0));
        assert_eq!(d.poll(t0 + LONG_PRESS), None);

        d.press((0.0, 0.0), t0);
        d.release();
        assert_eq!(d.poll(t0 + LONG_PRESS), None);
    }

    #[test]
    fn wheel_scales_by_powers_of_1_1() {
        let up = scroll_factor(&MouseScrollDelta::LineDelta(0.0, 1.0));
        let down = scroll_factor(&MouseScrollDelta::LineDelta(0.0, -2.0));
        assert!((up - 1.1).abs() < 1e-6);
        assert!((down - 1.0 / 1.21).abs() < 1e-6);
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(key_action(KeyCode::KeyR), Some(InputAction::ResetView));
        assert_eq!(key_action(KeyCode::KeyC), Some(InputAction::CycleColorMode));
        assert_eq!(key_action(KeyCode::KeyL), Some(InputAction::ToggleLegend));
        assert_eq!(
            key_action(KeyCode::BracketLeft),
            Some(InputAction::AdjustRatio(-RATIO_STEP))
        );
        assert_eq!(key_action(KeyCode::Escape), Some(InputAction::Quit));
        assert_eq!(key_action(KeyCode::KeyZ), None);
    }
}
