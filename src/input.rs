use crate::ship::ShipControls;
use gilrs::{Axis, Button, Gamepad, Gilrs};

/// Axis travel ignored around rest, on the -100..100 axis scale.
pub const DEFAULT_DEADZONE: f32 = 20.0;

/// One joystick's axes scaled to -100..100.
///
/// Sticks rest at 0 with y pointing down. Triggers rest at -100 and reach
/// 100 fully pressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadAxes {
    /// Left stick, horizontal.
    pub x: f32,
    /// Left stick, vertical.
    pub y: f32,
    /// Left trigger.
    pub z: f32,
    /// Right trigger.
    pub r: f32,
    /// Right stick, horizontal.
    pub u: f32,
    /// Right stick, vertical.
    pub v: f32,
    /// D-pad, horizontal.
    pub pov_x: f32,
    /// D-pad, vertical.
    pub pov_y: f32,
}

impl Default for GamepadAxes {
    fn default() -> Self {
        Self::REST
    }
}

impl GamepadAxes {
    /// Nothing touched.
    pub const REST: Self = Self {
        x: 0.0,
        y: 0.0,
        z: -100.0,
        r: -100.0,
        u: 0.0,
        v: 0.0,
        pov_x: 0.0,
        pov_y: 0.0,
    };

    /// Reads a connected gamepad.
    pub fn read(pad: &Gamepad<'_>) -> Self {
        let trigger = |button| pad.button_data(button).map_or(0.0, |d| d.value()) * 200.0 - 100.0;
        let pressed = |button| if pad.is_pressed(button) { 100.0 } else { 0.0 };
        Self {
            x: pad.value(Axis::LeftStickX) * 100.0,
            y: -pad.value(Axis::LeftStickY) * 100.0,
            z: trigger(Button::LeftTrigger2),
            r: trigger(Button::RightTrigger2),
            u: pad.value(Axis::RightStickX) * 100.0,
            v: -pad.value(Axis::RightStickY) * 100.0,
            pov_x: pressed(Button::DPadRight) - pressed(Button::DPadLeft),
            pov_y: pressed(Button::DPadDown) - pressed(Button::DPadUp),
        }
    }

    /// Right trigger thrusts forward, left trigger reverses, the left stick turns.
    pub fn controls(&self, deadzone: f32) -> ShipControls {
        ShipControls {
            left: self.x < -deadzone,
            up: self.r > -100.0 + deadzone,
            right: self.x > deadzone,
            down: self.z > -100.0 + deadzone,
        }
    }
}

/// A connected joystick as shown in the debug window.
#[derive(Debug, Clone, PartialEq)]
pub struct GamepadInfo {
    /// Position among connected gamepads.
    pub index: usize,
    /// Name reported by the driver.
    pub name: String,
    /// Current axis values.
    pub axes: GamepadAxes,
}

/// Joystick input. Without a working backend every query reports nothing connected.
pub struct Gamepads {
    gilrs: Option<Gilrs>,
}

impl Gamepads {
    /// Opens the platform gamepad backend, or a disconnected stand-in when `enabled` is false.
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self::disconnected();
        }
        match Gilrs::new() {
            Ok(gilrs) => {
                for (_, pad) in gilrs.gamepads() {
                    log::info!("gamepad connected: {}", pad.name());
                }
                Self { gilrs: Some(gilrs) }
            }
            Err(e) => {
                log::warn!("gamepad input unavailable: {e}");
                Self::disconnected()
            }
        }
    }

    /// Never reports a gamepad.
    pub fn disconnected() -> Self {
        Self { gilrs: None }
    }

    /// Drains pending events so axis state is current. Call once per frame.
    pub fn poll(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };
        while let Some(event) = gilrs.next_event() {
            log::trace!("gamepad event {:?}", event.event);
        }
    }

    /// Axes of the first connected gamepad.
    pub fn first(&self) -> Option<GamepadAxes> {
        let gilrs = self.gilrs.as_ref()?;
        let (_, pad) = gilrs.gamepads().next()?;
        Some(GamepadAxes::read(&pad))
    }

    /// Every connected gamepad.
    pub fn connected(&self) -> Vec<GamepadInfo> {
        let Some(gilrs) = self.gilrs.as_ref() else {
            return Vec::new();
        };
        gilrs
            .gamepads()
            .enumerate()
            .map(|(index, (_, pad))| GamepadInfo {
                index,
                name: pad.name().to_owned(),
                axes: GamepadAxes::read(&pad),
            })
            .collect()
    }

    /// Controls from the first gamepad, nothing pressed if none is connected.
    pub fn controls(&self, deadzone: f32) -> ShipControls {
        self.first()
            .map(|axes| axes.controls(deadzone))
            .unwrap_or_default()
    }
}
