//! Quantized input samples consumed by the engine.
//!
//! The hardware layer reads the joystick ADC and button pins once per poll and
//! hands the engine an [`InputSnapshot`]. Nothing here talks to peripherals.

/// Largest value the 12-bit joystick ADC produces.
pub const AXIS_MAX: u16 = 4095;

/// Reading of an axis at rest.
pub const AXIS_CENTER: u16 = 2048;

/// Raw joystick reading for both axes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AxisSample {
    pub x: u16,
    pub y: u16,
}

impl AxisSample {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Stick at rest.
    pub const fn centered() -> Self {
        Self::new(AXIS_CENTER, AXIS_CENTER)
    }
}

impl Default for AxisSample {
    fn default() -> Self {
        Self::centered()
    }
}

/// Everything sampled in one poll of the controls.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct InputSnapshot {
    pub axes: AxisSample,
    pub confirm: bool,
    pub alt: bool,
}

impl InputSnapshot {
    /// Stick centred and no buttons held.
    pub const fn idle() -> Self {
        Self {
            axes: AxisSample::centered(),
            confirm: false,
            alt: false,
        }
    }

    pub const fn with_axes(mut self, axes: AxisSample) -> Self {
        self.axes = axes;
        self
    }

    pub const fn with_confirm(mut self) -> Self {
        self.confirm = true;
        self
    }

    pub const fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }
}
