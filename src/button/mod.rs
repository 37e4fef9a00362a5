//! Debounced button input with hold and multi-click detection.

use core::time::Duration;

use crate::config;

mod debounce;
mod task;

pub use debounce::Debouncer;
pub use task::{Button, EdgeInput};

/// Raw logic level on an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn inverse(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Debounced button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    Released,
    Pressed,
    /// Pressed for longer than the hold threshold.
    Holding,
}

/// Events published as the debounced state evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    Pressed,
    Released,
    Holding,
    /// A sequence of short presses, finalized after a quiet window.
    Clicked { count: u8 },
}

/// Per-button tunables.
#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    /// Level the pin reads while the button is pressed.
    pub active_level: Level,
    pub debounce_window: Duration,
    pub hold_threshold: Duration,
    pub click_window: Duration,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        // Pull-up wiring: the pin reads low while pressed.
        ButtonConfig {
            active_level: Level::Low,
            debounce_window: Duration::from_millis(config::BUTTON_DEBOUNCE_MS),
            hold_threshold: Duration::from_millis(config::BUTTON_HOLD_MS),
            click_window: Duration::from_millis(config::BUTTON_CLICK_WINDOW_MS),
        }
    }
}
