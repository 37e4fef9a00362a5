//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, table sizes and protocol constants live here
//! so they can be tuned in one place.

// Wi-Fi connection campaign

/// Time budget for a single association attempt (ms).
pub const ATTEMPT_TIMEOUT_MS: u64 = 8_192;

/// Interval between radio status polls during an attempt (ms).
pub const STATUS_POLL_INTERVAL_MS: u64 = 256;

/// First backoff interval after a fully failed pass (ms).
pub const BACKOFF_BASE_MS: u64 = 1_024;

/// Backoff ceiling - the interval doubles per failed pass up to here (ms).
pub const BACKOFF_CEILING_MS: u64 = 32_768;

/// Interval between link checks while connected (ms).
pub const LINK_CHECK_INTERVAL_MS: u64 = 1_024;

/// Maximum number of SSIDs collected by a pre-pass scan.
pub const MAX_SCAN_RESULTS: usize = 16;

/// Maximum number of event bindings on the connectivity manager.
pub const MAX_LINK_BINDINGS: usize = 8;

// Buttons

/// Minimum stable duration before a raw level change is committed (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Duration in `Pressed` before the state is promoted to `Holding` (ms).
pub const BUTTON_HOLD_MS: u64 = 1_000;

/// Quiet window that finalizes a multi-click sequence (ms).
pub const BUTTON_CLICK_WINDOW_MS: u64 = 300;

/// Maximum number of event bindings per button.
pub const MAX_BUTTON_BINDINGS: usize = 4;

// GPIO pin assignments (Pico W defaults)
//
// These are logical names; actual `embassy_rp::peripherals::*` types are
// selected in `main.rs`.  PIN_23/24/25/29 are wired to the CYW43 on the
// Pico W and are not free for application use.
//
//   Button        → GP15 (active-low, internal pull-up)
//   CYW43 PWR     → GP23
//   CYW43 CS      → GP25
//   CYW43 DIO/CLK → GP24 / GP29
