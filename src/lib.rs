//! Wi-Fi link supervision and debounced button input for the Raspberry
//! Pi Pico W.
//!
//! The crate is split into portable logic, testable on the host, and
//! thin hardware bindings behind the `embedded` feature:
//!
//! - [`net`] drives connection campaigns over an ordered list of
//!   networks, applies static addressing, and supervises the link.
//! - [`button`] debounces pin edges into press, release, hold and
//!   multi-click events.
//! - [`event`] fans both out to filtered subscribers, inline or via
//!   async queues.

#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

pub mod button;
pub mod config;
pub mod error;
pub mod event;
pub mod net;
pub mod time;

pub use button::{Button, ButtonConfig, ButtonEvent, ButtonState, Debouncer, EdgeInput, Level};
pub use error::{Error, RejectReason};
pub use event::{BindingId, Dispatcher, Handler, Sink, SubscribeError};
pub use net::{
    ActiveLink, AddressRetry, BackoffPolicy, ConnectAttempt, ConnectivityManager,
    ConnectivityState, InterfaceMode, LinkEvent, LinkStatus, ManagerConfig, NetworkConfig, Radio,
    StaticAddress,
};
pub use time::{Clock, Instant};
