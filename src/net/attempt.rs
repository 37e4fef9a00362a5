//! A single bounded association attempt.

use core::net::Ipv4Addr;
use core::time::Duration;

use crate::config;
use crate::error::RejectReason;
use crate::time::Clock;

use super::{InterfaceMode, LinkStatus, NetworkConfig, Radio};

/// How one attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Connected(Ipv4Addr),
    TimedOut,
    Rejected(RejectReason),
}

/// Timing parameters for one association attempt.
///
/// The attempt kicks off association, then polls the radio until the
/// link is up, the AP rejects it, or the time budget runs out.
#[derive(Debug, Clone, Copy)]
pub struct ConnectAttempt {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConnectAttempt {
    fn default() -> Self {
        ConnectAttempt {
            timeout: Duration::from_millis(config::ATTEMPT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(config::STATUS_POLL_INTERVAL_MS),
        }
    }
}

impl ConnectAttempt {
    pub async fn run<R: Radio, C: Clock>(
        &self,
        mut radio: R,
        clock: &C,
        config: &NetworkConfig,
        mode: InterfaceMode,
    ) -> AttemptOutcome {
        if let Err(reason) = radio.begin_association(config, mode).await {
            return AttemptOutcome::Rejected(reason);
        }
        let deadline = clock.now() + self.timeout;
        loop {
            match radio.poll_status() {
                LinkStatus::Connected(address) => return AttemptOutcome::Connected(address),
                LinkStatus::Rejected(reason) => return AttemptOutcome::Rejected(reason),
                // Disassociated can be a transient between association
                // phases; only the deadline decides failure.
                LinkStatus::Connecting | LinkStatus::Disassociated => {}
            }
            if clock.now() >= deadline {
                return AttemptOutcome::TimedOut;
            }
            clock.sleep(self.poll_interval).await;
        }
    }
}
