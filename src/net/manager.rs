//! Connection campaign and link supervision.

use core::time::Duration;

use crate::config;
use crate::error::Error;
use crate::event::{BindingId, Dispatcher, Sink, SubscribeError};
use crate::time::Clock;

use super::{
    ActiveLink, AttemptOutcome, ConnectAttempt, ConnectivityState, InterfaceMode, LinkEvent,
    LinkStatus, NetworkConfig, Radio,
};

/// What to do when a static address cannot be applied to a fresh link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressRetry {
    /// Tear the link down and treat the config as failed.
    #[default]
    FailConfig,
    /// Retry the application once before giving up on the config.
    RetryOnce,
}

/// Exponential backoff between campaign passes.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub ceiling: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy {
            base: Duration::from_millis(config::BACKOFF_BASE_MS),
            ceiling: Duration::from_millis(config::BACKOFF_CEILING_MS),
        }
    }
}

impl BackoffPolicy {
    /// Delay before the pass following `failed_passes` full failures.
    /// Doubles per pass, capped at the ceiling.
    pub fn delay_after(&self, failed_passes: u32) -> Duration {
        let mut delay = self.base;
        for _ in 1..failed_passes {
            if delay >= self.ceiling {
                break;
            }
            delay = core::cmp::min(delay.saturating_mul(2), self.ceiling);
        }
        core::cmp::min(delay, self.ceiling)
    }
}

/// Tunables for the connectivity manager.
#[derive(Debug, Clone, Copy)]
pub struct ManagerConfig {
    pub mode: InterfaceMode,
    pub attempt: ConnectAttempt,
    pub backoff: BackoffPolicy,
    pub address_retry: AddressRetry,
    /// Scan before each pass and skip configs whose SSID is not
    /// visible (hidden configs are always attempted).
    pub scan_before_pass: bool,
    pub link_check_interval: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            mode: InterfaceMode::Station,
            attempt: ConnectAttempt::default(),
            backoff: BackoffPolicy::default(),
            address_retry: AddressRetry::default(),
            scan_before_pass: true,
            link_check_interval: Duration::from_millis(config::LINK_CHECK_INTERVAL_MS),
        }
    }
}

/// Drives connection campaigns across an ordered list of networks and
/// supervises the resulting link.
pub struct ConnectivityManager<'h, R: Radio, C: Clock> {
    radio: R,
    clock: C,
    cfg: ManagerConfig,
    state: ConnectivityState,
    events: Dispatcher<'h, LinkEvent, { config::MAX_LINK_BINDINGS }>,
}

impl<'h, R: Radio, C: Clock> ConnectivityManager<'h, R, C> {
    pub fn new(radio: R, clock: C, cfg: ManagerConfig) -> Self {
        ConnectivityManager {
            radio,
            clock,
            cfg,
            state: ConnectivityState::Idle,
            events: Dispatcher::new(),
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn radio(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn subscribe(
        &mut self,
        condition: fn(&LinkEvent) -> bool,
        sink: Sink<'h, LinkEvent>,
    ) -> Result<BindingId, SubscribeError> {
        self.events.subscribe(condition, sink)
    }

    pub fn unsubscribe(&mut self, id: BindingId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn set_binding_active(&mut self, id: BindingId, active: bool) {
        self.events.set_active(id, active);
    }

    /// Runs a connection campaign over `configs` in order.
    ///
    /// Each pass tries every eligible config once; after a fully failed
    /// pass the manager backs off and starts over.  `max_passes` of
    /// `None` means retry until connected.
    pub async fn try_connect(
        &mut self,
        configs: &[NetworkConfig],
        max_passes: Option<u32>,
    ) -> Result<ActiveLink, Error> {
        if configs.is_empty() {
            self.state = ConnectivityState::Failed;
            self.events.dispatch(&LinkEvent::CampaignFailed);
            return Err(Error::ConfigExhausted);
        }
        let mut pass: u32 = 0;
        loop {
            if let Some(max) = max_passes {
                if pass >= max {
                    log::warn!("connection campaign exhausted after {} passes", pass);
                    self.state = ConnectivityState::Failed;
                    self.events.dispatch(&LinkEvent::CampaignFailed);
                    return Err(Error::ConfigExhausted);
                }
            }
            if pass > 0 {
                let delay = self.cfg.backoff.delay_after(pass);
                self.state = ConnectivityState::Backoff { pass };
                self.events.dispatch(&LinkEvent::BackingOff {
                    pass,
                    delay_ms: delay.as_millis() as u64,
                });
                self.clock.sleep(delay).await;
            }
            let visible = if self.cfg.scan_before_pass {
                Some(self.radio.scan().await)
            } else {
                None
            };
            for (index, network) in configs.iter().enumerate() {
                if let Some(visible) = &visible {
                    let seen = visible.iter().any(|ssid| *ssid == network.ssid);
                    // An empty scan result means the scan itself failed;
                    // fall through and attempt everything.
                    if !seen && !network.hidden && !visible.is_empty() {
                        log::debug!("skipping {}: not visible", network.ssid.as_str());
                        continue;
                    }
                }
                if let Some(link) = self.attempt_config(index, network).await {
                    return Ok(link);
                }
            }
            pass += 1;
        }
    }

    /// One attempt against one config, including static addressing.
    async fn attempt_config(
        &mut self,
        config_index: usize,
        network: &NetworkConfig,
    ) -> Option<ActiveLink> {
        self.state = ConnectivityState::Attempting { config_index };
        self.events.dispatch(&LinkEvent::AttemptStarted { config_index });
        // Clean slate - a half-open association from a previous attempt
        // would confuse status polling.
        self.radio.disassociate().await;
        let attempt = self.cfg.attempt;
        let outcome = attempt
            .run(&mut self.radio, &self.clock, network, self.cfg.mode)
            .await;
        let error = match outcome {
            AttemptOutcome::Connected(mut address) => {
                if let Some(static_address) = &network.static_address {
                    match self.apply_static(static_address).await {
                        Ok(()) => address = static_address.address,
                        Err(()) => {
                            self.radio.disassociate().await;
                            log::warn!("static address rejected, dropping link");
                            self.events.dispatch(&LinkEvent::AttemptFailed {
                                config_index,
                                error: Error::AddressApplyFailed,
                            });
                            return None;
                        }
                    }
                }
                self.state = ConnectivityState::Connected {
                    config_index,
                    address,
                };
                self.events.dispatch(&LinkEvent::Connected {
                    config_index,
                    address,
                });
                log::info!("connected to {}", network.ssid.as_str());
                return Some(ActiveLink {
                    config_index,
                    address,
                });
            }
            AttemptOutcome::TimedOut => Error::Timeout,
            AttemptOutcome::Rejected(reason) => Error::Rejected(reason),
        };
        log::warn!("attempt on {} failed: {:?}", network.ssid.as_str(), error);
        self.events.dispatch(&LinkEvent::AttemptFailed {
            config_index,
            error,
        });
        None
    }

    async fn apply_static(&mut self, address: &super::StaticAddress) -> Result<(), ()> {
        match self.radio.apply_static_address(address).await {
            Ok(()) => Ok(()),
            Err(()) if self.cfg.address_retry == AddressRetry::RetryOnce => {
                self.radio.apply_static_address(address).await
            }
            Err(()) => Err(()),
        }
    }

    /// Keeps the device connected forever: connects, watches the link,
    /// reconnects when it drops.
    pub async fn maintain(&mut self, configs: &[NetworkConfig]) -> ! {
        loop {
            match self.try_connect(configs, None).await {
                Ok(_) => self.watch_link().await,
                // Only an empty config list fails an unbounded campaign.
                Err(_) => self.clock.sleep(self.cfg.link_check_interval).await,
            }
        }
    }

    /// Polls the established link until it drops.
    async fn watch_link(&mut self) {
        loop {
            self.clock.sleep(self.cfg.link_check_interval).await;
            match self.radio.poll_status() {
                LinkStatus::Connected(_) => {}
                _ => {
                    log::warn!("link lost");
                    self.events.dispatch(&LinkEvent::LinkLost);
                    return;
                }
            }
        }
    }
}
