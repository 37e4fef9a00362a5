//! Wi-Fi connectivity: configuration, radio abstraction and link
//! supervision.

use core::net::Ipv4Addr;

use heapless::{String, Vec};

use crate::config::MAX_SCAN_RESULTS;
use crate::error::RejectReason;

mod attempt;
mod manager;

#[cfg(feature = "embedded")]
mod cyw43;

pub use attempt::{AttemptOutcome, ConnectAttempt};
pub use manager::{AddressRetry, BackoffPolicy, ConnectivityManager, ManagerConfig};

#[cfg(feature = "embedded")]
pub use self::cyw43::Cyw43Radio;

/// Static IPv4 assignment applied once a link is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticAddress {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    /// `UNSPECIFIED` means no default route.
    pub gateway: Ipv4Addr,
    pub dns: Ipv4Addr,
}

impl StaticAddress {
    /// A /24 assignment with no gateway and a public DNS resolver.
    pub const fn new(address: Ipv4Addr) -> Self {
        StaticAddress {
            address,
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::UNSPECIFIED,
            dns: Ipv4Addr::new(8, 8, 8, 8),
        }
    }
}

/// A constructed [`NetworkConfig`] field exceeded its fixed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    SsidTooLong,
    PassphraseTooLong,
    HostnameTooLong,
}

/// One candidate network for the connection campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub ssid: String<32>,
    pub passphrase: String<64>,
    /// `None` means DHCP.
    pub static_address: Option<StaticAddress>,
    pub hostname: Option<String<32>>,
    /// Hidden networks are attempted even when a scan does not see them.
    pub hidden: bool,
}

impl NetworkConfig {
    pub fn new(ssid: &str, passphrase: &str) -> Result<Self, ConfigError> {
        Ok(NetworkConfig {
            ssid: String::try_from(ssid).map_err(|_| ConfigError::SsidTooLong)?,
            passphrase: String::try_from(passphrase).map_err(|_| ConfigError::PassphraseTooLong)?,
            static_address: None,
            hostname: None,
            hidden: false,
        })
    }

    pub fn with_static_address(mut self, address: StaticAddress) -> Self {
        self.static_address = Some(address);
        self
    }

    pub fn with_hostname(mut self, hostname: &str) -> Result<Self, ConfigError> {
        self.hostname = Some(String::try_from(hostname).map_err(|_| ConfigError::HostnameTooLong)?);
        Ok(self)
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Whether the radio joins a network or publishes its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceMode {
    Station,
    AccessPoint,
}

/// Raw link state as reported by the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Association or handshake in progress.
    Connecting,
    /// Link up with the given address.
    Connected(Ipv4Addr),
    /// No link and no attempt in progress.
    Disassociated,
    /// The AP refused the attempt.
    Rejected(RejectReason),
}

/// Driver interface the connectivity logic is written against.
pub trait Radio {
    /// Starts an association attempt; completion is observed via
    /// [`poll_status`](Radio::poll_status).
    async fn begin_association(
        &mut self,
        config: &NetworkConfig,
        mode: InterfaceMode,
    ) -> Result<(), RejectReason>;

    fn poll_status(&mut self) -> LinkStatus;

    async fn apply_static_address(&mut self, address: &StaticAddress) -> Result<(), ()>;

    async fn disassociate(&mut self);

    /// SSIDs currently visible. Best effort; an empty result disables
    /// scan filtering for the pass.
    async fn scan(&mut self) -> Vec<String<32>, MAX_SCAN_RESULTS>;
}

impl<R: Radio> Radio for &mut R {
    async fn begin_association(
        &mut self,
        config: &NetworkConfig,
        mode: InterfaceMode,
    ) -> Result<(), RejectReason> {
        (**self).begin_association(config, mode).await
    }

    fn poll_status(&mut self) -> LinkStatus {
        (**self).poll_status()
    }

    async fn apply_static_address(&mut self, address: &StaticAddress) -> Result<(), ()> {
        (**self).apply_static_address(address).await
    }

    async fn disassociate(&mut self) {
        (**self).disassociate().await
    }

    async fn scan(&mut self) -> Vec<String<32>, MAX_SCAN_RESULTS> {
        (**self).scan().await
    }
}

/// Notifications published by the connectivity manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    AttemptStarted {
        config_index: usize,
    },
    AttemptFailed {
        config_index: usize,
        error: crate::error::Error,
    },
    Connected {
        config_index: usize,
        address: Ipv4Addr,
    },
    BackingOff {
        pass: u32,
        delay_ms: u64,
    },
    /// A previously established link went down.
    LinkLost,
    /// All configs failed in all allowed passes.
    CampaignFailed,
}

/// Where the manager currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Idle,
    Attempting { config_index: usize },
    Connected { config_index: usize, address: Ipv4Addr },
    Backoff { pass: u32 },
    Failed,
}

/// Summary of an established link returned by `try_connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveLink {
    pub config_index: usize,
    pub address: Ipv4Addr,
}
