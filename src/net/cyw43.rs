//! [`Radio`] implementation over the CYW43 driver and the network stack.

use cyw43::{Control, JoinOptions, ScanOptions};
use embassy_net::{ConfigV4, Ipv4Cidr, Stack, StaticConfigV4};
use heapless::{String, Vec};

use crate::config::MAX_SCAN_RESULTS;
use crate::error::RejectReason;

use super::{InterfaceMode, LinkStatus, NetworkConfig, Radio, StaticAddress};

/// On-board Wi-Fi of the Pico W.
pub struct Cyw43Radio {
    control: Control<'static>,
    stack: Stack<'static>,
    /// Set between a successful join and the first teardown.
    associated: bool,
}

impl Cyw43Radio {
    pub fn new(control: Control<'static>, stack: Stack<'static>) -> Self {
        Cyw43Radio {
            control,
            stack,
            associated: false,
        }
    }
}

impl Radio for Cyw43Radio {
    async fn begin_association(
        &mut self,
        config: &NetworkConfig,
        mode: InterfaceMode,
    ) -> Result<(), RejectReason> {
        match mode {
            InterfaceMode::Station => {
                let options = if config.passphrase.is_empty() {
                    JoinOptions::new_open()
                } else {
                    JoinOptions::new(config.passphrase.as_bytes())
                };
                self.control
                    .join(config.ssid.as_str(), options)
                    .await
                    .map_err(|err| {
                        defmt::warn!("join failed, status {}", err.status);
                        // The firmware folds join failures into one
                        // status word; treat them all as association
                        // failures.
                        RejectReason::AssocFailed
                    })?;
            }
            InterfaceMode::AccessPoint => {
                self.control
                    .start_ap_wpa2(config.ssid.as_str(), config.passphrase.as_str(), 5)
                    .await;
            }
        }
        self.associated = true;
        Ok(())
    }

    fn poll_status(&mut self) -> LinkStatus {
        if self.stack.is_link_up() {
            if let Some(config) = self.stack.config_v4() {
                return LinkStatus::Connected(config.address.address());
            }
            // Associated, addressing still pending.
            return LinkStatus::Connecting;
        }
        if self.associated {
            LinkStatus::Connecting
        } else {
            LinkStatus::Disassociated
        }
    }

    async fn apply_static_address(&mut self, address: &StaticAddress) -> Result<(), ()> {
        let prefix_len = address.netmask.to_bits().count_ones() as u8;
        let mut dns_servers = Vec::new();
        // Capacity 3 per the stack; one resolver always fits.
        let _ = dns_servers.push(address.dns);
        self.stack.set_config_v4(ConfigV4::Static(StaticConfigV4 {
            address: Ipv4Cidr::new(address.address, prefix_len),
            gateway: (!address.gateway.is_unspecified()).then_some(address.gateway),
            dns_servers,
        }));
        Ok(())
    }

    async fn disassociate(&mut self) {
        if self.associated {
            self.control.leave().await;
            self.associated = false;
        }
    }

    async fn scan(&mut self) -> Vec<String<32>, MAX_SCAN_RESULTS> {
        let mut ssids: Vec<String<32>, MAX_SCAN_RESULTS> = Vec::new();
        let mut scanner = self.control.scan(ScanOptions::default()).await;
        while let Some(bss) = scanner.next().await {
            let len = usize::from(bss.ssid_len).min(bss.ssid.len());
            let Ok(ssid) = core::str::from_utf8(&bss.ssid[..len]) else {
                continue;
            };
            if ssid.is_empty() || ssids.iter().any(|s| s.as_str() == ssid) {
                continue;
            }
            let Ok(ssid) = String::try_from(ssid) else {
                continue;
            };
            if ssids.push(ssid).is_err() {
                break;
            }
        }
        ssids
    }
}
