//! Error types shared across the crate.

/// Why an access point turned down an association attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RejectReason {
    /// The passphrase was refused during the 4-way handshake.
    WrongPassword,
    /// No access point with the requested SSID answered.
    NoApFound,
    /// Association was attempted but the AP refused it.
    AssocFailed,
    /// The AP answered but the handshake never completed.
    HandshakeTimeout,
    /// The radio reported a failure it could not classify.
    Internal,
}

/// Connectivity errors surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The attempt's time budget ran out before a link came up.
    Timeout,
    /// The access point actively rejected the attempt.
    Rejected(RejectReason),
    /// The link came up but the static address could not be applied.
    AddressApplyFailed,
    /// Every configured network failed in every allowed pass.
    ConfigExhausted,
}

impl From<RejectReason> for Error {
    fn from(reason: RejectReason) -> Self {
        Error::Rejected(reason)
    }
}
