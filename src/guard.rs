use log::{debug, warn};

/// The result of the network-origin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

/// Allow-list of remote addresses, checked before any authentication.
///
/// Addresses are matched as exact strings, there is no CIDR or hostname support.
/// Without an allow-list (or with an empty one) every address is allowed.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    allow_list: Option<Vec<String>>,
}

impl AccessGuard {
    pub fn new(allow_list: Option<Vec<String>>) -> Self {
        AccessGuard {
            allow_list: allow_list.filter(|list| !list.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.allow_list.is_some()
    }

    /// Check the remote address against the allow-list. A request without
    /// a remote address is always denied if there is an allow-list.
    pub fn check(&self, remote_address: Option<&str>) -> Access {
        let Some(allow_list) = &self.allow_list else {
            return Access::Allowed;
        };

        match remote_address {
            None => {
                warn!("Received a request with no IP address.");
                Access::Denied
            }
            Some(address) if allow_list.iter().any(|allowed| allowed == address) => {
                debug!("Address {address} is allowed.");
                Access::Allowed
            }
            Some(address) => {
                warn!("Received a request from an unauthorized IP address: {address}.");
                Access::Denied
            }
        }
    }
}
