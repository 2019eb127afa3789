use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::stream::PskIdentity;
use crate::{error::ControlError, Result};

/// Supplies the bridge address and the streaming credentials.
///
/// Discovery and credential issuance happen elsewhere; implementations only
/// hand over what they already have.
pub trait BridgeDirectory: Send + Sync {
    fn resolve_address(&self) -> Result<IpAddr>;

    /// Username (PSK identity) and client key (PSK)
    fn session_identity(&self) -> Result<PskIdentity>;
}

#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HueConfig {
    pub bridge_ip: String,
    pub username: String,   // Used in REST paths and as the DTLS PSK identity
    pub client_key: String, // Hex-encoded DTLS PSK
    pub group_id: u32,      // Entertainment group to stream to
}

impl std::fmt::Debug for HueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HueConfig")
            .field("bridge_ip", &self.bridge_ip)
            .field("username", &"***REDACTED***")
            .field("client_key", &"***REDACTED***")
            .field("group_id", &self.group_id)
            .finish()
    }
}

impl BridgeDirectory for HueConfig {
    fn resolve_address(&self) -> Result<IpAddr> {
        if self.bridge_ip.is_empty() {
            return Err(ControlError::Configuration("Bridge IP is missing".to_string()));
        }
        self.bridge_ip.trim().parse().map_err(|e| {
            ControlError::Configuration(format!("Invalid bridge IP '{}': {}", self.bridge_ip, e))
        })
    }

    fn session_identity(&self) -> Result<PskIdentity> {
        if self.username.is_empty() {
            return Err(ControlError::Configuration("Bridge username is missing".to_string()));
        }
        let key = hex::decode(self.client_key.trim()).map_err(|e| {
            ControlError::Configuration(format!("Client key is not valid hex: {}", e))
        })?;
        if key.is_empty() {
            return Err(ControlError::Configuration("Client key is missing".to_string()));
        }
        Ok(PskIdentity {
            identity: self.username.clone(),
            key,
        })
    }
}
