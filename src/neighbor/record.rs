use super::*;

/// One adjacent device reported by CDP.
///
/// Built field by field while its block is parsed, then moved into the
/// parser's output. Only `device_id` is guaranteed to be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NeighborRecord {
    /// Value of the `Device ID:` line that opened the record.
    pub device_id: String,
    /// Entry address (`IPv4 Address:` or `IP address:`).
    pub ip_address: Option<String>,
    /// Always set together with `capabilities`.
    pub platform: Option<String>,
    pub capabilities: Option<String>,
    /// Local interface facing the neighbor.
    pub interface: Option<String>,
    /// Neighbor side of the link, `Port ID (outgoing port)`.
    pub port_id: Option<String>,
    /// First address listed under `Management address(es):`.
    pub management_address: Option<String>,
}

impl NeighborRecord {
    /// Creates a record holding only its device identifier.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Default::default()
        }
    }

    /// Stores platform and capabilities as a pair.
    pub fn set_platform(&mut self, platform: impl Into<String>, capabilities: impl Into<String>) {
        self.platform = Some(platform.into());
        self.capabilities = Some(capabilities.into());
    }

    /// Returns true if nothing beyond `device_id` was found.
    pub fn is_bare(&self) -> bool {
        self.ip_address.is_none()
            && self.platform.is_none()
            && self.interface.is_none()
            && self.port_id.is_none()
            && self.management_address.is_none()
    }
}
