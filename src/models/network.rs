// Network connectivity models

use serde::Serialize;

/// Connectivity tier. Wireless tiers are ordered by signal strength; `Wired` stands apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ConnectionClass {
    None,
    Weak,
    Medium,
    Strong,
    Full,
    Wired,
}

impl ConnectionClass {
    /// Maps signal quality (0-100, clamped) onto the fixed 20-point bands.
    pub fn from_signal_quality(quality: u8) -> Self {
        match quality.min(100) {
            80.. => ConnectionClass::Full,
            60..=79 => ConnectionClass::Strong,
            40..=59 => ConnectionClass::Medium,
            20..=39 => ConnectionClass::Weak,
            _ => ConnectionClass::None,
        }
    }

    pub fn is_wireless(self) -> bool {
        matches!(
            self,
            ConnectionClass::Weak
                | ConnectionClass::Medium
                | ConnectionClass::Strong
                | ConnectionClass::Full
        )
    }
}

/// Current connectivity. `ssid` is empty unless `connection` is a wireless tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkReading {
    connection: ConnectionClass,
    ssid: String,
}

impl Default for NetworkReading {
    fn default() -> Self {
        Self::none()
    }
}

impl NetworkReading {
    pub fn none() -> Self {
        Self {
            connection: ConnectionClass::None,
            ssid: String::new(),
        }
    }

    pub fn wired() -> Self {
        Self {
            connection: ConnectionClass::Wired,
            ssid: String::new(),
        }
    }

    /// Associated wireless network. A quality below the weakest band yields `None`
    /// and drops the SSID.
    pub fn wireless(ssid: impl Into<String>, signal_quality: u8) -> Self {
        let connection = ConnectionClass::from_signal_quality(signal_quality);
        Self::with_class(ssid, connection)
    }

    /// Associated wireless network whose signal could not be measured.
    pub fn wireless_unmeasured(ssid: impl Into<String>) -> Self {
        Self::with_class(ssid, ConnectionClass::Medium)
    }

    fn with_class(ssid: impl Into<String>, connection: ConnectionClass) -> Self {
        if connection.is_wireless() {
            Self {
                connection,
                ssid: ssid.into(),
            }
        } else {
            Self::none()
        }
    }

    pub fn connection(&self) -> ConnectionClass {
        self.connection
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn display_name(&self) -> &str {
        match self.connection {
            ConnectionClass::None => "Not Connected",
            ConnectionClass::Wired => "Wired Connection",
            _ => &self.ssid,
        }
    }
}
