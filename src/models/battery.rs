// Battery models

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ChargeLevel {
    Critical,
    Low,
    Medium,
    High,
}

impl ChargeLevel {
    pub fn from_percent(percent: u8) -> Self {
        if percent > 85 {
            ChargeLevel::High
        } else if percent > 40 {
            ChargeLevel::Medium
        } else if percent > 10 {
            ChargeLevel::Low
        } else {
            ChargeLevel::Critical
        }
    }
}

/// Instantaneous battery state. Hosts without a battery report the default (100 %, not charging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryReading {
    percent_charge: u8,
    is_charging: bool,
}

impl Default for BatteryReading {
    fn default() -> Self {
        Self {
            percent_charge: 100,
            is_charging: false,
        }
    }
}

impl BatteryReading {
    /// Platform values outside 0-100 (e.g. "unknown" sentinels) are clamped.
    pub fn new(percent_charge: i32, is_charging: bool) -> Self {
        Self {
            percent_charge: percent_charge.clamp(0, 100) as u8,
            is_charging,
        }
    }

    pub fn percent_charge(&self) -> u8 {
        self.percent_charge
    }

    pub fn is_charging(&self) -> bool {
        self.is_charging
    }

    pub fn charge_level(&self) -> ChargeLevel {
        ChargeLevel::from_percent(self.percent_charge)
    }

    pub fn percent_charge_string(&self) -> String {
        format!("{}%", self.percent_charge)
    }
}
