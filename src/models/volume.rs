// Storage volume models

use serde::Serialize;

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Capacity of one mounted volume. `used + free == total` unless the entry is degraded,
/// in which case all three are zero and the label carries the error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeUsage {
    label: String,
    total_bytes: u64,
    used_bytes: u64,
    free_bytes: u64,
}

impl VolumeUsage {
    /// Successful read. Returns `None` when `free > total`; such a reading cannot satisfy
    /// the capacity invariant and must be reported as degraded instead.
    pub fn measured(label: impl Into<String>, total_bytes: u64, free_bytes: u64) -> Option<Self> {
        let used_bytes = total_bytes.checked_sub(free_bytes)?;
        Some(Self {
            label: label.into(),
            total_bytes,
            used_bytes,
            free_bytes,
        })
    }

    /// Failed read of a known volume: kept visible with zeroed numbers.
    pub fn degraded(label: &str, reason: &str) -> Self {
        Self {
            label: format!("{} (Error: {})", label, reason),
            total_bytes: 0,
            used_bytes: 0,
            free_bytes: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    pub fn free_bytes(&self) -> u64 {
        self.free_bytes
    }

    pub fn is_degraded(&self) -> bool {
        self.total_bytes == 0 && self.used_bytes == 0 && self.free_bytes == 0
    }

    pub fn used_percent(&self) -> f64 {
        if self.total_bytes > 0 {
            (self.used_bytes as f64 / self.total_bytes as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Sweep angle in degrees for ring gauges.
    pub fn used_percent_angle(&self) -> f64 {
        self.used_percent() * 3.6
    }

    pub fn used_percent_string(&self) -> String {
        format!("{:.2}%", self.used_percent())
    }

    pub fn total_string(&self) -> String {
        format_bytes(self.total_bytes)
    }

    pub fn used_string(&self) -> String {
        format_bytes(self.used_bytes)
    }

    pub fn free_string(&self) -> String {
        format_bytes(self.free_bytes)
    }
}

/// Formats a byte count with 1024 steps and two decimals, e.g. "1.50 GB".
pub fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut idx = 0;
    while size >= 1024.0 && idx < BYTE_UNITS.len() - 1 {
        size /= 1024.0;
        idx += 1;
    }
    format!("{:.2} {}", size, BYTE_UNITS[idx])
}
