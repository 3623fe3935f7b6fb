// Battery status via starship-battery

use battery::units::ratio::percent;
use tracing::instrument;

use super::BatteryReader;
use crate::models::BatteryReading;

/// Reads the first battery the OS reports. A fresh `Manager` is opened per call so the
/// reader stays `Send + Sync` on every platform.
#[derive(Debug, Default)]
pub struct SystemBatteryReader;

impl SystemBatteryReader {
    pub fn new() -> Self {
        Self
    }

    fn read(&self) -> Result<Option<BatteryReading>, battery::Error> {
        let manager = battery::Manager::new()?;
        let Some(first) = manager.batteries()?.next() else {
            return Ok(None);
        };
        let bat = first?;
        let charge = bat.state_of_charge().get::<percent>();
        let is_charging = bat.state() == battery::State::Charging;
        Ok(Some(BatteryReading::new(charge.round() as i32, is_charging)))
    }
}

impl BatteryReader for SystemBatteryReader {
    #[instrument(skip(self), fields(reader = "battery", operation = "battery_status"))]
    fn battery_status(&self) -> BatteryReading {
        match self.read() {
            Ok(Some(reading)) => reading,
            Ok(None) => {
                tracing::trace!("no battery present; using defaults");
                BatteryReading::default()
            }
            Err(e) => {
                tracing::debug!(error = %e, "battery query failed; using defaults");
                BatteryReading::default()
            }
        }
    }
}
