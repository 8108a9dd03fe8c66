//! Simulated observation sources
//!
//! Fixed stand-ins for an SDR scanner and a MAC sniffer. Each poll returns
//! the same observations stamped with the poll time, which is enough to
//! drive the whole pipeline (incident files, officer histories, readings,
//! triangulation) without hardware.

use scanwatch_core::{IncidentRecord, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{ConnectorResult, ObservationSource};

/// A wireless device heard by the MAC scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacDetection {
    pub timestamp: Timestamp,
    pub mac: String,
    pub vendor: String,
    /// dBm
    pub signal_strength: f64,
    /// Metres, as reported by the scanner itself
    pub estimated_distance: f64,
    pub device_type: String,
}

/// Scanner that hears one traffic stop per poll
#[derive(Debug, Clone)]
pub struct SimulatedScanner {
    template: IncidentRecord,
    polls: u64,
}

impl Default for SimulatedScanner {
    fn default() -> Self {
        let mut template = IncidentRecord::new(Timestamp::default())
            .with_officer("123")
            .with_type("traffic_stop");
        template.frequency = Some("154.8000".to_string());
        template.channel = Some("Police Dispatch".to_string());
        template.transmission =
            Some("Unit 123 responding to traffic stop at Main St and 5th Ave".to_string());
        template.location = Some("Main St and 5th Ave".to_string());
        template.signal_strength = Some(-65.0);

        Self { template, polls: 0 }
    }
}

impl SimulatedScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay `template` instead of the built-in traffic stop
    pub fn with_template(template: IncidentRecord) -> Self {
        Self { template, polls: 0 }
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl ObservationSource for SimulatedScanner {
    type Observation = IncidentRecord;

    fn name(&self) -> &str {
        "simulated-scanner"
    }

    fn poll(&mut self, now: Timestamp) -> ConnectorResult<Vec<IncidentRecord>> {
        self.polls += 1;
        let mut incident = self.template.clone();
        incident.timestamp = now;
        Ok(vec![incident])
    }
}

/// A device the simulated MAC scanner keeps seeing
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedDevice {
    pub mac: String,
    pub vendor: String,
    pub signal_strength: f64,
    pub estimated_distance: f64,
    pub device_type: String,
}

impl SimulatedDevice {
    pub fn new(mac: &str, vendor: &str, signal_strength: f64, estimated_distance: f64, device_type: &str) -> Self {
        Self {
            mac: mac.to_string(),
            vendor: vendor.to_string(),
            signal_strength,
            estimated_distance,
            device_type: device_type.to_string(),
        }
    }
}

/// MAC scanner that sees a police radio and a police vehicle
#[derive(Debug, Clone)]
pub struct SimulatedMacScanner {
    devices: Vec<SimulatedDevice>,
}

impl Default for SimulatedMacScanner {
    fn default() -> Self {
        Self::with_devices(vec![
            SimulatedDevice::new("00:1A:2B:3C:4D:5E", "Motorola Solutions", -45.0, 50.0, "police_radio"),
            SimulatedDevice::new("AA:BB:CC:DD:EE:FF", "Panasonic", -60.0, 100.0, "police_vehicle"),
        ])
    }
}

impl SimulatedMacScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(devices: Vec<SimulatedDevice>) -> Self {
        Self { devices }
    }
}

impl ObservationSource for SimulatedMacScanner {
    type Observation = MacDetection;

    fn name(&self) -> &str {
        "simulated-mac-scanner"
    }

    fn poll(&mut self, now: Timestamp) -> ConnectorResult<Vec<MacDetection>> {
        Ok(self
            .devices
            .iter()
            .map(|d| MacDetection {
                timestamp: now,
                mac: d.mac.clone(),
                vendor: d.vendor.clone(),
                signal_strength: d.signal_strength,
                estimated_distance: d.estimated_distance,
                device_type: d.device_type.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn scanner_stamps_each_poll() {
        let mut scanner = SimulatedScanner::new();
        let t1 = Utc.with_ymd_and_hms(2024, 9, 15, 14, 30, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 9, 15, 14, 30, 5).unwrap();

        let first = scanner.poll(t1).unwrap();
        let second = scanner.poll(t2).unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].timestamp, t1);
        assert_eq!(second[0].timestamp, t2);
        assert_eq!(first[0].attributed_officer(), Some("123"));
        assert_eq!(first[0].incident_type.as_deref(), Some("traffic_stop"));
        assert_eq!(first[0].channel.as_deref(), Some("Police Dispatch"));
        assert!(first[0].incident_id.is_none());
        assert_eq!(scanner.polls(), 2);
    }

    #[test]
    fn mac_scanner_reports_both_devices() {
        let now = Utc.with_ymd_and_hms(2024, 9, 15, 14, 30, 0).unwrap();
        let detections = SimulatedMacScanner::new().poll(now).unwrap();

        let macs: Vec<_> = detections.iter().map(|d| d.mac.as_str()).collect();
        assert_eq!(macs, vec!["00:1A:2B:3C:4D:5E", "AA:BB:CC:DD:EE:FF"]);
        assert_eq!(detections[0].vendor, "Motorola Solutions");
        assert_eq!(detections[1].device_type, "police_vehicle");
        assert_eq!(detections[1].signal_strength, -60.0);
    }
}
