// Model tests: derived values, classification bands, display JSON shape

use homestatus::models::*;

#[test]
fn test_charge_level_thresholds() {
    assert_eq!(ChargeLevel::from_percent(100), ChargeLevel::High);
    assert_eq!(ChargeLevel::from_percent(86), ChargeLevel::High);
    assert_eq!(ChargeLevel::from_percent(85), ChargeLevel::Medium);
    assert_eq!(ChargeLevel::from_percent(41), ChargeLevel::Medium);
    assert_eq!(ChargeLevel::from_percent(40), ChargeLevel::Low);
    assert_eq!(ChargeLevel::from_percent(11), ChargeLevel::Low);
    assert_eq!(ChargeLevel::from_percent(10), ChargeLevel::Critical);
    assert_eq!(ChargeLevel::from_percent(0), ChargeLevel::Critical);
}

#[test]
fn test_battery_reading_clamps_out_of_range_percent() {
    assert_eq!(BatteryReading::new(255, false).percent_charge(), 100);
    assert_eq!(BatteryReading::new(-1, true).percent_charge(), 0);
    assert_eq!(BatteryReading::new(-1, true).charge_level(), ChargeLevel::Critical);
    assert_eq!(BatteryReading::new(42, true).percent_charge_string(), "42%");
}

#[test]
fn test_battery_default_is_full_and_not_charging() {
    let b = BatteryReading::default();
    assert_eq!(b.percent_charge(), 100);
    assert!(!b.is_charging());
    assert_eq!(b.charge_level(), ChargeLevel::High);
}

#[test]
fn test_signal_quality_bands() {
    let cases = [
        (0, ConnectionClass::None),
        (19, ConnectionClass::None),
        (20, ConnectionClass::Weak),
        (39, ConnectionClass::Weak),
        (40, ConnectionClass::Medium),
        (59, ConnectionClass::Medium),
        (60, ConnectionClass::Strong),
        (79, ConnectionClass::Strong),
        (80, ConnectionClass::Full),
        (100, ConnectionClass::Full),
        (200, ConnectionClass::Full),
    ];
    for (quality, expected) in cases {
        assert_eq!(
            ConnectionClass::from_signal_quality(quality),
            expected,
            "quality {}",
            quality
        );
    }
}

#[test]
fn test_network_display_names() {
    assert_eq!(NetworkReading::none().display_name(), "Not Connected");
    assert_eq!(NetworkReading::wired().display_name(), "Wired Connection");
    assert_eq!(NetworkReading::wireless("Cafe", 45).display_name(), "Cafe");
    assert_eq!(NetworkReading::default(), NetworkReading::none());
}

#[test]
fn test_ssid_only_kept_for_wireless_tiers() {
    let weak_signal = NetworkReading::wireless("Attic", 5);
    assert_eq!(weak_signal.connection(), ConnectionClass::None);
    assert_eq!(weak_signal.ssid(), "");

    let unmeasured = NetworkReading::wireless_unmeasured("Attic");
    assert_eq!(unmeasured.connection(), ConnectionClass::Medium);
    assert_eq!(unmeasured.ssid(), "Attic");

    assert_eq!(NetworkReading::wired().ssid(), "");
}

#[test]
fn test_volume_measured_keeps_capacity_invariant() {
    let v = VolumeUsage::measured("C:\\", 1000, 250).expect("valid capacity");
    assert_eq!(v.used_bytes(), 750);
    assert_eq!(v.used_bytes() + v.free_bytes(), v.total_bytes());
    assert!(!v.is_degraded());
    assert_eq!(v.used_percent_string(), "75.00%");
    assert!((v.used_percent_angle() - 270.0).abs() < 1e-9);

    assert!(VolumeUsage::measured("C:\\", 100, 101).is_none());
}

#[test]
fn test_degraded_volume_label_and_zeroes() {
    let v = VolumeUsage::degraded("E:\\", "The device is not ready");
    assert_eq!(v.label(), "E:\\ (Error: The device is not ready)");
    assert_eq!(v.total_bytes(), 0);
    assert_eq!(v.used_bytes(), 0);
    assert_eq!(v.free_bytes(), 0);
    assert!(v.is_degraded());
    assert_eq!(v.used_percent(), 0.0);
    assert_eq!(v.used_percent_string(), "0.00%");
}

#[test]
fn test_format_bytes() {
    assert_eq!(format_bytes(0), "0.00 B");
    assert_eq!(format_bytes(1023), "1023.00 B");
    assert_eq!(format_bytes(1024), "1.00 KB");
    assert_eq!(format_bytes(1536 * 1024 * 1024), "1.50 GB");
    assert_eq!(format_bytes(2 * 1024u64.pow(4)), "2.00 TB");
    assert_eq!(format_bytes(2048 * 1024u64.pow(4)), "2048.00 TB");
}

#[test]
fn test_snapshot_display_json_shape() {
    let snapshot = Snapshot {
        cycle: 7,
        sampled_at: 1_700_000_000_000,
        volumes: vec![VolumeUsage::measured("/", 4096, 1024).expect("valid capacity")],
        network: NetworkReading::wireless("HomeNet", 85),
        battery: BatteryReading::new(30, true),
        sources: SourceHealth {
            volumes: Health::Ok,
            network: Health::Degraded,
            battery: Health::Ok,
        },
    };
    let json = serde_json::to_value(SnapshotDisplay::from(&snapshot)).expect("serialize");

    assert_eq!(json["cycle"], 7);
    assert_eq!(json["sampledAt"], 1_700_000_000_000u64);
    assert_eq!(json["volumes"][0]["usedBytes"], 3072);
    assert_eq!(json["volumes"][0]["usedPercentString"], "75.00%");
    assert_eq!(json["volumes"][0]["totalString"], "4.00 KB");
    assert_eq!(json["network"]["connection"], "Full");
    assert_eq!(json["network"]["displayName"], "HomeNet");
    assert_eq!(json["battery"]["percentChargeString"], "30%");
    assert_eq!(json["battery"]["chargeLevel"], "Low");
    assert_eq!(json["battery"]["isCharging"], true);
    assert_eq!(json["sources"]["network"], "degraded");
}
