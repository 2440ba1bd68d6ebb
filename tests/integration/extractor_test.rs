use sensor_bridge::core::sensor_monitor::{
    extract_all, ExtractOptions, FanReading, HardwareType, SensorKind, SensorNode, StorageTemp,
    VoltageReading,
};

fn desktop() -> Vec<SensorNode> {
    vec![
        SensorNode::new(HardwareType::Cpu, "AMD Ryzen 7 7800X3D")
            .with_sensor(SensorKind::Temperature, "Core (Tctl/Tdie)", Some(71.5))
            .with_sensor(SensorKind::Power, "Package", Some(88.2))
            .with_sensor(SensorKind::Power, "Core #1 (SMU)", Some(9.0))
            .with_sensor(SensorKind::Clock, "Core #1", Some(4800.0))
            .with_sensor(SensorKind::Clock, "Core #2", Some(4600.0))
            .with_sensor(SensorKind::Clock, "Bus Speed", Some(100.0))
            .with_sensor(SensorKind::Load, "CPU Total", Some(26.0))
            .with_sensor(SensorKind::Load, "CPU Core #1", Some(12.0))
            .with_sensor(SensorKind::Load, "CPU Core #2", Some(40.0)),
        SensorNode::new(HardwareType::Motherboard, "ASUS TUF GAMING B650").with_child(
            SensorNode::new(HardwareType::SuperIo, "Nuvoton NCT6799D")
                .with_sensor(SensorKind::Temperature, "Motherboard", Some(34.0))
                .with_sensor(SensorKind::Temperature, "System", Some(36.0))
                .with_sensor(SensorKind::Temperature, "CPUTIN", Some(45.0))
                .with_sensor(SensorKind::Temperature, "VRM MOS", Some(60.0))
                .with_sensor(SensorKind::Fan, "CPU Fan", Some(1200.0))
                .with_sensor(SensorKind::Fan, "Chassis Fan #1", Some(800.0))
                .with_sensor(SensorKind::Control, "CPU Fan", Some(45.0))
                .with_sensor(SensorKind::Voltage, "Vcore", Some(1.2))
                .with_sensor(SensorKind::Voltage, "+12V", Some(12.1))
                .with_sensor(SensorKind::Voltage, "Vcore", Some(1.25))
                .with_sensor(SensorKind::Voltage, "VBAT", Some(0.0)),
        ),
        SensorNode::new(HardwareType::GpuNvidia, "NVIDIA GeForce RTX 4070")
            .with_sensor(SensorKind::Temperature, "GPU Core", Some(55.0))
            .with_sensor(SensorKind::Load, "GPU Core", Some(30.0))
            .with_sensor(SensorKind::Clock, "GPU Core", Some(2500.0))
            .with_sensor(SensorKind::Power, "GPU Package", Some(120.0)),
        SensorNode::new(HardwareType::GpuIntel, "Intel UHD Graphics")
            .with_sensor(SensorKind::Temperature, "GPU Core", None),
        SensorNode::new(HardwareType::Storage, "Samsung SSD 990 PRO")
            .with_sensor(SensorKind::Temperature, "Composite Temperature", Some(40.0))
            .with_sensor(SensorKind::Temperature, "Temperature 2", Some(52.0)),
        SensorNode::new(HardwareType::Storage, "Samsung SSD 990 PRO")
            .with_sensor(SensorKind::Temperature, "Composite Temperature", Some(38.0)),
    ]
}

#[test]
fn test_desktop_tree_extracts_every_family() {
    let metrics = extract_all(&desktop(), &ExtractOptions::default());

    assert_eq!(metrics.cpu_temp_c, Some(71.5));
    assert_eq!(metrics.mobo_temp_c, Some(35.0));

    assert_eq!(
        metrics.fans,
        vec![
            FanReading {
                name: Some("CPU Fan".to_string()),
                rpm: Some(1200),
                pct: Some(45),
            },
            FanReading {
                name: Some("Chassis Fan #1".to_string()),
                rpm: Some(800),
                pct: None,
            },
        ]
    );
    assert_eq!(metrics.fans_raw.len(), 3);

    assert_eq!(
        metrics.mobo_voltages,
        vec![
            VoltageReading {
                name: Some("Vcore".to_string()),
                volts: 1.25,
            },
            VoltageReading {
                name: Some("+12V".to_string()),
                volts: 12.1,
            },
        ]
    );

    assert_eq!(
        metrics.storage_temps,
        vec![
            StorageTemp {
                name: "Samsung SSD 990 PRO Composite".to_string(),
                temp_c: 40.0,
            },
            StorageTemp {
                name: "Samsung SSD 990 PRO Flash".to_string(),
                temp_c: 52.0,
            },
            StorageTemp {
                name: "Samsung SSD 990 PRO Composite".to_string(),
                temp_c: 38.0,
            },
        ]
    );

    // The Intel GPU has no values and is dropped.
    assert_eq!(metrics.gpus.len(), 1);
    let gpu = &metrics.gpus[0];
    assert_eq!(gpu.name.as_deref(), Some("NVIDIA GeForce RTX 4070"));
    assert_eq!(gpu.temp_c, Some(55.0));
    assert_eq!(gpu.load_pct, Some(30.0));
    assert_eq!(gpu.core_mhz, Some(2500.0));
    assert_eq!(gpu.power_w, Some(120.0));

    assert_eq!(metrics.cpu_package.pkg_power_w, Some(88.2));
    assert_eq!(metrics.cpu_package.avg_freq_mhz, Some(4700.0));
    assert_eq!(metrics.cpu_package.throttle_active, None);

    assert_eq!(metrics.per_core.loads_pct, vec![Some(12.0), Some(40.0)]);
    assert_eq!(metrics.per_core.clocks_mhz, vec![Some(4800.0), Some(4600.0)]);
    assert_eq!(metrics.per_core.temps_c, vec![None, None]);

    assert!(metrics.flags.has_temp && metrics.flags.has_temp_value);
    assert!(metrics.flags.has_fan && metrics.flags.has_fan_value);
    assert!(metrics.has_any_value());
}

#[test]
fn test_throttle_default_false_only_fills_the_gap() {
    let options = ExtractOptions {
        throttle_default_false: true,
    };
    let metrics = extract_all(&desktop(), &options);
    assert_eq!(metrics.cpu_package.throttle_active, Some(false));
    assert!(metrics.cpu_package.throttle_reasons.is_empty());

    let throttled = vec![SensorNode::new(HardwareType::Cpu, "Intel Core i7-12700H")
        .with_sensor(SensorKind::Power, "CPU Package", Some(45.0))
        .with_sensor(SensorKind::Power, "Package Power Limit", Some(1.0))
        .with_sensor(SensorKind::Factor, "Thermal Throttling", Some(0.0))];
    let metrics = extract_all(&throttled, &options);
    assert_eq!(metrics.cpu_package.throttle_active, Some(true));
    assert_eq!(
        metrics.cpu_package.throttle_reasons,
        vec!["Package Power Limit".to_string()]
    );
}

#[test]
fn test_implausible_readings_are_dropped_not_clamped() {
    let roots = vec![
        SensorNode::new(HardwareType::Cpu, "cpu")
            .with_sensor(SensorKind::Temperature, "CPU Package", Some(255.0))
            .with_sensor(SensorKind::Temperature, "Core #1", Some(-128.0))
            .with_sensor(SensorKind::Power, "Package", Some(5000.0)),
        SensorNode::new(HardwareType::EmbeddedController, "EC")
            .with_sensor(SensorKind::Fan, "Fan #1", Some(65_535.0))
            .with_sensor(SensorKind::Control, "Control #1", Some(180.0)),
    ];

    let metrics = extract_all(&roots, &ExtractOptions::default());

    assert_eq!(metrics.cpu_temp_c, None);
    assert_eq!(metrics.cpu_package.pkg_power_w, None);
    assert!(metrics.fans.is_empty());
    assert!(metrics.per_core.temps_c.is_empty());
    // Sensors exist and report numbers, even though none is usable.
    assert!(metrics.flags.has_temp_value);
    assert!(metrics.flags.has_fan_value);
}

#[test]
fn test_empty_tree_has_no_values() {
    let metrics = extract_all(&[], &ExtractOptions::default());
    assert!(!metrics.has_any_value());
    assert!(metrics.gpus.is_empty());
    assert_eq!(metrics.per_core.core_count(), 0);
}
