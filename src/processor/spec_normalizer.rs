use anyhow::Result;

use crate::models::{
    BatterySection, CameraSection, CellularSection, ConnectivitySection, DesignSection,
    DisplaySection, FixedSchemaRecord, HardwareSection, MultimediaSection, RawSpecRecord,
    SpecTable,
};

use super::patterns::SpecPatterns;
use super::policy::NormalizationPolicy;

/// Maps a raw spec table onto the fixed eight-section schema.
///
/// Sections are computed independently from the raw table; none reads
/// another section's output. Nothing here fails on missing or odd input:
/// every gap becomes an empty string.
pub struct SpecNormalizer {
    policy: NormalizationPolicy,
    patterns: SpecPatterns,
}

impl SpecNormalizer {
    pub fn new(policy: NormalizationPolicy) -> Result<Self> {
        Ok(Self {
            policy,
            patterns: SpecPatterns::new()?,
        })
    }

    pub fn policy(&self) -> &NormalizationPolicy {
        &self.policy
    }

    pub fn normalize(&self, record: &RawSpecRecord) -> FixedSchemaRecord {
        let specs = &record.specs;
        FixedSchemaRecord {
            camera: self.camera(specs),
            design: self.design(specs),
            battery: self.battery(specs),
            display: self.display(specs),
            cellular: self.cellular(specs),
            hardware: self.hardware(specs),
            multimedia: self.multimedia(specs),
            connectivity: self.connectivity(specs),
        }
    }

    // Fixed text is only emitted for pages that had a spec table.
    fn boilerplate(&self, specs: &SpecTable, text: &str) -> String {
        if specs.is_empty() {
            String::new()
        } else {
            text.to_string()
        }
    }

    fn camera(&self, specs: &SpecTable) -> CameraSection {
        let mut section = CameraSection {
            flash: specs.get("MAIN CAMERA", "Features").to_string(),
            front: specs
                .first_non_empty("SELFIE CAMERA", &self.policy.front_camera_keys)
                .to_string(),
            video_recording: specs.get("MAIN CAMERA", "Video").to_string(),
            ..Default::default()
        };

        let block = specs.first_non_empty("MAIN CAMERA", &self.policy.rear_camera_keys);
        if block.is_empty() {
            return section;
        }

        let lines: Vec<&str> = block.split('\n').collect();
        section.rear = lines[0].to_string();

        let module = |index: usize| {
            lines
                .get(index)
                .map(|line| line.trim().to_string())
                .unwrap_or_default()
        };
        section.main_camera = module(0);
        section.second_camera = module(1);
        section.third_camera = module(2);

        let headline = &section.main_camera;
        let mut facts = Vec::new();
        if let Some(aperture) = self.patterns.aperture(headline) {
            facts.push(format!("Aperture size: {}", aperture));
        }
        if let Some(focal_length) = self.patterns.focal_length(headline) {
            facts.push(format!("Focal Length: {}", focal_length));
        }
        section.specifications = facts.join(" ");

        section
    }

    fn design(&self, specs: &SpecTable) -> DesignSection {
        DesignSection {
            keys: self.boilerplate(specs, &self.policy.keys_text),
            colors: specs.get("MISC", "Colors").to_string(),
            folded: specs.get("BODY", "Folded").to_string(),
            weight: specs.get("BODY", "Weight").to_string(),
            materials: specs.get("BODY", "Build").to_string(),
            biometrics: specs.get("FEATURES", "Sensors").to_string(),
            dimensions: specs.get("BODY", "Dimensions").to_string(),
            resistance: specs
                .first_non_empty("BODY", &self.policy.resistance_keys)
                .to_string(),
        }
    }

    fn battery(&self, specs: &SpecTable) -> BatterySection {
        let raw_type = specs.get("BATTERY", "Type");
        let charging = specs.get("BATTERY", "Charging");

        let capacity = self.patterns.battery_capacity(raw_type).unwrap_or_default();
        let type_info = if capacity.is_empty() {
            raw_type.trim().to_string()
        } else {
            tidy_list(&raw_type.replace(&capacity, ""))
        };

        let battery_type = if self.policy.is_non_removable(&type_info) {
            format!("{}, {}", type_info, self.policy.non_removable_suffix)
        } else {
            type_info
        };

        let speeds = self.patterns.charging_speeds(charging);
        let mut max_speed = Vec::new();
        if let Some(wired) = speeds.wired {
            max_speed.push(format!("Wired: {}", wired));
        }
        if let Some(wireless) = speeds.wireless {
            max_speed.push(format!("Wireless: {}", wireless));
        }

        BatterySection {
            battery_type,
            capacity,
            charging: charging.to_string(),
            max_charge_speed: max_speed.join(", "),
        }
    }

    fn display(&self, specs: &SpecTable) -> DisplaySection {
        let size = specs.get("DISPLAY", "Size");
        let panel = specs.get("DISPLAY", "Type");

        DisplaySection {
            size: first_clause(size).trim().to_string(),
            features: specs.get("FEATURES", "Sensors").to_string(),
            resolution: specs.get("DISPLAY", "Resolution").to_string(),
            technology: first_clause(panel).to_string(),
            refresh_rate: self.patterns.refresh_rate(panel).unwrap_or_default(),
            screen_to_body: self.patterns.screen_to_body(size).unwrap_or_default(),
            peak_brightness: self.patterns.peak_brightness(panel).unwrap_or_default(),
            front_cover_display: specs.get("DISPLAY", "Secondary display").to_string(),
        }
    }

    fn cellular(&self, specs: &SpecTable) -> CellularSection {
        CellularSection {
            technology: specs.get("NETWORK", "Technology").to_string(),
            bands_2g: specs.get("NETWORK", "2G bands").to_string(),
            bands_3g: specs.get("NETWORK", "3G bands").to_string(),
            bands_4g: specs.get("NETWORK", "4G bands").to_string(),
            bands_5g: specs.get("NETWORK", "5G bands").to_string(),
            sim_type: specs.get("BODY", "SIM").to_string(),
        }
    }

    fn hardware(&self, specs: &SpecTable) -> HardwareSection {
        let memory = self.patterns.storage_ram(specs.get("MEMORY", "Internal"));

        let internal_storage = if memory.storage.is_empty() {
            String::new()
        } else if self.policy.is_non_expandable(specs.get("MEMORY", "Card slot")) {
            format!(
                "{} ({}), {}",
                memory.storage, self.policy.storage_technology, self.policy.non_expandable_suffix
            )
        } else {
            format!("{} ({})", memory.storage, self.policy.storage_technology)
        };

        HardwareSection {
            os: specs.get("PLATFORM", "OS").to_string(),
            gpu: specs.get("PLATFORM", "GPU").to_string(),
            ram: memory.ram,
            processor: specs.get("PLATFORM", "Chipset").to_string(),
            device_type: self.boilerplate(specs, &self.policy.device_type),
            internal_storage,
        }
    }

    fn multimedia(&self, specs: &SpecTable) -> MultimediaSection {
        let sound_note = specs.get("SOUND", "  ").to_lowercase();
        let additional_microphones =
            if sound_note.contains(&self.policy.dedicated_mic_marker.to_lowercase()) {
                self.policy.dedicated_mic_label.clone()
            } else {
                String::new()
            };

        MultimediaSection {
            speakers: specs.get("SOUND", "Loudspeaker").to_string(),
            headphones: specs.get("SOUND", "3.5mm jack").to_string(),
            screen_mirroring: self.boilerplate(specs, &self.policy.screen_mirroring),
            additional_microphones,
        }
    }

    fn connectivity(&self, specs: &SpecTable) -> ConnectivitySection {
        let other: Vec<&str> = self
            .policy
            .other_features
            .iter()
            .filter(|tag| self.policy.is_feature_present(specs.get(&tag.category, &tag.key)))
            .map(|tag| tag.label.as_str())
            .collect();

        ConnectivitySection {
            usb: specs.get("COMMS", "USB").to_string(),
            other: other.join(", "),
            wifi: specs.get("COMMS", "WLAN").to_string(),
            sensors: specs.get("FEATURES", "Sensors").to_string(),
            features: specs.get("COMMS", "USB").to_string(),
            location: specs.get("COMMS", "Positioning").to_string(),
            bluetooth: specs.get("COMMS", "Bluetooth").to_string(),
        }
    }
}

/// Text up to the first comma.
fn first_clause(text: &str) -> &str {
    text.split(',').next().unwrap_or("")
}

/// Re-join comma separated parts, dropping the empty ones left behind after
/// cutting a value out of the middle of a list.
fn tidy_list(text: &str) -> String {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CONTINUATION_LABEL;
    use serde_json::Value;

    fn normalizer() -> SpecNormalizer {
        SpecNormalizer::new(NormalizationPolicy::default()).unwrap()
    }

    fn record(rows: &[(&str, &str, &str)]) -> RawSpecRecord {
        RawSpecRecord {
            url: "https://www.gsmarena.com/acme_x1-13000.php".to_string(),
            name: "Acme X1".to_string(),
            image: None,
            highlights: Vec::new(),
            specs: rows.iter().copied().collect(),
        }
    }

    fn full_record() -> RawSpecRecord {
        record(&[
            ("NETWORK", "Technology", "GSM / HSPA / LTE / 5G"),
            ("NETWORK", "2G bands", "GSM 850 / 900 / 1800 / 1900"),
            ("NETWORK", "5G bands", "1, 3, 5, 7, 8, 28, 78 SA/NSA"),
            ("BODY", "Dimensions", "162.3 x 75.6 x 8.2 mm"),
            ("BODY", "Weight", "205 g (7.23 oz)"),
            ("BODY", "Build", "Glass front, aluminum frame"),
            ("BODY", "SIM", "Nano-SIM + eSIM"),
            ("BODY", CONTINUATION_LABEL, "IP68 dust/water resistant (up to 1.5m for 30 min)"),
            ("DISPLAY", "Type", "AMOLED, 1B colors, 120Hz, 1200 nits (peak)"),
            ("DISPLAY", "Size", "6.67 inches, 107.4 cm2 (~89.5% screen-to-body ratio)"),
            ("DISPLAY", "Resolution", "1220 x 2712 pixels (~446 ppi density)"),
            ("PLATFORM", "OS", "Android 15"),
            ("PLATFORM", "Chipset", "Snapdragon 8 Elite (3 nm)"),
            ("PLATFORM", "GPU", "Adreno 830"),
            ("MEMORY", "Card slot", "No"),
            ("MEMORY", "Internal", "256GB 12GB RAM, 512GB 16GB RAM"),
            (
                "MAIN CAMERA",
                "Triple",
                "50 MP, f/1.7, 23mm (wide), PDAF, OIS\n50 MP, f/2.0, 70mm (telephoto)\n12 MP, f/2.2, 15mm, 120˚ (ultrawide)",
            ),
            ("MAIN CAMERA", "Features", "LED flash, HDR, panorama"),
            ("MAIN CAMERA", "Video", "8K@24fps, 4K@30/60fps"),
            ("SELFIE CAMERA", "Single", "32 MP, f/2.0, 22mm (wide)"),
            ("SOUND", "Loudspeaker", "Yes, with stereo speakers"),
            ("SOUND", "3.5mm jack", "No"),
            ("SOUND", CONTINUATION_LABEL, "24-bit/192kHz Hi-Res audio, dedicated mic for noise cancellation"),
            ("COMMS", "WLAN", "Wi-Fi 802.11 a/b/g/n/ac/6e/7"),
            ("COMMS", "Bluetooth", "5.4, A2DP, LE"),
            ("COMMS", "Positioning", "GPS, GLONASS, GALILEO"),
            ("COMMS", "NFC", "Yes"),
            ("COMMS", "Infrared port", "Yes"),
            ("COMMS", "USB", "USB Type-C 3.2, OTG"),
            ("FEATURES", "Sensors", "Fingerprint (under display, ultrasonic), accelerometer"),
            ("BATTERY", "Type", "Si/C Li-Ion 5000 mAh, non-removable"),
            ("BATTERY", "Charging", "90W wired, 50W wireless, 10W reverse wireless"),
            ("MISC", "Colors", "Black, White, Green"),
        ])
    }

    #[test]
    fn test_empty_specs_give_all_empty_fields() {
        let normalized = normalizer().normalize(&record(&[]));
        let json = serde_json::to_value(&normalized).unwrap();

        for (section, fields) in json.as_object().unwrap() {
            for (label, value) in fields.as_object().unwrap() {
                assert_eq!(value, &Value::String(String::new()), "{section} {label}");
            }
        }
        assert_eq!(normalized, FixedSchemaRecord::default());
    }

    #[test]
    fn test_dual_camera_wins_over_single() {
        let normalized = normalizer().normalize(&record(&[
            ("MAIN CAMERA", "Single", "12 MP, f/2.4"),
            ("MAIN CAMERA", "Dual", "50 MP, f/1.8, 26mm (wide)\n8 MP, f/2.2 (ultrawide)"),
        ]));

        let camera = normalized.camera;
        assert_eq!(camera.rear, "50 MP, f/1.8, 26mm (wide)");
        assert_eq!(camera.main_camera, "50 MP, f/1.8, 26mm (wide)");
        assert_eq!(camera.second_camera, "8 MP, f/2.2 (ultrawide)");
        assert_eq!(camera.third_camera, "");
        assert_eq!(camera.specifications, "Aperture size: F/1.8 Focal Length: 26mm");
    }

    #[test]
    fn test_empty_higher_priority_camera_is_skipped() {
        let normalized = normalizer().normalize(&record(&[
            ("MAIN CAMERA", "Triple", ""),
            ("MAIN CAMERA", "Single", "48 MP, f/1.9"),
        ]));
        assert_eq!(normalized.camera.main_camera, "48 MP, f/1.9");
        assert_eq!(normalized.camera.specifications, "Aperture size: F/1.9");
    }

    #[test]
    fn test_full_record() {
        let normalized = normalizer().normalize(&full_record());

        let camera = &normalized.camera;
        assert_eq!(camera.third_camera, "12 MP, f/2.2, 15mm, 120˚ (ultrawide)");
        assert_eq!(camera.front, "32 MP, f/2.0, 22mm (wide)");
        assert_eq!(camera.flash, "LED flash, HDR, panorama");
        assert_eq!(camera.folded, "");

        let design = &normalized.design;
        assert_eq!(design.resistance, "IP68 dust/water resistant (up to 1.5m for 30 min)");
        assert_eq!(design.keys, "Right: Volume control, Lock/Unlock key");

        let battery = &normalized.battery;
        assert_eq!(battery.capacity, "5000 mAh");
        assert_eq!(battery.battery_type, "Si/C Li-Ion, non-removable, Not user replaceable");
        assert_eq!(battery.max_charge_speed, "Wired: 90W, Wireless: 50W");

        let display = &normalized.display;
        assert_eq!(display.size, "6.67 inches");
        assert_eq!(display.technology, "AMOLED");
        assert_eq!(display.refresh_rate, "120Hz");
        assert_eq!(display.screen_to_body, "89.5 %");
        assert_eq!(display.peak_brightness, "1200 cd/m2 (nit)");
        assert_eq!(display.front_cover_display, "");

        assert_eq!(normalized.cellular.sim_type, "Nano-SIM + eSIM");
        assert_eq!(normalized.cellular.bands_3g, "");

        let hardware = &normalized.hardware;
        assert_eq!(hardware.ram, "12GB");
        assert_eq!(hardware.internal_storage, "256GB (UFS), not expandable");
        assert_eq!(hardware.device_type, "Smartphone");

        assert_eq!(normalized.multimedia.additional_microphones, "Noise cancellation");
        assert_eq!(normalized.connectivity.other, "NFC, Infrared");
        assert_eq!(normalized.connectivity.features, "USB Type-C 3.2, OTG");
    }

    #[test]
    fn test_battery_scenario() {
        let normalized = normalizer().normalize(&record(&[(
            "BATTERY",
            "Type",
            "Li-Ion 5000 mAh, non-removable",
        )]));
        assert_eq!(normalized.battery.capacity, "5000 mAh");
        assert!(normalized.battery.battery_type.contains("Not user replaceable"));
        assert_eq!(normalized.battery.max_charge_speed, "");
    }

    #[test]
    fn test_removable_battery_has_no_suffix() {
        let normalized = normalizer().normalize(&record(&[("BATTERY", "Type", "Li-Po 4000 mAh, removable")]));
        assert_eq!(normalized.battery.battery_type, "Li-Po, removable");
    }

    #[test]
    fn test_display_scenario() {
        let normalized = normalizer().normalize(&record(&[(
            "DISPLAY",
            "Type",
            "AMOLED, 120Hz, 1200 nits (peak)",
        )]));
        assert_eq!(normalized.display.refresh_rate, "120Hz");
        assert_eq!(normalized.display.peak_brightness, "1200 cd/m2 (nit)");
        assert_eq!(normalized.display.technology, "AMOLED");
    }

    #[test]
    fn test_memory_scenario() {
        let normalized = normalizer().normalize(&record(&[
            ("MEMORY", "Internal", "256GB 12GB RAM"),
            ("MEMORY", "Card slot", "No"),
        ]));
        assert_eq!(normalized.hardware.ram, "12GB");
        assert_eq!(normalized.hardware.internal_storage, "256GB (UFS), not expandable");
    }

    #[test]
    fn test_expandable_storage() {
        let normalized = normalizer().normalize(&record(&[
            ("MEMORY", "Internal", "128GB 6GB RAM"),
            ("MEMORY", "Card slot", "microSDXC (dedicated slot)"),
        ]));
        assert_eq!(normalized.hardware.internal_storage, "128GB (UFS)");
    }

    #[test]
    fn test_absent_features_are_left_out() {
        let normalized = normalizer().normalize(&record(&[
            ("COMMS", "NFC", "No"),
            ("COMMS", "Infrared port", "Yes"),
        ]));
        assert_eq!(normalized.connectivity.other, "Infrared");
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let n = normalizer();
        let raw = full_record();
        let first = serde_json::to_string_pretty(&n.normalize(&raw)).unwrap();
        let second = serde_json::to_string_pretty(&n.normalize(&raw)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_policy_override_changes_chain() {
        let mut policy = NormalizationPolicy::default();
        policy.rear_camera_keys = vec!["Single".to_string(), "Dual".to_string()];
        let n = SpecNormalizer::new(policy).unwrap();

        let normalized = n.normalize(&record(&[
            ("MAIN CAMERA", "Single", "12 MP, f/2.4"),
            ("MAIN CAMERA", "Dual", "50 MP, f/1.8"),
        ]));
        assert_eq!(normalized.camera.main_camera, "12 MP, f/2.4");
    }
}
