use serde::{Deserialize, Serialize};

/// Site-specific normalization rules.
///
/// Fallback orders, suffix triggers and boilerplate text tied to the
/// catalog's current wording. Overridable from the `[normalization]`
/// config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationPolicy {
    pub version: String,

    /// MAIN CAMERA keys, richest module description first.
    pub rear_camera_keys: Vec<String>,
    /// SELFIE CAMERA keys.
    pub front_camera_keys: Vec<String>,
    /// BODY keys for the ingress-protection line. `"  "` is the NBSP label.
    pub resistance_keys: Vec<String>,

    pub non_removable_marker: String,
    pub non_removable_suffix: String,

    /// Card slot values (lowercase) meaning storage cannot be expanded.
    pub non_expandable_card_values: Vec<String>,
    pub non_expandable_suffix: String,
    pub storage_technology: String,

    pub dedicated_mic_marker: String,
    pub dedicated_mic_label: String,

    /// Checked in order; present tags are joined into `Other:`.
    pub other_features: Vec<FeatureTag>,
    /// Raw values (compared case-insensitively) that mean a feature is absent.
    pub absent_values: Vec<String>,

    /// Fixed text used when the page had any spec table at all.
    pub keys_text: String,
    pub device_type: String,
    pub screen_mirroring: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTag {
    pub category: String,
    pub key: String,
    pub label: String,
}

impl FeatureTag {
    fn new(category: &str, key: &str, label: &str) -> Self {
        Self {
            category: category.to_string(),
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self {
            version: "gsmarena-1".to_string(),
            rear_camera_keys: strings(&["Triple", "Quad", "Dual", "Single"]),
            front_camera_keys: strings(&["Single", "Dual"]),
            resistance_keys: strings(&["  ", ""]),
            non_removable_marker: "non-removable".to_string(),
            non_removable_suffix: "Not user replaceable".to_string(),
            non_expandable_card_values: strings(&["no", ""]),
            non_expandable_suffix: "not expandable".to_string(),
            storage_technology: "UFS".to_string(),
            dedicated_mic_marker: "dedicated mic".to_string(),
            dedicated_mic_label: "Noise cancellation".to_string(),
            other_features: vec![
                FeatureTag::new("COMMS", "NFC", "NFC"),
                FeatureTag::new("COMMS", "Infrared port", "Infrared"),
            ],
            absent_values: strings(&["no"]),
            keys_text: "Right: Volume control, Lock/Unlock key".to_string(),
            device_type: "Smartphone".to_string(),
            screen_mirroring: "Wireless screen share".to_string(),
        }
    }
}

impl NormalizationPolicy {
    /// True when the card slot text says storage is fixed.
    pub fn is_non_expandable(&self, card_slot: &str) -> bool {
        let card_slot = card_slot.trim().to_lowercase();
        self.non_expandable_card_values
            .iter()
            .any(|value| value.to_lowercase() == card_slot)
    }

    pub fn is_non_removable(&self, battery_type: &str) -> bool {
        battery_type
            .to_lowercase()
            .contains(&self.non_removable_marker.to_lowercase())
    }

    /// A feature counts as present when its value is non-empty and not one
    /// of the explicit "absent" answers.
    pub fn is_feature_present(&self, value: &str) -> bool {
        let value = value.trim();
        !value.is_empty()
            && !self
                .absent_values
                .iter()
                .any(|absent| absent.eq_ignore_ascii_case(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_slot_rules() {
        let policy = NormalizationPolicy::default();
        assert!(policy.is_non_expandable("No"));
        assert!(policy.is_non_expandable(""));
        assert!(!policy.is_non_expandable("microSDXC (dedicated slot)"));
    }

    #[test]
    fn test_feature_presence() {
        let policy = NormalizationPolicy::default();
        assert!(policy.is_feature_present("Yes"));
        assert!(policy.is_feature_present("Yes (market/region dependent)"));
        assert!(!policy.is_feature_present("No"));
        assert!(!policy.is_feature_present(""));
    }

    #[test]
    fn test_partial_override_from_toml() {
        let policy: NormalizationPolicy = toml::from_str(
            r#"
            version = "gsmarena-2"
            rear_camera_keys = ["Quad", "Triple", "Dual", "Single"]
            "#,
        )
        .unwrap();

        assert_eq!(policy.version, "gsmarena-2");
        assert_eq!(policy.rear_camera_keys[0], "Quad");
        assert_eq!(policy.front_camera_keys, vec!["Single", "Dual"]);
        assert_eq!(policy.other_features.len(), 2);
    }
}
