use serde::{Deserialize, Serialize};

use super::SpecTable;

/// Everything read from one device page, before normalization.
///
/// Serialized verbatim as the raw audit record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSpecRecord {
    pub url: String,
    pub name: String,
    pub image: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub specs: SpecTable,
}

/// One row of the crawl ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "Device Name")]
    pub name: String,
    #[serde(rename = "URL")]
    pub url: String,
}

/// The fixed eight-section output schema.
///
/// Every section is a plain struct of strings so each label is always
/// present in the serialized record, empty when nothing was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSchemaRecord {
    #[serde(rename = "Camera")]
    pub camera: CameraSection,
    #[serde(rename = "Design")]
    pub design: DesignSection,
    #[serde(rename = "Battery")]
    pub battery: BatterySection,
    #[serde(rename = "Display")]
    pub display: DisplaySection,
    #[serde(rename = "Cellular")]
    pub cellular: CellularSection,
    #[serde(rename = "Hardware")]
    pub hardware: HardwareSection,
    #[serde(rename = "Multimedia")]
    pub multimedia: MultimediaSection,
    #[serde(rename = "Connectivity & Features")]
    pub connectivity: ConnectivitySection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSection {
    #[serde(rename = "Rear:")]
    pub rear: String,
    #[serde(rename = "Flash:")]
    pub flash: String,
    #[serde(rename = "Front:")]
    pub front: String,
    #[serde(rename = "Folded:")]
    pub folded: String,
    #[serde(rename = "Main camera:")]
    pub main_camera: String,
    #[serde(rename = "Second camera:")]
    pub second_camera: String,
    #[serde(rename = "Third camera:")]
    pub third_camera: String,
    #[serde(rename = "Specifications:")]
    pub specifications: String,
    #[serde(rename = "Video recording:")]
    pub video_recording: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSection {
    #[serde(rename = "Keys:")]
    pub keys: String,
    #[serde(rename = "Colors:")]
    pub colors: String,
    #[serde(rename = "Folded:")]
    pub folded: String,
    #[serde(rename = "Weight:")]
    pub weight: String,
    #[serde(rename = "Materials:")]
    pub materials: String,
    #[serde(rename = "Biometrics:")]
    pub biometrics: String,
    #[serde(rename = "Dimensions:")]
    pub dimensions: String,
    #[serde(rename = "Resistance:")]
    pub resistance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatterySection {
    #[serde(rename = "Type:")]
    pub battery_type: String,
    #[serde(rename = "Capacity:")]
    pub capacity: String,
    #[serde(rename = "Charging:")]
    pub charging: String,
    #[serde(rename = "Max charge speed:")]
    pub max_charge_speed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySection {
    #[serde(rename = "Size:")]
    pub size: String,
    #[serde(rename = "Features:")]
    pub features: String,
    #[serde(rename = "Resolution:")]
    pub resolution: String,
    #[serde(rename = "Technology:")]
    pub technology: String,
    #[serde(rename = "Refresh rate:")]
    pub refresh_rate: String,
    #[serde(rename = "Screen-to-body:")]
    pub screen_to_body: String,
    #[serde(rename = "Peak brightness:")]
    pub peak_brightness: String,
    #[serde(rename = "Front cover display:")]
    pub front_cover_display: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellularSection {
    #[serde(rename = "Technology:")]
    pub technology: String,
    #[serde(rename = "2G bands:")]
    pub bands_2g: String,
    #[serde(rename = "3G bands:")]
    pub bands_3g: String,
    #[serde(rename = "4G bands:")]
    pub bands_4g: String,
    #[serde(rename = "5G bands:")]
    pub bands_5g: String,
    #[serde(rename = "SIM type:")]
    pub sim_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSection {
    #[serde(rename = "OS:")]
    pub os: String,
    #[serde(rename = "GPU:")]
    pub gpu: String,
    #[serde(rename = "RAM:")]
    pub ram: String,
    #[serde(rename = "Processor:")]
    pub processor: String,
    #[serde(rename = "Device type:")]
    pub device_type: String,
    #[serde(rename = "Internal storage:")]
    pub internal_storage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultimediaSection {
    #[serde(rename = "Speakers:")]
    pub speakers: String,
    #[serde(rename = "Headphones:")]
    pub headphones: String,
    #[serde(rename = "Screen mirroring:")]
    pub screen_mirroring: String,
    #[serde(rename = "Additional microphone(s):")]
    pub additional_microphones: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivitySection {
    #[serde(rename = "USB:")]
    pub usb: String,
    #[serde(rename = "Other:")]
    pub other: String,
    #[serde(rename = "Wi-Fi:")]
    pub wifi: String,
    #[serde(rename = "Sensors:")]
    pub sensors: String,
    #[serde(rename = "Features:")]
    pub features: String,
    #[serde(rename = "Location:")]
    pub location: String,
    #[serde(rename = "Bluetooth:")]
    pub bluetooth: String,
}
