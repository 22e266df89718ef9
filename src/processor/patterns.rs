use anyhow::Result;
use regex::Regex;

/// Wired/wireless charging speeds pulled from one charging description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargeSpeeds {
    pub wired: Option<String>,
    pub wireless: Option<String>,
}

/// Storage and RAM sizes found in a memory description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageRam {
    pub storage: String,
    pub ram: String,
}

/// Compiled sub-extraction patterns, one per fact.
///
/// Each method is optional by construction: a miss is `None` or an empty
/// string, never an error.
pub struct SpecPatterns {
    aperture: Regex,
    focal_length: Regex,
    refresh_rate: Regex,
    screen_to_body: Regex,
    peak_brightness: Regex,
    battery_capacity: Regex,
    wired_charging: Regex,
    wireless_charging: Regex,
    storage_ram_pair: Regex,
    storage: Regex,
    ram: Regex,
}

impl SpecPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            aperture: Regex::new(r"(?i)f/\d+(?:\.\d+)?")?,
            focal_length: Regex::new(r"(?i)\d+\s*mm")?,
            refresh_rate: Regex::new(r"(?i)(\d+)\s*Hz")?,
            screen_to_body: Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*%\s*screen-to-body ratio")?,
            peak_brightness: Regex::new(r"(?i)(\d+)\s*nits\s*\(peak\)")?,
            battery_capacity: Regex::new(r"(?i)\d+\s*mAh")?,
            wired_charging: Regex::new(r"(?i)(\d+(?:\.\d+)?W)\s+wired")?,
            wireless_charging: Regex::new(r"(?i)(\d+(?:\.\d+)?W)\s+wireless")?,
            storage_ram_pair: Regex::new(r"(\d+\s*(?:GB|TB))\s+(\d+\s*GB)\s+RAM")?,
            storage: Regex::new(r"\d+\s*(?:GB|TB)")?,
            ram: Regex::new(r"(\d+\s*GB)\s+RAM")?,
        })
    }

    /// `f/1.8` -> `F/1.8`.
    pub fn aperture(&self, text: &str) -> Option<String> {
        self.aperture.find(text).map(|m| m.as_str().to_uppercase())
    }

    pub fn focal_length(&self, text: &str) -> Option<String> {
        self.focal_length.find(text).map(|m| m.as_str().to_string())
    }

    /// `AMOLED, 120Hz, HDR10+` -> `120Hz`.
    pub fn refresh_rate(&self, text: &str) -> Option<String> {
        self.refresh_rate
            .captures(text)
            .map(|caps| format!("{}Hz", &caps[1]))
    }

    /// `6.7 inches (~89.5% screen-to-body ratio)` -> `89.5 %`.
    pub fn screen_to_body(&self, text: &str) -> Option<String> {
        self.screen_to_body
            .captures(text)
            .map(|caps| format!("{} %", &caps[1]))
    }

    /// `1200 nits (peak)` -> `1200 cd/m2 (nit)`.
    pub fn peak_brightness(&self, text: &str) -> Option<String> {
        self.peak_brightness
            .captures(text)
            .map(|caps| format!("{} cd/m2 (nit)", &caps[1]))
    }

    /// Matched capacity exactly as written, e.g. `5000 mAh`.
    pub fn battery_capacity(&self, text: &str) -> Option<String> {
        self.battery_capacity
            .find(text)
            .map(|m| m.as_str().trim().to_string())
    }

    pub fn charging_speeds(&self, text: &str) -> ChargeSpeeds {
        ChargeSpeeds {
            wired: self
                .wired_charging
                .captures(text)
                .map(|caps| caps[1].to_string()),
            wireless: self
                .wireless_charging
                .captures(text)
                .map(|caps| caps[1].to_string()),
        }
    }

    /// First `<storage> <ram> RAM` pair, else storage and RAM matched
    /// independently.
    pub fn storage_ram(&self, text: &str) -> StorageRam {
        if let Some(caps) = self.storage_ram_pair.captures(text) {
            return StorageRam {
                storage: caps[1].to_string(),
                ram: caps[2].to_string(),
            };
        }

        StorageRam {
            storage: self
                .storage
                .find(text)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            ram: self
                .ram
                .captures(text)
                .map(|caps| caps[1].to_string())
                .unwrap_or_default(),
        }
    }
}
