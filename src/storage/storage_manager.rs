use chrono::NaiveDate;

/// Characters that cannot appear in file names on common file systems.
const RESERVED: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

pub struct StorageManager;

impl StorageManager {
    /// File-system-safe stem for an item name: reserved characters dropped,
    /// spaces turned into underscores.
    pub fn safe_name(name: &str) -> String {
        let safe: String = name
            .chars()
            .filter(|c| !RESERVED.contains(c))
            .map(|c| if c == ' ' { '_' } else { c })
            .collect();

        if safe.is_empty() {
            "unnamed".to_string()
        } else {
            safe
        }
    }

    /// Extension (with the dot) of the last path segment of `url`, or `.jpg`.
    pub fn image_extension(url: &str) -> String {
        let path = url.split(['?', '#']).next().unwrap_or("");
        let segment = path.rsplit('/').next().unwrap_or("");

        match segment.rfind('.') {
            Some(dot) if dot > 0 && dot + 1 < segment.len() => segment[dot..].to_lowercase(),
            _ => ".jpg".to_string(),
        }
    }

    pub fn snapshot_file_name(date: NaiveDate) -> String {
        format!("{}.txt", date.format("%Y-%m-%d"))
    }
}
