//! WebView feature toggles.

use serde::{Deserialize, Deserializer, Serialize};

fn enabled() -> bool {
    true
}

fn default_download_directory() -> String {
    "Downloads".to_string()
}

/// WebView behaviour switches baked into the generated entry point.
///
/// Every toggle defaults to `true` except [`enable_media_autoplay`], which
/// defaults to `false`. Field names are the submission keys; the matching
/// source constants are listed by [`FeatureToggles::constants`].
///
/// [`enable_media_autoplay`]: FeatureToggles::enable_media_autoplay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggles {
    #[serde(default = "enabled")]
    pub allow_zoom: bool,
    #[serde(default = "enabled")]
    pub enable_javascript: bool,
    #[serde(default = "enabled")]
    pub enable_dom_storage: bool,
    #[serde(default = "enabled")]
    pub enable_geolocation: bool,
    #[serde(default = "enabled")]
    pub enable_pull_refresh: bool,
    #[serde(default = "enabled")]
    pub show_navigation: bool,
    #[serde(default = "enabled")]
    pub enable_file_access: bool,
    #[serde(default = "enabled")]
    pub enable_cache: bool,
    #[serde(default)]
    pub enable_media_autoplay: bool,

    // Camera & gallery
    #[serde(default = "enabled")]
    pub enable_camera_access: bool,
    #[serde(default = "enabled")]
    pub enable_gallery_access: bool,
    #[serde(default = "enabled")]
    pub camera_permission_prompt: bool,

    // QR / barcode scanner
    #[serde(default = "enabled")]
    pub enable_qr_scanner: bool,
    #[serde(default = "enabled")]
    pub enable_barcode_scanner: bool,
    #[serde(default, deserialize_with = "list_or_csv")]
    pub scanner_formats: Vec<String>,

    // Download manager
    #[serde(default = "enabled")]
    pub enable_download_manager: bool,
    #[serde(default = "default_download_directory")]
    pub download_directory: String,
    #[serde(default = "enabled")]
    pub allow_large_downloads: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            allow_zoom: true,
            enable_javascript: true,
            enable_dom_storage: true,
            enable_geolocation: true,
            enable_pull_refresh: true,
            show_navigation: true,
            enable_file_access: true,
            enable_cache: true,
            enable_media_autoplay: false,
            enable_camera_access: true,
            enable_gallery_access: true,
            camera_permission_prompt: true,
            enable_qr_scanner: true,
            enable_barcode_scanner: true,
            scanner_formats: Vec::new(),
            enable_download_manager: true,
            download_directory: default_download_directory(),
            allow_large_downloads: true,
        }
    }
}

impl FeatureToggles {
    /// Source constant name and value for every boolean toggle.
    pub fn constants(&self) -> [(&'static str, bool); 16] {
        [
            ("ALLOW_ZOOM", self.allow_zoom),
            ("ENABLE_JAVASCRIPT", self.enable_javascript),
            ("ENABLE_DOM_STORAGE", self.enable_dom_storage),
            ("ENABLE_GEOLOCATION", self.enable_geolocation),
            ("ENABLE_PULL_TO_REFRESH", self.enable_pull_refresh),
            ("SHOW_NAVIGATION_BAR", self.show_navigation),
            ("ENABLE_FILE_ACCESS", self.enable_file_access),
            ("ENABLE_CACHE", self.enable_cache),
            ("ENABLE_MEDIA_AUTOPLAY", self.enable_media_autoplay),
            ("ENABLE_CAMERA_ACCESS", self.enable_camera_access),
            ("ENABLE_GALLERY_ACCESS", self.enable_gallery_access),
            ("CAMERA_PERMISSION_PROMPT", self.camera_permission_prompt),
            ("ENABLE_QR_SCANNER", self.enable_qr_scanner),
            ("ENABLE_BARCODE_SCANNER", self.enable_barcode_scanner),
            ("ENABLE_DOWNLOAD_MANAGER", self.enable_download_manager),
            ("ALLOW_LARGE_DOWNLOADS", self.allow_large_downloads),
        ]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrCsv {
    List(Vec<String>),
    Csv(String),
}

fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let formats = match ListOrCsv::deserialize(deserializer).map_err(|_| {
        serde::de::Error::custom("scanner_formats must be a list or string")
    })? {
        ListOrCsv::List(items) => items,
        ListOrCsv::Csv(text) => text.split(',').map(str::to_string).collect(),
    };
    Ok(formats
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let toggles: FeatureToggles = serde_json::from_str("{}").unwrap();
        assert_eq!(toggles, FeatureToggles::default());
        assert!(toggles.allow_zoom);
        assert!(!toggles.enable_media_autoplay);
        assert_eq!(toggles.download_directory, "Downloads");
    }

    #[test]
    fn scanner_formats_accept_list_or_csv() {
        let a: FeatureToggles =
            serde_json::from_str(r#"{"scanner_formats": ["qr", "ean13"]}"#).unwrap();
        let b: FeatureToggles =
            serde_json::from_str(r#"{"scanner_formats": "qr, ean13"}"#).unwrap();
        assert_eq!(a.scanner_formats, vec!["qr", "ean13"]);
        assert_eq!(a.scanner_formats, b.scanner_formats);
    }

    #[test]
    fn non_boolean_toggle_is_rejected() {
        let err = serde_json::from_str::<FeatureToggles>(r#"{"enable_qr_scanner": "yes"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("boolean"));
    }

    #[test]
    fn scanner_formats_reject_numbers() {
        assert!(serde_json::from_str::<FeatureToggles>(r#"{"scanner_formats": 5}"#).is_err());
    }
}
