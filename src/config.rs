use log::warn;
use serde::Deserialize;
use web_sys::Document;

#[cfg(debug_assertions)]
pub fn get_maps_api_key() -> &'static str {
    "YOUR_API_KEY"  // Placeholder key for local pages
}

#[cfg(not(debug_assertions))]
pub fn get_maps_api_key() -> &'static str {
    match option_env!("MAPS_API_KEY") {
        Some(key) => key,
        None => "YOUR_API_KEY",
    }
}

/// Id of the optional `<script type="application/json">` block a page can
/// use to override [`SiteConfig`] fields.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapLocation {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
    pub title: String,
}

impl Default for MapLocation {
    fn default() -> Self {
        Self {
            lat: 19.217,
            lng: 73.088,
            zoom: 15,
            title: "Shankara Ayurveda".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub hero_images: Vec<String>,
    pub hero_interval_ms: u32,
    pub carousel_interval_ms: u32,
    /// Viewports narrower than this show one testimonial per slide and
    /// close the mobile menu when widened past it.
    pub wide_breakpoint: f64,
    pub typing_delay_ms: u32,
    pub block_pause_ms: u32,
    pub focus_delay_ms: u32,
    pub map: MapLocation,
    pub preload_images: Vec<String>,
    pub contact_storage_key: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            hero_images: vec![
                "./images/banner-1.webp".to_string(),
                "./images/banner-2.webp".to_string(),
                "./images/banner-3.webp".to_string(),
            ],
            hero_interval_ms: 5000,
            carousel_interval_ms: 4000,
            wide_breakpoint: 768.0,
            typing_delay_ms: 40,
            block_pause_ms: 200,
            focus_delay_ms: 100,
            map: MapLocation::default(),
            preload_images: Vec::new(),
            contact_storage_key: "contacts".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads overrides from the page, falling back to defaults when the
    /// block is missing or unreadable.
    pub fn from_page(document: &Document) -> Self {
        let Some(text) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };

        match Self::from_json(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring invalid #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }
}
