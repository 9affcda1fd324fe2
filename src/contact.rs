//! Contact form that keeps submissions in local storage.

use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use serde::Serialize;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement, Window,
};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::Unavailable;

pub const SAVED_MESSAGE: &str = "Message saved locally!";
pub const FAILED_MESSAGE: &str = "Could not save your message.";
const FIELDS: [&str; 4] = ["name", "email", "phone", "message"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    #[serde(with = "millis")]
    pub time: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn new(name: &str, email: &str, phone: &str, message: &str, time: DateTime<Utc>) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
            message: message.trim().to_string(),
            time,
        }
    }
}

/// Timestamps as `2024-05-01T09:30:00.000Z`, the shape `Date.toISOString` gives.
mod millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    #[cfg(test)]
    pub fn deserialize<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::Deserialize;

        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Everything stored under the contacts key. Entries are kept as raw JSON
/// so records written by older page versions survive a round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactLog {
    entries: Vec<serde_json::Value>,
}

impl ContactLog {
    pub fn parse(stored: Option<&str>) -> Result<Self, serde_json::Error> {
        match stored {
            None => Ok(Self::default()),
            Some(json) => Ok(Self {
                entries: serde_json::from_str(json)?,
            }),
        }
    }

    /// Like [`Self::parse`] but starts over when the stored value is unreadable.
    pub fn parse_or_reset(stored: Option<&str>) -> Self {
        Self::parse(stored).unwrap_or_else(|e| {
            warn!("Discarding unreadable contact log: {}", e);
            Self::default()
        })
    }

    pub fn push(&mut self, submission: &ContactSubmission) -> Result<(), serde_json::Error> {
        self.entries.push(serde_json::to_value(submission)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn submissions(&self) -> Vec<ContactSubmission> {
        self.entries
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }
}

fn field_value(form: &HtmlFormElement, name: &str) -> String {
    let Ok(Some(field)) = form.query_selector(&format!("[name=\"{}\"]", name)) else {
        return String::new();
    };
    if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
        return input.value();
    }
    if let Some(area) = field.dyn_ref::<HtmlTextAreaElement>() {
        return area.value();
    }
    String::new()
}

fn save(window: &Window, key: &str, submission: &ContactSubmission) -> Result<usize, String> {
    let storage = window
        .local_storage()
        .ok()
        .flatten()
        .ok_or_else(|| "local storage unavailable".to_string())?;
    let stored = storage.get_item(key).ok().flatten();

    let mut log = ContactLog::parse_or_reset(stored.as_deref());
    log.push(submission).map_err(|e| e.to_string())?;
    let json = log.to_json().map_err(|e| e.to_string())?;
    storage
        .set_item(key, &json)
        .map_err(|e| format!("{:?}", e))?;
    Ok(log.len())
}

fn show_status(status: Option<&Element>, text: &str, color: &str) {
    let Some(status) = status else { return };
    status.set_text_content(Some(text));
    if let Some(status) = status.dyn_ref::<HtmlElement>() {
        dom::set_style(status, "color", color);
    }
}

/// Marker for a contact form whose submit handler is installed.
pub struct ContactForm;

pub fn mount(
    window: &Window,
    document: &Document,
    config: &SiteConfig,
) -> Result<ContactForm, Unavailable> {
    let form = dom::require_id(document, "contactForm")?
        .dyn_into::<HtmlFormElement>()
        .map_err(|_| Unavailable::MissingElement("contactForm"))?;
    let status = document.get_element_by_id("formStatus");

    let key = config.contact_storage_key.clone();
    let window = window.clone();
    let submitted = form.clone();
    dom::listen(&form, "submit", move |e| {
        e.prevent_default();
        let [name, email, phone, message] = FIELDS.map(|f| field_value(&submitted, f));
        let submission = ContactSubmission::new(&name, &email, &phone, &message, Utc::now());

        match save(&window, &key, &submission) {
            Ok(total) => {
                info!(
                    "Saved contact message at {} ({} stored)",
                    submission.time.to_rfc3339_opts(SecondsFormat::Secs, true),
                    total
                );
                show_status(status.as_ref(), SAVED_MESSAGE, "green");
                submitted.reset();
            }
            Err(e) => {
                warn!("Could not save contact message: {}", e);
                show_status(status.as_ref(), FAILED_MESSAGE, "red");
            }
        }
    })?;

    info!("Contact form saves to local storage under {:?}", config.contact_storage_key);
    Ok(ContactForm)
}
