//! Static field catalog: device models, problem types, urgency levels and
//! support methods offered by the intake form.

use serde::Deserialize;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::Display;
use strum_macros::EnumIter;
use strum_macros::EnumString;

/// Device model entry used when the hardware is not in the list.
pub const OTHER_DEVICE_MODEL: &str = "Other";

/// Devices offered in the device-model picker, in display order.
pub const DEVICE_MODELS: &[&str] = &[
    "RAK7268 Wisgate Edge Lite 2",
    "RAK7271 WisGate Edge Prime",
    "RAK7289 WisGate Edge Pro",
    "RAK7258 WisGate Edge",
    "RAK7249 WisGate Edge Max",
    "RAK7240 WisGate Edge Prime",
    "RAK7268C WisGate Edge Lite 2",
    "RAK7391 WisBlock Base Board Pro",
    "RAK5010 WisTrio NB-IoT Tracker",
    "RAK4631 WisBlock Core",
    "RAK4200 WisDuo LPWAN Module",
    "RAK4270 WisDuo LPWAN Module",
    "RAK3172 WisDuo LPWAN Module",
    "RAK11300 WisBlock Core",
    "RAK11200 WisBlock Core",
    "RAK11720 Module",
    "RAK12500 WisBlock Sensor",
    "RAK2013 Cellular NB-IoT",
    OTHER_DEVICE_MODEL,
];

/// True when `model` is one of the catalogued devices (including "Other").
pub fn is_catalogued_device(model: &str) -> bool {
    DEVICE_MODELS.contains(&model.trim())
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProblemType {
    #[default]
    Connectivity,
    Installation,
    Configuration,
    Hardware,
    Software,
    Other,
}

impl ProblemType {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Connectivity => "Connectivity Issues",
            Self::Installation => "Installation Problems",
            Self::Configuration => "Configuration Help",
            Self::Hardware => "Hardware Malfunction",
            Self::Software => "Software/Firmware Issues",
            Self::Other => "Other Issue",
        }
    }

    /// Label for a raw wire value. Unknown values are echoed back unchanged.
    pub fn label_for(raw: &str) -> String {
        raw.parse::<Self>()
            .map(|kind| kind.label().to_string())
            .unwrap_or_else(|_| raw.to_string())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl UrgencyLevel {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Long label shown in the urgency picker.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low - No immediate impact on operations",
            Self::Medium => "Medium - Some features affected but workarounds exist",
            Self::High => "High - Critical system or business impact",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Expected first-response window quoted on the confirmation screen.
    pub fn response_window(self) -> &'static str {
        match self {
            Self::High => "4 hours",
            Self::Medium => "24 hours",
            Self::Low => "48 hours",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SupportMethod {
    #[default]
    Email,
    Phone,
    Remote,
}

impl SupportMethod {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email Support",
            Self::Phone => "Phone Support",
            Self::Remote => "Remote Assistance",
        }
    }
}
