//! Firm identity used to sign templated emails and documents.

use serde::{Deserialize, Serialize};

const LOCATION_PLACEHOLDER: &str = "[Office address or video link will be provided separately]";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmProfile {
    pub name: String,
    pub office_location: Option<String>,
    /// IANA timezone used when the client does not give one.
    pub timezone: String,
}

impl Default for FirmProfile {
    fn default() -> Self {
        Self {
            name: "Your Law Firm".to_string(),
            office_location: None,
            timezone: "America/Los_Angeles".to_string(),
        }
    }
}

impl FirmProfile {
    /// Closing line plus firm name, e.g. "Best regards,\nAcme Law".
    pub fn sign_off(&self, closing: &str) -> String {
        format!("{closing},\n{}", self.name)
    }

    /// The explicit location if given, else the firm default, else a placeholder.
    pub fn location_or_default(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.office_location.as_deref())
            .unwrap_or(LOCATION_PLACEHOLDER)
            .to_string()
    }

    pub fn timezone_or_default<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit.unwrap_or(&self.timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_falls_back_to_placeholder() {
        let firm = FirmProfile::default();
        assert_eq!(firm.location_or_default(None), LOCATION_PLACEHOLDER);
        assert_eq!(firm.location_or_default(Some("Zoom link")), "Zoom link");

        let firm = FirmProfile {
            office_location: Some("12 Main St".into()),
            ..FirmProfile::default()
        };
        assert_eq!(firm.location_or_default(None), "12 Main St");
    }

    #[test]
    fn sign_off_uses_firm_name() {
        let firm = FirmProfile {
            name: "Harbor & Vale LLP".into(),
            ..FirmProfile::default()
        };
        assert_eq!(firm.sign_off("Sincerely"), "Sincerely,\nHarbor & Vale LLP");
    }
}
