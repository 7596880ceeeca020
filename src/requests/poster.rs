use crate::models::poster::{PaymentMethods, ThemeColor};
use crate::session::PosterDraft;
use serde::Deserialize;

/// Full draft payload for both create and update. Saving always carries the
/// whole record; the patient name is the only required field.
#[derive(Debug, Deserialize)]
pub struct SavePosterRequest {
    pub patient_name: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub procedure: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub payment: PaymentMethods,
    #[serde(default)]
    pub contact_phones: Vec<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub medical_report_url: Option<String>,
    #[serde(default)]
    pub thank_you_message: String,
    #[serde(default)]
    pub total_amount: String,
    #[serde(default)]
    pub theme: ThemeColor,
}

impl SavePosterRequest {
    pub fn into_draft(self) -> (PosterDraft, ThemeColor) {
        let theme = self.theme;
        let draft = PosterDraft {
            patient_name: self.patient_name,
            condition: self.condition,
            procedure: self.procedure,
            location: self.location,
            description: self.description,
            payment: self.payment,
            contact_phones: self.contact_phones,
            photo_url: self.photo_url,
            medical_report_url: self.medical_report_url,
            thank_you_message: self.thank_you_message,
            total_amount: self.total_amount,
        };
        (draft, theme)
    }
}

#[derive(Debug, Deserialize)]
pub struct RefineStoryRequest {
    pub patient_name: String,
    pub condition: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub search: String,
}
