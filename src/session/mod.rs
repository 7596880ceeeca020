//! Poster state controller. One `PosterSession` exists per page view and is
//! the exclusive owner of the in-memory campaign record and its donation list;
//! everything durable lives behind the [`RecordStore`] seam.

pub mod donate;
pub mod layout;
pub mod store;

use crate::models::donation::Donation;
use crate::models::poster::{
    BankTransfer, PagoMovil, PaymentMethods, Poster, PosterColumns, PosterSummary, ThemeColor,
    Yappy, Zelle,
};
use crate::services::generation::TextGenerator;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use store::{RecordStore, StoreError};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// History picker page size.
pub const HISTORY_LIMIT: i64 = 20;

const DEFAULT_THANK_YOU: &str = "¡Gracias de todo corazón por tu aporte!";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Por favor, ingresa al menos el nombre del paciente.")]
    MissingPatientName,
    #[error("Ingresa nombre y diagnóstico para generar la historia.")]
    MissingStoryFields,
    #[error("No se encontró ninguna campaña con ese ID.")]
    CampaignNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The editable in-memory campaign record. All-empty by default apart from
/// the stock thank-you line and two blank contact-phone slots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PosterDraft {
    pub patient_name: String,
    pub condition: String,
    pub procedure: String,
    pub location: String,
    pub description: String,
    pub payment: PaymentMethods,
    pub contact_phones: Vec<String>,
    pub photo_url: Option<String>,
    pub medical_report_url: Option<String>,
    pub thank_you_message: String,
    pub total_amount: String,
}

impl Default for PosterDraft {
    fn default() -> Self {
        Self {
            patient_name: String::new(),
            condition: String::new(),
            procedure: String::new(),
            location: String::new(),
            description: String::new(),
            payment: PaymentMethods::default(),
            contact_phones: vec![String::new(), String::new()],
            photo_url: None,
            medical_report_url: None,
            thank_you_message: DEFAULT_THANK_YOU.to_string(),
            total_amount: String::new(),
        }
    }
}

impl From<Poster> for PosterDraft {
    fn from(poster: Poster) -> Self {
        let payment = poster.payment_methods();
        let contact_phones = if poster.contact_phones.is_empty() {
            vec![String::new(), String::new()]
        } else {
            poster.contact_phones
        };

        Self {
            patient_name: poster.patient_name,
            condition: poster.condition.unwrap_or_default(),
            procedure: poster.procedure.unwrap_or_default(),
            location: poster.location.unwrap_or_default(),
            description: poster.description.unwrap_or_default(),
            payment,
            contact_phones,
            photo_url: poster.photo_url,
            medical_report_url: poster.medical_report_url,
            thank_you_message: poster
                .thank_you_message
                .filter(|msg| !msg.is_empty())
                .unwrap_or_else(|| DEFAULT_THANK_YOU.to_string()),
            total_amount: poster.total_amount.unwrap_or_default(),
        }
    }
}

fn column(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| value.to_string())
}

impl PosterDraft {
    /// Maps the grouped draft onto the flat store column names.
    pub fn to_columns(&self, theme: ThemeColor) -> PosterColumns {
        let zelle = self.payment.zelle.as_ref();
        let pago_movil = self.payment.pago_movil.as_ref();
        let bank = self.payment.bank_transfer.as_ref();
        let yappy = self.payment.yappy.as_ref();

        PosterColumns {
            patient_name: self.patient_name.clone(),
            condition: column(&self.condition),
            procedure: column(&self.procedure),
            location: column(&self.location),
            description: column(&self.description),
            zelle_email: zelle.and_then(|z| column(&z.email)),
            zelle_holder: zelle.and_then(|z| column(&z.holder)),
            pago_movil_bank: pago_movil.and_then(|p| column(&p.bank)),
            pago_movil_phone: pago_movil.and_then(|p| column(&p.phone)),
            pago_movil_id: pago_movil.and_then(|p| column(&p.id_number)),
            bank_name: bank.and_then(|b| column(&b.bank_name)),
            bank_account_number: bank.and_then(|b| column(&b.account_number)),
            bank_account_type: bank.and_then(|b| column(&b.account_type)),
            bank_account_holder: bank.and_then(|b| column(&b.holder)),
            bank_account_id: bank.and_then(|b| column(&b.id_number)),
            yappy_phone: yappy.and_then(|y| column(&y.phone)),
            yappy_holder: yappy.and_then(|y| column(&y.holder)),
            contact_phones: self.contact_phones.clone(),
            photo_url: self.photo_url.clone(),
            medical_report_url: self.medical_report_url.clone(),
            thank_you_message: column(&self.thank_you_message),
            total_amount: column(&self.total_amount),
            theme,
        }
    }
}

/// Partial field set for a single atomic merge into the draft. Absent fields
/// are left untouched; double-option fields distinguish "leave" from "clear"
/// for the optional attachments and payment groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PosterPatch {
    pub patient_name: Option<String>,
    pub condition: Option<String>,
    pub procedure: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zelle: Option<Option<Zelle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pago_movil: Option<Option<PagoMovil>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_transfer: Option<Option<BankTransfer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yappy: Option<Option<Yappy>>,
    pub contact_phones: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_report_url: Option<Option<String>>,
    pub thank_you_message: Option<String>,
    pub total_amount: Option<String>,
}

/// Prompt template for the description-refinement feature.
pub fn story_prompt(patient_name: &str, condition: &str) -> String {
    format!(
        "Redacta una historia médica corta y muy emotiva para un poster de recaudación. \
         Paciente: {}. Diagnóstico: {}. Sé respetuoso y directo. Máximo 300 caracteres.",
        patient_name, condition
    )
}

/// Drops at most one leading and one trailing double quote, which the
/// generator tends to wrap its prose in.
pub fn strip_outer_quotes(text: &str) -> &str {
    let text = text.strip_prefix('"').unwrap_or(text);
    text.strip_suffix('"').unwrap_or(text)
}

pub struct PosterSession<S> {
    store: S,
    draft: PosterDraft,
    theme: ThemeColor,
    poster_id: Option<Uuid>,
    donations: Vec<Donation>,
    editing: bool,
}

impl<S: RecordStore> PosterSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            draft: PosterDraft::default(),
            theme: ThemeColor::default(),
            poster_id: None,
            donations: Vec::new(),
            editing: true,
        }
    }

    /// Entry point for a fresh page view: an `id` query parameter selects the
    /// record to load, its absence starts an empty editing session.
    pub async fn initialize(&mut self, location: Option<Uuid>) -> Result<(), SessionError> {
        match location {
            Some(id) => self.load(id).await,
            None => {
                self.editing = true;
                Ok(())
            }
        }
    }

    /// Loads a record and its donations, replacing local state only once both
    /// are in hand. Not-found and transport failures leave prior state (and
    /// the editing mode) untouched.
    pub async fn load(&mut self, id: Uuid) -> Result<(), SessionError> {
        let poster = match self.store.fetch_poster(id).await {
            Ok(Some(poster)) => poster,
            Ok(None) => return Err(SessionError::CampaignNotFound),
            Err(e) => {
                error!("Error loading poster {}: {}", id, e);
                return Err(e.into());
            }
        };

        let donations = match self.store.donations_for(id).await {
            Ok(donations) => donations,
            Err(e) => {
                error!("Error loading donations for poster {}: {}", id, e);
                Vec::new()
            }
        };

        self.theme = poster.theme;
        self.draft = PosterDraft::from(poster);
        self.donations = donations;
        self.poster_id = Some(id);
        self.editing = false;
        info!("Loaded poster {}", id);
        Ok(())
    }

    /// Insert-or-update of the current draft. The patient name is the only
    /// required field; validation failures never reach the store.
    pub async fn save(&mut self) -> Result<Uuid, SessionError> {
        if self.draft.patient_name.trim().is_empty() {
            return Err(SessionError::MissingPatientName);
        }

        let columns = self.draft.to_columns(self.theme);
        let result = match self.poster_id {
            Some(id) => self.store.update_poster(id, columns).await,
            None => self.store.insert_poster(columns).await,
        };

        let saved = result.map_err(|e| {
            error!("Error saving poster: {}", e);
            e
        })?;

        self.poster_id = Some(saved.id);
        info!("Saved poster {}", saved.id);
        Ok(saved.id)
    }

    /// Save, then leave editing mode. Editing survives a failed save.
    pub async fn publish(&mut self) -> Result<Uuid, SessionError> {
        let id = self.save().await?;
        self.editing = false;
        Ok(id)
    }

    /// Discards the session and starts over. Destructive, so it requires the
    /// caller to pass the user's explicit confirmation; without it nothing
    /// changes. Returns whether the reset happened.
    pub fn create_new(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }

        self.draft = PosterDraft::default();
        self.poster_id = None;
        self.donations.clear();
        self.editing = true;
        true
    }

    /// Merges a partial set of field changes into the draft in one step.
    pub fn apply_edit(&mut self, patch: PosterPatch) {
        let draft = &mut self.draft;
        if let Some(v) = patch.patient_name {
            draft.patient_name = v;
        }
        if let Some(v) = patch.condition {
            draft.condition = v;
        }
        if let Some(v) = patch.procedure {
            draft.procedure = v;
        }
        if let Some(v) = patch.location {
            draft.location = v;
        }
        if let Some(v) = patch.description {
            draft.description = v;
        }
        if let Some(v) = patch.zelle {
            draft.payment.zelle = v;
        }
        if let Some(v) = patch.pago_movil {
            draft.payment.pago_movil = v;
        }
        if let Some(v) = patch.bank_transfer {
            draft.payment.bank_transfer = v;
        }
        if let Some(v) = patch.yappy {
            draft.payment.yappy = v;
        }
        if let Some(v) = patch.contact_phones {
            draft.contact_phones = v;
        }
        if let Some(v) = patch.photo_url {
            draft.photo_url = v;
        }
        if let Some(v) = patch.medical_report_url {
            draft.medical_report_url = v;
        }
        if let Some(v) = patch.thank_you_message {
            draft.thank_you_message = v;
        }
        if let Some(v) = patch.total_amount {
            draft.total_amount = v;
        }
    }

    pub fn set_theme(&mut self, theme: ThemeColor) {
        self.theme = theme;
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    /// Generates an emotive story from the patient name and diagnosis and
    /// overwrites the description with it. Generator failures and empty
    /// output are logged and leave the description as it was; this is a
    /// single-field last-write-wins overwrite.
    pub async fn refine_description<G>(&mut self, generator: &G) -> Result<(), SessionError>
    where
        G: TextGenerator + ?Sized,
    {
        if self.draft.patient_name.trim().is_empty() || self.draft.condition.trim().is_empty() {
            return Err(SessionError::MissingStoryFields);
        }

        let prompt = story_prompt(&self.draft.patient_name, &self.draft.condition);
        match generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                self.draft.description = strip_outer_quotes(text.trim()).to_string();
            }
            Ok(_) => error!("Text generator returned an empty story"),
            Err(e) => error!("Error generating story: {}", e),
        }
        Ok(())
    }

    /// Recently updated campaigns whose patient name contains `term`.
    pub async fn search_history(&self, term: &str) -> Result<Vec<PosterSummary>, SessionError> {
        self.store
            .search_posters(term, HISTORY_LIMIT)
            .await
            .map_err(|e| {
                error!("Error searching campaign history: {}", e);
                e.into()
            })
    }

    /// The shareable page address for the current record, once it has one.
    pub fn share_link(&self, origin: &str) -> Option<String> {
        self.poster_id
            .map(|id| format!("{}/?id={}", origin.trim_end_matches('/'), id))
    }

    pub fn draft(&self) -> &PosterDraft {
        &self.draft
    }

    pub fn theme(&self) -> ThemeColor {
        self.theme
    }

    /// Store-assigned identifier, mirrored into the page's `id` query
    /// parameter.
    pub fn location(&self) -> Option<Uuid> {
        self.poster_id
    }

    pub fn donations(&self) -> &[Donation] {
        &self.donations
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn total_raised(&self) -> Decimal {
        layout::total_raised(&self.donations)
    }

    pub fn goal_amount(&self) -> Decimal {
        layout::goal_amount(&self.draft.total_amount)
    }

    pub fn progress_percent(&self) -> f64 {
        layout::progress_percent(self.total_raised(), self.goal_amount())
    }
}
