use crate::database::connection::DbPool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PosterError {
    #[error("Poster with ID {id} not found")]
    NotFound { id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Closed set of poster color variants. Stored as a Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "theme_color", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    #[default]
    Pink,
    Blue,
    Yellow,
    Purple,
}

impl FromStr for ThemeColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pink" => Ok(ThemeColor::Pink),
            "blue" => Ok(ThemeColor::Blue),
            "yellow" => Ok(ThemeColor::Yellow),
            "purple" => Ok(ThemeColor::Purple),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Zelle {
    pub email: String,
    pub holder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PagoMovil {
    pub bank: String,
    pub phone: String,
    pub id_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BankTransfer {
    pub bank_name: String,
    pub account_number: String,
    pub account_type: String,
    pub holder: String,
    pub id_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Yappy {
    pub phone: String,
    pub holder: String,
}

/// Payment instructions as independent optional field groups. New methods get
/// a new group here instead of widening the poster row type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PaymentMethods {
    pub zelle: Option<Zelle>,
    pub pago_movil: Option<PagoMovil>,
    pub bank_transfer: Option<BankTransfer>,
    pub yappy: Option<Yappy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Poster {
    pub id: Uuid,
    pub patient_name: String,
    pub condition: Option<String>,
    pub procedure: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub zelle_email: Option<String>,
    pub zelle_holder: Option<String>,
    pub pago_movil_bank: Option<String>,
    pub pago_movil_phone: Option<String>,
    pub pago_movil_id: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_account_type: Option<String>,
    pub bank_account_holder: Option<String>,
    pub bank_account_id: Option<String>,
    pub yappy_phone: Option<String>,
    pub yappy_holder: Option<String>,
    pub contact_phones: Vec<String>,
    pub photo_url: Option<String>,
    pub medical_report_url: Option<String>,
    pub thank_you_message: Option<String>,
    pub total_amount: Option<String>,
    pub theme: ThemeColor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row as listed in the campaign history picker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PosterSummary {
    pub id: Uuid,
    pub patient_name: String,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Full set of writable poster columns, used for both insert and update. The
/// controller maps its grouped draft onto this flat shape at the save boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosterColumns {
    pub patient_name: String,
    pub condition: Option<String>,
    pub procedure: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub zelle_email: Option<String>,
    pub zelle_holder: Option<String>,
    pub pago_movil_bank: Option<String>,
    pub pago_movil_phone: Option<String>,
    pub pago_movil_id: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_account_type: Option<String>,
    pub bank_account_holder: Option<String>,
    pub bank_account_id: Option<String>,
    pub yappy_phone: Option<String>,
    pub yappy_holder: Option<String>,
    pub contact_phones: Vec<String>,
    pub photo_url: Option<String>,
    pub medical_report_url: Option<String>,
    pub thank_you_message: Option<String>,
    pub total_amount: Option<String>,
    pub theme: ThemeColor,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl Poster {
    /// Reads the flat payment columns back into grouped form. A group is
    /// present when its key field carries a value: zelle_email,
    /// pago_movil_phone, bank_account_number, yappy_phone.
    pub fn payment_methods(&self) -> PaymentMethods {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();

        PaymentMethods {
            zelle: filled(&self.zelle_email).then(|| Zelle {
                email: field(&self.zelle_email),
                holder: field(&self.zelle_holder),
            }),
            pago_movil: filled(&self.pago_movil_phone).then(|| PagoMovil {
                bank: field(&self.pago_movil_bank),
                phone: field(&self.pago_movil_phone),
                id_number: field(&self.pago_movil_id),
            }),
            bank_transfer: filled(&self.bank_account_number).then(|| BankTransfer {
                bank_name: field(&self.bank_name),
                account_number: field(&self.bank_account_number),
                account_type: field(&self.bank_account_type),
                holder: field(&self.bank_account_holder),
                id_number: field(&self.bank_account_id),
            }),
            yappy: filled(&self.yappy_phone).then(|| Yappy {
                phone: field(&self.yappy_phone),
                holder: field(&self.yappy_holder),
            }),
        }
    }

    pub async fn create(pool: &DbPool, columns: PosterColumns) -> Result<Self, PosterError> {
        let now = Utc::now();

        let poster = sqlx::query_as::<_, Poster>(
            "INSERT INTO posters (id, patient_name, condition, procedure, location, description,
                 zelle_email, zelle_holder, pago_movil_bank, pago_movil_phone, pago_movil_id,
                 bank_name, bank_account_number, bank_account_type, bank_account_holder, bank_account_id,
                 yappy_phone, yappy_holder, contact_phones, photo_url, medical_report_url,
                 thank_you_message, total_amount, theme, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                 $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(columns.patient_name)
        .bind(columns.condition)
        .bind(columns.procedure)
        .bind(columns.location)
        .bind(columns.description)
        .bind(columns.zelle_email)
        .bind(columns.zelle_holder)
        .bind(columns.pago_movil_bank)
        .bind(columns.pago_movil_phone)
        .bind(columns.pago_movil_id)
        .bind(columns.bank_name)
        .bind(columns.bank_account_number)
        .bind(columns.bank_account_type)
        .bind(columns.bank_account_holder)
        .bind(columns.bank_account_id)
        .bind(columns.yappy_phone)
        .bind(columns.yappy_holder)
        .bind(columns.contact_phones)
        .bind(columns.photo_url)
        .bind(columns.medical_report_url)
        .bind(columns.thank_you_message)
        .bind(columns.total_amount)
        .bind(columns.theme)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(poster)
    }

    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, PosterError> {
        let poster = sqlx::query_as::<_, Poster>("SELECT * FROM posters WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(poster)
    }

    /// Full-row overwrite. Saving always writes the complete draft, so there
    /// is no partial-update path.
    pub async fn update(
        pool: &DbPool,
        id: Uuid,
        columns: PosterColumns,
    ) -> Result<Self, PosterError> {
        let now = Utc::now();

        let updated = sqlx::query_as::<_, Poster>(
            "UPDATE posters
             SET patient_name = $2, condition = $3, procedure = $4, location = $5, description = $6,
                 zelle_email = $7, zelle_holder = $8, pago_movil_bank = $9, pago_movil_phone = $10,
                 pago_movil_id = $11, bank_name = $12, bank_account_number = $13,
                 bank_account_type = $14, bank_account_holder = $15, bank_account_id = $16,
                 yappy_phone = $17, yappy_holder = $18, contact_phones = $19, photo_url = $20,
                 medical_report_url = $21, thank_you_message = $22, total_amount = $23,
                 theme = $24, updated_at = $25
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(columns.patient_name)
        .bind(columns.condition)
        .bind(columns.procedure)
        .bind(columns.location)
        .bind(columns.description)
        .bind(columns.zelle_email)
        .bind(columns.zelle_holder)
        .bind(columns.pago_movil_bank)
        .bind(columns.pago_movil_phone)
        .bind(columns.pago_movil_id)
        .bind(columns.bank_name)
        .bind(columns.bank_account_number)
        .bind(columns.bank_account_type)
        .bind(columns.bank_account_holder)
        .bind(columns.bank_account_id)
        .bind(columns.yappy_phone)
        .bind(columns.yappy_holder)
        .bind(columns.contact_phones)
        .bind(columns.photo_url)
        .bind(columns.medical_report_url)
        .bind(columns.thank_you_message)
        .bind(columns.total_amount)
        .bind(columns.theme)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        updated.ok_or(PosterError::NotFound { id })
    }

    /// Case-insensitive contains on patient name, newest activity first.
    /// An empty term lists everything up to the cap.
    pub async fn search(
        pool: &DbPool,
        term: &str,
        limit: i64,
    ) -> Result<Vec<PosterSummary>, PosterError> {
        let pattern = format!("%{}%", term.trim());

        let summaries = sqlx::query_as::<_, PosterSummary>(
            "SELECT id, patient_name, condition, location, updated_at
             FROM posters
             WHERE patient_name ILIKE $1
             ORDER BY updated_at DESC
             LIMIT $2",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(summaries)
    }
}
