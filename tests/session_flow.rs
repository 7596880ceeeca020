use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use solidaria::models::donation::{CreateDonation, Donation};
use solidaria::models::poster::{Poster, PosterColumns, PosterSummary, ThemeColor, Zelle};
use solidaria::services::generation::{GenerationError, TextGenerator};
use solidaria::services::storage::{BlobStore, StorageError, store_report};
use solidaria::session::donate::{DonateError, DonationForm, submit_donation};
use solidaria::session::store::{RecordStore, StoreError};
use solidaria::session::{PosterDraft, PosterPatch, PosterSession};

fn poster_from(id: Uuid, columns: PosterColumns) -> Poster {
    let now = Utc::now();
    Poster {
        id,
        patient_name: columns.patient_name,
        condition: columns.condition,
        procedure: columns.procedure,
        location: columns.location,
        description: columns.description,
        zelle_email: columns.zelle_email,
        zelle_holder: columns.zelle_holder,
        pago_movil_bank: columns.pago_movil_bank,
        pago_movil_phone: columns.pago_movil_phone,
        pago_movil_id: columns.pago_movil_id,
        bank_name: columns.bank_name,
        bank_account_number: columns.bank_account_number,
        bank_account_type: columns.bank_account_type,
        bank_account_holder: columns.bank_account_holder,
        bank_account_id: columns.bank_account_id,
        yappy_phone: columns.yappy_phone,
        yappy_holder: columns.yappy_holder,
        contact_phones: columns.contact_phones,
        photo_url: columns.photo_url,
        medical_report_url: columns.medical_report_url,
        thank_you_message: columns.thank_you_message,
        total_amount: columns.total_amount,
        theme: columns.theme,
        created_at: now,
        updated_at: now,
    }
}

fn donation(poster_id: Uuid, amount: Decimal) -> Donation {
    Donation {
        id: Uuid::new_v4(),
        poster_id,
        donor_name: "Anónimo".to_string(),
        amount,
        message: None,
        payment_method: None,
        proof_url: None,
        created_at: Utc::now(),
    }
}

/// In-memory record store standing in for the hosted backend.
#[derive(Default)]
struct MemoryStore {
    posters: Mutex<HashMap<Uuid, Poster>>,
    donations: Mutex<Vec<Donation>>,
    inserts: AtomicUsize,
    updates: AtomicUsize,
}

impl MemoryStore {
    fn seed_poster(&self, columns: PosterColumns) -> Uuid {
        let id = Uuid::new_v4();
        self.posters
            .lock()
            .unwrap()
            .insert(id, poster_from(id, columns));
        id
    }

    fn seed_donation(&self, poster_id: Uuid, amount: Decimal) {
        self.donations.lock().unwrap().push(donation(poster_id, amount));
    }
}

#[async_trait]
impl RecordStore for &MemoryStore {
    async fn fetch_poster(&self, id: Uuid) -> Result<Option<Poster>, StoreError> {
        Ok(self.posters.lock().unwrap().get(&id).cloned())
    }

    async fn insert_poster(&self, columns: PosterColumns) -> Result<Poster, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let id = Uuid::new_v4();
        let poster = poster_from(id, columns);
        self.posters.lock().unwrap().insert(id, poster.clone());
        Ok(poster)
    }

    async fn update_poster(&self, id: Uuid, columns: PosterColumns) -> Result<Poster, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut posters = self.posters.lock().unwrap();
        if !posters.contains_key(&id) {
            return Err(StoreError::NotFound { id });
        }
        let poster = poster_from(id, columns);
        posters.insert(id, poster.clone());
        Ok(poster)
    }

    async fn search_posters(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<PosterSummary>, StoreError> {
        let needle = term.trim().to_lowercase();
        let mut matches: Vec<PosterSummary> = self
            .posters
            .lock()
            .unwrap()
            .values()
            .filter(|poster| poster.patient_name.to_lowercase().contains(&needle))
            .map(|poster| PosterSummary {
                id: poster.id,
                patient_name: poster.patient_name.clone(),
                condition: poster.condition.clone(),
                location: poster.location.clone(),
                updated_at: poster.updated_at,
            })
            .collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matches.truncate(limit as usize);
        Ok(matches)
    }

    async fn donations_for(&self, poster_id: Uuid) -> Result<Vec<Donation>, StoreError> {
        let mut donations: Vec<Donation> = self
            .donations
            .lock()
            .unwrap()
            .iter()
            .filter(|donation| donation.poster_id == poster_id)
            .cloned()
            .collect();
        donations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(donations)
    }

    async fn insert_donation(&self, donation: CreateDonation) -> Result<Donation, StoreError> {
        let row = Donation {
            id: Uuid::new_v4(),
            poster_id: donation.poster_id,
            donor_name: donation.donor_name.unwrap_or_else(|| "Anónimo".to_string()),
            amount: donation.amount,
            message: donation.message,
            payment_method: donation.payment_method,
            proof_url: donation.proof_url,
            created_at: Utc::now(),
        };
        self.donations.lock().unwrap().push(row.clone());
        Ok(row)
    }
}

/// Blob store double that can be told to fail and counts upload attempts.
#[derive(Default)]
struct MemoryBlob {
    uploads: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl BlobStore for MemoryBlob {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::Config("blob store offline".to_string()));
        }
        Ok(format!("https://blob.example/{}/{}", bucket, name))
    }
}

struct FixedGenerator(&'static str);

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.0.to_string())
    }
}

struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Empty)
    }
}

fn named_draft_columns(name: &str) -> PosterColumns {
    let mut draft = PosterDraft::default();
    draft.patient_name = name.to_string();
    draft.to_columns(ThemeColor::Pink)
}

#[tokio::test]
async fn initialize_without_location_starts_an_empty_editing_session() {
    let store = MemoryStore::default();
    let mut session = PosterSession::new(&store);
    session.initialize(None).await.expect("initialize");

    assert!(session.is_editing());
    assert!(session.location().is_none());
    assert!(session.draft().patient_name.is_empty());
    assert!(session.donations().is_empty());
}

#[tokio::test]
async fn blank_patient_name_blocks_save_before_any_store_call() {
    let store = MemoryStore::default();
    let mut session = PosterSession::new(&store);

    let result = session.save().await;
    assert!(result.is_err());
    assert!(session.location().is_none());
    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    assert_eq!(store.updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_save_inserts_and_second_save_updates_in_place() {
    let store = MemoryStore::default();
    let mut session = PosterSession::new(&store);
    session.apply_edit(PosterPatch {
        patient_name: Some("Nuvia Lezama".to_string()),
        ..Default::default()
    });

    let first = session.save().await.expect("first save");
    assert_eq!(session.location(), Some(first));

    session.apply_edit(PosterPatch {
        condition: Some("Quiste Gigante en el Hígado".to_string()),
        ..Default::default()
    });
    let second = session.save().await.expect("second save");

    assert_eq!(first, second);
    assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    assert_eq!(store.updates.load(Ordering::SeqCst), 1);
    assert_eq!(store.posters.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn publish_exits_editing_only_when_save_succeeds() {
    let store = MemoryStore::default();
    let mut session = PosterSession::new(&store);

    assert!(session.publish().await.is_err());
    assert!(session.is_editing());

    session.apply_edit(PosterPatch {
        patient_name: Some("Ana".to_string()),
        ..Default::default()
    });
    session.publish().await.expect("publish");
    assert!(!session.is_editing());
    assert!(session.share_link("https://solidaria.example").is_some());
}

#[tokio::test]
async fn loading_a_missing_id_leaves_state_and_mode_unchanged() {
    let store = MemoryStore::default();
    let mut session = PosterSession::new(&store);
    session.apply_edit(PosterPatch {
        patient_name: Some("Borrador sin guardar".to_string()),
        ..Default::default()
    });

    let result = session.load(Uuid::new_v4()).await;
    assert!(result.is_err());
    assert!(session.is_editing());
    assert!(session.location().is_none());
    assert_eq!(session.draft().patient_name, "Borrador sin guardar");
}

#[tokio::test]
async fn load_replaces_record_theme_and_donations_atomically() {
    let store = MemoryStore::default();
    let mut columns = named_draft_columns("Ana");
    columns.total_amount = Some("$1,000".to_string());
    columns.theme = ThemeColor::Purple;
    columns.zelle_email = Some("ana@example.com".to_string());
    let id = store.seed_poster(columns);
    store.seed_donation(id, dec!(250));
    store.seed_donation(id, dec!(250));

    let mut session = PosterSession::new(&store);
    session.initialize(Some(id)).await.expect("load");

    assert!(!session.is_editing());
    assert_eq!(session.location(), Some(id));
    assert_eq!(session.theme(), ThemeColor::Purple);
    assert_eq!(session.draft().patient_name, "Ana");
    assert!(session.draft().payment.zelle.is_some());
    assert_eq!(session.donations().len(), 2);
    assert_eq!(session.total_raised(), dec!(500));
    assert_eq!(session.goal_amount(), dec!(1000));
    assert_eq!(session.progress_percent(), 50.0);
}

#[tokio::test]
async fn disjoint_edits_merge_without_clobbering_each_other() {
    let store = MemoryStore::default();
    let mut session = PosterSession::new(&store);

    session.apply_edit(PosterPatch {
        condition: Some("X".to_string()),
        ..Default::default()
    });
    session.apply_edit(PosterPatch {
        procedure: Some("Y".to_string()),
        ..Default::default()
    });
    session.apply_edit(PosterPatch {
        zelle: Some(Some(Zelle {
            email: "x@example.com".to_string(),
            holder: "X".to_string(),
        })),
        ..Default::default()
    });

    let draft = session.draft();
    assert_eq!(draft.condition, "X");
    assert_eq!(draft.procedure, "Y");
    assert!(draft.payment.zelle.is_some());
    // untouched fields keep their defaults
    assert!(draft.patient_name.is_empty());
    assert_eq!(draft.contact_phones.len(), 2);
}

#[tokio::test]
async fn create_new_without_confirmation_mutates_nothing() {
    let store = MemoryStore::default();
    let id = store.seed_poster(named_draft_columns("Ana"));

    let mut session = PosterSession::new(&store);
    session.load(id).await.expect("load");

    assert!(!session.create_new(false));
    assert_eq!(session.location(), Some(id));
    assert_eq!(session.draft().patient_name, "Ana");
    assert!(!session.is_editing());

    assert!(session.create_new(true));
    assert!(session.location().is_none());
    assert!(session.draft().patient_name.is_empty());
    assert!(session.donations().is_empty());
    assert!(session.is_editing());
}

#[tokio::test]
async fn refine_requires_patient_name_and_condition() {
    let store = MemoryStore::default();
    let mut session = PosterSession::new(&store);
    session.apply_edit(PosterPatch {
        patient_name: Some("Ana".to_string()),
        ..Default::default()
    });

    let result = session.refine_description(&FixedGenerator("historia")).await;
    assert!(result.is_err());
    assert!(session.draft().description.is_empty());
}

#[tokio::test]
async fn refine_overwrites_description_and_strips_wrapping_quotes() {
    let store = MemoryStore::default();
    let mut session = PosterSession::new(&store);
    session.apply_edit(PosterPatch {
        patient_name: Some("Ana".to_string()),
        condition: Some("Leucemia".to_string()),
        description: Some("borrador anterior".to_string()),
        ..Default::default()
    });

    session
        .refine_description(&FixedGenerator("\"Una historia emotiva.\""))
        .await
        .expect("refine");
    assert_eq!(session.draft().description, "Una historia emotiva.");
}

#[tokio::test]
async fn generator_failure_leaves_description_unchanged() {
    let store = MemoryStore::default();
    let mut session = PosterSession::new(&store);
    session.apply_edit(PosterPatch {
        patient_name: Some("Ana".to_string()),
        condition: Some("Leucemia".to_string()),
        description: Some("historia escrita a mano".to_string()),
        ..Default::default()
    });

    session
        .refine_description(&FailingGenerator)
        .await
        .expect("failure is swallowed");
    assert_eq!(session.draft().description, "historia escrita a mano");
}

const PNG_DATA_URL: &str = "data:image/png;base64,aGVsbG8=";

#[tokio::test]
async fn donation_to_unknown_poster_fails_before_any_upload() {
    let store = MemoryStore::default();
    let blobs = MemoryBlob::default();

    let form = DonationForm {
        amount: dec!(50),
        proof_image: Some(PNG_DATA_URL.to_string()),
        ..Default::default()
    };
    let result = submit_donation(&store, &blobs, Uuid::new_v4(), form).await;

    assert!(matches!(result, Err(DonateError::CampaignNotFound)));
    assert_eq!(blobs.uploads.load(Ordering::SeqCst), 0);
    assert!(store.donations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_proof_upload_aborts_the_whole_submission() {
    let store = MemoryStore::default();
    let id = store.seed_poster(named_draft_columns("Ana"));
    let blobs = MemoryBlob {
        fail: true,
        ..Default::default()
    };

    let form = DonationForm {
        amount: dec!(50),
        proof_image: Some(PNG_DATA_URL.to_string()),
        ..Default::default()
    };
    let result = submit_donation(&store, &blobs, id, form).await;

    assert!(matches!(result, Err(DonateError::Storage(_))));
    assert_eq!(blobs.uploads.load(Ordering::SeqCst), 1);
    assert!(store.donations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_proof_attachment_is_rejected_before_upload() {
    let store = MemoryStore::default();
    let id = store.seed_poster(named_draft_columns("Ana"));
    let blobs = MemoryBlob::default();

    let form = DonationForm {
        amount: dec!(50),
        proof_image: Some("https://example.com/capture.png".to_string()),
        ..Default::default()
    };
    let result = submit_donation(&store, &blobs, id, form).await;

    assert!(matches!(result, Err(DonateError::InvalidProof)));
    assert_eq!(blobs.uploads.load(Ordering::SeqCst), 0);
    assert!(store.donations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn donation_with_proof_uploads_once_and_records_its_url() {
    let store = MemoryStore::default();
    let id = store.seed_poster(named_draft_columns("Ana"));
    let blobs = MemoryBlob::default();

    let form = DonationForm {
        donor_name: Some("Carlos".to_string()),
        amount: dec!(25),
        proof_image: Some(PNG_DATA_URL.to_string()),
        ..Default::default()
    };
    let donation = submit_donation(&store, &blobs, id, form).await.expect("submit");

    assert_eq!(blobs.uploads.load(Ordering::SeqCst), 1);
    let proof_url = donation.proof_url.expect("proof url recorded");
    // proof objects are keyed under their poster
    assert!(proof_url.contains(&format!("/proofs/{}/", id)));
    assert!(proof_url.ends_with(".png"));
    assert_eq!(store.donations.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn donation_without_proof_never_touches_the_blob_store() {
    let store = MemoryStore::default();
    let id = store.seed_poster(named_draft_columns("Ana"));
    let blobs = MemoryBlob::default();

    let form = DonationForm {
        amount: dec!(10),
        ..Default::default()
    };
    let donation = submit_donation(&store, &blobs, id, form).await.expect("submit");

    assert_eq!(blobs.uploads.load(Ordering::SeqCst), 0);
    assert!(donation.proof_url.is_none());
}

#[tokio::test]
async fn non_pdf_report_is_rejected_with_zero_upload_calls() {
    let blobs = MemoryBlob::default();

    for content_type in ["image/png", "text/plain", ""] {
        let result = store_report(&blobs, content_type, b"not a pdf".to_vec()).await;
        assert!(result.is_err());
    }
    assert_eq!(blobs.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pdf_report_lands_in_the_reports_bucket() {
    let blobs = MemoryBlob::default();

    let url = store_report(&blobs, "application/pdf", b"%PDF-1.7".to_vec())
        .await
        .expect("upload");

    assert_eq!(blobs.uploads.load(Ordering::SeqCst), 1);
    assert!(url.contains("/reports/report_"));
    assert!(url.ends_with(".pdf"));
}

#[tokio::test]
async fn history_search_filters_case_insensitively_and_caps_results() {
    let store = MemoryStore::default();
    for i in 0..25 {
        store.seed_poster(named_draft_columns(&format!("Paciente {}", i)));
    }
    store.seed_poster(named_draft_columns("Ana María"));
    store.seed_poster(named_draft_columns("mariana"));

    let session = PosterSession::new(&store);

    let all = session.search_history("").await.expect("search");
    assert_eq!(all.len(), 20);

    let anas = session.search_history("ana").await.expect("search");
    let names: Vec<&str> = anas.iter().map(|s| s.patient_name.as_str()).collect();
    assert!(names.contains(&"Ana María"));
    assert!(names.contains(&"mariana"));
    assert_eq!(anas.len(), 2);
}
