//! In-memory collaborators for driving the try-on flow without network access.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use fitting_room::db::FittingStore;
use fitting_room::models::fitting::{FittingModel, FittingRecord, ModelReference, TryOnRequest};
use fitting_room::models::garment::CategoryPrediction;
use fitting_room::models::job::{FittingRequest, JobStatus, ProviderError, TryOnJob};
use fitting_room::services::background::{BackgroundError, BackgroundRemover};
use fitting_room::services::classifier::{CategoryPredictor, ClassifierError};
use fitting_room::services::fitting::{FittingApiError, RemoteJobClient};
use fitting_room::services::orchestrator::{TryOnOrchestrator, TryOnSettings};
use fitting_room::services::poller::PollPolicy;
use fitting_room::services::storage::{ObjectStore, StorageError};

pub const OWNER: &str = "device-123";
pub const GARMENT_BYTES: &[u8] = b"garment image bytes";
pub const PROCESSED_BYTES: &[u8] = b"background removed";

// ── Status builders ─────────────────────────────────────────────────────

pub fn status(status: JobStatus) -> TryOnJob {
    TryOnJob {
        job_id: "j1".to_string(),
        status,
        output_urls: Vec::new(),
        error: None,
    }
}

pub fn completed(outputs: &[&str]) -> TryOnJob {
    TryOnJob {
        output_urls: outputs.iter().map(|s| s.to_string()).collect(),
        ..status(JobStatus::Completed)
    }
}

pub fn failed(name: &str, message: &str) -> TryOnJob {
    TryOnJob {
        error: Some(ProviderError {
            name: name.to_string(),
            message: message.to_string(),
        }),
        ..status(JobStatus::Failed)
    }
}

// ── Classifier ──────────────────────────────────────────────────────────

pub struct FakeClassifier {
    class_name: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeClassifier {
    pub fn returning(class_name: &str) -> Arc<Self> {
        Arc::new(Self {
            class_name: Some(class_name.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            class_name: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CategoryPredictor for FakeClassifier {
    async fn predict_category(&self, _image: &[u8]) -> Result<CategoryPrediction, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.class_name {
            Some(name) => Ok(CategoryPrediction {
                class_idx: 0,
                class_name: name.clone(),
                confidence: 0.97,
            }),
            None => Err(ClassifierError::Status(503, "model loading".to_string())),
        }
    }
}

// ── Object storage ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeStorage {
    pub uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeStorage {
    pub fn folders(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(folder, _)| folder.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for FakeStorage {
    async fn upload(&self, data: &[u8], folder: &str) -> Result<String, StorageError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((folder.to_string(), data.to_vec()));
        Ok(format!("https://cdn.test/{}/{}.png", folder, uploads.len()))
    }
}

// ── Fitting provider ────────────────────────────────────────────────────

/// Replays scripted statuses; the last successful one repeats once the script is exhausted.
pub struct ScriptedFitting {
    submit_error: Mutex<Option<FittingApiError>>,
    script: Mutex<VecDeque<Result<TryOnJob, FittingApiError>>>,
    last: Mutex<Option<TryOnJob>>,
    pub submitted: Mutex<Vec<FittingRequest>>,
    pub fetches: AtomicUsize,
}

impl ScriptedFitting {
    pub fn new(script: Vec<Result<TryOnJob, FittingApiError>>) -> Arc<Self> {
        Arc::new(Self {
            submit_error: Mutex::new(None),
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn statuses(statuses: Vec<TryOnJob>) -> Arc<Self> {
        Self::new(statuses.into_iter().map(Ok).collect())
    }

    pub fn rejecting_submit(error: FittingApiError) -> Arc<Self> {
        let client = Self::new(Vec::new());
        *client.submit_error.lock().unwrap() = Some(error);
        client
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn submits(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteJobClient for ScriptedFitting {
    async fn submit(&self, request: &FittingRequest) -> Result<String, FittingApiError> {
        if let Some(error) = self.submit_error.lock().unwrap().take() {
            return Err(error);
        }
        self.submitted.lock().unwrap().push(request.clone());
        Ok("j1".to_string())
    }

    async fn fetch_status(&self, _job_id: &str) -> Result<TryOnJob, FittingApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(job)) => {
                *self.last.lock().unwrap() = Some(job.clone());
                Ok(job)
            }
            Some(Err(error)) => Err(error),
            None => Ok(self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| status(JobStatus::Processing))),
        }
    }
}

// ── Background removal ──────────────────────────────────────────────────

pub struct FakeBackground {
    fail: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackground {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BackgroundRemover for FakeBackground {
    async fn remove_background(&self, image_url: &str) -> Result<Vec<u8>, BackgroundError> {
        self.calls.lock().unwrap().push(image_url.to_string());
        if self.fail {
            return Err(BackgroundError::Status(500, "segmentation crashed".to_string()));
        }
        Ok(PROCESSED_BYTES.to_vec())
    }
}

// ── Persistence ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeStore {
    pub models: Mutex<HashMap<Uuid, FittingModel>>,
    pub saved: Mutex<Vec<FittingRecord>>,
}

impl FakeStore {
    pub fn with_model(model: FittingModel) -> Arc<Self> {
        let store = Self::default();
        store.models.lock().unwrap().insert(model.id, model);
        Arc::new(store)
    }

    pub fn saved_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl FittingStore for FakeStore {
    async fn find_model(
        &self,
        owner_id: &str,
        model_id: Uuid,
    ) -> Result<Option<FittingModel>, sqlx::Error> {
        Ok(self
            .models
            .lock()
            .unwrap()
            .get(&model_id)
            .filter(|m| m.owner_id == owner_id)
            .cloned())
    }

    async fn save_fitting(&self, record: &FittingRecord) -> Result<(), sqlx::Error> {
        let mut models = self.models.lock().unwrap();
        let model = models
            .get_mut(&record.model_id)
            .ok_or(sqlx::Error::RowNotFound)?;
        model.image_url = record.result_url.clone();
        self.saved.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ── Harness ─────────────────────────────────────────────────────────────

pub fn model() -> FittingModel {
    FittingModel {
        id: Uuid::new_v4(),
        owner_id: OWNER.to_string(),
        name: "Weekend look".to_string(),
        image_url: "https://cdn.test/models/base.png".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// One set of collaborators plus the model they know about.
pub struct Harness {
    pub classifier: Arc<FakeClassifier>,
    pub storage: Arc<FakeStorage>,
    pub fitting: Arc<ScriptedFitting>,
    pub background: Arc<FakeBackground>,
    pub store: Arc<FakeStore>,
    pub model: FittingModel,
}

impl Harness {
    pub fn new(class_name: &str, fitting: Arc<ScriptedFitting>) -> Self {
        let model = model();
        Self {
            classifier: FakeClassifier::returning(class_name),
            storage: Arc::new(FakeStorage::default()),
            fitting,
            background: FakeBackground::working(),
            store: FakeStore::with_model(model.clone()),
            model,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<FakeClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_background(mut self, background: Arc<FakeBackground>) -> Self {
        self.background = background;
        self
    }

    pub fn orchestrator(&self) -> TryOnOrchestrator {
        self.orchestrator_with(PollPolicy::default())
    }

    pub fn orchestrator_with(&self, poll_policy: PollPolicy) -> TryOnOrchestrator {
        TryOnOrchestrator::new(
            self.classifier.clone(),
            self.storage.clone(),
            self.fitting.clone(),
            self.background.clone(),
            self.store.clone(),
            TryOnSettings {
                model_name: "tryon-v1.6".to_string(),
                poll_policy,
            },
        )
    }

    pub fn request(&self) -> TryOnRequest {
        TryOnRequest {
            garment_image: GARMENT_BYTES.to_vec(),
            model: ModelReference {
                owner_id: OWNER.to_string(),
                model_id: self.model.id,
            },
            product_url: Some("https://shop.test/items/42".to_string()),
        }
    }
}

pub fn policy(max_wait_ms: u64, interval_ms: u64) -> PollPolicy {
    PollPolicy::new(
        Duration::from_millis(max_wait_ms),
        Duration::from_millis(interval_ms),
    )
    .expect("valid poll policy")
}
