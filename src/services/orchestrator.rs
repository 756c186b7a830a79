//! End-to-end virtual try-on workflow.
//!
//! A run moves strictly forward through [`TryOnStage`]; the first failing
//! stage ends it. Nothing outcome-dependent is persisted unless the provider
//! reported a completed job with at least one output image.

use std::sync::Arc;
use std::time::Duration;

use strum::Display;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::db::FittingStore;
use crate::error::TryOnError;
use crate::models::fitting::{FittingModel, FittingRecord, TryOnRequest, TryOnResult};
use crate::models::garment::GarmentCategory;
use crate::models::job::{FittingRequest, JobStatus, TryOnJob};
use crate::services::background::BackgroundRemover;
use crate::services::classifier::CategoryPredictor;
use crate::services::error_translator::{self, TranslatedError};
use crate::services::fitting::{FittingApiError, RemoteJobClient};
use crate::services::poller::{CompletionPoller, PollError, PollPolicy};
use crate::services::storage::{folders, ObjectStore};

/// Position of a run in the try-on pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TryOnStage {
    PredictingCategory,
    Validating,
    ResolvingModel,
    UploadingGarment,
    SubmittingJob,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

/// How a submitted fitting job ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FittingOutcome {
    Succeeded { result_url: String },
    Failed(TranslatedError),
    TimedOut { waited: Duration },
}

impl FittingOutcome {
    /// Classify a terminal job. Returns `None` for a job that is still running.
    ///
    /// When the provider returns several outputs the first one is taken as the
    /// result.
    pub fn from_terminal(job: &TryOnJob) -> Option<Self> {
        match job.status {
            JobStatus::Completed => Some(match job.output_urls.first() {
                Some(url) if !url.trim().is_empty() => FittingOutcome::Succeeded {
                    result_url: url.clone(),
                },
                _ => FittingOutcome::Failed(TranslatedError::missing_output()),
            }),
            JobStatus::Failed => Some(FittingOutcome::Failed(error_translator::translate(
                job.error.as_ref(),
            ))),
            _ => None,
        }
    }

    pub fn stage(&self) -> TryOnStage {
        match self {
            FittingOutcome::Succeeded { .. } => TryOnStage::Succeeded,
            FittingOutcome::Failed(_) => TryOnStage::Failed,
            FittingOutcome::TimedOut { .. } => TryOnStage::TimedOut,
        }
    }
}

/// Tunables for a try-on run.
#[derive(Debug, Clone)]
pub struct TryOnSettings {
    /// Provider model version sent with every job.
    pub model_name: String,
    pub poll_policy: PollPolicy,
}

/// Coordinates classification, uploads, the remote fitting job and persistence.
pub struct TryOnOrchestrator {
    predictor: Arc<dyn CategoryPredictor>,
    storage: Arc<dyn ObjectStore>,
    fitting: Arc<dyn RemoteJobClient>,
    poller: CompletionPoller,
    background: Arc<dyn BackgroundRemover>,
    store: Arc<dyn FittingStore>,
    settings: TryOnSettings,
}

impl TryOnOrchestrator {
    pub fn new(
        predictor: Arc<dyn CategoryPredictor>,
        storage: Arc<dyn ObjectStore>,
        fitting: Arc<dyn RemoteJobClient>,
        background: Arc<dyn BackgroundRemover>,
        store: Arc<dyn FittingStore>,
        settings: TryOnSettings,
    ) -> Self {
        Self {
            predictor,
            storage,
            poller: CompletionPoller::new(fitting.clone()),
            fitting,
            background,
            store,
            settings,
        }
    }

    /// Dress the referenced model in the garment and return the stored result.
    pub async fn run_try_on(
        &self,
        request: TryOnRequest,
        cancel: &CancellationToken,
    ) -> Result<TryOnResult, TryOnError> {
        let start = Instant::now();
        metrics::counter!("tryon_requests_total").increment(1);

        let model_id = request.model.model_id;
        let result = self.run_stages(request, cancel).await;

        match &result {
            Ok(outcome) => {
                metrics::histogram!("tryon_processing_seconds")
                    .record(start.elapsed().as_secs_f64());
                tracing::info!(
                    model_id = %model_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    result_url = %outcome.result_image_url,
                    "Try-on completed"
                );
            }
            Err(e) => {
                metrics::counter!("tryon_failures_total", "code" => e.code()).increment(1);
                tracing::warn!(
                    model_id = %model_id,
                    code = e.code(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Try-on failed"
                );
            }
        }

        result
    }

    async fn run_stages(
        &self,
        request: TryOnRequest,
        cancel: &CancellationToken,
    ) -> Result<TryOnResult, TryOnError> {
        let TryOnRequest {
            garment_image,
            model: reference,
            product_url,
        } = request;

        if garment_image.is_empty() {
            return Err(TryOnError::InvalidRequest(
                "Garment image is empty".to_string(),
            ));
        }

        let category = self.predict_category(&garment_image).await?;

        enter(TryOnStage::Validating, reference.model_id);
        if !category.is_supported() {
            return Err(TryOnError::InvalidRequest(format!(
                "{} garments are not supported for virtual fitting",
                category
            )));
        }

        enter(TryOnStage::ResolvingModel, reference.model_id);
        let model = self.resolve_model(&reference.owner_id, reference.model_id).await?;

        enter(TryOnStage::UploadingGarment, model.id);
        let garment_url = self
            .storage
            .upload(&garment_image, folders::GARMENTS)
            .await
            .map_err(|e| {
                tracing::error!(model_id = %model.id, error = %e, "Garment upload failed");
                TryOnError::Internal
            })?;

        enter(TryOnStage::SubmittingJob, model.id);
        let mut fitting_request =
            FittingRequest::new(&self.settings.model_name, &model.image_url, &garment_url);
        if let Some(provider_category) = category.provider_category() {
            fitting_request = fitting_request.with_category(provider_category);
        }
        let job_id = self
            .fitting
            .submit(&fitting_request)
            .await
            .map_err(|e| api_error(TryOnStage::SubmittingJob, e))?;
        tracing::info!(model_id = %model.id, job_id = %job_id, category = %category, "Fitting job submitted");

        enter(TryOnStage::Polling, model.id);
        let result_url = match self.wait_for_outcome(&job_id, cancel).await? {
            FittingOutcome::Succeeded { result_url } => result_url,
            FittingOutcome::Failed(translated) => {
                tracing::warn!(
                    job_id = %job_id,
                    classification = %translated.classification,
                    provider_error = %translated.provider_error_name,
                    provider_message = %translated.provider_message,
                    "Fitting job failed"
                );
                return Err(TryOnError::VirtualFittingFailed(translated));
            }
            FittingOutcome::TimedOut { waited } => {
                return Err(TryOnError::VirtualFittingTimeout { job_id, waited });
            }
        };

        let stored_url = self.post_process(&job_id, &result_url).await?;

        let record = FittingRecord {
            model_id: model.id,
            owner_id: model.owner_id.clone(),
            category,
            garment_url,
            product_url,
            provider_job_id: job_id.clone(),
            result_url: stored_url.clone(),
        };
        self.store.save_fitting(&record).await.map_err(|e| {
            tracing::error!(job_id = %job_id, model_id = %model.id, error = %e, "Failed to persist fitting");
            TryOnError::Internal
        })?;

        Ok(TryOnResult {
            result_image_url: stored_url,
            provider_result_url: result_url,
            model_id: model.id,
            model_name: model.name,
        })
    }

    async fn predict_category(&self, garment_image: &[u8]) -> Result<GarmentCategory, TryOnError> {
        tracing::debug!(stage = %TryOnStage::PredictingCategory, bytes = garment_image.len(), "Predicting garment category");

        let prediction = self
            .predictor
            .predict_category(garment_image)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Category prediction failed");
                TryOnError::CategoryPredictionFailed
            })?;

        prediction.category().ok_or_else(|| {
            tracing::error!(
                class_idx = prediction.class_idx,
                class_name = %prediction.class_name,
                "Classifier returned an unknown category"
            );
            TryOnError::CategoryPredictionFailed
        })
    }

    async fn resolve_model(&self, owner_id: &str, model_id: uuid::Uuid) -> Result<FittingModel, TryOnError> {
        match self.store.find_model(owner_id, model_id).await {
            Ok(Some(model)) => Ok(model),
            Ok(None) => Err(TryOnError::NotFound(format!("Model {} not found", model_id))),
            Err(e) => {
                tracing::error!(model_id = %model_id, error = %e, "Model lookup failed");
                Err(TryOnError::Internal)
            }
        }
    }

    async fn wait_for_outcome(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<FittingOutcome, TryOnError> {
        let outcome = match self
            .poller
            .wait_for_terminal(job_id, &self.settings.poll_policy, cancel)
            .await
        {
            Ok(job) => FittingOutcome::from_terminal(&job).ok_or_else(|| {
                tracing::error!(job_id = %job_id, status = ?job.status, "Poller returned a running job");
                TryOnError::Internal
            })?,
            Err(PollError::Timeout { waited, .. }) => FittingOutcome::TimedOut { waited },
            Err(PollError::Cancelled) => return Err(TryOnError::Cancelled),
            Err(PollError::Api(e)) => return Err(api_error(TryOnStage::Polling, e)),
            Err(PollError::InvalidPolicy(reason)) => {
                tracing::error!(reason = %reason, "Invalid poll policy");
                return Err(TryOnError::Internal);
            }
        };

        tracing::debug!(job_id = %job_id, stage = %outcome.stage(), "Fitting job settled");
        Ok(outcome)
    }

    /// Remove the result's background and store the processed image.
    async fn post_process(&self, job_id: &str, result_url: &str) -> Result<String, TryOnError> {
        let processed = self
            .background
            .remove_background(result_url)
            .await
            .map_err(|e| {
                tracing::error!(job_id = %job_id, result_url = %result_url, error = %e, "Background removal failed");
                TryOnError::BackgroundRemovalFailed
            })?;

        self.storage
            .upload(&processed, folders::RESULTS)
            .await
            .map_err(|e| {
                tracing::error!(job_id = %job_id, error = %e, "Result upload failed");
                TryOnError::Internal
            })
    }
}

fn enter(stage: TryOnStage, model_id: uuid::Uuid) {
    tracing::debug!(stage = %stage, model_id = %model_id, "Entering try-on stage");
}

fn api_error(stage: TryOnStage, err: FittingApiError) -> TryOnError {
    tracing::error!(
        stage = %stage,
        provider_fault = err.is_provider_fault(),
        error = %err,
        "Fitting provider call failed"
    );
    TryOnError::VirtualFittingApiError {
        message: err.user_message(),
        provider_fault: err.is_provider_fault(),
    }
}
