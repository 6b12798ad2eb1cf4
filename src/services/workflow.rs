//! Validated mutation workflow shared by every create and update form
//!
//! A submission is validated and sanitized, then a candidate record is built
//! from the sanitized values whatever the validation outcome. Rejected
//! candidates are shown again on their form with the field errors and freshly
//! loaded reference data; accepted ones are persisted and the client is
//! redirected to the stored record.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    forms::{self, FieldRules, FieldSanitizers, FormData, SanitizedInput},
    views::{Outcome, Page},
};

/// Whether a submission creates a record or replaces an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update(Uuid),
}

impl Mode {
    /// Id of the record being written
    pub fn record_id(&self) -> Uuid {
        match self {
            Mode::Create => Uuid::new_v4(),
            Mode::Update(id) => *id,
        }
    }
}

/// Per-record configuration of the workflow
#[async_trait]
pub trait FormSpec: Send + Sync {
    type Record: Serialize + Send + Sync;

    const TEMPLATE: &'static str;
    /// Payload key holding the record on the form page
    const RECORD_KEY: &'static str;

    fn title(&self, mode: Mode) -> &'static str;

    fn rules(&self) -> Vec<FieldRules>;

    fn sanitizers(&self) -> Vec<FieldSanitizers>;

    /// Reshape raw input before validation
    fn prepare(&self, _form: &mut FormData) {}

    fn build(&self, input: &SanitizedInput, id: Uuid) -> Self::Record;

    /// Add the selection lists the form needs, marked from `record`
    async fn reference_data(
        &self,
        _record: Option<&Self::Record>,
        _page: &mut Page,
    ) -> AppResult<()> {
        Ok(())
    }

    /// Store an accepted record and return the location to redirect to
    async fn persist(&self, record: Self::Record, mode: Mode) -> AppResult<String>;
}

/// Form page for `record`, or an empty form when there is none
pub async fn form_page<F: FormSpec>(
    spec: &F,
    mode: Mode,
    record: Option<&F::Record>,
) -> AppResult<Page> {
    let mut page = Page::new(F::TEMPLATE, spec.title(mode)).with_errors(&[]);
    if let Some(record) = record {
        page.insert(F::RECORD_KEY, record);
    }
    spec.reference_data(record, &mut page).await?;
    Ok(page)
}

/// Run a form submission through validation and either persistence or redisplay
pub async fn submit<F: FormSpec>(spec: &F, mode: Mode, mut form: FormData) -> AppResult<Outcome> {
    spec.prepare(&mut form);

    let errors = forms::validate(&form, &spec.rules());
    let input = forms::sanitize(&form, &spec.sanitizers());
    let candidate = spec.build(&input, mode.record_id());

    if !errors.is_empty() {
        tracing::debug!(
            "Rejected {} submission with {} error(s)",
            F::RECORD_KEY,
            errors.len()
        );
        let page = form_page(spec, mode, Some(&candidate))
            .await?
            .with_errors(&errors);
        return Ok(Outcome::Render(page));
    }

    let location = spec.persist(candidate, mode).await?;
    tracing::info!("Saved {} ({:?}), redirecting to {}", F::RECORD_KEY, mode, location);
    Ok(Outcome::Redirect(location))
}
