//! Contact service
//!
//! Intake for the contact / recruitment form and the admin inbox over it.

use std::sync::Arc;

use crate::db::repositories::ContactRepository;
use crate::models::{ContactSubmission, CreateContactInput};
use crate::services::validation::{validate_contact, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ContactServiceError {
    #[error("{0}")]
    ValidationError(String),

    #[error("Contact submission not found: {0}")]
    NotFound(i64),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<ValidationError> for ContactServiceError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err.0)
    }
}

pub struct ContactService {
    repo: Arc<dyn ContactRepository>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepository>) -> Self {
        Self { repo }
    }

    /// Validate, trim and store a submission as unread
    pub async fn submit(
        &self,
        input: CreateContactInput,
    ) -> Result<ContactSubmission, ContactServiceError> {
        let input = validate_contact(&input)?;
        let submission = self.repo.create(&input).await?;
        tracing::info!(submission_id = submission.id, "Contact submission received");
        Ok(submission)
    }

    pub async fn list(&self) -> Result<Vec<ContactSubmission>, ContactServiceError> {
        Ok(self.repo.list_all().await?)
    }

    pub async fn set_read(
        &self,
        id: i64,
        read: bool,
    ) -> Result<ContactSubmission, ContactServiceError> {
        let submission = self
            .repo
            .set_read(id, read)
            .await?
            .ok_or(ContactServiceError::NotFound(id))?;
        tracing::info!(submission_id = id, read, "Contact read flag changed");
        Ok(submission)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ContactServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ContactServiceError::NotFound(id));
        }
        tracing::info!(submission_id = id, "Contact submission deleted");
        Ok(())
    }
}
