//! Request bodies and their validation.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

use db::models::NewWorker;

const MAX_NAME_LEN: usize = 255;
const MAX_DOCUMENT_LEN: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("dateOfBirth must not be in the future")]
    BirthDateInFuture,
}

/// Body of `POST /workers`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkerDto {
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub date_of_birth: NaiveDate,
}

fn required(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(value.to_owned())
}

impl CreateWorkerDto {
    /// Check the payload and turn it into insertable column values.
    pub fn validate(self, today: NaiveDate) -> Result<NewWorker, ValidationError> {
        let first_name = required("firstName", &self.first_name, MAX_NAME_LEN)?;
        let last_name = required("lastName", &self.last_name, MAX_NAME_LEN)?;
        let document_number = required("documentNumber", &self.document_number, MAX_DOCUMENT_LEN)?;

        if self.date_of_birth > today {
            return Err(ValidationError::BirthDateInFuture);
        }

        Ok(NewWorker {
            first_name,
            last_name,
            document_number,
            date_of_birth: self.date_of_birth,
        })
    }

    pub fn validate_now(self) -> Result<NewWorker, ValidationError> {
        self.validate(Utc::now().date_naive())
    }
}
