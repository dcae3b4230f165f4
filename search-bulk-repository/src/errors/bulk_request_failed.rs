//! The aggregated report of a partially failed bulk request.

use std::fmt;

use serde_json::Value;

use super::WorkError;
use crate::interfaces::BulkableWork;

/// A work that succeeded, paired with its slice of the bulk response.
#[derive(Debug)]
pub struct SucceededWork {
    /// The work that succeeded.
    pub work: Box<dyn BulkableWork>,
    /// The response item matched to the work, if the response had items.
    pub result: Option<Value>,
}

/// Report of a bulk request in which at least one work failed.
///
/// Every submitted work ends up in exactly one of [`successful`] or
/// [`failed`], both in submission order. Errors raised by result handlers are
/// kept as suppressed causes: they explain why some works are in the failed
/// list but are not the primary error.
///
/// [`successful`]: BulkRequestFailedError::successful
/// [`failed`]: BulkRequestFailedError::failed
#[derive(Debug)]
pub struct BulkRequestFailedError {
    request: String,
    response: String,
    successful: Vec<SucceededWork>,
    failed: Vec<Box<dyn BulkableWork>>,
    suppressed: Vec<WorkError>,
}

impl BulkRequestFailedError {
    /// Create a report from the formatted request and response and the classified works.
    pub fn new(
        request: impl Into<String>,
        response: impl Into<String>,
        successful: Vec<SucceededWork>,
        failed: Vec<Box<dyn BulkableWork>>,
    ) -> Self {
        Self {
            request: request.into(),
            response: response.into(),
            successful,
            failed,
            suppressed: Vec::new(),
        }
    }

    /// Attach an error raised by a result handler.
    pub fn add_suppressed(&mut self, error: WorkError) {
        self.suppressed.push(error);
    }

    /// The outbound request, formatted for diagnostics.
    pub fn request(&self) -> &str {
        &self.request
    }

    /// The raw response, formatted for diagnostics.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Works that succeeded, with their response items.
    pub fn successful(&self) -> &[SucceededWork] {
        &self.successful
    }

    /// Works that failed.
    pub fn failed(&self) -> &[Box<dyn BulkableWork>] {
        &self.failed
    }

    /// Errors raised by result handlers while classifying the works.
    pub fn suppressed(&self) -> &[WorkError] {
        &self.suppressed
    }

    /// Total number of works in the bulk request.
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
}

impl fmt::Display for BulkRequestFailedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bulk request failed: {} of {} works failed",
            self.failed.len(),
            self.total()
        )?;
        if !self.suppressed.is_empty() {
            write!(f, " ({} result handler errors)", self.suppressed.len())?;
        }
        write!(f, "\nRequest: {}\nResponse: {}", self.request, self.response)
    }
}

// Suppressed errors are not the cause of the report, so there is no `source`.
impl std::error::Error for BulkRequestFailedError {}
