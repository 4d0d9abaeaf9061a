use tracing::*;

use super::record::Record;
use crate::{Error, Result};

/// Outcome of an operation whose API errors were captured on the record.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled<T> {
    Success(T),
    Failed,
}

impl<T> Handled<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Handled::Success(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Handled::Failed)
    }

    pub fn success(self) -> Option<T> {
        match self {
            Handled::Success(value) => Some(value),
            Handled::Failed => None,
        }
    }
}

impl<T> From<Handled<T>> for bool {
    fn from(handled: Handled<T>) -> Self {
        handled.is_success()
    }
}

impl Record {
    /// Awaits `operation`, recording a recognized API error on this record instead of
    /// returning it. Other errors pass through.
    pub async fn handle_api_errors<T>(
        &self,
        operation: impl Future<Output = Result<T>>,
    ) -> Result<Handled<T>> {
        match operation.await {
            Ok(value) => {
                self.clear_errors();
                Ok(Handled::Success(value))
            }

            Err(Error::Api(error)) => {
                warn!(
                    model = self.schema().name(),
                    status = %error.status,
                    code = %error.error,
                    "API error captured"
                );
                self.capture_error(error);
                Ok(Handled::Failed)
            }

            Err(error) => Err(error),
        }
    }
}
