//! Error types for the service registry

use thiserror::Error;

/// Errors that can occur while resolving, injecting or registering services.
///
/// `Clone` so that a failed lazy entry can hand the same recorded failure to
/// every later caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// An annotated field names a service that was never registered
    #[error("service '{service}' not found for field '{field}'")]
    ServiceNotFound { service: String, field: String },

    /// The registered value has no view of the field's type
    #[error(
        "service '{service}' is not assignable to field '{field}': expected {expected}, found {actual}"
    )]
    TypeMismatch {
        service: String,
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A factory reported an error or panicked
    #[error("failed to construct service '{service}': {reason}")]
    ConstructionFailed { service: String, reason: String },

    /// A module (transitively) imports itself
    #[error("cyclic module import at '{module}': {}", .cycle.join(" -> "))]
    CyclicImport { module: String, cycle: Vec<String> },
}

impl DiError {
    /// Create a ServiceNotFound error
    #[inline]
    pub fn service_not_found(service: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service: service.into(),
            field: field.into(),
        }
    }

    /// Create a TypeMismatch error for a field expecting `Arc<X>`
    #[inline]
    pub fn type_mismatch<X: ?Sized + 'static>(
        service: impl Into<String>,
        field: impl Into<String>,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            service: service.into(),
            field: field.into(),
            expected: std::any::type_name::<X>(),
            actual,
        }
    }

    /// Create a ConstructionFailed error
    #[inline]
    pub fn construction_failed(service: impl Into<String>, reason: impl ToString) -> Self {
        Self::ConstructionFailed {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    /// The service name this error is about, if any
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::ServiceNotFound { service, .. }
            | Self::TypeMismatch { service, .. }
            | Self::ConstructionFailed { service, .. } => Some(service),
            Self::CyclicImport { .. } => None,
        }
    }
}

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_service_and_field() {
        let err = DiError::service_not_found("Logger", "logger");
        assert_eq!(err.to_string(), "service 'Logger' not found for field 'logger'");

        let err = DiError::type_mismatch::<str>("Config", "config", "u32");
        assert_eq!(
            err.to_string(),
            "service 'Config' is not assignable to field 'config': expected str, found u32"
        );
    }

    #[test]
    fn test_cycle_message() {
        let err = DiError::CyclicImport {
            module: "a".into(),
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic module import at 'a': a -> b -> a");
        assert_eq!(err.service(), None);
    }
}
