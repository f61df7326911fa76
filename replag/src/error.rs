use std::error;
use std::fmt;

/// Convenient result type for harness operations using [`BenchError`] as the error type.
///
/// This type alias reduces boilerplate when working with fallible harness operations.
/// Most harness functions return this type.
pub type BenchResult<T> = Result<T, BenchError>;

/// Main error type for harness operations.
///
/// [`BenchError`] provides a comprehensive error system that can represent single errors,
/// errors with additional detail, or multiple aggregated errors. The design allows for
/// rich error information while maintaining ergonomic usage patterns.
#[derive(Debug, Clone)]
pub struct BenchError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
///
/// This enum supports different error patterns while maintaining a unified interface.
/// Users should not interact with this type directly but use [`BenchError`] methods instead.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Error with kind and static description
    WithDescription(ErrorKind, &'static str),
    /// Error with kind, static description, and dynamic detail
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    /// Multiple aggregated errors
    Many(Vec<BenchError>),
}

/// Specific categories of errors that can occur during a benchmark run.
///
/// This enum provides granular error classification to enable appropriate error handling
/// strategies. Error kinds are organized by functional area and failure mode.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Control Plane Errors
    ProvisionFailed,
    ControlPlaneRequestFailed,
    ControlPlaneOperationFailed,

    // Database Errors
    ConnectionFailed,
    AuthenticationFailed,
    QueryFailed,
    MissingColumn,
    ConversionError,
    InvalidPosition,

    // Replication Errors
    ReplicationSetupFailed,
    LagTimeout,
    ConvergenceMismatch,

    // Workload Errors
    WorkloadStartFailed,
    WorkloadDied,

    // Fault Injection & Teardown Errors
    FaultInjectionFailed,
    CleanupFailed,

    // IO & Serialization Errors
    EncryptionError,
    IoError,
    DeserializationError,

    // Unknown / Uncategorized
    Unknown,
}

impl BenchError {
    /// Creates a [`BenchError`] containing multiple aggregated errors.
    ///
    /// This is useful when multiple operations fail and you want to report all failures
    /// rather than just the first one.
    pub fn many(errors: Vec<BenchError>) -> BenchError {
        BenchError {
            repr: ErrorRepr::Many(errors),
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or [`ErrorKind::Unknown`]
    /// if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
            ErrorRepr::Many(ref errors) => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    ///
    /// For single errors, returns a vector with one element. For multiple errors,
    /// returns a flattened vector of all error kinds.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => vec![kind],
            ErrorRepr::Many(ref errors) => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For multiple errors, returns the detail of the first error that has one.
    /// Returns [`None`] if no detailed information is available.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::Many(ref errors) => {
                // For multiple errors, return the detail of the first error that has one
                errors.iter().find_map(|e| e.detail())
            }
            _ => None,
        }
    }
}

impl PartialEq for BenchError {
    fn eq(&self, other: &BenchError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::WithDescription(kind_a, _), ErrorRepr::WithDescription(kind_b, _)) => {
                kind_a == kind_b
            }
            (
                ErrorRepr::WithDescriptionAndDetail(kind_a, _, _),
                ErrorRepr::WithDescriptionAndDetail(kind_b, _, _),
            ) => kind_a == kind_b,
            (ErrorRepr::Many(errors_a), ErrorRepr::Many(errors_b)) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;

                Ok(())
            }
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                f.write_str(" -> ")?;
                detail.fmt(f)?;

                Ok(())
            }
            ErrorRepr::Many(ref errors) => {
                if errors.is_empty() {
                    write!(f, "Multiple errors occurred (empty)")?;
                } else if errors.len() == 1 {
                    // If there's only one error, just display it directly
                    errors[0].fmt(f)?;
                } else {
                    write!(f, "Multiple errors occurred ({} total):", errors.len())?;
                    for (i, error) in errors.iter().enumerate() {
                        write!(f, "\n  {}: {}", i + 1, error)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl error::Error for BenchError {}

/// Creates a [`BenchError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for BenchError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> BenchError {
        BenchError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

/// Creates a [`BenchError`] from an error kind, static description, and dynamic detail.
impl From<(ErrorKind, &'static str, String)> for BenchError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> BenchError {
        BenchError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

/// Creates a [`BenchError`] from a vector of errors for aggregation.
impl<E> From<Vec<E>> for BenchError
where
    E: Into<BenchError>,
{
    fn from(errors: Vec<E>) -> BenchError {
        BenchError {
            repr: ErrorRepr::Many(errors.into_iter().map(Into::into).collect()),
        }
    }
}

// Common standard library error conversions

/// Converts [`std::io::Error`] to [`BenchError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> BenchError {
        BenchError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::IoError,
                "I/O error occurred",
                err.to_string(),
            ),
        }
    }
}

/// Converts [`serde_json::Error`] to [`BenchError`] with appropriate error kind.
///
/// Maps I/O failures to [`ErrorKind::IoError`] and everything else to
/// [`ErrorKind::DeserializationError`] based on error classification.
impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> BenchError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
        };

        BenchError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}

/// Converts [`std::num::ParseIntError`] to [`BenchError`] with [`ErrorKind::ConversionError`].
impl From<std::num::ParseIntError> for BenchError {
    fn from(err: std::num::ParseIntError) -> BenchError {
        BenchError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::ConversionError,
                "Integer parsing failed",
                err.to_string(),
            ),
        }
    }
}

/// Converts [`tokio_postgres::Error`] to [`BenchError`] with appropriate error kind.
///
/// Maps errors based on PostgreSQL SQLSTATE codes so that connectivity loss, which
/// is expected while an endpoint restarts, can be told apart from genuine query
/// failures.
impl From<tokio_postgres::Error> for BenchError {
    fn from(err: tokio_postgres::Error) -> BenchError {
        let (kind, description) = match err.code() {
            Some(sqlstate) => {
                use tokio_postgres::error::SqlState;

                match *sqlstate {
                    // Connection errors (08xxx)
                    SqlState::CONNECTION_EXCEPTION
                    | SqlState::CONNECTION_DOES_NOT_EXIST
                    | SqlState::CONNECTION_FAILURE
                    | SqlState::SQLCLIENT_UNABLE_TO_ESTABLISH_SQLCONNECTION
                    | SqlState::SQLSERVER_REJECTED_ESTABLISHMENT_OF_SQLCONNECTION => {
                        (ErrorKind::ConnectionFailed, "PostgreSQL connection error")
                    }

                    // Authentication errors (28xxx)
                    SqlState::INVALID_AUTHORIZATION_SPECIFICATION | SqlState::INVALID_PASSWORD => (
                        ErrorKind::AuthenticationFailed,
                        "PostgreSQL authentication failed",
                    ),

                    // Resource errors (53xxx)
                    SqlState::INSUFFICIENT_RESOURCES
                    | SqlState::OUT_OF_MEMORY
                    | SqlState::TOO_MANY_CONNECTIONS => (
                        ErrorKind::ConnectionFailed,
                        "PostgreSQL resource limitation",
                    ),

                    // Shutdown and recovery errors (57xxx)
                    SqlState::ADMIN_SHUTDOWN | SqlState::CRASH_SHUTDOWN => {
                        (ErrorKind::ConnectionFailed, "PostgreSQL server shutdown")
                    }
                    SqlState::CANNOT_CONNECT_NOW => (
                        ErrorKind::ConnectionFailed,
                        "PostgreSQL database starting up",
                    ),
                    SqlState::IDLE_SESSION_TIMEOUT => (
                        ErrorKind::ConnectionFailed,
                        "PostgreSQL idle session timeout",
                    ),

                    // Default for other SQL states
                    _ => (ErrorKind::QueryFailed, "PostgreSQL error"),
                }
            }
            // No SQL state means connection issue
            None => (ErrorKind::ConnectionFailed, "PostgreSQL connection failed"),
        };

        BenchError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}

/// Converts [`reqwest::Error`] to [`BenchError`] with appropriate error kind.
///
/// Maps body decoding failures to [`ErrorKind::DeserializationError`] and all other
/// transport failures to [`ErrorKind::ControlPlaneRequestFailed`].
impl From<reqwest::Error> for BenchError {
    fn from(err: reqwest::Error) -> BenchError {
        let (kind, description) = if err.is_decode() {
            (
                ErrorKind::DeserializationError,
                "Control plane response decoding failed",
            )
        } else {
            (
                ErrorKind::ControlPlaneRequestFailed,
                "Control plane request failed",
            )
        };

        BenchError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}

/// Converts [`rustls::Error`] to [`BenchError`] with [`ErrorKind::EncryptionError`].
impl From<rustls::Error> for BenchError {
    fn from(err: rustls::Error) -> BenchError {
        BenchError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::EncryptionError,
                "TLS configuration failed",
                err.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bail, bench_error};

    #[test]
    fn test_simple_error_creation() {
        let err = BenchError::from((ErrorKind::ConnectionFailed, "Database connection failed"));
        assert_eq!(err.kind(), ErrorKind::ConnectionFailed);
        assert_eq!(err.detail(), None);
        assert_eq!(err.kinds(), vec![ErrorKind::ConnectionFailed]);
    }

    #[test]
    fn test_error_with_detail() {
        let err = BenchError::from((
            ErrorKind::QueryFailed,
            "SQL query execution failed",
            "Table 'pgbench_accounts' doesn't exist".to_string(),
        ));
        assert_eq!(err.kind(), ErrorKind::QueryFailed);
        assert_eq!(
            err.detail(),
            Some("Table 'pgbench_accounts' doesn't exist")
        );
        assert_eq!(err.kinds(), vec![ErrorKind::QueryFailed]);
    }

    #[test]
    fn test_multiple_errors() {
        let errors = vec![
            BenchError::from((ErrorKind::CleanupFailed, "Workload termination failed")),
            BenchError::from((ErrorKind::ControlPlaneRequestFailed, "Project delete failed")),
            BenchError::from((ErrorKind::IoError, "Connection timeout")),
        ];
        let multi_err = BenchError::many(errors);

        assert_eq!(multi_err.kind(), ErrorKind::CleanupFailed);
        assert_eq!(
            multi_err.kinds(),
            vec![
                ErrorKind::CleanupFailed,
                ErrorKind::ControlPlaneRequestFailed,
                ErrorKind::IoError
            ]
        );
        assert_eq!(multi_err.detail(), None);
    }

    #[test]
    fn test_multiple_errors_with_detail() {
        let errors = vec![
            BenchError::from((
                ErrorKind::CleanupFailed,
                "Workload termination failed",
                "pgbench did not exit".to_string(),
            )),
            BenchError::from((ErrorKind::ControlPlaneRequestFailed, "Project delete failed")),
        ];
        let multi_err = BenchError::many(errors);

        assert_eq!(multi_err.detail(), Some("pgbench did not exit"));
    }

    #[test]
    fn test_from_vector() {
        let errors = vec![
            BenchError::from((ErrorKind::CleanupFailed, "Error 1")),
            BenchError::from((ErrorKind::ConversionError, "Error 2")),
        ];
        let multi_err = BenchError::from(errors);
        assert_eq!(multi_err.kinds().len(), 2);
    }

    #[test]
    fn test_empty_multiple_errors() {
        let multi_err = BenchError::many(vec![]);
        assert_eq!(multi_err.kind(), ErrorKind::Unknown);
        assert_eq!(multi_err.kinds(), vec![]);
        assert_eq!(multi_err.detail(), None);
    }

    #[test]
    fn test_error_equality() {
        let err1 = BenchError::from((ErrorKind::ConnectionFailed, "Connection failed"));
        let err2 = BenchError::from((ErrorKind::ConnectionFailed, "Connection failed"));
        let err3 = BenchError::from((ErrorKind::QueryFailed, "Query failed"));

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn test_error_display() {
        let err = BenchError::from((ErrorKind::ConnectionFailed, "Database connection failed"));
        let display_str = format!("{err}");
        assert!(display_str.contains("ConnectionFailed"));
        assert!(display_str.contains("Database connection failed"));
    }

    #[test]
    fn test_error_display_with_detail() {
        let err = BenchError::from((
            ErrorKind::QueryFailed,
            "SQL query failed",
            "Invalid table name".to_string(),
        ));
        let display_str = format!("{err}");
        assert!(display_str.contains("QueryFailed"));
        assert!(display_str.contains("SQL query failed"));
        assert!(display_str.contains("Invalid table name"));
    }

    #[test]
    fn test_multiple_errors_display() {
        let errors = vec![
            BenchError::from((ErrorKind::CleanupFailed, "Workload termination failed")),
            BenchError::from((ErrorKind::ControlPlaneRequestFailed, "Project delete failed")),
        ];
        let multi_err = BenchError::many(errors);
        let display_str = format!("{multi_err}");
        assert!(display_str.contains("Multiple errors"));
        assert!(display_str.contains("2 total"));
    }

    #[test]
    fn test_macro_usage() {
        let err = bench_error!(ErrorKind::LagTimeout, "Subscriber did not catch up");
        assert_eq!(err.kind(), ErrorKind::LagTimeout);
        assert_eq!(err.detail(), None);

        let err_with_detail = bench_error!(
            ErrorKind::ConversionError,
            "Type conversion failed",
            "Cannot convert string to integer: 'abc'"
        );
        assert_eq!(err_with_detail.kind(), ErrorKind::ConversionError);
        assert!(err_with_detail.detail().unwrap().contains("Cannot convert"));
    }

    #[test]
    fn test_bail_macro() {
        fn test_function() -> BenchResult<i32> {
            bail!(ErrorKind::LagTimeout, "Test error");
        }

        fn test_function_with_detail() -> BenchResult<i32> {
            bail!(
                ErrorKind::ConversionError,
                "Test error",
                "Additional detail"
            );
        }

        let result = test_function();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LagTimeout);

        let result = test_function_with_detail();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConversionError);
        assert!(err.detail().unwrap().contains("Additional detail"));
    }

    #[test]
    fn test_nested_multiple_errors() {
        let inner_errors = vec![
            BenchError::from((ErrorKind::ConversionError, "Inner error 1")),
            BenchError::from((ErrorKind::CleanupFailed, "Inner error 2")),
        ];
        let inner_multi = BenchError::many(inner_errors);

        let outer_errors = vec![
            inner_multi,
            BenchError::from((ErrorKind::IoError, "Outer error")),
        ];
        let outer_multi = BenchError::many(outer_errors);

        let kinds = outer_multi.kinds();
        assert_eq!(kinds.len(), 3);
        assert!(kinds.contains(&ErrorKind::ConversionError));
        assert!(kinds.contains(&ErrorKind::CleanupFailed));
        assert!(kinds.contains(&ErrorKind::IoError));
    }

    #[test]
    fn test_json_error_classification() {
        // Test syntax error during deserialization
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let bench_err = BenchError::from(json_err);
        assert_eq!(bench_err.kind(), ErrorKind::DeserializationError);
        assert!(bench_err.detail().unwrap().contains("expected"));

        // Test data error during deserialization
        let json_err = serde_json::from_str::<bool>("\"not_a_bool\"").unwrap_err();
        let bench_err = BenchError::from(json_err);
        assert_eq!(bench_err.kind(), ErrorKind::DeserializationError);
        assert!(bench_err.detail().is_some());
    }
}
