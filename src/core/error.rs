//! Error handling for configuration propagation
//!
//! Configuration-phase failures abort the pass before any module is handed to
//! the build executor. Missing publishing credentials are deliberately not an
//! error and never show up here.

use thiserror::Error;

/// Main error type for configuration propagation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    // Registry errors
    #[error("[{module}] duplicate {field} '{value}' (already declared by module '{existing}')")]
    DuplicateModule {
        /// Colliding field: "name" or "pluginId"
        field: String,
        value: String,
        module: String,
        existing: String,
    },

    // License errors
    #[error("[{module}] license header placeholder '${{{placeholder}}}' has no property")]
    UnresolvedPlaceholder { module: String, placeholder: String },

    // Loader errors
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

impl ConfigurationError {
    /// Get the module name associated with this error, if any
    pub fn module(&self) -> Option<&str> {
        match self {
            Self::DuplicateModule { module, .. } | Self::UnresolvedPlaceholder { module, .. } => {
                Some(module)
            }
            Self::InvalidConfig { .. } | Self::Io { .. } => None,
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::DuplicateModule { .. } => vec![
                "Give every module a unique name",
                "Give every module a unique plugin id",
            ],
            Self::UnresolvedPlaceholder { .. } => vec![
                "Add the missing key under license.properties",
                "Remove the placeholder from the license header template",
            ],
            Self::InvalidConfig { .. } => {
                vec!["Run `build-propagator check` to list configuration problems"]
            }
            Self::Io { .. } => vec![
                "Check that the file exists",
                "Check file permissions",
            ],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateModule { .. } => "DUPLICATE_MODULE",
            Self::UnresolvedPlaceholder { .. } => "UNRESOLVED_PLACEHOLDER",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::Io { .. } => "IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_module_error() {
        let error = ConfigurationError::DuplicateModule {
            field: "pluginId".to_string(),
            value: "org.example.plugin".to_string(),
            module: "run".to_string(),
            existing: "builder".to_string(),
        };

        assert_eq!(error.module(), Some("run"));
        assert_eq!(error.code(), "DUPLICATE_MODULE");
        let message = error.to_string();
        assert!(message.contains("pluginId"));
        assert!(message.contains("org.example.plugin"));
        assert!(message.contains("builder"));
    }

    #[test]
    fn test_unresolved_placeholder_error() {
        let error = ConfigurationError::UnresolvedPlaceholder {
            module: "slib".to_string(),
            placeholder: "author".to_string(),
        };

        assert_eq!(error.module(), Some("slib"));
        assert_eq!(error.code(), "UNRESOLVED_PLACEHOLDER");
        assert_eq!(
            error.to_string(),
            "[slib] license header placeholder '${author}' has no property"
        );
        assert!(!error.suggested_actions().is_empty());
    }

    #[test]
    fn test_invalid_config_has_no_module() {
        let error = ConfigurationError::InvalidConfig {
            message: "no modules declared".to_string(),
        };

        assert!(error.module().is_none());
        assert_eq!(error.code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_io_error_display() {
        let error = ConfigurationError::Io {
            path: "license_header.txt".to_string(),
            message: "not found".to_string(),
        };

        assert!(error.to_string().contains("license_header.txt"));
        assert_eq!(error.code(), "IO_ERROR");
    }
}
