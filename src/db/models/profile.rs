use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WisaError};

/// Listing row for a stored profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub name: String,
    pub window_count: usize,
    pub saved_at: Option<DateTime<Utc>>,
}

/// Profile names are case-sensitive identity keys and must contain at least
/// one non-whitespace character.
pub fn validate_profile_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(WisaError::Validation(
            "profile name must not be empty".into(),
        ));
    }
    if name.contains(['\n', '\r']) {
        return Err(WisaError::Validation(format!(
            "profile name {name:?} must be a single line"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_names() {
        for name in ["", "   ", "\t"] {
            let err = validate_profile_name(name).unwrap_err();
            assert!(matches!(err, WisaError::Validation(_)), "{name:?}");
        }
    }

    #[test]
    fn accepts_names_with_inner_spaces_and_case() {
        assert!(validate_profile_name("Work").is_ok());
        assert!(validate_profile_name("deep focus").is_ok());
    }

    #[test]
    fn rejects_multiline_names() {
        assert!(validate_profile_name("a\nb").is_err());
    }
}
