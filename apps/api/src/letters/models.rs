use serde::{Deserialize, Serialize};

/// Salutation target used when an application names no hiring manager.
pub const DEFAULT_HIRING_MANAGER: &str = "Hiring Manager";

// ────────────────────────────────────────────────────────────────────────────
// Wire types (request)
// ────────────────────────────────────────────────────────────────────────────

/// Raw request body for `POST /api/generate`.
///
/// Every field is optional at the serde layer so that missing required
/// fields surface as a validation error rather than a deserialization one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateLettersRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub linkedin: Option<String>,
    pub applications: Option<Vec<ApplicationEntry>>,
}

/// One entry of the `applications` array, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationEntry {
    pub company: Option<String>,
    pub role: Option<String>,
    pub hiring_manager: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validated domain types
// ────────────────────────────────────────────────────────────────────────────

/// The applicant's identity and contact details. Optional fields are `None`
/// when absent or blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantProfile {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub linkedin: Option<String>,
}

/// A single (company, role, hiring manager) tuple to write a letter for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationTarget {
    pub company: String,
    pub role: String,
    pub hiring_manager: Option<String>,
}

impl ApplicationTarget {
    /// The name to address the letter to.
    pub fn resolved_hiring_manager(&self) -> &str {
        self.hiring_manager
            .as_deref()
            .unwrap_or(DEFAULT_HIRING_MANAGER)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (response)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterStatus {
    Generated,
    Failed,
}

/// Result for one application target. Echoes the contact fields the
/// browser needs to render a PDF without keeping its own copy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedLetter {
    pub company: String,
    pub role: String,
    pub hiring_manager: String,
    /// Holds `"Error: ..."` when generation failed.
    pub cover_letter: String,
    pub email_subject: String,
    pub email_body: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub linkedin: Option<String>,
    pub status: LetterStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateLettersResponse {
    pub letters: Vec<GeneratedLetter>,
}
