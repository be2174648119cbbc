//! Turns a raw request body into a validated profile and target list.

use tracing::debug;

use crate::errors::AppError;
use crate::letters::models::{
    ApplicantProfile, ApplicationEntry, ApplicationTarget, GenerateLettersRequest,
};

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: fullName or applications";

/// Validates the request.
///
/// Entries with a blank company or role are dropped; the request fails only
/// when `fullName` is blank or no usable entry remains.
pub fn validate_request(
    request: GenerateLettersRequest,
) -> Result<(ApplicantProfile, Vec<ApplicationTarget>), AppError> {
    let full_name = non_blank(request.full_name)
        .ok_or_else(|| AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()))?;

    let entries = request.applications.unwrap_or_default();
    let submitted = entries.len();
    let targets: Vec<ApplicationTarget> = entries.into_iter().filter_map(to_target).collect();

    if targets.is_empty() {
        return Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
    }
    if targets.len() < submitted {
        debug!(
            "Dropped {} application entries with blank company or role",
            submitted - targets.len()
        );
    }

    let profile = ApplicantProfile {
        full_name,
        email: non_blank(request.email),
        phone: non_blank(request.phone),
        github: non_blank(request.github),
        portfolio: non_blank(request.portfolio),
        linkedin: non_blank(request.linkedin),
    };

    Ok((profile, targets))
}

fn to_target(entry: ApplicationEntry) -> Option<ApplicationTarget> {
    Some(ApplicationTarget {
        company: non_blank(entry.company)?,
        role: non_blank(entry.role)?,
        hiring_manager: non_blank(entry.hiring_manager),
    })
}

/// Keeps the value verbatim unless it is absent or whitespace-only.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
