//! Letter assembly: turns generated text (or its failure) into a `GeneratedLetter`.
//!
//! Subject and email body are templated deterministically; only the cover
//! letter depends on the text provider.

use crate::letters::models::{ApplicantProfile, ApplicationTarget, GeneratedLetter, LetterStatus};
use crate::letters::provider::GenerationError;

pub fn email_subject(target: &ApplicationTarget) -> String {
    format!("Application for {} at {}", target.role, target.company)
}

/// Email draft with one contact line per present field, email before phone.
pub fn email_body(profile: &ApplicantProfile, target: &ApplicationTarget) -> String {
    let mut lines = vec![
        format!("Hello {} Hiring Team,", target.company),
        String::new(),
        format!(
            "I'm excited to apply for the {} position at {}. I've attached my resume and cover letter for your review.",
            target.role, target.company
        ),
        String::new(),
        "Best regards,".to_string(),
        profile.full_name.clone(),
    ];
    if let Some(email) = &profile.email {
        lines.push(format!("Email: {email}"));
    }
    if let Some(phone) = &profile.phone {
        lines.push(format!("Phone: {phone}"));
    }
    lines.join("\n")
}

pub fn assemble(
    profile: &ApplicantProfile,
    target: &ApplicationTarget,
    generated: Result<String, GenerationError>,
) -> GeneratedLetter {
    let (cover_letter, status, error) = match generated {
        Ok(text) => (text.trim().to_string(), LetterStatus::Generated, None),
        Err(e) => {
            let message = e.to_string();
            (format!("Error: {message}"), LetterStatus::Failed, Some(message))
        }
    };

    GeneratedLetter {
        company: target.company.clone(),
        role: target.role.clone(),
        hiring_manager: target.resolved_hiring_manager().to_string(),
        cover_letter,
        email_subject: email_subject(target),
        email_body: email_body(profile, target),
        full_name: profile.full_name.clone(),
        email: profile.email.clone(),
        phone: profile.phone.clone(),
        github: profile.github.clone(),
        portfolio: profile.portfolio.clone(),
        linkedin: profile.linkedin.clone(),
        status,
        error,
    }
}
