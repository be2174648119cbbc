// All LLM prompt constants for cover-letter generation.
// Only the company, role, hiring manager and signature vary per call.

use crate::letters::models::{ApplicantProfile, ApplicationTarget};

/// Upper bound on the letter body length the model is asked to respect.
pub const MAX_WORDS: u32 = 180;

/// System prompt sent alongside every cover-letter request.
pub const LETTER_SYSTEM: &str = "You are an experienced career writer who drafts concise, \
    warm and professional cover letters for software developers. \
    Respond with the letter text only, as plain text. \
    Do NOT use markdown. \
    Do NOT include explanations or apologies.";

/// Background the letter may draw on. Nothing else about the applicant is known.
const BACKGROUND_FACTS: &str = "\
    - a background in software development\n\
    - a passion for building user-centred web applications\n\
    - hands-on experience with modern JavaScript, React and backend APIs";

/// Content the model must never produce.
const FORBIDDEN_CONTENT: &str = "\
    - a subject line or any heading\n\
    - commentary about the letter itself (e.g. \"Here is your cover letter\")\n\
    - placeholders in square brackets\n\
    - email addresses, phone numbers, links or other contact details\n\
    - any mention of an attached resume or CV";

/// Cover-letter prompt template.
/// Replace: {company}, {role}, {hiring_manager}, {full_name}, {max_words},
///          {background}, {forbidden}
pub const LETTER_PROMPT_TEMPLATE: &str = r#"Write a cover letter for the {role} position at {company}.

FORMAT RULES:
1. Open with exactly this salutation on its own line: "Dear {hiring_manager},"
2. Write exactly two paragraphs of body text.
3. Keep the body under {max_words} words.
4. Close with "Sincerely," on its own line followed by "{full_name}" on the next line.

TONE: enthusiastic, confident and professional. Show genuine interest in {company} and the {role} role.

BACKGROUND to reference (use only these facts, do not invent employers, metrics or projects):
{background}

NEVER include:
{forbidden}"#;

/// Builds the user prompt for one application target.
pub fn build_prompt(profile: &ApplicantProfile, target: &ApplicationTarget) -> String {
    let max_words = MAX_WORDS.to_string();
    fill_template(
        LETTER_PROMPT_TEMPLATE,
        &[
            ("background", BACKGROUND_FACTS),
            ("forbidden", FORBIDDEN_CONTENT),
            ("max_words", &max_words),
            ("hiring_manager", target.resolved_hiring_manager()),
            ("full_name", &profile.full_name),
            ("company", &target.company),
            ("role", &target.role),
        ],
    )
}

/// Replaces `{key}` placeholders in a single left-to-right pass.
///
/// Inserted values are never rescanned, so user text containing `{company}`
/// stays literal. Unknown placeholders are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        let replacement = tail.find('}').and_then(|close| {
            let key = &tail[1..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });

        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
