//! Per-step predicates that gate forward navigation.
//!
//! Validators are recomputed from the record on every call; nothing here
//! caches validity.

use std::sync::OnceLock;

use regex_lite::Regex;
use support_protocol::SupportRecord;
use support_protocol::present;

use crate::step::Step;

pub const EMAIL_ERROR: &str = "Please enter a valid email address";

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

/// `local@domain.tld` shape check. Surrounding whitespace is ignored.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    email_pattern().is_some_and(|pattern| pattern.is_match(email))
}

/// Fields of `step` that are missing or invalid, using wire field names.
pub fn missing_fields(step: Step, record: &SupportRecord) -> Vec<&'static str> {
    let mut missing = Vec::new();
    match step {
        Step::ClientInfo => {
            if present(&record.name).is_none() {
                missing.push("name");
            }
            if !is_valid_email(&record.email) {
                missing.push("email");
            }
        }
        Step::DeviceInfo => {
            if present(&record.device_model).is_none() {
                missing.push("deviceModel");
            }
        }
        // Urgency is an enum with a default, so it is always set.
        Step::IssueDescription => {
            if present(&record.issue_description).is_none() {
                missing.push("issueDescription");
            }
        }
        Step::SupportRequest => {
            if !record.privacy_agreed {
                missing.push("privacyAgreed");
            }
        }
        Step::Review | Step::Confirmation => {}
    }
    missing
}

pub fn is_step_valid(step: Step, record: &SupportRecord) -> bool {
    missing_fields(step, record).is_empty()
}

/// First step in `steps` that fails validation, with its missing fields.
pub fn first_incomplete(
    steps: &[Step],
    record: &SupportRecord,
) -> Option<(Step, Vec<&'static str>)> {
    steps.iter().find_map(|step| {
        let missing = missing_fields(*step, record);
        (!missing.is_empty()).then_some((*step, missing))
    })
}
