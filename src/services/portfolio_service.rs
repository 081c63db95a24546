use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use sqlx::PgPool;
use tracing::{error, info};

use crate::db;
use crate::errors::AppError;
use crate::models::{Contact, CreateContact, Project, Skill, ValidContact};

const NAME_MAX_CHARS: usize = 100;
const SUBJECT_MAX_CHARS: usize = 200;

const REQUIRED: &str = "This field is required.";
const INVALID_EMAIL: &str = "Enter a valid email address.";

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| match Regex::new(EMAIL_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                error!("Email pattern failed to compile, rejecting all addresses: {}", e);
                None
            }
        })
        .as_ref()
}

fn is_valid_email(email: &str) -> bool {
    email_regex().map(|re| re.is_match(email)).unwrap_or(false)
}

pub async fn fetch_skills(pool: &PgPool, category: Option<&str>) -> Result<Vec<Skill>, AppError> {
    let category = category.map(str::trim).filter(|c| !c.is_empty());
    let skills = db::portfolio_queries::fetch_skills(pool, category).await?;
    Ok(skills)
}

pub async fn fetch_projects(pool: &PgPool) -> Result<Vec<Project>, AppError> {
    let projects = db::portfolio_queries::fetch_projects(pool).await?;
    Ok(projects)
}

/// Field-level checks on a contact submission. Errors are keyed by field name.
pub fn validate_contact(input: CreateContact) -> Result<ValidContact, AppError> {
    let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut fail = |field: &str, message: String| {
        errors.entry(field.to_string()).or_default().push(message);
    };

    let clean = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();
    let name = clean(input.name);
    let email = clean(input.email);
    let subject = clean(input.subject);
    let message = clean(input.message);

    for (field, value, max) in [
        ("name", &name, Some(NAME_MAX_CHARS)),
        ("email", &email, None),
        ("subject", &subject, Some(SUBJECT_MAX_CHARS)),
        ("message", &message, None),
    ] {
        if value.is_empty() {
            fail(field, REQUIRED.to_string());
            continue;
        }
        if let Some(max) = max {
            let len = value.chars().count();
            if len > max {
                fail(
                    field,
                    format!("Ensure this value has at most {} characters (it has {}).", max, len),
                );
            }
        }
    }

    if !email.is_empty() && !is_valid_email(&email) {
        fail("email", INVALID_EMAIL.to_string());
    }

    if !errors.is_empty() {
        return Err(AppError::Form(errors));
    }

    Ok(ValidContact {
        name,
        email,
        subject,
        message,
    })
}

pub async fn submit_contact(pool: &PgPool, input: CreateContact) -> Result<Contact, AppError> {
    let valid = validate_contact(input)?;
    let contact = db::portfolio_queries::insert_contact(pool, valid).await?;
    info!("Stored contact message {} from {}", contact.id, contact.email);
    Ok(contact)
}
