//! Input validation
//!
//! Form rules for comments, the contact form and sign-in/sign-up. Text
//! fields are trimmed before measuring, lengths are counted in characters,
//! and only the first violated rule is reported. Passwords are never
//! trimmed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CreateCommentInput, CreateContactInput};

/// Dot-separated local part, dot-separated domain labels, alphabetic TLD
static EMAIL_REGEX: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_'+\-]+(?:\.[A-Za-z0-9_'+\-]+)*@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$",
    )
});

/// A rejected input; the message is shown to the visitor as is
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Check that `value` has between `min` and `max` characters.
fn check_length(
    value: &str,
    min: usize,
    max: usize,
    too_short: &str,
    too_long: &str,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::new(too_short));
    }
    if len > max {
        return Err(ValidationError::new(too_long));
    }
    Ok(())
}

/// Address shape check. Empty, leading, trailing and repeated dots are
/// rejected on both sides of the `@`.
pub fn is_valid_email(email: &str) -> bool {
    match EMAIL_REGEX.as_ref() {
        Ok(re) => re.is_match(email),
        Err(_) => false,
    }
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if !is_valid_email(email) {
        return Err(ValidationError::new("Email tidak valid"));
    }
    check_length(email, 1, 255, "Email tidak valid", "Email maksimal 255 karakter")
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 6 {
        return Err(ValidationError::new("Password minimal 6 karakter"));
    }
    Ok(())
}

/// Validate a comment, returning it trimmed.
///
/// Name is checked before content.
pub fn validate_comment(input: &CreateCommentInput) -> Result<CreateCommentInput, ValidationError> {
    let author_name = input.author_name.trim();
    let content = input.content.trim();

    check_length(
        author_name,
        2,
        100,
        "Nama minimal 2 karakter",
        "Nama maksimal 100 karakter",
    )?;
    check_length(
        content,
        10,
        1000,
        "Komentar minimal 10 karakter",
        "Komentar maksimal 1000 karakter",
    )?;

    Ok(CreateCommentInput::new(input.news_id, author_name, content))
}

/// Validate the contact form, returning it trimmed.
///
/// Fields are checked in form order: name, email, subject, message.
pub fn validate_contact(input: &CreateContactInput) -> Result<CreateContactInput, ValidationError> {
    let input = input.trimmed();

    check_length(
        &input.name,
        2,
        100,
        "Nama minimal 2 karakter",
        "Nama maksimal 100 karakter",
    )?;
    check_email(&input.email)?;
    check_length(
        &input.subject,
        5,
        200,
        "Subjek minimal 5 karakter",
        "Subjek maksimal 200 karakter",
    )?;
    check_length(
        &input.message,
        20,
        2000,
        "Pesan minimal 20 karakter",
        "Pesan maksimal 2000 karakter",
    )?;

    Ok(input)
}

/// Validate sign-in fields, returning the trimmed email.
pub fn validate_sign_in(email: &str, password: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    check_email(email)?;
    check_password(password)?;
    Ok(email.to_string())
}

/// Validate sign-up fields, returning the trimmed full name and email.
pub fn validate_sign_up(
    full_name: &str,
    email: &str,
    password: &str,
) -> Result<(String, String), ValidationError> {
    let full_name = full_name.trim();
    let email = email.trim();
    check_length(
        full_name,
        2,
        100,
        "Nama minimal 2 karakter",
        "Nama maksimal 100 karakter",
    )?;
    check_email(email)?;
    check_password(password)?;
    Ok((full_name.to_string(), email.to_string()))
}
