//! # Form validation
//!
//! Every check pushes a human-readable message; a form is rejected with all
//! of its messages at once (HTTP 422).

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, Result};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CONTENT_LEN: usize = 20_000;
pub const MAX_SECTION_NAME_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 1_000;
pub const MAX_REASON_LEN: usize = 1_000;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,32}$").unwrap());
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Collected validation failures for a single form.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.0.push(message.into());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn username(v: &mut Violations, name: &str) {
    v.check(
        USERNAME_RE.is_match(name),
        "Invalid user name. Use 3 to 32 alphanumeric characters, '_' or '-'",
    );
}

pub fn email(v: &mut Violations, email: &str) {
    v.check(
        email.len() <= 254 && EMAIL_RE.is_match(email),
        "Invalid email address",
    );
}

pub fn password(v: &mut Violations, password: &str) {
    v.check(
        password.chars().count() >= MIN_PASSWORD_LEN,
        format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
    );
}

pub fn title(v: &mut Violations, title: &str) {
    v.check(!is_blank(title), "Title is required");
    v.check(
        title.chars().count() <= MAX_TITLE_LEN,
        format!("Title must be at most {MAX_TITLE_LEN} characters"),
    );
}

pub fn content(v: &mut Violations, content: &str) {
    v.check(!is_blank(content), "Content is required");
    v.check(
        content.chars().count() <= MAX_CONTENT_LEN,
        format!("Content must be at most {MAX_CONTENT_LEN} characters"),
    );
}

pub fn reason(v: &mut Violations, reason: &str) {
    v.check(!is_blank(reason), "Reason is required");
    v.check(
        reason.chars().count() <= MAX_REASON_LEN,
        format!("Reason must be at most {MAX_REASON_LEN} characters"),
    );
}

/// Lowercases and trims an address before it is stored or compared.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn registration(name: &str, mail: &str, pass: &str, confirmation: &str) -> Result<()> {
    let mut v = Violations::new();
    username(&mut v, name);
    email(&mut v, mail);
    password(&mut v, pass);
    v.check(pass == confirmation, "Passwords do not match");
    v.finish()
}

/// Title plus body, shared by topics and private messages.
pub fn discussion(t: &str, c: &str) -> Result<()> {
    let mut v = Violations::new();
    title(&mut v, t);
    content(&mut v, c);
    v.finish()
}

pub fn post(c: &str) -> Result<()> {
    let mut v = Violations::new();
    content(&mut v, c);
    v.finish()
}

pub fn section(name: &str, description: &str) -> Result<()> {
    let mut v = Violations::new();
    v.check(!is_blank(name), "Section name is required");
    v.check(
        name.trim().chars().count() <= MAX_SECTION_NAME_LEN,
        format!("Section name must be at most {MAX_SECTION_NAME_LEN} characters"),
    );
    v.check(
        description.chars().count() <= MAX_DESCRIPTION_LEN,
        format!("Description must be at most {MAX_DESCRIPTION_LEN} characters"),
    );
    v.finish()
}

pub fn complaint(r: &str) -> Result<()> {
    let mut v = Violations::new();
    reason(&mut v, r);
    v.finish()
}

pub fn ban(r: &str, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    let mut v = Violations::new();
    reason(&mut v, r);
    v.check(expires_at > now, "Ban expiry must be in the future");
    v.finish()
}

/// Returns the normalized extension of an acceptable avatar file name.
pub fn avatar_extension(filename: &str) -> Result<&'static str> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" => Ok("jpg"),
        "jpeg" => Ok("jpeg"),
        "png" => Ok("png"),
        _ => Err(AppError::invalid(
            "Avatar must be a .jpg, .jpeg or .png file",
        )),
    }
}

/// Splits a comma-separated recipient list, dropping blanks and duplicates.
pub fn recipients(raw: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    if names.is_empty() {
        return Err(AppError::invalid("At least one recipient is required"));
    }
    Ok(names)
}

/// Accepts `YYYY-MM-DDTHH:MM` (HTML datetime-local, read as UTC) or RFC 3339.
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|_| AppError::invalid("Invalid expiry date"))
}
