//! Request body validation for the credential endpoints.

use serde::Deserialize;

use super::error::ApiError;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated, normalized registration input.
#[derive(Debug, PartialEq, Eq)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validated, normalized login input.
#[derive(Debug, PartialEq, Eq)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Trim and lower-case an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose `local@domain.tld` check.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|l| !l.is_empty())
        && labels.last().is_some_and(|tld| tld.len() >= 2)
}

fn password_errors(password: &str, errors: &mut Vec<String>) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".into());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push("Password must contain at least one lowercase letter".into());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number".into());
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        errors.push("Password must contain at least one special character".into());
    }
}

pub fn validate_register(req: RegisterRequest) -> Result<RegisterInput, ApiError> {
    let mut errors = Vec::new();

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        errors.push("Name is required".to_string());
    }

    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    if !is_valid_email(&email) {
        errors.push("Invalid email address".to_string());
    }

    let password = req.password.unwrap_or_default();
    password_errors(&password, &mut errors);

    if let Some(confirm) = &req.confirm_password {
        if *confirm != password {
            errors.push("Passwords do not match".to_string());
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    Ok(RegisterInput {
        name: name.to_string(),
        email,
        password,
    })
}

pub fn validate_login(req: LoginRequest) -> Result<LoginInput, ApiError> {
    let mut errors = Vec::new();

    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    if !is_valid_email(&email) {
        errors.push("Invalid email address".to_string());
    }

    let password = req.password.unwrap_or_default();
    if password.is_empty() {
        errors.push("Password is required".to_string());
    }

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    Ok(LoginInput { email, password })
}
