use crate::api::{login, register};

/// Shown when either login field is left blank.
pub const FILL_IN_ALL_FIELDS: &str = "Please fill in all fields.";

/// Check the login form. Both fields just need to be non-empty; the server
/// decides whether they're right.
///
/// ## Errors
///
/// `FILL_IN_ALL_FIELDS` if either the email or password is empty.
pub fn login(req: &login::Req) -> Result<(), &'static str> {
    if req.email.is_empty() || req.password.is_empty() {
        Err(FILL_IN_ALL_FIELDS)
    } else {
        Ok(())
    }
}

/// The fields on the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    /// Name
    Name,

    /// Email address
    Email,

    /// Password
    Password,

    /// Phone number
    PhoneNumber,
}

/// Per-field problems with a registration form. Empty means good to go.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    /// Problem with the name, if any
    pub name: Option<&'static str>,

    /// Problem with the email, if any
    pub email: Option<&'static str>,

    /// Problem with the password, if any
    pub password: Option<&'static str>,

    /// Problem with the phone number, if any
    pub phone_number: Option<&'static str>,
}

impl FieldErrors {
    /// Is everything OK?
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.phone_number.is_none()
    }

    /// The problem with a given field
    pub fn get(&self, field: Field) -> Option<&'static str> {
        match field {
            Field::Name => self.name,
            Field::Email => self.email,
            Field::Password => self.password,
            Field::PhoneNumber => self.phone_number,
        }
    }
}

/// Check the registration form, field by field.
pub fn registration(req: &register::Req) -> FieldErrors {
    FieldErrors {
        name: required(&req.name, "Name is required"),
        email: required(&req.email, "Email is required").or_else(|| {
            if is_email(req.email.trim()) {
                None
            } else {
                Some("Invalid email format")
            }
        }),
        password: required(&req.password, "Password is required"),
        phone_number: required(&req.phone_number, "Phone Number is required"),
    }
}

fn required(value: &str, message: &'static str) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some(message)
    } else {
        None
    }
}

/// A basic shape check: `local@domain.tld`. Anything stricter is the server's
/// job.
pub fn is_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}
