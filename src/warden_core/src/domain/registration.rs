use secrecy::Secret;

use super::{
    email::Email,
    password::Password,
    user::{UserError, UserType},
};

const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;
const MIN_PHONE_LENGTH: usize = 6;
const MAX_PHONE_LENGTH: usize = 20;

/// Raw self-registration form as it arrives from the transport.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub email: Secret<String>,
    pub password: Secret<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub user_type: String,
}

/// A registration form whose every field passed validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: Email,
    pub password: Password,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub user_type: UserType,
}

/// Every problem found in a registration form, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationErrors(pub Vec<UserError>);

impl RegistrationErrors {
    pub fn message(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for RegistrationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for RegistrationErrors {}

impl TryFrom<RegistrationForm> for Registration {
    type Error = RegistrationErrors;

    fn try_from(form: RegistrationForm) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let email = Email::try_from(form.email).map_err(|e| errors.push(e)).ok();
        let password = Password::try_from(form.password)
            .map_err(|e| errors.push(e))
            .ok();
        let first_name = parse_name(&form.first_name, "first name")
            .map_err(|e| errors.push(e))
            .ok();
        let last_name = parse_name(&form.last_name, "last name")
            .map_err(|e| errors.push(e))
            .ok();
        let phone = parse_phone(form.phone.as_deref())
            .map_err(|e| errors.push(e))
            .ok();
        let user_type = form
            .user_type
            .parse::<UserType>()
            .ok()
            .filter(UserType::is_self_registrable)
            .ok_or(UserError::InvalidUserType)
            .map_err(|e| errors.push(e))
            .ok();

        match (email, password, first_name, last_name, phone, user_type) {
            (
                Some(email),
                Some(password),
                Some(first_name),
                Some(last_name),
                Some(phone),
                Some(user_type),
            ) => Ok(Registration {
                email,
                password,
                first_name,
                last_name,
                phone,
                user_type,
            }),
            _ => Err(RegistrationErrors(errors)),
        }
    }
}

fn parse_name(raw: &str, field: &'static str) -> Result<String, UserError> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
        return Err(UserError::InvalidName(field));
    }
    Ok(trimmed.to_owned())
}

fn parse_phone(raw: Option<&str>) -> Result<Option<String>, UserError> {
    let Some(phone) = raw.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    let length = phone.chars().count();

    if !allowed || !(MIN_PHONE_LENGTH..=MAX_PHONE_LENGTH).contains(&length) {
        return Err(UserError::InvalidPhone);
    }
    Ok(Some(phone.to_owned()))
}
