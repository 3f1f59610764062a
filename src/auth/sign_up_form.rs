//! The sign-up form data and its validation rules.

use email_address::EmailAddress;
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::ValidatedPassword;

const MIN_NAME_LENGTH: usize = 3;
const MAX_ADDRESS_LENGTH: usize = 50;
const STATE_LENGTH: usize = 2;
const POSTAL_CODE_LENGTH: usize = 5;

/// The raw data entered by the user in the sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: String,
    pub ssn: String,
    pub email: String,
    pub password: String,
}

/// Sign-up data that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSignUp {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: Date,
    pub ssn: String,
    pub email: String,
    pub password: ValidatedPassword,
}

/// One optional error message per form field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUpErrors {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub date_of_birth: Option<String>,
    pub ssn: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl SignUpErrors {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn min_length(value: &str, min: usize) -> Option<String> {
    (value.chars().count() < min).then(|| format!("Must be at least {min} characters"))
}

fn max_length(value: &str, max: usize) -> Option<String> {
    (value.chars().count() > max).then(|| format!("Must be at most {max} characters"))
}

fn exact_length(value: &str, length: usize) -> Option<String> {
    (value.chars().count() != length).then(|| format!("Must be exactly {length} characters"))
}

/// Checks for the "XXX-XX-XXXX" format where each X is a digit.
fn is_valid_ssn(ssn: &str) -> bool {
    let bytes = ssn.as_bytes();

    bytes.len() == 11
        && bytes.iter().enumerate().all(|(i, byte)| match i {
            3 | 6 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

fn parse_date(date: &str) -> Option<Date> {
    Date::parse(date, format_description!("[year]-[month]-[day]")).ok()
}

impl SignUpForm {
    /// Check every field and collect the problems.
    ///
    /// # Errors
    ///
    /// Returns a [SignUpErrors] with a message for each invalid field.
    pub fn validate(&self) -> Result<ValidatedSignUp, SignUpErrors> {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let address1 = self.address1.trim();
        let city = self.city.trim();
        let state = self.state.trim();
        let postal_code = self.postal_code.trim();
        let email = self.email.trim();
        let ssn = self.ssn.trim();

        let date_of_birth = parse_date(self.date_of_birth.trim());
        let password = ValidatedPassword::new(&self.password);

        let errors = SignUpErrors {
            first_name: min_length(first_name, MIN_NAME_LENGTH),
            last_name: min_length(last_name, MIN_NAME_LENGTH),
            address1: max_length(address1, MAX_ADDRESS_LENGTH),
            city: max_length(city, MAX_ADDRESS_LENGTH),
            state: exact_length(state, STATE_LENGTH),
            postal_code: exact_length(postal_code, POSTAL_CODE_LENGTH),
            date_of_birth: date_of_birth
                .is_none()
                .then(|| "Enter a date formatted as YYYY-MM-DD".to_owned()),
            ssn: (!is_valid_ssn(ssn)).then(|| "Enter a number formatted as XXX-XX-XXXX".to_owned()),
            email: (!EmailAddress::is_valid(email)).then(|| "Invalid email address".to_owned()),
            password: password.as_ref().err().map(|error| error.to_string()),
        };

        match (date_of_birth, password) {
            (Some(date_of_birth), Ok(password)) if errors.is_empty() => Ok(ValidatedSignUp {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                address1: address1.to_owned(),
                city: city.to_owned(),
                state: state.to_uppercase(),
                postal_code: postal_code.to_owned(),
                date_of_birth,
                ssn: ssn.to_owned(),
                email: email.to_owned(),
                password,
            }),
            _ => Err(errors),
        }
    }
}
