// ABOUTME: Application port validation.
// ABOUTME: Accepts decimal integers in 1..=65535 with no sign or other characters.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppPortError {
    #[error("port cannot be empty")]
    Empty,

    #[error("port must contain only digits: '{0}'")]
    NotNumeric(String),

    #[error("port must be between 1 and 65535: '{0}'")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppPort(u16);

impl AppPort {
    pub fn parse(value: &str) -> Result<Self, AppPortError> {
        if value.is_empty() {
            return Err(AppPortError::Empty);
        }

        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppPortError::NotNumeric(value.to_string()));
        }

        match value.parse::<u16>() {
            Ok(0) | Err(_) => Err(AppPortError::OutOfRange(value.to_string())),
            Ok(port) => Ok(Self(port)),
        }
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for AppPort {
    type Error = AppPortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err(AppPortError::OutOfRange("0".to_string()));
        }
        Ok(Self(value))
    }
}

impl fmt::Display for AppPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
