//! Checkout customer payload and its validation.
//!
//! The storefront's checkout endpoint receives this payload, validates it,
//! and forwards the contact and address to the payment gateway as the payer.
//! Validation errors carry the user-facing (Portuguese) message for the
//! field that failed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Customer contact and shipping data captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerData {
    pub email: String,
    pub name: String,
    pub phone: Phone,
    pub address: Address,
}

/// Phone number split the way the gateway expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub area_code: String,
    pub number: String,
}

/// Shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub zip_code: String,
    pub street_name: String,
    pub street_number: String,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
}

/// A required checkout field is missing or empty.
///
/// The display message is what the storefront returns to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerDataError {
    #[error("E-mail é obrigatório")]
    MissingEmail,
    #[error("Nome é obrigatório")]
    MissingName,
    #[error("Telefone é obrigatório")]
    MissingPhone,
    #[error("CEP é obrigatório")]
    MissingZipCode,
    #[error("Endereço é obrigatório")]
    MissingStreet,
    #[error("Cidade é obrigatória")]
    MissingCity,
    #[error("Estado é obrigatório")]
    MissingState,
}

impl CustomerData {
    /// Check that every required field is present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns the first [`CustomerDataError`] encountered, in field order,
    /// so the caller can surface a single field-specific message.
    pub fn validate(&self) -> Result<(), CustomerDataError> {
        if self.email.trim().is_empty() {
            return Err(CustomerDataError::MissingEmail);
        }
        if self.name.trim().is_empty() {
            return Err(CustomerDataError::MissingName);
        }
        if self.phone.area_code.trim().is_empty() || self.phone.number.trim().is_empty() {
            return Err(CustomerDataError::MissingPhone);
        }
        if self.address.zip_code.trim().is_empty() {
            return Err(CustomerDataError::MissingZipCode);
        }
        if self.address.street_name.trim().is_empty()
            || self.address.street_number.trim().is_empty()
        {
            return Err(CustomerDataError::MissingStreet);
        }
        if self.address.city.trim().is_empty() {
            return Err(CustomerDataError::MissingCity);
        }
        if self.address.state.trim().is_empty() {
            return Err(CustomerDataError::MissingState);
        }
        Ok(())
    }
}
