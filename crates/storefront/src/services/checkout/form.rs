//! Checkout form and its validation.

use serde::{Deserialize, Serialize};

use bazaar_core::{Email, PaymentMethod, SessionUser};

use super::CheckoutError;
use crate::api::Address;

/// Raw checkout form as the customer filled it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub phone: String,
    pub country: String,
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub notes: String,
}

/// Shipping block of the payment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub phone: String,
    pub country: String,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    pub shipping: ShippingAddress,
    pub email: Email,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl CheckoutForm {
    /// Check every required field and the email format.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingFields` listing every blank required
    /// field in form order, or `CheckoutError::InvalidEmail` when all fields
    /// are present but the email is malformed.
    pub fn validate(&self) -> Result<ValidatedCheckout, CheckoutError> {
        let text_fields = [
            (&self.full_name, "Full name"),
            (&self.email, "Email"),
            (&self.address, "Address"),
            (&self.city, "City"),
            (&self.region, "Region"),
            (&self.postal_code, "Postal code"),
            (&self.phone, "Phone"),
            (&self.country, "Country"),
        ];

        let mut missing: Vec<&'static str> = text_fields
            .iter()
            .filter(|(value, _)| value.trim().is_empty())
            .map(|(_, label)| *label)
            .collect();
        if self.payment_method.is_none() {
            missing.push("Payment method");
        }

        let Some(payment_method) = self.payment_method.filter(|_| missing.is_empty()) else {
            return Err(CheckoutError::MissingFields(missing));
        };

        let email = Email::parse(&self.email)?;

        Ok(ValidatedCheckout {
            shipping: ShippingAddress {
                full_name: self.full_name.trim().to_string(),
                email: email.as_str().to_string(),
                address: self.address.trim().to_string(),
                city: self.city.trim().to_string(),
                region: self.region.trim().to_string(),
                postal_code: self.postal_code.trim().to_string(),
                phone: self.phone.trim().to_string(),
                country: self.country.trim().to_string(),
            },
            email,
            payment_method,
            notes: Some(self.notes.trim().to_string()).filter(|n| !n.is_empty()),
        })
    }

    /// Fill blank fields from a saved address and the signed-in user.
    ///
    /// Fields the customer already typed are left alone. The address name
    /// wins over the profile name, and a bare username is never used as a
    /// recipient name.
    pub fn prefill(&mut self, address: Option<&Address>, user: Option<&SessionUser>) {
        if let Some(address) = address {
            if let Some(name) = &address.full_name {
                fill(&mut self.full_name, name.clone());
            }
            fill(&mut self.address, address.address.clone());
            fill(&mut self.city, address.city.clone());
            fill(&mut self.region, address.region.clone());
            fill(&mut self.postal_code, address.postal_code.clone());
            if let Some(phone) = &address.phone {
                fill(&mut self.phone, phone.clone());
            }
            if let Some(country) = address.country.as_ref().and_then(|c| c.form_value()) {
                fill(&mut self.country, country);
            }
        }

        if let Some(user) = user {
            let full_name = format!("{} {}", user.first_name.trim(), user.last_name.trim());
            fill(&mut self.full_name, full_name.trim().to_string());
            fill(&mut self.email, user.email.clone());
        }
    }
}

fn fill(field: &mut String, value: String) {
    if field.trim().is_empty() && !value.trim().is_empty() {
        *field = value;
    }
}
