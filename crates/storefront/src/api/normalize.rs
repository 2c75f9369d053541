//! Normalization of heterogeneous API payloads.
//!
//! The backend grew endpoint by endpoint and wraps its data in whatever was
//! fashionable at the time: bare arrays, `{"data": …}`, paginated
//! `{"results": …}`, token fields under three different names. Responses are
//! decoded into the wrappers here once, immediately on receipt, and handed to
//! the rest of the crate as plain typed values.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use url::Url;

use bazaar_core::{PaymentId, SessionUser};

use crate::models::Session;

/// A list response in any of the shapes the backend emits.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    Results { results: Vec<T> },
    Items { items: Vec<T> },
}

impl<T> ListPayload<T> {
    /// Unwrap into the contained items.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items)
            | Self::Data { data: items }
            | Self::Results { results: items }
            | Self::Items { items } => items,
        }
    }
}

/// A single-object response, bare or wrapped in `{"data": …}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemPayload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ItemPayload<T> {
    /// Unwrap into the contained value.
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Response of `/login`.
#[derive(Debug, Deserialize)]
pub struct AuthPayload {
    #[serde(alias = "access_token", alias = "token")]
    access: String,
    #[serde(default, alias = "refresh_token")]
    refresh: Option<String>,
    user: SessionUser,
    #[serde(default, alias = "is_staff", deserialize_with = "flexible_bool")]
    is_admin: Option<bool>,
}

impl AuthPayload {
    /// Convert into a [`Session`].
    ///
    /// The admin flag may sit at the top level or inside the user object
    /// (`is_admin` / `is_staff`); the top level wins.
    #[must_use]
    pub fn into_session(self) -> Session {
        let nested_admin = ["is_admin", "is_staff", "is_superuser"]
            .iter()
            .filter_map(|key| self.user.extra.get(*key))
            .any(|v| v.as_bool() == Some(true) || v.as_str() == Some("true"));

        Session {
            access_token: SecretString::from(self.access),
            refresh_token: self.refresh.filter(|t| !t.is_empty()).map(SecretString::from),
            is_admin: self.is_admin.unwrap_or(nested_admin),
            user: self.user,
        }
    }
}

/// Response of `/payments/initiate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentInitiation {
    #[serde(alias = "id", alias = "payment")]
    pub payment_id: PaymentId,
    #[serde(
        default,
        alias = "approval_url",
        alias = "checkout_url",
        alias = "payment_url",
        alias = "url"
    )]
    pub redirect_url: Option<String>,
}

impl PaymentInitiation {
    /// The provider URL, if present and well-formed.
    #[must_use]
    pub fn redirect(&self) -> Option<Url> {
        self.redirect_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .and_then(|u| Url::parse(u).ok())
    }
}

/// Accepts `true`, `"true"`, `1`, `"1"` and friends.
fn flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Bool(b)) => Some(b),
        Some(Raw::Int(n)) => Some(n != 0),
        Some(Raw::Str(s)) => Some(matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")),
    })
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `detail`, `message`, `error`, `non_field_errors`, then the first
/// field error (`{"email": ["already taken"]}` → `email: already taken`).
#[must_use]
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["detail", "message", "error", "non_field_errors"] {
        if let Some(message) = object.get(key).and_then(first_text) {
            return Some(message);
        }
    }

    object
        .iter()
        .find_map(|(field, v)| first_text(v).map(|message| format!("{field}: {message}")))
}

fn first_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Array(items) => items.iter().find_map(first_text),
        serde_json::Value::Object(map) => map.values().find_map(first_text),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: u32,
    }

    fn list(json: &str) -> Vec<Thing> {
        serde_json::from_str::<ListPayload<Thing>>(json)
            .unwrap()
            .into_vec()
    }

    #[test]
    fn test_list_shapes() {
        let expected = vec![Thing { id: 1 }, Thing { id: 2 }];
        assert_eq!(list(r#"[{"id":1},{"id":2}]"#), expected);
        assert_eq!(list(r#"{"data":[{"id":1},{"id":2}]}"#), expected);
        assert_eq!(list(r#"{"count":2,"next":null,"results":[{"id":1},{"id":2}]}"#), expected);
        assert_eq!(list(r#"{"items":[{"id":1},{"id":2}]}"#), expected);
    }

    #[test]
    fn test_item_shapes() {
        let bare: ItemPayload<Thing> = serde_json::from_str(r#"{"id":5}"#).unwrap();
        let wrapped: ItemPayload<Thing> = serde_json::from_str(r#"{"data":{"id":5}}"#).unwrap();
        assert_eq!(bare.into_inner(), Thing { id: 5 });
        assert_eq!(wrapped.into_inner(), Thing { id: 5 });
    }

    #[test]
    fn test_auth_payload_variants() {
        let a: AuthPayload = serde_json::from_str(
            r#"{"access":"A","refresh":"R","user":{"username":"ana"},"is_admin":true}"#,
        )
        .unwrap();
        let session = a.into_session();
        assert_eq!(session.access_token.expose_secret(), "A");
        assert_eq!(session.refresh_token.unwrap().expose_secret(), "R");
        assert!(session.is_admin);

        let b: AuthPayload = serde_json::from_str(
            r#"{"access_token":"B","user":{"username":"ben","is_staff":true}}"#,
        )
        .unwrap();
        let session = b.into_session();
        assert!(session.refresh_token.is_none());
        assert!(session.is_admin);

        let c: AuthPayload =
            serde_json::from_str(r#"{"token":"C","user":{"username":"cy"},"is_admin":"false"}"#)
                .unwrap();
        assert!(!c.into_session().is_admin);
    }

    #[test]
    fn test_payment_initiation_aliases() {
        let cod: PaymentInitiation = serde_json::from_str(r#"{"payment_id":12}"#).unwrap();
        assert_eq!(cod.payment_id.as_str(), "12");
        assert!(cod.redirect().is_none());

        let paypal: PaymentInitiation = serde_json::from_str(
            r#"{"id":"PAY-1","approval_url":"https://www.paypal.com/checkoutnow?token=EC-1"}"#,
        )
        .unwrap();
        assert_eq!(paypal.redirect().unwrap().host_str(), Some("www.paypal.com"));

        let broken: PaymentInitiation =
            serde_json::from_str(r#"{"payment_id":1,"url":"not a url"}"#).unwrap();
        assert!(broken.redirect().is_none());
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"detail":"Invalid coupon code"}"#).as_deref(),
            Some("Invalid coupon code")
        );
        assert_eq!(
            extract_error_message(r#"{"non_field_errors":["Out of stock"]}"#).as_deref(),
            Some("Out of stock")
        );
        assert_eq!(
            extract_error_message(r#"{"email":["This field is required."]}"#).as_deref(),
            Some("email: This field is required.")
        );
        assert_eq!(extract_error_message("<html>502</html>"), None);
        assert_eq!(extract_error_message(r#"{"detail":""}"#), None);
    }
}
