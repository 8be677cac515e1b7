//! Wire representation of transaction events.
//!
//! Creation and confirmation events share one record shape. Every field is
//! optional on the wire; each handler checks the fields it needs, so a
//! confirmation event can carry only `id` and `status` and still be
//! re-encoded verbatim.

use super::account::PixKeyKind;
use super::transaction::{TransactionId, TransactionStatus};
use crate::error::{RelayError, Result};
use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

/// A wire value kept exactly as received, next to its parsed form.
///
/// Encoding writes the received text back: a number amount stays a number,
/// and a `cpf` kind or a `Confirmed` status keeps its spelling.
#[derive(Debug, Clone)]
pub struct Verbatim<T> {
    raw: Box<RawValue>,
    value: T,
}

impl<T: Serialize> Verbatim<T> {
    pub fn new(value: T) -> Result<Self> {
        let raw = serde_json::value::to_raw_value(&value)
            .map_err(|e| RelayError::InternalError(Box::new(e)))?;
        Ok(Self { raw, value })
    }
}

impl<T> Verbatim<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The JSON text as it appeared on the wire.
    pub fn raw(&self) -> &str {
        self.raw.get()
    }
}

impl<T: PartialEq> PartialEq for Verbatim<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw() && self.value == other.value
    }
}

impl<T> Serialize for Verbatim<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Verbatim<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let value = serde_json::from_str(raw.get()).map_err(de::Error::custom)?;
        Ok(Self { raw, value })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TransactionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Verbatim<Decimal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_key_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_key_kind_to: Option<Verbatim<PixKeyKind>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Verbatim<TransactionStatus>>,
}

/// The fields of a creation event, all present.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationRequest {
    pub account_id: String,
    pub amount: Decimal,
    pub pix_key_to: String,
    pub pix_key_kind_to: PixKeyKind,
    pub description: String,
}

impl TransactionEvent {
    pub fn decode(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| RelayError::DecodeError(e.to_string()))
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| RelayError::InternalError(Box::new(e)))
    }

    /// Extracts the draft fields of a creation event.
    pub fn creation_request(&self) -> Result<CreationRequest> {
        Ok(CreationRequest {
            account_id: required(&self.account_id, "account_id")?.clone(),
            amount: *required(&self.amount, "amount")?.value(),
            pix_key_to: required(&self.pix_key_to, "pix_key_to")?.clone(),
            pix_key_kind_to: *required(&self.pix_key_kind_to, "pix_key_kind_to")?.value(),
            description: required(&self.description, "description")?.clone(),
        })
    }

    pub fn transaction_id(&self) -> Result<TransactionId> {
        required(&self.id, "id").copied()
    }

    pub fn status(&self) -> Option<TransactionStatus> {
        self.status.as_ref().map(|status| *status.value())
    }
}

fn required<'a, T>(field: &'a Option<T>, name: &str) -> Result<&'a T> {
    field
        .as_ref()
        .ok_or_else(|| RelayError::DecodeError(format!("missing field `{name}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    #[test]
    fn test_decode_creation_event() {
        let payload = br#"{"account_id":"A1","amount":100,"pix_key_to":"x@y.com","pix_key_kind_to":"email","description":"rent"}"#;
        let event = TransactionEvent::decode(payload).unwrap();

        assert_eq!(event.id, None);
        assert_eq!(event.status(), None);
        let request = event.creation_request().unwrap();
        assert_eq!(request.account_id, "A1");
        assert_eq!(request.amount, dec!(100));
        assert_eq!(request.pix_key_kind_to, PixKeyKind::Email);
        assert_eq!(request.description, "rent");
    }

    #[test]
    fn test_decode_accepts_string_amount() {
        let event = TransactionEvent::decode(br#"{"amount":"250.75"}"#).unwrap();
        let amount = event.amount.unwrap();
        assert_eq!(*amount.value(), dec!(250.75));
        assert_eq!(amount.raw(), r#""250.75""#);
    }

    #[test]
    fn test_creation_request_reports_missing_field() {
        let event = TransactionEvent::decode(br#"{"account_id":"A1","amount":1}"#).unwrap();
        match event.creation_request() {
            Err(RelayError::DecodeError(msg)) => assert!(msg.contains("pix_key_to")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_payloads_are_decode_errors() {
        let payloads: [&[u8]; 4] = [
            b"not json",
            br#"{"pix_key_kind_to":"fax"}"#,
            br#"{"status":"archived"}"#,
            br#"{"id":"seven"}"#,
        ];
        for payload in payloads {
            assert!(
                matches!(
                    TransactionEvent::decode(payload),
                    Err(RelayError::DecodeError(_))
                ),
                "payload {:?} should fail",
                String::from_utf8_lossy(payload)
            );
        }
    }

    #[test]
    fn test_confirmation_event_needs_only_id_and_status() {
        let event = TransactionEvent::decode(br#"{"id":7,"status":"Confirmed"}"#).unwrap();
        assert_eq!(event.transaction_id().unwrap(), TransactionId(7));
        assert_eq!(event.status(), Some(TransactionStatus::Confirmed));

        let missing = TransactionEvent::decode(br#"{"status":"completed"}"#).unwrap();
        assert!(matches!(
            missing.transaction_id(),
            Err(RelayError::DecodeError(_))
        ));
    }

    #[test]
    fn test_reencode_preserves_every_field() {
        let original = json!({
            "id": 42,
            "account_id": "A1",
            "amount": "99.90",
            "pix_key_to": "x@y.com",
            "pix_key_kind_to": "email",
            "description": "rent",
            "status": "confirmed"
        });
        let event = TransactionEvent::decode(original.to_string().as_bytes()).unwrap();
        let encoded: Value = serde_json::from_slice(&event.encode().unwrap()).unwrap();

        assert_eq!(encoded, original);
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let event = TransactionEvent {
            id: Some(TransactionId(7)),
            status: Some(Verbatim::new(TransactionStatus::Completed).unwrap()),
            ..Default::default()
        };
        let encoded: Value = serde_json::from_slice(&event.encode().unwrap()).unwrap();
        assert_eq!(encoded, json!({"id": 7, "status": "completed"}));
    }

    #[test]
    fn test_reencode_keeps_inbound_spelling() {
        let payloads = [
            r#"{"id":7,"account_id":"A1","amount":100,"pix_key_to":"123","pix_key_kind_to":"cpf","description":"rent","status":"Confirmed"}"#,
            r#"{"id":8,"account_id":"A1","amount":42.50,"pix_key_to":"x@y.com","pix_key_kind_to":"email","description":"","status":"Completed"}"#,
            r#"{"id":9,"amount":"0.10","status":"pending"}"#,
        ];

        for payload in payloads {
            let event = TransactionEvent::decode(payload.as_bytes()).unwrap();
            let encoded = event.encode().unwrap();
            assert_eq!(String::from_utf8(encoded).unwrap(), payload);
        }
    }

    #[test]
    fn test_verbatim_fields_still_parse() {
        let event = TransactionEvent::decode(
            br#"{"amount":42.50,"pix_key_kind_to":"cpf","status":"Confirmed"}"#,
        )
        .unwrap();

        assert_eq!(*event.amount.as_ref().unwrap().value(), dec!(42.5));
        assert_eq!(event.amount.as_ref().unwrap().raw(), "42.50");
        assert_eq!(
            *event.pix_key_kind_to.as_ref().unwrap().value(),
            PixKeyKind::Document
        );
        assert_eq!(event.status(), Some(TransactionStatus::Confirmed));
    }
}
