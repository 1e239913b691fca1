use super::payment::PaymentMethodDetails;
use super::ports::CardEncryptor;
use crate::error::EncryptionError;
use std::fmt;

/// Plaintext card fields as typed by the shopper. Never serialized.
#[derive(Clone, PartialEq)]
pub struct CardDetails {
    pub number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub security_code: Option<String>,
    pub holder_name: Option<String>,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &"<redacted>")
            .field("expiry_month", &"<redacted>")
            .field("expiry_year", &"<redacted>")
            .field("security_code", &self.security_code.as_ref().map(|_| "<redacted>"))
            .field("holder_name", &self.holder_name)
            .finish()
    }
}

impl CardDetails {
    /// Encrypts every sensitive field and builds a `scheme` payment method.
    pub fn encrypt(
        &self,
        encryptor: &dyn CardEncryptor,
        public_key: &str,
    ) -> Result<PaymentMethodDetails, EncryptionError> {
        if public_key.trim().is_empty() {
            return Err(EncryptionError::InvalidPublicKey);
        }

        let mut details = PaymentMethodDetails::new("scheme")
            .with_field(
                "encryptedCardNumber",
                encryptor.encrypt(&self.number, public_key)?,
            )
            .with_field(
                "encryptedExpiryMonth",
                encryptor.encrypt(&self.expiry_month, public_key)?,
            )
            .with_field(
                "encryptedExpiryYear",
                encryptor.encrypt(&self.expiry_year, public_key)?,
            );

        if let Some(code) = &self.security_code {
            details = details.with_field(
                "encryptedSecurityCode",
                encryptor.encrypt(code, public_key)?,
            );
        }
        if let Some(holder) = &self.holder_name {
            details = details.with_field("holderName", holder.as_str());
        }
        Ok(details)
    }
}

/// A card saved on an earlier payment. The shopper only re-enters the
/// security code.
#[derive(Clone, PartialEq)]
pub struct StoredCardDetails {
    pub stored_payment_method_id: String,
    pub brand: String,
    pub security_code: String,
}

impl fmt::Debug for StoredCardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCardDetails")
            .field("stored_payment_method_id", &self.stored_payment_method_id)
            .field("brand", &self.brand)
            .field("security_code", &"<redacted>")
            .finish()
    }
}

impl StoredCardDetails {
    /// Encrypts the security code and builds a `scheme` payment method that
    /// points at the stored card.
    pub fn encrypt(
        &self,
        encryptor: &dyn CardEncryptor,
        public_key: &str,
    ) -> Result<PaymentMethodDetails, EncryptionError> {
        if public_key.trim().is_empty() {
            return Err(EncryptionError::InvalidPublicKey);
        }

        Ok(PaymentMethodDetails::new("scheme")
            .with_field("storedPaymentMethodId", self.stored_payment_method_id.as_str())
            .with_field("brand", self.brand.as_str())
            .with_field(
                "encryptedSecurityCode",
                encryptor.encrypt(&self.security_code, public_key)?,
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    struct ReversingEncryptor;

    impl CardEncryptor for ReversingEncryptor {
        fn encrypt(&self, plaintext: &str, _public_key: &str) -> Result<String, EncryptionError> {
            Ok(plaintext.chars().rev().collect())
        }
    }

    struct FailingEncryptor;

    impl CardEncryptor for FailingEncryptor {
        fn encrypt(&self, _plaintext: &str, _public_key: &str) -> Result<String, EncryptionError> {
            Err(EncryptionError::Failed {
                field: "card".to_string(),
                reason: "bad key".to_string(),
            })
        }
    }

    fn card() -> CardDetails {
        CardDetails {
            number: "4111111111111111".to_string(),
            expiry_month: "03".to_string(),
            expiry_year: "2030".to_string(),
            security_code: Some("737".to_string()),
            holder_name: Some("J. Smith".to_string()),
        }
    }

    #[test]
    fn test_encrypt_builds_scheme_details() {
        let details = card().encrypt(&ReversingEncryptor, "10001|ABCD").unwrap();

        assert_eq!(details.payment_type(), Some("scheme"));
        let fields = details.fields();
        assert_eq!(
            fields.get("encryptedSecurityCode"),
            Some(&Value::from("737"))
        );
        assert_eq!(fields.get("encryptedExpiryYear"), Some(&Value::from("0302")));
        assert_eq!(fields.get("holderName"), Some(&Value::from("J. Smith")));
        assert!(!fields.contains_key("number"));
    }

    #[test]
    fn test_encrypt_propagates_errors() {
        assert!(matches!(
            card().encrypt(&FailingEncryptor, "10001|ABCD"),
            Err(EncryptionError::Failed { .. })
        ));
        assert_eq!(
            card().encrypt(&ReversingEncryptor, " "),
            Err(EncryptionError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_stored_card_encrypts_only_security_code() {
        let stored = StoredCardDetails {
            stored_payment_method_id: "8415995487234100".to_string(),
            brand: "visa".to_string(),
            security_code: "737".to_string(),
        };

        let details = stored.encrypt(&ReversingEncryptor, "10001|ABCD").unwrap();

        assert_eq!(details.payment_type(), Some("scheme"));
        let fields = details.fields();
        assert_eq!(
            fields.get("storedPaymentMethodId"),
            Some(&Value::from("8415995487234100"))
        );
        assert_eq!(fields.get("brand"), Some(&Value::from("visa")));
        assert_eq!(
            fields.get("encryptedSecurityCode"),
            Some(&Value::from("737"))
        );
        assert!(!fields.contains_key("encryptedCardNumber"));
        assert!(!format!("{stored:?}").contains("737"));
        assert!(matches!(
            stored.encrypt(&FailingEncryptor, "10001|ABCD"),
            Err(EncryptionError::Failed { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_card_number() {
        let printed = format!("{:?}", card());
        assert!(!printed.contains("4111"));
    }
}
