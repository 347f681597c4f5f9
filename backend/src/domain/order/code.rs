//! Human-shareable order codes and their generation.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of characters in an order code.
pub const ORDER_CODE_LEN: usize = 8;
/// Characters an order code is drawn from.
pub const ORDER_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Validation errors for [`OrderCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderCodeError {
    #[error("order code must be exactly {expected} characters")]
    Length { expected: usize },
    #[error("order code may only contain A-Z and 0-9")]
    Alphabet,
}

/// Eight character uppercase alphanumeric order code, e.g. `K3ZQ81TA`.
///
/// # Examples
/// ```
/// use escrow_market::domain::OrderCode;
///
/// let code = OrderCode::parse("k3zq81ta").expect("valid code");
/// assert_eq!(code.as_ref(), "K3ZQ81TA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderCode(String);

impl OrderCode {
    /// Parse a code, normalising it to upper case.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, OrderCodeError> {
        let normalised = raw.as_ref().trim().to_ascii_uppercase();
        if normalised.len() != ORDER_CODE_LEN {
            return Err(OrderCodeError::Length {
                expected: ORDER_CODE_LEN,
            });
        }
        if !normalised.bytes().all(|b| ORDER_CODE_ALPHABET.contains(&b)) {
            return Err(OrderCodeError::Alphabet);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for OrderCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<OrderCode> for String {
    fn from(value: OrderCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for OrderCode {
    type Error = OrderCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Source of candidate order codes.
///
/// Candidates may collide with stored codes; the order service retries on
/// collision.
#[cfg_attr(test, mockall::automock)]
pub trait OrderCodeGenerator: Send + Sync {
    /// Produce the next candidate code.
    fn next_code(&self) -> OrderCode;
}

/// Generator drawing codes uniformly from [`ORDER_CODE_ALPHABET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOrderCodeGenerator;

impl OrderCodeGenerator for RandomOrderCodeGenerator {
    fn next_code(&self) -> OrderCode {
        let mut rng = rand::thread_rng();
        let code = (0..ORDER_CODE_LEN)
            .map(|_| char::from(ORDER_CODE_ALPHABET[rng.gen_range(0..ORDER_CODE_ALPHABET.len())]))
            .collect();
        OrderCode(code)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn random_codes_are_well_formed() {
        let generator = RandomOrderCodeGenerator;
        for _ in 0..256 {
            let code = generator.next_code();
            assert_eq!(code.as_ref().len(), ORDER_CODE_LEN);
            assert!(OrderCode::parse(code.as_ref()).is_ok());
        }
    }

    #[rstest]
    #[case("abc", OrderCodeError::Length { expected: ORDER_CODE_LEN })]
    #[case("ABCDEFGHI", OrderCodeError::Length { expected: ORDER_CODE_LEN })]
    #[case("ABCD-123", OrderCodeError::Alphabet)]
    fn parse_rejects_malformed_codes(#[case] raw: &str, #[case] expected: OrderCodeError) {
        assert_eq!(OrderCode::parse(raw), Err(expected));
    }

    #[rstest]
    fn parse_uppercases_input() {
        let code = OrderCode::parse(" ab12cd34 ").expect("valid code");
        assert_eq!(code.to_string(), "AB12CD34");
    }
}
