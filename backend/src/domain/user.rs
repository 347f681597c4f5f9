//! Marketplace participant identity and settlement requisites.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::CurrencyVolumes;

/// Maximum accepted length of an external identifier.
pub const EXTERNAL_ID_MAX: usize = 64;
/// Maximum accepted length of a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Validation errors raised by the user value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyExternalId,
    ExternalIdTooLong { max: usize },
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyExternalId => write!(f, "external id must not be empty"),
            Self::ExternalIdTooLong { max } => {
                write!(f, "external id must be at most {max} characters")
            }
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Internal user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier supplied by the client platform (for example a
/// messenger account id).
///
/// # Examples
/// ```
/// use escrow_market::domain::ExternalId;
///
/// let id = ExternalId::new("tg-1001").expect("valid id");
/// assert_eq!(id.as_ref(), "tg-1001");
/// assert!(ExternalId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId(String);

impl ExternalId {
    /// Validate and construct an [`ExternalId`]. Surrounding whitespace is
    /// stripped.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyExternalId);
        }
        if trimmed.chars().count() > EXTERNAL_ID_MAX {
            return Err(UserValidationError::ExternalIdTooLong {
                max: EXTERNAL_ID_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ExternalId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ExternalId> for String {
    fn from(value: ExternalId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ExternalId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable name shown to counterparties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Settlement details a user advertises to counterparties.
///
/// Every field is optional; the marketplace never validates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requisites {
    pub wallet: Option<String>,
    pub card_number: Option<String>,
    pub card_bank: Option<String>,
    pub card_currency: Option<String>,
    pub messaging_handle: Option<String>,
}

/// Partial update applied to [`Requisites`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitesUpdate {
    pub wallet: Option<String>,
    pub card_number: Option<String>,
    pub card_bank: Option<String>,
    pub card_currency: Option<String>,
    pub messaging_handle: Option<String>,
}

impl RequisitesUpdate {
    /// Returns `true` when the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.wallet.is_none()
            && self.card_number.is_none()
            && self.card_bank.is_none()
            && self.card_currency.is_none()
            && self.messaging_handle.is_none()
    }

    /// Apply the update on top of existing requisites.
    ///
    /// # Examples
    /// ```
    /// use escrow_market::domain::{Requisites, RequisitesUpdate};
    ///
    /// let current = Requisites {
    ///     card_bank: Some("Monobank".into()),
    ///     ..Requisites::default()
    /// };
    /// let update = RequisitesUpdate {
    ///     wallet: Some("UQ-wallet".into()),
    ///     ..RequisitesUpdate::default()
    /// };
    /// let merged = update.apply_to(current);
    /// assert_eq!(merged.wallet.as_deref(), Some("UQ-wallet"));
    /// assert_eq!(merged.card_bank.as_deref(), Some("Monobank"));
    /// ```
    pub fn apply_to(self, current: Requisites) -> Requisites {
        Requisites {
            wallet: self.wallet.or(current.wallet),
            card_number: self.card_number.or(current.card_number),
            card_bank: self.card_bank.or(current.card_bank),
            card_currency: self.card_currency.or(current.card_currency),
            messaging_handle: self.messaging_handle.or(current.messaging_handle),
        }
    }
}

/// Marketplace participant.
///
/// ## Invariants
/// - `external_id` is unique across users and never changes.
/// - `completed_deals` only grows, and only through order completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    external_id: ExternalId,
    display_name: DisplayName,
    requisites: Requisites,
    completed_deals: u32,
    created_at: DateTime<Utc>,
}

/// Input for [`User::new`], used by adapters rehydrating stored records.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub external_id: ExternalId,
    pub display_name: DisplayName,
    pub requisites: Requisites,
    pub completed_deals: u32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a user from validated components.
    pub fn new(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            external_id,
            display_name,
            requisites,
            completed_deals,
            created_at,
        } = draft;
        Self {
            id,
            external_id,
            display_name,
            requisites,
            completed_deals,
            created_at,
        }
    }

    /// A freshly registered user: no requisites and no completed deals.
    pub fn register(external_id: ExternalId, display_name: DisplayName) -> Self {
        Self::new(UserDraft {
            id: UserId::random(),
            external_id,
            display_name,
            requisites: Requisites::default(),
            completed_deals: 0,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn external_id(&self) -> &ExternalId {
        &self.external_id
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn requisites(&self) -> &Requisites {
        &self.requisites
    }

    pub fn completed_deals(&self) -> u32 {
        self.completed_deals
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl From<User> for UserDraft {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            external_id: value.external_id,
            display_name: value.display_name,
            requisites: value.requisites,
            completed_deals: value.completed_deals,
            created_at: value.created_at,
        }
    }
}

/// A user together with the per-currency volume they have traded.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user: User,
    pub volumes: CurrencyVolumes,
}
