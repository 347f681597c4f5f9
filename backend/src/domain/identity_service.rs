//! Identity resolution and user account services.
//!
//! Maps opaque client identifiers to persistent users. Registration is an
//! idempotent get-or-create whose race is settled by the repository's
//! uniqueness guarantee on the external id.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error};

use crate::domain::ports::{
    LedgerPersistenceError, LedgerRepository, ResolveUserRequest, UserAccountsCommand,
    UserAccountsQuery, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, ExternalId, OrderRuleViolation, RequisitesUpdate, User, UserProfile};

/// Map user repository failures onto the domain error envelope.
pub(crate) fn map_user_error(err: UserPersistenceError) -> Error {
    error!(error = %err, "user repository failure");
    match err {
        UserPersistenceError::Connection { message } => {
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

pub(crate) fn map_ledger_error(err: LedgerPersistenceError) -> Error {
    error!(error = %err, "ledger repository failure");
    match err {
        LedgerPersistenceError::Connection { message } => {
            Error::internal(format!("ledger repository unavailable: {message}"))
        }
        LedgerPersistenceError::Query { message } => {
            Error::internal(format!("ledger repository error: {message}"))
        }
    }
}

/// Load a user by external id, failing with `user_not_found`.
pub(crate) async fn require_user<U>(users: &U, external_id: &ExternalId) -> Result<User, Error>
where
    U: UserRepository + ?Sized,
{
    users
        .find_by_external_id(external_id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| OrderRuleViolation::UserNotFound.into())
}

/// User account service implementing the identity driving ports.
#[derive(Clone)]
pub struct IdentityService<U, L> {
    users: Arc<U>,
    ledger: Arc<L>,
}

impl<U, L> IdentityService<U, L> {
    /// Create a new service with the given repositories.
    pub fn new(users: Arc<U>, ledger: Arc<L>) -> Self {
        Self { users, ledger }
    }
}

#[async_trait]
impl<U, L> UserAccountsCommand for IdentityService<U, L>
where
    U: UserRepository,
    L: LedgerRepository,
{
    async fn resolve_or_create(&self, request: ResolveUserRequest) -> Result<User, Error> {
        let ResolveUserRequest {
            external_id,
            display_name,
        } = request;

        if let Some(existing) = self
            .users
            .find_by_external_id(&external_id)
            .await
            .map_err(map_user_error)?
        {
            return Ok(existing);
        }

        let candidate = User::register(external_id.clone(), display_name);
        self.users
            .insert_if_absent(&candidate)
            .await
            .map_err(map_user_error)?;

        let stored = self
            .users
            .find_by_external_id(&external_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::internal("user missing after registration"))?;
        if stored.id() == candidate.id() {
            debug!(external_id = %external_id, user_id = %stored.id(), "registered user");
        }
        Ok(stored)
    }

    async fn update_requisites(
        &self,
        external_id: &ExternalId,
        update: RequisitesUpdate,
    ) -> Result<(), Error> {
        if update.is_empty() {
            return Err(
                Error::invalid_request("requisites update must set at least one field")
                    .with_details(json!({ "code": "empty_update" })),
            );
        }
        let user = require_user(self.users.as_ref(), external_id).await?;
        let saved = self
            .users
            .merge_requisites(user.id(), &update)
            .await
            .map_err(map_user_error)?;
        if !saved {
            return Err(OrderRuleViolation::UserNotFound.into());
        }
        Ok(())
    }
}

#[async_trait]
impl<U, L> UserAccountsQuery for IdentityService<U, L>
where
    U: UserRepository,
    L: LedgerRepository,
{
    async fn profile(&self, external_id: &ExternalId) -> Result<UserProfile, Error> {
        let user = require_user(self.users.as_ref(), external_id).await?;
        let volumes = self
            .ledger
            .volumes_for(user.id())
            .await
            .map_err(map_ledger_error)?;
        Ok(UserProfile { user, volumes })
    }
}
