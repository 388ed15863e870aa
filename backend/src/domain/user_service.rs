//! User service: accounts, addresses and the default-address pointer.
//!
//! The default-address pointer on a user is maintained after the address
//! write commits. Pointer failures are returned as warnings and logged; the
//! address write is never rolled back. Promoting an address to primary does
//! not demote the user's other primary addresses.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::domain::ports::{EntityRepository, UserAccounts};
use crate::domain::reference::{ReferenceValidator, invalid_reference};
use crate::domain::service_support::{self, changed};
use crate::domain::{
    EntityId, EntityKind, Error, Persisted, RecordFilter, User, UserAddress, UserAddressFilter,
    UserAddressPatch, UserFilter, UserPatch, WithWarnings, validate_user, validate_user_address,
};

/// Implements [`UserAccounts`] over the user and address repositories.
#[derive(Clone)]
pub struct UserAccountService {
    users: Arc<dyn EntityRepository<User>>,
    addresses: Arc<dyn EntityRepository<UserAddress>>,
    references: ReferenceValidator,
}

impl UserAccountService {
    pub fn new(
        users: Arc<dyn EntityRepository<User>>,
        addresses: Arc<dyn EntityRepository<UserAddress>>,
        references: ReferenceValidator,
    ) -> Self {
        Self {
            users,
            addresses,
            references,
        }
    }

    /// A user's default address must be one of that user's active addresses.
    async fn require_owned_address(
        &self,
        user_id: EntityId,
        address_id: EntityId,
    ) -> Result<(), Error> {
        let filter = UserAddressFilter {
            user_id: Some(user_id),
            ..UserAddressFilter::by_id(address_id)
        };
        let owned = service_support::list(self.addresses.as_ref(), &filter).await?;
        if owned.is_empty() {
            return Err(invalid_reference(
                "default_address_id",
                EntityKind::UserAddress,
                &address_id,
            ));
        }
        Ok(())
    }

    /// Point the user's default address at `address_id`.
    async fn promote_default(&self, user_id: EntityId, address_id: EntityId) -> Result<(), Error> {
        let mut user = service_support::fetch_active(self.users.as_ref(), user_id).await?;
        if user.default_address_id == Some(address_id) {
            return Ok(());
        }
        user.data.default_address_id = Some(address_id);
        service_support::update(self.users.as_ref(), &user).await?;
        Ok(())
    }

    /// Clear the user's default address after a primary address is deleted.
    ///
    /// The pointer is cleared whatever it names: with several primaries
    /// outstanding, deleting any one of them leaves the user without a
    /// default.
    async fn clear_default(&self, user_id: EntityId) -> Result<(), Error> {
        let mut user = service_support::fetch_active(self.users.as_ref(), user_id).await?;
        if user.default_address_id.is_none() {
            return Ok(());
        }
        user.data.default_address_id = None;
        service_support::update(self.users.as_ref(), &user).await?;
        Ok(())
    }

    fn record_sync_failure<T>(
        outcome: &mut WithWarnings<T>,
        action: &str,
        user_id: EntityId,
        address_id: EntityId,
        error: &Error,
    ) {
        warn!(%user_id, %address_id, error = %error, "default address sync failed");
        outcome.warn(format!(
            "{action}, but failed to update the user's default address: {error}"
        ));
    }
}

#[async_trait]
impl UserAccounts for UserAccountService {
    async fn create_user(&self, meta: Option<Value>, user: User) -> Result<Persisted<User>, Error> {
        validate_user(&user)?;
        self.references
            .require_optional(
                "default_address_id",
                EntityKind::UserAddress,
                user.default_address_id.as_ref(),
            )
            .await?;
        service_support::create(self.users.as_ref(), meta, user).await
    }

    async fn list_users(&self, filter: UserFilter) -> Result<Vec<Persisted<User>>, Error> {
        service_support::list(self.users.as_ref(), &filter).await
    }

    async fn update_user(&self, id: EntityId, patch: UserPatch) -> Result<Persisted<User>, Error> {
        let current = service_support::fetch_active(self.users.as_ref(), id).await?;
        let next = patch.apply(current.data.clone());
        validate_user(&next)?;
        if let Some(address_id) = changed(
            next.default_address_id.as_ref(),
            current.default_address_id.as_ref(),
        ) {
            self.require_owned_address(id, *address_id).await?;
        }
        let record = service_support::revise(current, next, patch.meta);
        service_support::update(self.users.as_ref(), &record).await
    }

    async fn delete_user(&self, id: EntityId) -> Result<(), Error> {
        service_support::delete(self.users.as_ref(), id).await
    }

    async fn create_address(
        &self,
        meta: Option<Value>,
        address: UserAddress,
    ) -> Result<WithWarnings<Persisted<UserAddress>>, Error> {
        validate_user_address(&address)?;
        self.references
            .require("user_id", EntityKind::User, &address.user_id)
            .await?;
        let created = service_support::create(self.addresses.as_ref(), meta, address).await?;

        let mut outcome = WithWarnings::new(created);
        if outcome.value.is_primary {
            let (user_id, address_id) = (outcome.value.user_id, outcome.value.id());
            if let Err(error) = self.promote_default(user_id, address_id).await {
                Self::record_sync_failure(
                    &mut outcome,
                    "Address created",
                    user_id,
                    address_id,
                    &error,
                );
            }
        }
        Ok(outcome)
    }

    async fn list_addresses(
        &self,
        filter: UserAddressFilter,
    ) -> Result<Vec<Persisted<UserAddress>>, Error> {
        service_support::list(self.addresses.as_ref(), &filter).await
    }

    async fn update_address(
        &self,
        id: EntityId,
        patch: UserAddressPatch,
    ) -> Result<WithWarnings<Persisted<UserAddress>>, Error> {
        let current = service_support::fetch_active(self.addresses.as_ref(), id).await?;
        let was_primary = current.is_primary;
        let next = patch.apply(current.data.clone());
        validate_user_address(&next)?;
        if let Some(user_id) = changed(Some(&next.user_id), Some(&current.user_id)) {
            self.references
                .require("user_id", EntityKind::User, user_id)
                .await?;
        }
        let record = service_support::revise(current, next, patch.meta);
        let updated = service_support::update(self.addresses.as_ref(), &record).await?;

        let mut outcome = WithWarnings::new(updated);
        if !was_primary && outcome.value.is_primary {
            let user_id = outcome.value.user_id;
            if let Err(error) = self.promote_default(user_id, id).await {
                Self::record_sync_failure(&mut outcome, "Address updated", user_id, id, &error);
            }
        }
        Ok(outcome)
    }

    async fn delete_address(&self, id: EntityId) -> Result<WithWarnings<()>, Error> {
        let current = service_support::fetch_active(self.addresses.as_ref(), id).await?;
        service_support::delete(self.addresses.as_ref(), id).await?;

        let mut outcome = WithWarnings::new(());
        if current.is_primary {
            let user_id = current.user_id;
            if let Err(error) = self.clear_default(user_id).await {
                Self::record_sync_failure(&mut outcome, "Address deleted", user_id, id, &error);
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
