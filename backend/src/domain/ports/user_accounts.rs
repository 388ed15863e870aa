//! Driving port for the user service: accounts and delivery addresses.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{
    EntityId, Error, Persisted, User, UserAddress, UserAddressFilter, UserAddressPatch, UserFilter,
    UserPatch, WithWarnings,
};

/// Use cases exposed by the user service.
///
/// Address mutations return warnings when the owning user's default-address
/// pointer could not be synchronised; the address write itself stands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    async fn create_user(&self, meta: Option<Value>, user: User) -> Result<Persisted<User>, Error>;

    async fn list_users(&self, filter: UserFilter) -> Result<Vec<Persisted<User>>, Error>;

    async fn update_user(&self, id: EntityId, patch: UserPatch) -> Result<Persisted<User>, Error>;

    async fn delete_user(&self, id: EntityId) -> Result<(), Error>;

    async fn create_address(
        &self,
        meta: Option<Value>,
        address: UserAddress,
    ) -> Result<WithWarnings<Persisted<UserAddress>>, Error>;

    async fn list_addresses(
        &self,
        filter: UserAddressFilter,
    ) -> Result<Vec<Persisted<UserAddress>>, Error>;

    async fn update_address(
        &self,
        id: EntityId,
        patch: UserAddressPatch,
    ) -> Result<WithWarnings<Persisted<UserAddress>>, Error>;

    async fn delete_address(&self, id: EntityId) -> Result<WithWarnings<()>, Error>;
}
