//! Driving port for the restaurant service.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{EntityId, Error, Persisted, Restaurant, RestaurantFilter, RestaurantPatch};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestaurantDirectory: Send + Sync {
    async fn create_restaurant(
        &self,
        meta: Option<Value>,
        restaurant: Restaurant,
    ) -> Result<Persisted<Restaurant>, Error>;

    async fn list_restaurants(
        &self,
        filter: RestaurantFilter,
    ) -> Result<Vec<Persisted<Restaurant>>, Error>;

    /// Only references that the patch changes are re-validated.
    async fn update_restaurant(
        &self,
        id: EntityId,
        patch: RestaurantPatch,
    ) -> Result<Persisted<Restaurant>, Error>;

    async fn delete_restaurant(&self, id: EntityId) -> Result<(), Error>;
}
