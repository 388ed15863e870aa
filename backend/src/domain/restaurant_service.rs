//! Restaurant service: validated CRUD over restaurant profiles.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{EntityRepository, RestaurantDirectory};
use crate::domain::reference::ReferenceValidator;
use crate::domain::service_support::{self, added, changed};
use crate::domain::{
    EntityId, EntityKind, Error, Persisted, Restaurant, RestaurantFilter, RestaurantPatch,
    validate_restaurant,
};

/// Implements [`RestaurantDirectory`] over a restaurant repository.
#[derive(Clone)]
pub struct RestaurantDirectoryService {
    restaurants: Arc<dyn EntityRepository<Restaurant>>,
    references: ReferenceValidator,
}

impl RestaurantDirectoryService {
    pub fn new(
        restaurants: Arc<dyn EntityRepository<Restaurant>>,
        references: ReferenceValidator,
    ) -> Self {
        Self {
            restaurants,
            references,
        }
    }
}

#[async_trait]
impl RestaurantDirectory for RestaurantDirectoryService {
    async fn create_restaurant(
        &self,
        meta: Option<Value>,
        restaurant: Restaurant,
    ) -> Result<Persisted<Restaurant>, Error> {
        validate_restaurant(&restaurant)?;
        self.references
            .require_optional("owner_id", EntityKind::User, restaurant.owner_id.as_ref())
            .await?;
        self.references
            .require_all("image_file_ids", EntityKind::File, &restaurant.image_file_ids)
            .await?;
        service_support::create(self.restaurants.as_ref(), meta, restaurant).await
    }

    async fn list_restaurants(
        &self,
        filter: RestaurantFilter,
    ) -> Result<Vec<Persisted<Restaurant>>, Error> {
        service_support::list(self.restaurants.as_ref(), &filter).await
    }

    async fn update_restaurant(
        &self,
        id: EntityId,
        patch: RestaurantPatch,
    ) -> Result<Persisted<Restaurant>, Error> {
        let current = service_support::fetch_active(self.restaurants.as_ref(), id).await?;
        let next = patch.apply(current.data.clone());
        validate_restaurant(&next)?;
        self.references
            .require_optional(
                "owner_id",
                EntityKind::User,
                changed(next.owner_id.as_ref(), current.owner_id.as_ref()),
            )
            .await?;
        self.references
            .require_all(
                "image_file_ids",
                EntityKind::File,
                &added(&next.image_file_ids, &current.image_file_ids),
            )
            .await?;
        let record = service_support::revise(current, next, patch.meta);
        service_support::update(self.restaurants.as_ref(), &record).await
    }

    async fn delete_restaurant(&self, id: EntityId) -> Result<(), Error> {
        service_support::delete(self.restaurants.as_ref(), id).await
    }
}

#[cfg(test)]
#[path = "restaurant_service_tests.rs"]
mod tests;
