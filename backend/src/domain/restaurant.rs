//! Restaurant aggregate.

use std::collections::BTreeSet;

use serde_json::Value;

use super::entity::{
    EntityData, EntityKind, RecordFilter, contains_or_any, eq_optional, eq_or_any, within_bounds,
};
use super::person::{AuthProvider, PersonDetails};
use super::record::{EntityId, FilterScope};
use super::validation::{ValidationError, require_non_negative, require_text};

#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub person: PersonDetails,
    /// User account operating the restaurant.
    pub owner_id: Option<EntityId>,
    pub cuisine_types: BTreeSet<String>,
    /// Opaque opening-hours document; must be a JSON object.
    pub operating_hours: Value,
    pub location: String,
    pub rating: f64,
    pub delivery_fee: f64,
    /// Weak references into the file service.
    pub image_file_ids: Vec<EntityId>,
}

impl EntityData for Restaurant {
    type Filter = RestaurantFilter;
    const KIND: EntityKind = EntityKind::Restaurant;
}

/// Validate a restaurant before it is written.
pub fn validate_restaurant(restaurant: &Restaurant) -> Result<(), ValidationError> {
    restaurant.person.validate()?;
    if restaurant
        .cuisine_types
        .iter()
        .all(|tag| tag.trim().is_empty())
    {
        return Err(ValidationError::EmptyCollection {
            field: "cuisine_types",
        });
    }
    match &restaurant.operating_hours {
        Value::Object(hours) if !hours.is_empty() => {}
        Value::Object(_) | Value::Null => {
            return Err(ValidationError::Missing {
                field: "operating_hours",
            });
        }
        _ => {
            return Err(ValidationError::NotAnObject {
                field: "operating_hours",
            });
        }
    }
    require_text("location", &restaurant.location)?;
    require_non_negative("rating", restaurant.rating)?;
    require_non_negative("delivery_fee", restaurant.delivery_fee)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestaurantFilter {
    pub scope: FilterScope,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: Option<AuthProvider>,
    pub owner_id: Option<EntityId>,
    /// Matches restaurants tagged with this cuisine.
    pub cuisine: Option<String>,
    pub rating_min: Option<f64>,
    pub rating_max: Option<f64>,
    pub delivery_fee_min: Option<f64>,
    pub delivery_fee_max: Option<f64>,
}

impl RecordFilter<Restaurant> for RestaurantFilter {
    fn scope(&self) -> &FilterScope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut FilterScope {
        &mut self.scope
    }

    fn matches_data(&self, data: &Restaurant) -> bool {
        contains_or_any(self.name.as_deref(), &data.person.name)
            && eq_optional(self.email.as_deref(), data.person.email.as_deref())
            && eq_optional(self.phone.as_deref(), data.person.phone.as_deref())
            && eq_or_any(self.auth_provider.as_ref(), &data.person.auth_provider)
            && eq_optional(self.owner_id.as_ref(), data.owner_id.as_ref())
            && self
                .cuisine
                .as_ref()
                .is_none_or(|cuisine| data.cuisine_types.contains(cuisine))
            && within_bounds(self.rating_min, self.rating_max, data.rating)
            && within_bounds(self.delivery_fee_min, self.delivery_fee_max, data.delivery_fee)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestaurantPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: Option<AuthProvider>,
    pub owner_id: Option<EntityId>,
    pub cuisine_types: Option<BTreeSet<String>>,
    pub operating_hours: Option<Value>,
    pub location: Option<String>,
    pub rating: Option<f64>,
    pub delivery_fee: Option<f64>,
    pub image_file_ids: Option<Vec<EntityId>>,
    pub meta: Option<Value>,
}

impl RestaurantPatch {
    #[must_use]
    pub fn apply(&self, mut restaurant: Restaurant) -> Restaurant {
        if let Some(name) = &self.name {
            restaurant.person.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            restaurant.person.email = Some(email.clone());
        }
        if let Some(phone) = &self.phone {
            restaurant.person.phone = Some(phone.clone());
        }
        if let Some(provider) = self.auth_provider {
            restaurant.person.auth_provider = provider;
        }
        if let Some(owner_id) = self.owner_id {
            restaurant.owner_id = Some(owner_id);
        }
        if let Some(cuisines) = &self.cuisine_types {
            restaurant.cuisine_types.clone_from(cuisines);
        }
        if let Some(hours) = &self.operating_hours {
            restaurant.operating_hours.clone_from(hours);
        }
        if let Some(location) = &self.location {
            restaurant.location.clone_from(location);
        }
        if let Some(rating) = self.rating {
            restaurant.rating = rating;
        }
        if let Some(fee) = self.delivery_fee {
            restaurant.delivery_fee = fee;
        }
        if let Some(images) = &self.image_file_ids {
            restaurant.image_file_ids.clone_from(images);
        }
        restaurant
    }
}
