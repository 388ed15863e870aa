//! Users and the addresses they own.

use std::collections::BTreeSet;

use serde_json::Value;

use super::entity::{EntityData, EntityKind, RecordFilter, contains_or_any, eq_optional, eq_or_any};
use super::person::{AuthProvider, PersonDetails};
use super::record::{EntityId, FilterScope};
use super::validation::{ValidationError, require_text, require_within};

/// Customer account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub person: PersonDetails,
    pub preferences: BTreeSet<String>,
    pub dietary_restrictions: BTreeSet<String>,
    /// Weak pointer maintained by the default-address rules.
    pub default_address_id: Option<EntityId>,
}

impl EntityData for User {
    type Filter = UserFilter;
    const KIND: EntityKind = EntityKind::User;
}

/// Validate a user before it is written.
pub fn validate_user(user: &User) -> Result<(), ValidationError> {
    user.person.validate()
}

/// `Get` filter for users.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub scope: FilterScope,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: Option<AuthProvider>,
}

impl RecordFilter<User> for UserFilter {
    fn scope(&self) -> &FilterScope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut FilterScope {
        &mut self.scope
    }

    fn matches_data(&self, data: &User) -> bool {
        contains_or_any(self.name.as_deref(), &data.person.name)
            && eq_optional(self.email.as_deref(), data.person.email.as_deref())
            && eq_optional(self.phone.as_deref(), data.person.phone.as_deref())
            && eq_or_any(self.auth_provider.as_ref(), &data.person.auth_provider)
    }
}

/// Partial update for a user. Unset fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: Option<AuthProvider>,
    pub preferences: Option<BTreeSet<String>>,
    pub dietary_restrictions: Option<BTreeSet<String>>,
    pub default_address_id: Option<EntityId>,
    pub meta: Option<Value>,
}

impl UserPatch {
    /// Apply the patch, returning the updated value.
    #[must_use]
    pub fn apply(&self, mut user: User) -> User {
        if let Some(name) = &self.name {
            user.person.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            user.person.email = Some(email.clone());
        }
        if let Some(phone) = &self.phone {
            user.person.phone = Some(phone.clone());
        }
        if let Some(provider) = self.auth_provider {
            user.person.auth_provider = provider;
        }
        if let Some(preferences) = &self.preferences {
            user.preferences.clone_from(preferences);
        }
        if let Some(restrictions) = &self.dietary_restrictions {
            user.dietary_restrictions.clone_from(restrictions);
        }
        if let Some(address_id) = self.default_address_id {
            user.default_address_id = Some(address_id);
        }
        user
    }
}

/// Geographic coordinates attached to an address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Delivery address owned by exactly one user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAddress {
    pub user_id: EntityId,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub alias_name: Option<String>,
    pub location: Option<GeoPoint>,
    pub is_primary: bool,
}

impl EntityData for UserAddress {
    type Filter = UserAddressFilter;
    const KIND: EntityKind = EntityKind::UserAddress;

    /// A deleted address can no longer be anyone's primary address.
    fn retire(&mut self) {
        self.is_primary = false;
    }
}

/// Validate an address before it is written.
pub fn validate_user_address(address: &UserAddress) -> Result<(), ValidationError> {
    require_text("address_line1", &address.address_line1)?;
    require_text("city", &address.city)?;
    require_text("state", &address.state)?;
    require_text("postal_code", &address.postal_code)?;
    require_text("country", &address.country)?;
    if let Some(point) = address.location {
        require_within("latitude", point.latitude, -90.0, 90.0)?;
        require_within("longitude", point.longitude, -180.0, 180.0)?;
    }
    Ok(())
}

/// `Get` filter for addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAddressFilter {
    pub scope: FilterScope,
    pub user_id: Option<EntityId>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub is_primary: Option<bool>,
}

impl RecordFilter<UserAddress> for UserAddressFilter {
    fn scope(&self) -> &FilterScope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut FilterScope {
        &mut self.scope
    }

    fn matches_data(&self, data: &UserAddress) -> bool {
        eq_or_any(self.user_id.as_ref(), &data.user_id)
            && eq_or_any(self.city.as_deref(), data.city.as_str())
            && eq_or_any(self.postal_code.as_deref(), data.postal_code.as_str())
            && eq_or_any(self.is_primary.as_ref(), &data.is_primary)
    }
}

/// Partial update for an address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAddressPatch {
    pub user_id: Option<EntityId>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub alias_name: Option<String>,
    pub location: Option<GeoPoint>,
    pub is_primary: Option<bool>,
    pub meta: Option<Value>,
}

impl UserAddressPatch {
    #[must_use]
    pub fn apply(&self, mut address: UserAddress) -> UserAddress {
        if let Some(user_id) = self.user_id {
            address.user_id = user_id;
        }
        if let Some(line) = &self.address_line1 {
            address.address_line1.clone_from(line);
        }
        if let Some(line) = &self.address_line2 {
            address.address_line2 = Some(line.clone());
        }
        if let Some(city) = &self.city {
            address.city.clone_from(city);
        }
        if let Some(state) = &self.state {
            address.state.clone_from(state);
        }
        if let Some(code) = &self.postal_code {
            address.postal_code.clone_from(code);
        }
        if let Some(country) = &self.country {
            address.country.clone_from(country);
        }
        if let Some(alias) = &self.alias_name {
            address.alias_name = Some(alias.clone());
        }
        if let Some(point) = self.location {
            address.location = Some(point);
        }
        if let Some(primary) = self.is_primary {
            address.is_primary = primary;
        }
        address
    }
}
