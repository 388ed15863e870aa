//! PostgreSQL-backed user and user-address repositories.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{EntityRepository, RepositoryError};
use crate::domain::{EntityId, Persisted, User, UserAddress, UserAddressFilter, UserFilter};

use super::diesel_support::{map_diesel_error, next_stamp, substring_pattern};
use super::models::{
    NewUserAddressRow, NewUserRow, UserAddressChanges, UserAddressRow, UserChanges, UserRow,
};
use super::pool::DbPool;
use super::schema::{user_addresses, users};

/// Diesel adapter for the `users` table.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl EntityRepository<User> for DieselUserRepository {
    async fn create(
        &self,
        meta: Option<Value>,
        data: User,
    ) -> Result<Persisted<User>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let row = NewUserRow {
            id: Uuid::new_v4(),
            changes: UserChanges::new(meta, &data),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .try_into()
    }

    async fn get(&self, filter: &UserFilter) -> Result<Vec<Persisted<User>>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let mut query = users::table.select(UserRow::as_select()).into_boxed();
        if !filter.scope.include_deleted {
            query = query.filter(users::is_active.eq(true));
        }
        if let Some(id) = filter.scope.id {
            query = query.filter(users::id.eq(*id.as_uuid()));
        }
        if let Some(name) = filter.name.as_deref() {
            query = query.filter(users::name.like(substring_pattern(name)));
        }
        if let Some(email) = filter.email.clone() {
            query = query.filter(users::email.eq(email));
        }
        if let Some(phone) = filter.phone.clone() {
            query = query.filter(users::phone.eq(phone));
        }
        if let Some(provider) = filter.auth_provider {
            query = query.filter(users::auth_provider.eq(provider.as_str()));
        }
        query
            .order((users::created_at.asc(), users::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(Persisted::try_from)
            .collect()
    }

    async fn update(&self, record: &Persisted<User>) -> Result<Persisted<User>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let changes = UserChanges::new(record.header.meta.clone(), &record.data);
        diesel::update(
            users::table
                .filter(users::id.eq(*record.id().as_uuid()))
                .filter(users::is_active.eq(true)),
        )
        .set((&changes, users::updated_at.eq(next_stamp!(now))))
        .returning(UserRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| RepositoryError::not_found(record.id()))?
        .try_into()
    }

    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let affected = diesel::update(
            users::table
                .filter(users::id.eq(*id.as_uuid()))
                .filter(users::is_active.eq(true)),
        )
        .set((users::is_active.eq(false), users::updated_at.eq(next_stamp!(now))))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(RepositoryError::not_found(*id));
        }
        Ok(())
    }
}

/// Diesel adapter for the `user_addresses` table.
#[derive(Clone)]
pub struct DieselUserAddressRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselUserAddressRepository {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl EntityRepository<UserAddress> for DieselUserAddressRepository {
    async fn create(
        &self,
        meta: Option<Value>,
        data: UserAddress,
    ) -> Result<Persisted<UserAddress>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let row = NewUserAddressRow {
            id: Uuid::new_v4(),
            changes: UserAddressChanges::new(meta, &data),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(user_addresses::table)
            .values(&row)
            .returning(UserAddressRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .try_into()
    }

    async fn get(
        &self,
        filter: &UserAddressFilter,
    ) -> Result<Vec<Persisted<UserAddress>>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let mut query = user_addresses::table
            .select(UserAddressRow::as_select())
            .into_boxed();
        if !filter.scope.include_deleted {
            query = query.filter(user_addresses::is_active.eq(true));
        }
        if let Some(id) = filter.scope.id {
            query = query.filter(user_addresses::id.eq(*id.as_uuid()));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(user_addresses::user_id.eq(*user_id.as_uuid()));
        }
        if let Some(city) = filter.city.clone() {
            query = query.filter(user_addresses::city.eq(city));
        }
        if let Some(postal_code) = filter.postal_code.clone() {
            query = query.filter(user_addresses::postal_code.eq(postal_code));
        }
        if let Some(is_primary) = filter.is_primary {
            query = query.filter(user_addresses::is_primary.eq(is_primary));
        }
        query
            .order((user_addresses::created_at.asc(), user_addresses::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(Persisted::try_from)
            .collect()
    }

    async fn update(
        &self,
        record: &Persisted<UserAddress>,
    ) -> Result<Persisted<UserAddress>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let changes = UserAddressChanges::new(record.header.meta.clone(), &record.data);
        diesel::update(
            user_addresses::table
                .filter(user_addresses::id.eq(*record.id().as_uuid()))
                .filter(user_addresses::is_active.eq(true)),
        )
        .set((&changes, user_addresses::updated_at.eq(next_stamp!(now))))
        .returning(UserAddressRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| RepositoryError::not_found(record.id()))?
        .try_into()
    }

    /// Deleting an address also clears its primary flag.
    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let affected = diesel::update(
            user_addresses::table
                .filter(user_addresses::id.eq(*id.as_uuid()))
                .filter(user_addresses::is_active.eq(true)),
        )
        .set((
            user_addresses::is_active.eq(false),
            user_addresses::is_primary.eq(false),
            user_addresses::updated_at.eq(next_stamp!(now)),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(RepositoryError::not_found(*id));
        }
        Ok(())
    }
}
