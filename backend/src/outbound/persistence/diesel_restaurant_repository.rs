//! PostgreSQL-backed restaurant repository.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::PgArrayExpressionMethods;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{EntityRepository, RepositoryError};
use crate::domain::{EntityId, Persisted, Restaurant, RestaurantFilter};

use super::diesel_support::{map_diesel_error, next_stamp, substring_pattern};
use super::models::{NewRestaurantRow, RestaurantChanges, RestaurantRow};
use super::pool::DbPool;
use super::schema::restaurants;

#[derive(Clone)]
pub struct DieselRestaurantRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselRestaurantRepository {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl EntityRepository<Restaurant> for DieselRestaurantRepository {
    async fn create(
        &self,
        meta: Option<Value>,
        data: Restaurant,
    ) -> Result<Persisted<Restaurant>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let row = NewRestaurantRow {
            id: Uuid::new_v4(),
            changes: RestaurantChanges::new(meta, &data),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(restaurants::table)
            .values(&row)
            .returning(RestaurantRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .try_into()
    }

    async fn get(
        &self,
        filter: &RestaurantFilter,
    ) -> Result<Vec<Persisted<Restaurant>>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let mut query = restaurants::table
            .select(RestaurantRow::as_select())
            .into_boxed();
        if !filter.scope.include_deleted {
            query = query.filter(restaurants::is_active.eq(true));
        }
        if let Some(id) = filter.scope.id {
            query = query.filter(restaurants::id.eq(*id.as_uuid()));
        }
        if let Some(name) = filter.name.as_deref() {
            query = query.filter(restaurants::name.like(substring_pattern(name)));
        }
        if let Some(email) = filter.email.clone() {
            query = query.filter(restaurants::email.eq(email));
        }
        if let Some(phone) = filter.phone.clone() {
            query = query.filter(restaurants::phone.eq(phone));
        }
        if let Some(provider) = filter.auth_provider {
            query = query.filter(restaurants::auth_provider.eq(provider.as_str()));
        }
        if let Some(owner_id) = filter.owner_id {
            query = query.filter(restaurants::owner_id.eq(*owner_id.as_uuid()));
        }
        if let Some(cuisine) = filter.cuisine.clone() {
            query = query.filter(restaurants::cuisine_types.contains(vec![cuisine]));
        }
        if let Some(min) = filter.rating_min {
            query = query.filter(restaurants::rating.ge(min));
        }
        if let Some(max) = filter.rating_max {
            query = query.filter(restaurants::rating.le(max));
        }
        if let Some(min) = filter.delivery_fee_min {
            query = query.filter(restaurants::delivery_fee.ge(min));
        }
        if let Some(max) = filter.delivery_fee_max {
            query = query.filter(restaurants::delivery_fee.le(max));
        }
        query
            .order((restaurants::created_at.asc(), restaurants::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(Persisted::try_from)
            .collect()
    }

    async fn update(
        &self,
        record: &Persisted<Restaurant>,
    ) -> Result<Persisted<Restaurant>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let changes = RestaurantChanges::new(record.header.meta.clone(), &record.data);
        diesel::update(
            restaurants::table
                .filter(restaurants::id.eq(*record.id().as_uuid()))
                .filter(restaurants::is_active.eq(true)),
        )
        .set((&changes, restaurants::updated_at.eq(next_stamp!(now))))
        .returning(RestaurantRow::as_returning())
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
            restaurants::table
                .filter(restaurants::id.eq(*id.as_uuid()))
                .filter(restaurants::is_active.eq(true)),
        )
        .set((
            restaurants::is_active.eq(false),
            restaurants::updated_at.eq(next_stamp!(now)),
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
