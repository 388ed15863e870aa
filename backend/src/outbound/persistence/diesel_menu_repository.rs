//! PostgreSQL-backed menu category and menu item repositories.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{EntityRepository, RepositoryError};
use crate::domain::{
    EntityId, MenuCategory, MenuCategoryFilter, MenuItem, MenuItemFilter, Persisted,
};

use super::diesel_support::{map_diesel_error, next_stamp, substring_pattern};
use super::models::{
    MenuCategoryChanges, MenuCategoryRow, MenuItemChanges, MenuItemRow, NewMenuCategoryRow,
    NewMenuItemRow,
};
use super::pool::DbPool;
use super::schema::{menu_categories, menu_items};

#[derive(Clone)]
pub struct DieselMenuCategoryRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselMenuCategoryRepository {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl EntityRepository<MenuCategory> for DieselMenuCategoryRepository {
    async fn create(
        &self,
        meta: Option<Value>,
        data: MenuCategory,
    ) -> Result<Persisted<MenuCategory>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let row = NewMenuCategoryRow {
            id: Uuid::new_v4(),
            changes: MenuCategoryChanges::new(meta, &data),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let stored = diesel::insert_into(menu_categories::table)
            .values(&row)
            .returning(MenuCategoryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.into())
    }

    async fn get(
        &self,
        filter: &MenuCategoryFilter,
    ) -> Result<Vec<Persisted<MenuCategory>>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let mut query = menu_categories::table
            .select(MenuCategoryRow::as_select())
            .into_boxed();
        if !filter.scope.include_deleted {
            query = query.filter(menu_categories::is_active.eq(true));
        }
        if let Some(id) = filter.scope.id {
            query = query.filter(menu_categories::id.eq(*id.as_uuid()));
        }
        if let Some(restaurant_id) = filter.restaurant_id {
            query = query.filter(menu_categories::restaurant_id.eq(*restaurant_id.as_uuid()));
        }
        if let Some(name) = filter.name.as_deref() {
            query = query.filter(menu_categories::name.like(substring_pattern(name)));
        }
        let rows = query
            .order((menu_categories::created_at.asc(), menu_categories::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Persisted::from).collect())
    }

    async fn update(
        &self,
        record: &Persisted<MenuCategory>,
    ) -> Result<Persisted<MenuCategory>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let changes = MenuCategoryChanges::new(record.header.meta.clone(), &record.data);
        let stored = diesel::update(
            menu_categories::table
                .filter(menu_categories::id.eq(*record.id().as_uuid()))
                .filter(menu_categories::is_active.eq(true)),
        )
        .set((&changes, menu_categories::updated_at.eq(next_stamp!(now))))
        .returning(MenuCategoryRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| RepositoryError::not_found(record.id()))?;
        Ok(stored.into())
    }

    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let affected = diesel::update(
            menu_categories::table
                .filter(menu_categories::id.eq(*id.as_uuid()))
                .filter(menu_categories::is_active.eq(true)),
        )
        .set((
            menu_categories::is_active.eq(false),
            menu_categories::updated_at.eq(next_stamp!(now)),
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

#[derive(Clone)]
pub struct DieselMenuItemRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselMenuItemRepository {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl EntityRepository<MenuItem> for DieselMenuItemRepository {
    async fn create(
        &self,
        meta: Option<Value>,
        data: MenuItem,
    ) -> Result<Persisted<MenuItem>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let row = NewMenuItemRow {
            id: Uuid::new_v4(),
            changes: MenuItemChanges::new(meta, &data),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(menu_items::table)
            .values(&row)
            .returning(MenuItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .try_into()
    }

    async fn get(
        &self,
        filter: &MenuItemFilter,
    ) -> Result<Vec<Persisted<MenuItem>>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let mut query = menu_items::table
            .select(MenuItemRow::as_select())
            .into_boxed();
        if !filter.scope.include_deleted {
            query = query.filter(menu_items::is_active.eq(true));
        }
        if let Some(id) = filter.scope.id {
            query = query.filter(menu_items::id.eq(*id.as_uuid()));
        }
        if let Some(restaurant_id) = filter.restaurant_id {
            query = query.filter(menu_items::restaurant_id.eq(*restaurant_id.as_uuid()));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(menu_items::category_id.eq(*category_id.as_uuid()));
        }
        if let Some(name) = filter.name.as_deref() {
            query = query.filter(menu_items::name.like(substring_pattern(name)));
        }
        if let Some(is_available) = filter.is_available {
            query = query.filter(menu_items::is_available.eq(is_available));
        }
        if let Some(min) = filter.price_min {
            query = query.filter(menu_items::price.ge(min));
        }
        if let Some(max) = filter.price_max {
            query = query.filter(menu_items::price.le(max));
        }
        query
            .order((menu_items::created_at.asc(), menu_items::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(Persisted::try_from)
            .collect()
    }

    async fn update(
        &self,
        record: &Persisted<MenuItem>,
    ) -> Result<Persisted<MenuItem>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let changes = MenuItemChanges::new(record.header.meta.clone(), &record.data);
        diesel::update(
            menu_items::table
                .filter(menu_items::id.eq(*record.id().as_uuid()))
                .filter(menu_items::is_active.eq(true)),
        )
        .set((&changes, menu_items::updated_at.eq(next_stamp!(now))))
        .returning(MenuItemRow::as_returning())
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
            menu_items::table
                .filter(menu_items::id.eq(*id.as_uuid()))
                .filter(menu_items::is_active.eq(true)),
        )
        .set((
            menu_items::is_active.eq(false),
            menu_items::updated_at.eq(next_stamp!(now)),
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
