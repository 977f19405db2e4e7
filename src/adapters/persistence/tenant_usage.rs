use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::tier_gate::TenantUsageRepo,
};

#[async_trait]
impl TenantUsageRepo for PostgresPersistence {
    async fn count_restaurants_by_owner(&self, owner_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM restaurants WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn count_categories_in_restaurant(&self, restaurant_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn count_menu_items_in_restaurant(&self, restaurant_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM menu_items WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn count_staff_by_owner(&self, owner_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'staff' AND owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn get_restaurant_owner(&self, restaurant_id: Uuid) -> AppResult<Option<Uuid>> {
        sqlx::query_scalar("SELECT owner_id FROM restaurants WHERE id = $1")
            .bind(restaurant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }
}
