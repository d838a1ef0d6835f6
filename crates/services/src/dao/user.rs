use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use peopledesk_db::models::{Role, User};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    /// The very first account becomes the administrator.
    pub async fn create(
        &self,
        email: String,
        display_name: String,
        password_hash: String,
    ) -> DaoResult<User> {
        let role = if self.base.count(doc! {}).await? == 0 {
            Role::Admin
        } else {
            Role::Employee
        };

        let now = DateTime::now();
        let user = User {
            id: None,
            email: email.to_lowercase(),
            display_name,
            password_hash: Some(password_hash),
            role,
            avatar_url: None,
            employee_id: None,
            desktop_notifications: true,
            last_active_at: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email.to_lowercase() })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn update_profile(
        &self,
        user_id: ObjectId,
        display_name: Option<String>,
        desktop_notifications: Option<bool>,
    ) -> DaoResult<bool> {
        let mut update = bson::Document::new();
        if let Some(name) = display_name {
            update.insert("display_name", name);
        }
        if let Some(enabled) = desktop_notifications {
            update.insert("desktop_notifications", enabled);
        }

        if update.is_empty() {
            return Ok(false);
        }

        self.base
            .update_by_id(user_id, doc! { "$set": update })
            .await
    }

    pub async fn set_avatar(&self, user_id: ObjectId, avatar_url: &str) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "avatar_url": avatar_url } })
            .await
    }

    pub async fn touch(&self, user_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "last_active_at": DateTime::now() } })
            .await
    }

    /// Subset of `user_ids` that accept desktop notifications.
    pub async fn notifiable_among(&self, user_ids: &[ObjectId]) -> DaoResult<Vec<ObjectId>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = self
            .base
            .find_many(
                doc! { "_id": { "$in": user_ids }, "desktop_notifications": true },
                None,
            )
            .await?;
        Ok(users.into_iter().filter_map(|u| u.id).collect())
    }

    pub async fn all_ids(&self) -> DaoResult<Vec<ObjectId>> {
        let users = self.base.find_many(doc! {}, None).await?;
        Ok(users.into_iter().filter_map(|u| u.id).collect())
    }
}
