use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use peopledesk_db::models::Announcement;

use super::base::{BaseDao, DaoResult};
use crate::validation::AnnouncementForm;

pub struct AnnouncementDao {
    pub base: BaseDao<Announcement>,
}

impl AnnouncementDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Announcement::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        author_id: ObjectId,
        author_name: String,
        form: AnnouncementForm,
    ) -> DaoResult<Announcement> {
        let announcement = Announcement {
            id: None,
            title: form.title,
            content: form.content,
            author_id,
            author_name,
            published_at: DateTime::now(),
        };

        let id = self.base.insert_one(&announcement).await?;
        self.base.find_by_id(id).await
    }

    pub async fn recent(&self, limit: u32) -> DaoResult<Vec<Announcement>> {
        self.base
            .find_limited(doc! {}, doc! { "published_at": -1 }, limit)
            .await
    }
}
