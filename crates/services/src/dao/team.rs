use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use peopledesk_db::models::Team;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct TeamDao {
    pub base: BaseDao<Team>,
}

impl TeamDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Team::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        name: String,
        description: String,
        member_ids: Vec<ObjectId>,
        member_names: Vec<String>,
    ) -> DaoResult<Team> {
        let now = DateTime::now();
        let team = Team {
            id: None,
            name,
            description,
            member_ids,
            member_names,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&team).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update(
        &self,
        id: ObjectId,
        name: String,
        description: String,
        member_ids: Vec<ObjectId>,
        member_names: Vec<String>,
    ) -> DaoResult<Team> {
        let matched = self
            .base
            .update_by_id(
                id,
                doc! {
                    "$set": {
                        "name": name,
                        "description": description,
                        "member_ids": member_ids,
                        "member_names": member_names,
                    }
                },
            )
            .await?;
        if !matched {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(id).await
    }

    pub async fn list(&self) -> DaoResult<Vec<Team>> {
        self.base.find_many(doc! {}, Some(doc! { "name": 1 })).await
    }
}
