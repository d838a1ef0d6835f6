use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::Database;
use peopledesk_db::models::{DocumentCategory, DocumentMetadata};

use super::base::{BaseDao, DaoResult};
use crate::validation::DocumentForm;

pub struct DocumentDao {
    pub base: BaseDao<DocumentMetadata>,
}

impl DocumentDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, DocumentMetadata::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        uploaded_by: ObjectId,
        uploader_name: String,
        download_url: String,
        form: DocumentForm,
    ) -> DaoResult<DocumentMetadata> {
        let document = DocumentMetadata {
            id: None,
            file_name: form.file_name,
            file_type: form.file_type,
            file_size: form.file_size,
            category: form.category,
            description: form.description,
            storage_key: form.storage_key,
            download_url,
            checksum: form.checksum,
            uploaded_by,
            uploader_name,
            uploaded_at: DateTime::now(),
        };

        let id = self.base.insert_one(&document).await?;
        self.base.find_by_id(id).await
    }

    pub async fn list(
        &self,
        category: Option<DocumentCategory>,
        limit: u32,
    ) -> DaoResult<Vec<DocumentMetadata>> {
        let mut filter = Document::new();
        if let Some(category) = category {
            filter.insert("category", category.as_str());
        }
        self.base
            .find_limited(filter, doc! { "uploaded_at": -1 }, limit)
            .await
    }
}
