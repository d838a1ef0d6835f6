use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{
    Announcement, ChatMessage, DocumentMetadata, Employee, LeaveRequest, Resignation, Team, User,
    WifiBill,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        User::COLLECTION,
        vec![
            index_unique(bson::doc! { "email": 1 }),
            index(bson::doc! { "employee_id": 1 }),
        ],
    )
    .await?;

    // Employees
    create_indexes(
        db,
        Employee::COLLECTION,
        vec![
            index_unique(bson::doc! { "email": 1 }),
            index(bson::doc! { "status": 1, "department": 1 }),
            index(bson::doc! { "last_name": 1, "first_name": 1 }),
        ],
    )
    .await?;

    // Leave requests
    create_indexes(
        db,
        LeaveRequest::COLLECTION,
        vec![
            index(bson::doc! { "employee_id": 1, "start_date": -1 }),
            index(bson::doc! { "status": 1, "requested_at": -1 }),
        ],
    )
    .await?;

    // Resignations
    create_indexes(
        db,
        Resignation::COLLECTION,
        vec![
            index(bson::doc! { "employee_id": 1 }),
            index(bson::doc! { "resignation_date": -1 }),
        ],
    )
    .await?;

    // Teams
    create_indexes(
        db,
        Team::COLLECTION,
        vec![
            index(bson::doc! { "name": 1 }),
            index(bson::doc! { "member_ids": 1 }),
        ],
    )
    .await?;

    // Documents
    create_indexes(
        db,
        DocumentMetadata::COLLECTION,
        vec![
            index(bson::doc! { "category": 1, "uploaded_at": -1 }),
            index(bson::doc! { "uploaded_by": 1, "uploaded_at": -1 }),
        ],
    )
    .await?;

    // Chat
    create_indexes(
        db,
        ChatMessage::COLLECTION,
        vec![
            index(bson::doc! { "conversation_id": 1, "created_at": -1 }),
            index(bson::doc! { "participants": 1, "created_at": -1 }),
        ],
    )
    .await?;

    // WiFi bills
    create_indexes(
        db,
        WifiBill::COLLECTION,
        vec![index(bson::doc! { "due_date": -1 })],
    )
    .await?;

    // Announcements
    create_indexes(
        db,
        Announcement::COLLECTION,
        vec![index(bson::doc! { "published_at": -1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
