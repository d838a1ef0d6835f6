use axum::extract::Multipart;
use std::collections::HashMap;

use crate::error::ApiError;

pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A multipart body: the `file` part plus any plain text fields.
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut file = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?;
                fields.insert(name, text);
            }
        }

        Ok(Self { file, fields })
    }

    pub fn require_file(self) -> Result<(UploadedFile, HashMap<String, String>), ApiError> {
        match self.file {
            Some(file) => Ok((file, self.fields)),
            None => Err(ApiError::field("file", "Choose a file to upload")),
        }
    }
}

impl UploadedFile {
    pub fn require_image(&self) -> Result<(), ApiError> {
        if self.content_type.starts_with("image/") {
            Ok(())
        } else {
            Err(ApiError::field("file", "Avatars must be an image"))
        }
    }
}
