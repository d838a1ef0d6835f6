pub mod auth;
pub mod chat;
pub mod dao;
pub mod feedback;
pub mod storage;
pub mod validation;

pub use auth::AuthService;
pub use dao::BaseDao;
pub use feedback::FeedbackAnalyzer;
pub use storage::{LocalObjectStore, ObjectStore};
pub use validation::FieldErrors;
