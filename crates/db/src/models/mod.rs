pub mod announcement;
pub mod chat_message;
pub mod document;
pub mod employee;
pub mod leave_request;
pub mod resignation;
pub mod team;
pub mod user;
pub mod wifi_bill;

pub use announcement::*;
pub use chat_message::*;
pub use document::*;
pub use employee::*;
pub use leave_request::*;
pub use resignation::*;
pub use team::*;
pub use user::*;
pub use wifi_bill::*;
