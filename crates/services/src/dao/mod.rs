pub mod announcement;
pub mod base;
pub mod chat;
pub mod document;
pub mod employee;
pub mod leave_request;
pub mod resignation;
pub mod team;
pub mod user;
pub mod wifi_bill;

pub use base::BaseDao;
