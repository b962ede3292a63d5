pub mod admin;
pub mod chat;
pub mod employees;
pub mod health;
