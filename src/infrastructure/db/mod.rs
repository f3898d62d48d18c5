pub mod catalog;
pub mod connection;
pub mod regions;
pub mod users;
