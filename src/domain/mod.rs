pub mod address_form;
pub mod catalog;
pub mod error;
pub mod region;
pub mod user;
