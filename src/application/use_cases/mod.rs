pub mod catalog;
pub mod hierarchy_path;
pub mod region_import;
pub mod select_options;
