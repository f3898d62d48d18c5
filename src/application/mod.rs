pub mod use_cases;

pub use use_cases::catalog::CatalogUseCase;
pub use use_cases::region_import::RegionImportUseCase;
pub use use_cases::select_options::SelectOptionsUseCase;
