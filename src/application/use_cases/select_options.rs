use crate::application::use_cases::hierarchy_path::{
    parent_select_options, path_options, PathNode, SelectOption,
};
use crate::domain::address_form::{AddressField, AddressFormState};
use crate::domain::catalog::TernaryFilter;
use crate::domain::error::Result;
use crate::domain::region::RegionLevel;
use crate::infrastructure::db::catalog::CatalogRepository;
use crate::infrastructure::db::regions::RegionRepository;
use sqlx::sqlite::SqlitePool;

/// Option feeds behind the admin select inputs.
pub struct SelectOptionsUseCase {
    regions: RegionRepository,
    catalog: CatalogRepository,
}

impl SelectOptionsUseCase {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            regions: RegionRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool),
        }
    }

    /// Category "parent" select, leaving out the category being edited.
    pub async fn category_parent_options(&self, exclude: Option<i64>) -> Result<Vec<SelectOption<i64>>> {
        let categories = self.catalog.list_categories(TernaryFilter::All, None).await?;
        let nodes: Vec<PathNode<i64>> = categories.iter().map(PathNode::from).collect();
        Ok(parent_select_options(&nodes, exclude.as_ref()))
    }

    /// Breadcrumb options for every region of `level`, labelled with its
    /// ancestors (`Aceh > Kab. Simeulue`).
    pub async fn region_options(&self, level: RegionLevel) -> Result<Vec<SelectOption<String>>> {
        let mut nodes: Vec<PathNode<String>> = Vec::new();
        let mut current = Some(level);
        while let Some(lvl) = current {
            nodes.extend(self.regions.list_level(lvl).await?.iter().map(PathNode::from));
            current = lvl.parent();
        }

        Ok(path_options(&nodes)
            .into_iter()
            .filter(|option| {
                option
                    .value
                    .as_deref()
                    .and_then(RegionLevel::classify)
                    == Some(level)
            })
            .collect())
    }

    /// Names offered by one address field given the form's current parent
    /// value. A dependent field with no parent selected offers nothing.
    pub async fn address_options(&self, form: &AddressFormState, field: AddressField) -> Result<Vec<String>> {
        match form.filter_value(field) {
            None => self.regions.names(field.level()).await,
            Some(None) => Ok(Vec::new()),
            Some(Some(parent)) => self.regions.child_names(field.level(), parent).await,
        }
    }

    /// Children of the named parent one level down, for the HTTP feeds.
    pub async fn child_options(&self, level: RegionLevel, parent_name: &str) -> Result<Vec<String>> {
        self.regions.child_names(level, parent_name).await
    }

    pub async fn province_names(&self) -> Result<Vec<String>> {
        self.regions.names(RegionLevel::Province).await
    }
}
