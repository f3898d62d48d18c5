use crate::domain::catalog::{
    Address, AddressInput, AddressOwner, Brand, BrandInput, BrandStatus, Category, CategoryInput,
    CategoryStatus, Seller, SellerInput, SellerStatus, TernaryFilter,
};
use crate::domain::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::QueryBuilder;
use sqlx::Sqlite;
use std::str::FromStr;

const BRAND_COLUMNS: &str = "id, name, slug, logo_path, description, status, meta_title, meta_description, created_at, updated_at";
const CATEGORY_COLUMNS: &str = "id, name, slug, description, image_path, parent_id, status, meta_title, meta_description, created_at, updated_at";
const SELLER_COLUMNS: &str = "id, user_id, store_name, store_slug, store_description, store_logo_path, status, created_at, updated_at";
const ADDRESS_COLUMNS: &str = "id, owner_kind, owner_id, label, recipient_name, phone_number, province, city, district, village, detail_address, postal_code, latitude, longitude, is_default";

pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---------------------------------------------------------------- brands

    pub async fn insert_brand(&self, input: &BrandInput, slug: &str) -> Result<Brand> {
        let status: &'static str = input.status.into();
        let result = sqlx::query(
            "INSERT INTO brands (name, slug, logo_path, description, status, meta_title, meta_description)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(slug)
        .bind(&input.logo_path)
        .bind(&input.description)
        .bind(status)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert brand: {e}")))?;

        self.get_brand(result.last_insert_rowid()).await
    }

    pub async fn get_brand(&self, id: i64) -> Result<Brand> {
        let brand = sqlx::query_as::<_, BrandEntity>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch brand: {e}")))?;

        match brand {
            Some(brand) => brand.try_into(),
            None => Err(AppError::NotFound(format!("Brand not found: {}", id))),
        }
    }

    pub async fn list_brands(&self, filter: TernaryFilter) -> Result<Vec<Brand>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {BRAND_COLUMNS} FROM brands"));
        push_status_filter(&mut query, filter.statuses::<BrandStatus>());
        query.push(" ORDER BY name");

        let rows = query
            .build_query_as::<BrandEntity>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list brands: {e}")))?;

        rows.into_iter().map(Brand::try_from).collect()
    }

    pub async fn set_brand_status(&self, id: i64, status: BrandStatus) -> Result<Brand> {
        self.update_status("brands", id, status.into()).await?;
        self.get_brand(id).await
    }

    pub async fn delete_brand(&self, id: i64) -> Result<()> {
        self.delete_row("brands", id).await
    }

    // ------------------------------------------------------------ categories

    pub async fn insert_category(&self, input: &CategoryInput, slug: &str) -> Result<Category> {
        let status: &'static str = input.status.into();
        let result = sqlx::query(
            "INSERT INTO categories (name, slug, description, image_path, parent_id, status, meta_title, meta_description)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(slug)
        .bind(&input.description)
        .bind(&input.image_path)
        .bind(input.parent_id)
        .bind(status)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert category: {e}")))?;

        self.get_category(result.last_insert_rowid()).await
    }

    pub async fn get_category(&self, id: i64) -> Result<Category> {
        let category = sqlx::query_as::<_, CategoryEntity>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch category: {e}")))?;

        match category {
            Some(category) => category.try_into(),
            None => Err(AppError::NotFound(format!("Category not found: {}", id))),
        }
    }

    pub async fn list_categories(
        &self,
        filter: TernaryFilter,
        parent_id: Option<i64>,
    ) -> Result<Vec<Category>> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {CATEGORY_COLUMNS} FROM categories"));
        let has_where = push_status_filter(&mut query, filter.statuses::<CategoryStatus>());
        if let Some(parent_id) = parent_id {
            query.push(if has_where { " AND " } else { " WHERE " });
            query.push("parent_id = ").push_bind(parent_id);
        }
        query.push(" ORDER BY name");

        let rows = query
            .build_query_as::<CategoryEntity>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list categories: {e}")))?;

        rows.into_iter().map(Category::try_from).collect()
    }

    pub async fn set_category_parent(&self, id: i64, parent_id: Option<i64>) -> Result<Category> {
        let result = sqlx::query(
            "UPDATE categories SET parent_id = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(parent_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update category parent: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category not found: {}", id)));
        }
        self.get_category(id).await
    }

    pub async fn set_category_status(&self, id: i64, status: CategoryStatus) -> Result<Category> {
        self.update_status("categories", id, status.into()).await?;
        self.get_category(id).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.delete_row("categories", id).await
    }

    // --------------------------------------------------------------- sellers

    /// Inserts the seller and its addresses in one transaction.
    pub async fn insert_seller(&self, input: &SellerInput, slug: &str) -> Result<Seller> {
        let status: &'static str = input.status.into();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {e}")))?;

        let result = sqlx::query(
            "INSERT INTO sellers (user_id, store_name, store_slug, store_description, store_logo_path, status)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(input.user_id)
        .bind(&input.store_name)
        .bind(slug)
        .bind(&input.store_description)
        .bind(&input.store_logo_path)
        .bind(status)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert seller: {e}")))?;

        let id = result.last_insert_rowid();
        for address in &input.addresses {
            insert_address_row(&mut *tx, AddressOwner::Seller, id, address).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit seller: {e}")))?;

        self.get_seller(id).await
    }

    pub async fn get_seller(&self, id: i64) -> Result<Seller> {
        let seller = sqlx::query_as::<_, SellerEntity>(&format!(
            "SELECT {SELLER_COLUMNS} FROM sellers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch seller: {e}")))?;

        match seller {
            Some(seller) => seller.try_into(),
            None => Err(AppError::NotFound(format!("Seller not found: {}", id))),
        }
    }

    pub async fn find_seller_by_user(&self, user_id: i64) -> Result<Option<Seller>> {
        let seller = sqlx::query_as::<_, SellerEntity>(&format!(
            "SELECT {SELLER_COLUMNS} FROM sellers WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch seller: {e}")))?;

        seller.map(Seller::try_from).transpose()
    }

    pub async fn list_sellers(&self, filter: TernaryFilter) -> Result<Vec<Seller>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {SELLER_COLUMNS} FROM sellers"));
        push_status_filter(&mut query, filter.statuses::<SellerStatus>());
        query.push(" ORDER BY store_name");

        let rows = query
            .build_query_as::<SellerEntity>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list sellers: {e}")))?;

        rows.into_iter().map(Seller::try_from).collect()
    }

    pub async fn set_seller_status(&self, id: i64, status: SellerStatus) -> Result<Seller> {
        self.update_status("sellers", id, status.into()).await?;
        self.get_seller(id).await
    }

    pub async fn delete_seller(&self, id: i64) -> Result<()> {
        self.delete_row("sellers", id).await
    }

    // ------------------------------------------------------------- addresses

    /// Inserts an address. A new default address demotes the owner's
    /// previous default.
    pub async fn insert_address(
        &self,
        owner_kind: AddressOwner,
        owner_id: i64,
        input: &AddressInput,
    ) -> Result<Address> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {e}")))?;

        let id = insert_address_row(&mut *tx, owner_kind, owner_id, input).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit address: {e}")))?;

        self.list_addresses(owner_kind, owner_id)
            .await?
            .into_iter()
            .find(|address| address.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Address not found: {}", id)))
    }

    pub async fn list_addresses(&self, owner_kind: AddressOwner, owner_id: i64) -> Result<Vec<Address>> {
        let owner: &'static str = owner_kind.into();
        let rows = sqlx::query_as::<_, AddressEntity>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE owner_kind = ? AND owner_id = ?
             ORDER BY is_default DESC, id"
        ))
        .bind(owner)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list addresses: {e}")))?;

        rows.into_iter().map(Address::try_from).collect()
    }

    // ---------------------------------------------------------------- shared

    async fn update_status(&self, table: &str, id: i64, status: &str) -> Result<()> {
        let result = sqlx::query(&format!(
            "UPDATE {table} SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        ))
        .bind(status)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update {table} status: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{table} row not found: {id}")));
        }
        Ok(())
    }

    async fn delete_row(&self, table: &str, id: i64) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete from {table}: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{table} row not found: {id}")));
        }
        Ok(())
    }
}

/// Writes one address row on `conn`, demoting the owner's previous default
/// first when the new row is the default. Callers own the transaction.
pub(crate) async fn insert_address_row(
    conn: &mut SqliteConnection,
    owner_kind: AddressOwner,
    owner_id: i64,
    input: &AddressInput,
) -> Result<i64> {
    let owner: &'static str = owner_kind.into();

    if input.is_default {
        sqlx::query(
            "UPDATE addresses SET is_default = 0, updated_at = CURRENT_TIMESTAMP
             WHERE owner_kind = ? AND owner_id = ? AND is_default = 1",
        )
        .bind(owner)
        .bind(owner_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to clear default address: {e}")))?;
    }

    let result = sqlx::query(
        "INSERT INTO addresses (owner_kind, owner_id, label, recipient_name, phone_number, province, city,
            district, village, detail_address, postal_code, latitude, longitude, is_default)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(owner)
    .bind(owner_id)
    .bind(&input.label)
    .bind(&input.recipient_name)
    .bind(&input.phone_number)
    .bind(&input.province)
    .bind(&input.city)
    .bind(&input.district)
    .bind(&input.village)
    .bind(&input.detail_address)
    .bind(&input.postal_code)
    .bind(input.latitude)
    .bind(input.longitude)
    .bind(input.is_default)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to insert address: {e}")))?;

    Ok(result.last_insert_rowid())
}

/// Appends `WHERE status IN (...)` when the filter narrows the rows.
/// Returns whether a WHERE clause was written.
pub(crate) fn push_status_filter(
    query: &mut QueryBuilder<'_, Sqlite>,
    statuses: Option<Vec<&'static str>>,
) -> bool {
    let Some(statuses) = statuses else {
        return false;
    };
    query.push(" WHERE status IN (");
    let mut separated = query.separated(", ");
    for status in statuses {
        separated.push_bind(status);
    }
    separated.push_unseparated(")");
    true
}

pub(crate) fn parse_enum<T: FromStr>(column: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AppError::ParseError(format!("Unexpected {column} value: {value}")))
}

#[derive(sqlx::FromRow)]
struct BrandEntity {
    id: i64,
    name: String,
    slug: String,
    logo_path: Option<String>,
    description: Option<String>,
    status: String,
    meta_title: Option<String>,
    meta_description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BrandEntity> for Brand {
    type Error = AppError;

    fn try_from(e: BrandEntity) -> Result<Self> {
        Ok(Self {
            id: e.id,
            name: e.name,
            slug: e.slug,
            logo_path: e.logo_path,
            description: e.description,
            status: parse_enum("brand status", &e.status)?,
            meta_title: e.meta_title,
            meta_description: e.meta_description,
            created_at: e.created_at,
            updated_at: e.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CategoryEntity {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    image_path: Option<String>,
    parent_id: Option<i64>,
    status: String,
    meta_title: Option<String>,
    meta_description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CategoryEntity> for Category {
    type Error = AppError;

    fn try_from(e: CategoryEntity) -> Result<Self> {
        Ok(Self {
            id: e.id,
            name: e.name,
            slug: e.slug,
            description: e.description,
            image_path: e.image_path,
            parent_id: e.parent_id,
            status: parse_enum("category status", &e.status)?,
            meta_title: e.meta_title,
            meta_description: e.meta_description,
            created_at: e.created_at,
            updated_at: e.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SellerEntity {
    id: i64,
    user_id: i64,
    store_name: String,
    store_slug: String,
    store_description: Option<String>,
    store_logo_path: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SellerEntity> for Seller {
    type Error = AppError;

    fn try_from(e: SellerEntity) -> Result<Self> {
        Ok(Self {
            id: e.id,
            user_id: e.user_id,
            store_name: e.store_name,
            store_slug: e.store_slug,
            store_description: e.store_description,
            store_logo_path: e.store_logo_path,
            status: parse_enum("seller status", &e.status)?,
            created_at: e.created_at,
            updated_at: e.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AddressEntity {
    id: i64,
    owner_kind: String,
    owner_id: i64,
    label: String,
    recipient_name: String,
    phone_number: String,
    province: String,
    city: String,
    district: String,
    village: Option<String>,
    detail_address: String,
    postal_code: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_default: bool,
}

impl TryFrom<AddressEntity> for Address {
    type Error = AppError;

    fn try_from(e: AddressEntity) -> Result<Self> {
        Ok(Self {
            id: e.id,
            owner_kind: parse_enum("address owner", &e.owner_kind)?,
            owner_id: e.owner_id,
            label: e.label,
            recipient_name: e.recipient_name,
            phone_number: e.phone_number,
            province: e.province,
            city: e.city,
            district: e.district,
            village: e.village,
            detail_address: e.detail_address,
            postal_code: e.postal_code,
            latitude: e.latitude,
            longitude: e.longitude,
            is_default: e.is_default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::memory_pool;

    fn brand(name: &str, status: BrandStatus) -> BrandInput {
        BrandInput {
            name: name.to_string(),
            slug: None,
            logo_path: None,
            description: None,
            status,
            meta_title: None,
            meta_description: None,
        }
    }

    fn address(label: &str, is_default: bool) -> AddressInput {
        AddressInput {
            label: label.to_string(),
            recipient_name: "Budi".to_string(),
            phone_number: "0812".to_string(),
            province: "Aceh".to_string(),
            city: "Kab. Simeulue".to_string(),
            district: "Teupah Selatan".to_string(),
            village: None,
            detail_address: "Jl. Merdeka 1".to_string(),
            postal_code: None,
            latitude: None,
            longitude: None,
            is_default,
        }
    }

    #[tokio::test]
    async fn test_brand_status_filter() {
        let repo = CatalogRepository::new(memory_pool().await);
        repo.insert_brand(&brand("Acme", BrandStatus::Active), "acme")
            .await
            .unwrap();
        repo.insert_brand(&brand("Zeta", BrandStatus::Inactive), "zeta")
            .await
            .unwrap();

        assert_eq!(repo.list_brands(TernaryFilter::All).await.unwrap().len(), 2);
        let inactive = repo.list_brands(TernaryFilter::NotActive).await.unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].name, "Zeta");
    }

    #[tokio::test]
    async fn test_duplicate_brand_slug_rejected() {
        let repo = CatalogRepository::new(memory_pool().await);
        repo.insert_brand(&brand("Acme", BrandStatus::Active), "acme")
            .await
            .unwrap();
        let duplicate = repo
            .insert_brand(&brand("Acme Two", BrandStatus::Active), "acme")
            .await;
        assert!(matches!(duplicate, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_unknown_stored_status_is_parse_error() {
        let pool = memory_pool().await;
        let repo = CatalogRepository::new(pool.clone());
        let acme = repo
            .insert_brand(&brand("Acme", BrandStatus::Active), "acme")
            .await
            .unwrap();
        sqlx::query("PRAGMA ignore_check_constraints = ON")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("UPDATE brands SET status = 'archived' WHERE id = ?")
            .bind(acme.id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(repo.get_brand(acme.id).await, Err(AppError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_found() {
        let repo = CatalogRepository::new(memory_pool().await);
        assert!(matches!(repo.delete_brand(7).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_new_default_address_demotes_previous() {
        let repo = CatalogRepository::new(memory_pool().await);
        repo.insert_address(AddressOwner::Seller, 1, &address("Kantor Pusat", true))
            .await
            .unwrap();
        repo.insert_address(AddressOwner::Seller, 1, &address("Gudang", true))
            .await
            .unwrap();

        let addresses = repo.list_addresses(AddressOwner::Seller, 1).await.unwrap();
        let defaults: Vec<&str> = addresses
            .iter()
            .filter(|a| a.is_default)
            .map(|a| a.label.as_str())
            .collect();
        assert_eq!(defaults, vec!["Gudang"]);
    }
}
