use crate::domain::catalog::{
    slugify, Address, AddressInput, AddressOwner, Brand, BrandInput, BrandStatus, Category,
    CategoryInput, CategoryStatus, Seller, SellerInput, SellerStatus, TernaryFilter,
};
use crate::domain::error::{AppError, Result};
use crate::domain::user::{User, UserInput, UserStatus, UserType};
use crate::infrastructure::db::catalog::CatalogRepository;
use crate::infrastructure::db::users::UserRepository;
use sqlx::sqlite::SqlitePool;
use tracing::info;
use validator::Validate;

/// Admin operations on brands, categories, sellers, users and addresses.
pub struct CatalogUseCase {
    catalog: CatalogRepository,
    users: UserRepository,
}

/// A supplied slug is stored as typed (trimmed); otherwise one is derived
/// from the name.
fn slug_or_derived(slug: Option<&str>, name: &str) -> String {
    match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slug.to_string(),
        None => slugify(name),
    }
}

impl CatalogUseCase {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            catalog: CatalogRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    pub async fn create_brand(&self, input: BrandInput) -> Result<Brand> {
        input.validate()?;
        let slug = slug_or_derived(input.slug.as_deref(), &input.name);
        let brand = self.catalog.insert_brand(&input, &slug).await?;
        info!(id = brand.id, slug = %brand.slug, "Brand created");
        Ok(brand)
    }

    pub async fn list_brands(&self, filter: TernaryFilter) -> Result<Vec<Brand>> {
        self.catalog.list_brands(filter).await
    }

    pub async fn set_brand_status(&self, id: i64, status: BrandStatus) -> Result<Brand> {
        self.catalog.set_brand_status(id, status).await
    }

    pub async fn delete_brand(&self, id: i64) -> Result<()> {
        self.catalog.delete_brand(id).await
    }

    pub async fn create_category(&self, input: CategoryInput) -> Result<Category> {
        input.validate()?;
        if let Some(parent_id) = input.parent_id {
            self.catalog.get_category(parent_id).await?;
        }
        let slug = slug_or_derived(input.slug.as_deref(), &input.name);
        let category = self.catalog.insert_category(&input, &slug).await?;
        info!(id = category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    /// Moves a category under `parent_id`, or to the root when `None`.
    pub async fn set_category_parent(&self, id: i64, parent_id: Option<i64>) -> Result<Category> {
        if parent_id == Some(id) {
            return Err(AppError::ValidationError(format!(
                "Category {} cannot be its own parent",
                id
            )));
        }
        if let Some(parent_id) = parent_id {
            self.catalog.get_category(parent_id).await?;
        }
        self.catalog.set_category_parent(id, parent_id).await
    }

    pub async fn list_categories(
        &self,
        filter: TernaryFilter,
        parent_id: Option<i64>,
    ) -> Result<Vec<Category>> {
        self.catalog.list_categories(filter, parent_id).await
    }

    pub async fn set_category_status(&self, id: i64, status: CategoryStatus) -> Result<Category> {
        self.catalog.set_category_status(id, status).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.catalog.delete_category(id).await
    }

    pub async fn create_user(&self, input: UserInput) -> Result<User> {
        input.validate()?;
        let user = self.users.insert(&input).await?;
        info!(id = user.id, user_type = %user.user_type, "User created");
        Ok(user)
    }

    pub async fn list_users(&self, filter: TernaryFilter, user_type: Option<UserType>) -> Result<Vec<User>> {
        self.users.list(filter, user_type).await
    }

    pub async fn set_user_status(&self, id: i64, status: UserStatus) -> Result<User> {
        self.users.set_status(id, status).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.users.delete(id).await
    }

    /// Opens a store for a seller-type user that has none yet.
    pub async fn create_seller(&self, input: SellerInput) -> Result<Seller> {
        input.validate()?;

        let user = self.users.get(input.user_id).await?;
        if user.user_type != UserType::Seller {
            return Err(AppError::ValidationError(format!(
                "User {} is not a seller account",
                user.id
            )));
        }
        if self.catalog.find_seller_by_user(user.id).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "User {} already owns a store",
                user.id
            )));
        }

        let slug = slug_or_derived(input.store_slug.as_deref(), &input.store_name);
        let seller = self.catalog.insert_seller(&input, &slug).await?;
        info!(id = seller.id, user_id = user.id, slug = %seller.store_slug, "Seller created");
        Ok(seller)
    }

    pub async fn list_sellers(&self, filter: TernaryFilter) -> Result<Vec<Seller>> {
        self.catalog.list_sellers(filter).await
    }

    pub async fn set_seller_status(&self, id: i64, status: SellerStatus) -> Result<Seller> {
        self.catalog.set_seller_status(id, status).await
    }

    pub async fn delete_seller(&self, id: i64) -> Result<()> {
        self.catalog.delete_seller(id).await
    }

    pub async fn add_address(
        &self,
        owner_kind: AddressOwner,
        owner_id: i64,
        input: AddressInput,
    ) -> Result<Address> {
        input.validate()?;
        match owner_kind {
            AddressOwner::User => {
                self.users.get(owner_id).await?;
            }
            AddressOwner::Seller => {
                self.catalog.get_seller(owner_id).await?;
            }
        }
        self.catalog.insert_address(owner_kind, owner_id, &input).await
    }

    pub async fn list_addresses(&self, owner_kind: AddressOwner, owner_id: i64) -> Result<Vec<Address>> {
        self.catalog.list_addresses(owner_kind, owner_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::Gender;
    use crate::infrastructure::db::connection::memory_pool;

    fn user(email: &str, user_type: UserType) -> UserInput {
        UserInput {
            name: "Dewi".to_string(),
            email: email.to_string(),
            user_type,
            status: UserStatus::Active,
            profile_picture: None,
            gender: Some(Gender::Female),
            date_of_birth: None,
            phone_number: None,
            addresses: Vec::new(),
        }
    }

    fn seller(user_id: i64, store_name: &str) -> SellerInput {
        SellerInput {
            user_id,
            store_name: store_name.to_string(),
            store_slug: None,
            store_description: None,
            store_logo_path: None,
            status: SellerStatus::default(),
            addresses: Vec::new(),
        }
    }

    fn category(name: &str, slug: Option<&str>) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            slug: slug.map(str::to_string),
            description: None,
            image_path: None,
            parent_id: None,
            status: CategoryStatus::Active,
            meta_title: None,
            meta_description: None,
        }
    }

    fn address(label: &str, is_default: bool) -> AddressInput {
        AddressInput {
            label: label.to_string(),
            recipient_name: "Dewi".to_string(),
            phone_number: "0813".to_string(),
            province: "Bali".to_string(),
            city: "Kota Denpasar".to_string(),
            district: "Denpasar Barat".to_string(),
            village: None,
            detail_address: "Jl. Gajah Mada 5".to_string(),
            postal_code: Some("80112".to_string()),
            latitude: None,
            longitude: None,
            is_default,
        }
    }

    #[tokio::test]
    async fn test_seller_creation_rejects_non_seller_user() {
        let use_case = CatalogUseCase::new(memory_pool().await);
        let customer = use_case
            .create_user(user("dewi@example.com", UserType::Customer))
            .await
            .unwrap();

        let result = use_case.create_seller(seller(customer.id, "Toko Dewi")).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_seller_creation_derives_slug_and_blocks_second_store() {
        let use_case = CatalogUseCase::new(memory_pool().await);
        let owner = use_case
            .create_user(user("dewi@example.com", UserType::Seller))
            .await
            .unwrap();

        let store = use_case
            .create_seller(seller(owner.id, "Toko Dewi Jaya"))
            .await
            .unwrap();
        assert_eq!(store.store_slug, "toko-dewi-jaya");
        assert_eq!(store.status, SellerStatus::Inactive);

        let second = use_case.create_seller(seller(owner.id, "Toko Lain")).await;
        assert!(matches!(second, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_category_cannot_be_its_own_parent() {
        let use_case = CatalogUseCase::new(memory_pool().await);
        let fashion = use_case
            .create_category(category("Fashion", None))
            .await
            .unwrap();

        let result = use_case.set_category_parent(fashion.id, Some(fashion.id)).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_category_parent_assignment() {
        let use_case = CatalogUseCase::new(memory_pool().await);
        let fashion = use_case
            .create_category(category("Fashion", Some("  Mode-Pakaian ")))
            .await
            .unwrap();
        assert_eq!(fashion.slug, "Mode-Pakaian");
        let shoes = use_case.create_category(category("Sepatu", None)).await.unwrap();

        let moved = use_case
            .set_category_parent(shoes.id, Some(fashion.id))
            .await
            .unwrap();
        assert_eq!(moved.parent_id, Some(fashion.id));

        let children = use_case
            .list_categories(TernaryFilter::All, Some(fashion.id))
            .await
            .unwrap();
        assert_eq!(children.len(), 1);

        let missing = use_case.set_category_parent(shoes.id, Some(404)).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_brand_input_rejected() {
        let use_case = CatalogUseCase::new(memory_pool().await);
        let input = BrandInput {
            name: "x".repeat(256),
            slug: None,
            logo_path: None,
            description: None,
            status: BrandStatus::Active,
            meta_title: None,
            meta_description: None,
        };
        assert!(matches!(
            use_case.create_brand(input).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_user_addresses_keep_single_default() {
        let use_case = CatalogUseCase::new(memory_pool().await);
        let mut input = user("dewi@example.com", UserType::Customer);
        input.addresses = vec![address("Rumah", true)];
        let dewi = use_case.create_user(input).await.unwrap();

        use_case
            .add_address(AddressOwner::User, dewi.id, address("Kantor", true))
            .await
            .unwrap();

        let addresses = use_case
            .list_addresses(AddressOwner::User, dewi.id)
            .await
            .unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses.iter().filter(|a| a.is_default).count(), 1);
        assert_eq!(addresses[0].label, "Kantor");
    }

    async fn reject_address_inserts(pool: &SqlitePool) {
        sqlx::query(
            "CREATE TRIGGER reject_addresses BEFORE INSERT ON addresses
             BEGIN SELECT RAISE(ABORT, 'address rejected'); END",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_user_creation_rolls_back_when_address_fails() {
        let pool = memory_pool().await;
        reject_address_inserts(&pool).await;
        let use_case = CatalogUseCase::new(pool);

        let mut input = user("dewi@example.com", UserType::Customer);
        input.addresses = vec![address("Rumah", true)];
        let result = use_case.create_user(input).await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert!(use_case
            .list_users(TernaryFilter::All, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_seller_creation_rolls_back_when_address_fails() {
        let pool = memory_pool().await;
        let use_case = CatalogUseCase::new(pool.clone());
        let owner = use_case
            .create_user(user("dewi@example.com", UserType::Seller))
            .await
            .unwrap();
        reject_address_inserts(&pool).await;

        let mut input = seller(owner.id, "Toko Dewi");
        input.addresses = vec![address("Gudang", true)];
        let result = use_case.create_seller(input).await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert!(use_case
            .list_sellers(TernaryFilter::All)
            .await
            .unwrap()
            .is_empty());

        let retry = use_case.create_seller(seller(owner.id, "Toko Dewi")).await;
        assert!(retry.is_ok());
    }

    #[tokio::test]
    async fn test_brand_slug_derived_from_name() {
        let use_case = CatalogUseCase::new(memory_pool().await);
        let brand = use_case
            .create_brand(BrandInput {
                name: "iPhone Store".to_string(),
                slug: None,
                logo_path: None,
                description: None,
                status: BrandStatus::Active,
                meta_title: None,
                meta_description: None,
            })
            .await
            .unwrap();
        assert_eq!(brand.slug, "iphone-store");
    }

    #[tokio::test]
    async fn test_address_for_missing_owner_is_not_found() {
        let use_case = CatalogUseCase::new(memory_pool().await);
        let result = use_case
            .add_address(AddressOwner::Seller, 9, address("Gudang", false))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
