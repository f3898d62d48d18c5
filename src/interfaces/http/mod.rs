use crate::application::use_cases::select_options::SelectOptionsUseCase;
use crate::domain::address_form::{AddressField, AddressFormState};
use crate::domain::error::AppError;
use actix_cors::Cors;
use actix_web::{dev::Server, get, web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use tracing::{error, info, warn};

pub struct HttpState {
    pub pool: SqlitePool,
    pub options: SelectOptionsUseCase,
}

impl HttpState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            options: SelectOptionsUseCase::new(pool.clone()),
            pool,
        }
    }
}

#[derive(Deserialize)]
pub struct CitiesQuery {
    pub province: Option<String>,
}

#[derive(Deserialize)]
pub struct DistrictsQuery {
    pub city: Option<String>,
}

#[derive(Deserialize)]
pub struct VillagesQuery {
    pub district: Option<String>,
}

#[derive(Deserialize)]
pub struct CategoryOptionsQuery {
    pub exclude: Option<i64>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

fn error_response(e: &AppError) -> HttpResponse {
    match e {
        AppError::NotFound(_) => {
            warn!(error = %e, "Request target not found");
            HttpResponse::NotFound().body(e.to_string())
        }
        AppError::ValidationError(_) => {
            warn!(error = %e, "Rejected request");
            HttpResponse::BadRequest().body(e.to_string())
        }
        _ => {
            error!(error = %e, "Request failed");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

/// Options for `field` once its parent field holds `parent`.
async fn field_options(
    data: &HttpState,
    parent_field: AddressField,
    field: AddressField,
    parent: Option<String>,
) -> HttpResponse {
    let mut form = AddressFormState::new();
    form.set(parent_field, parent);
    match data.options.address_options(&form, field).await {
        Ok(names) => HttpResponse::Ok().json(names),
        Err(e) => error_response(&e),
    }
}

#[get("/regions/provinces")]
async fn provinces(data: web::Data<HttpState>) -> impl Responder {
    match data.options.province_names().await {
        Ok(names) => HttpResponse::Ok().json(names),
        Err(e) => error_response(&e),
    }
}

#[get("/regions/cities")]
async fn cities(data: web::Data<HttpState>, query: web::Query<CitiesQuery>) -> impl Responder {
    let query = query.into_inner();
    field_options(&data, AddressField::Province, AddressField::City, query.province).await
}

#[get("/regions/districts")]
async fn districts(data: web::Data<HttpState>, query: web::Query<DistrictsQuery>) -> impl Responder {
    let query = query.into_inner();
    field_options(&data, AddressField::City, AddressField::District, query.city).await
}

#[get("/regions/villages")]
async fn villages(data: web::Data<HttpState>, query: web::Query<VillagesQuery>) -> impl Responder {
    let query = query.into_inner();
    field_options(&data, AddressField::District, AddressField::Village, query.district).await
}

#[get("/categories/options")]
async fn category_options(
    data: web::Data<HttpState>,
    query: web::Query<CategoryOptionsQuery>,
) -> impl Responder {
    match data.options.category_parent_options(query.exclude).await {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(e) => error_response(&e),
    }
}

#[get("/health")]
async fn health(data: web::Data<HttpState>) -> impl Responder {
    match sqlx::query("SELECT 1").execute(&data.pool).await {
        Ok(_) => HttpResponse::Ok().json(HealthResponse { status: "ok" }),
        Err(e) => error_response(&AppError::DatabaseError(format!("Health check failed: {e}"))),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(provinces)
            .service(cities)
            .service(districts)
            .service(villages)
            .service(category_options)
            .service(health),
    );
}

pub fn start_server(pool: SqlitePool, host: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState::new(pool));

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new().wrap(cors).app_data(state.clone()).configure(configure)
    })
    .bind((host, port))?
    .run();

    info!(host, port, "Option feed listening");
    Ok(server)
}
