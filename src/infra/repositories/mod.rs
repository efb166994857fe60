pub mod postgres_catalog_repo;
pub mod postgres_code_repo;
pub mod postgres_reservation_repo;
pub mod sqlite_catalog_repo;
pub mod sqlite_code_repo;
pub mod sqlite_reservation_repo;
