pub mod rent_repository;
pub mod tenant_repository;

pub use rent_repository::RentRepository;
pub use tenant_repository::TenantRepository;
