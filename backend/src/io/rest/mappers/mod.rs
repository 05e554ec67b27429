pub mod rent_mapper;
pub mod tenant_mapper;

pub use rent_mapper::{MessageMapper, RentMapper};
pub use tenant_mapper::TenantMapper;
