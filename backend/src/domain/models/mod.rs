pub mod pagination;
pub mod period;
pub mod rent;
pub mod tenant;

pub use pagination::PageRequest;
pub use period::BillingPeriod;
pub use rent::{RentAmounts, RentFilter, RentRecord, RentWithTenant};
pub use tenant::{ActiveFilter, Tenant, TenantFilter};
