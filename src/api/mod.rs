mod error;
mod kiosk_config;
mod resource_service;
mod resource_service_factory;
mod config_store;
mod pump_registry;
mod pump_registry_factory;
mod dual_allocator;
mod channel_bank;
mod channel_bank_factory;
mod dispense_scheduler;
mod points_ledger;
mod kiosk_service;
mod kiosk_service_factory;
pub mod models;
#[cfg(not(feature = "use-gpio"))]
pub mod mock;

pub use error::*;
pub use kiosk_config::*;
pub use resource_service::*;
pub use resource_service_factory::*;
pub use config_store::*;
pub use pump_registry::*;
pub use pump_registry_factory::*;
pub use dual_allocator::*;
pub use channel_bank::*;
pub use channel_bank_factory::*;
pub use dispense_scheduler::*;
pub use points_ledger::*;
pub use kiosk_service::*;
pub use kiosk_service_factory::*;
