mod ids;
mod pump_assignment;
mod pump_menu;
mod pump_state;
mod volume_pair;
mod recipe;
mod dispense_request;
mod dispense_event;
mod user_account;
pub mod resources_xml;

pub use ids::*;
pub use pump_assignment::*;
pub use pump_menu::*;
pub use pump_state::*;
pub use volume_pair::*;
pub use recipe::*;
pub use dispense_request::*;
pub use dispense_event::*;
pub use user_account::*;
