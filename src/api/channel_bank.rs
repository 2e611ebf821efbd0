#[cfg(feature = "use-gpio")]
use gpio_cdev::LineHandle;
#[cfg(not(feature = "use-gpio"))]
use crate::api::mock::LineHandle;
use serde_json::json;
use crate::api::models::PumpId;
use crate::api::ResourceService;

pub type ChannelError = Box<dyn std::error::Error + Send + Sync>;

/// One switchable pump/LED output.
pub trait Channel: Send {
    fn activate(&mut self) -> Result<(), ChannelError>;
    fn deactivate(&mut self) -> Result<(), ChannelError>;
}

/// A pump relay on a GPIO line.
pub struct RelayChannel {
    line_handle: LineHandle,
    is_relay_inverted: bool
}

impl RelayChannel {
    pub fn new(line_handle: LineHandle, is_relay_inverted: bool) -> RelayChannel {
        RelayChannel { line_handle, is_relay_inverted }
    }

    fn set(&mut self, on: bool) -> Result<(), ChannelError> {
        // Inverted relays switch on when the line is pulled low.
        let value = if on != self.is_relay_inverted { 1 } else { 0 };
        self.line_handle.set_value(value).map_err(|error| ChannelError::from(error.to_string()))
    }
}

impl Channel for RelayChannel {
    fn activate(&mut self) -> Result<(), ChannelError> {
        self.set(true)
    }

    fn deactivate(&mut self) -> Result<(), ChannelError> {
        self.set(false)
    }
}

/// Every pump channel of the machine, in pump order. Dropping the bank
/// switches all of them off.
pub struct ChannelBank {
    resource_service: ResourceService,
    channels: Vec<(PumpId, Box<dyn Channel>)>
}

impl ChannelBank {
    pub fn new(resource_service: ResourceService, channels: Vec<(PumpId, Box<dyn Channel>)>) -> ChannelBank {
        ChannelBank { resource_service, channels }
    }

    pub fn pumps(&self) -> Vec<PumpId> {
        self.channels.iter().map(|(pump, _)| *pump).collect()
    }

    pub fn index_of(&self, pump: PumpId) -> Option<usize> {
        self.channels.iter().position(|(candidate, _)| *candidate == pump)
    }

    pub(crate) fn activate(&mut self, index: usize) -> Result<(), ChannelError> {
        let (pump, channel) = &mut self.channels[index];
        log::debug!("{}", self.resource_service.render("pump_on_debug_message_template", &json!({ "pump": pump.0 })));
        channel.activate()
    }

    pub(crate) fn deactivate(&mut self, index: usize) -> Result<(), ChannelError> {
        let (pump, channel) = &mut self.channels[index];
        log::debug!("{}", self.resource_service.render("pump_off_debug_message_template", &json!({ "pump": pump.0 })));
        channel.deactivate()
    }

    pub(crate) fn pump_at(&self, index: usize) -> PumpId {
        self.channels[index].0
    }

    /// Switches every channel off, carrying on past failures.
    pub fn force_all_off(&mut self) {
        for (pump, channel) in self.channels.iter_mut() {
            if let Err(error) = channel.deactivate() {
                log::error!("{}", self.resource_service.render(
                    "deactivation_failed_error_message_template",
                    &json!({ "pump": pump.0, "error": error.to_string() })
                ));
            }
        }
    }
}

impl Drop for ChannelBank {
    fn drop(&mut self) {
        self.force_all_off();
    }
}
