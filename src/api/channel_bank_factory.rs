#[cfg(feature = "use-gpio")]
use gpio_cdev::{ Chip, LineRequestFlags };
#[cfg(not(feature = "use-gpio"))]
use crate::api::mock::{ Chip, LineRequestFlags };
use serde_json::json;
use crate::api::error::{ Error, Result };
use crate::api::{ Channel, ChannelBank, KioskConfig, RelayChannel, ResourceService };

pub struct ChannelBankFactory {}

impl ChannelBankFactory {
    pub fn create(config: &KioskConfig, resource_service: &ResourceService) -> Result<ChannelBank> {
        if cfg!(not(feature = "use-gpio")) {
            log::info!("{}", resource_service.message("gpio_mocked_info_message"));
        }

        log::info!("{}", resource_service.render(
            "getting_chip_info_message_template",
            &json!({ "chip": config.rpi_chip_name })
        ));
        let mut chip = Chip::new(&config.rpi_chip_name)
            .map_err(|error| Error::DispenseFault(format!("chip {}: {}", config.rpi_chip_name, error)))?;
        // Relays start switched off.
        let default_state: u8 = if config.is_relay_inverted { 1 } else { 0 };

        let mut channels = vec![];
        for (position, pump) in config.pump_pin_numbers.iter().enumerate() {
            let line = chip.get_line(pump.0)
                .map_err(|error| Error::DispenseFault(format!("line {}: {}", pump, error)))?;
            let line_handle = line
                .request(LineRequestFlags::OUTPUT, default_state, format!("Pump {}", position + 1).as_str())
                .map_err(|error| Error::DispenseFault(format!("line {}: {}", pump, error)))?;
            let channel: Box<dyn Channel> = Box::new(RelayChannel::new(line_handle, config.is_relay_inverted));
            channels.push((*pump, channel));
        }

        Ok(ChannelBank::new(resource_service.clone(), channels))
    }
}
