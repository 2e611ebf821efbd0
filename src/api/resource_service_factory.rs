use std::fs;
use crate::api::error::Result;
use crate::api::{ KioskConfig, ResourceService };

pub struct ResourceServiceFactory {}

impl ResourceServiceFactory {
    pub fn create(config: &KioskConfig) -> Result<ResourceService> {
        match &config.strings_xml_file_path {
            Some(file_path) => {
                let resource_xml_content = fs::read_to_string(file_path)?;
                ResourceService::from_xml(&resource_xml_content)
            },
            None => ResourceService::embedded()
        }
    }
}
