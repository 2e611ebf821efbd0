use handlebars::{ Handlebars, no_escape };
use hard_xml::XmlRead;
use serde::Serialize;
use crate::api::error::{ Error, Result };
use crate::api::models::resources_xml::ResourcesElement;

/// Strings shipped with the kiosk, used when no override file is configured.
pub const DEFAULT_STRINGS_XML: &str = include_str!("../../resources/strings.xml");

#[derive(Clone)]
pub struct ResourceService {
    resource_element: ResourcesElement
}

impl ResourceService{
    pub fn new(resource_element: ResourcesElement) -> ResourceService {
        ResourceService {
            resource_element
        }
    }

    pub fn from_xml(xml: &str) -> Result<ResourceService> {
        let resource_element = ResourcesElement::from_str(xml)
            .map_err(|error| Error::Config(format!("Couldn't parse strings xml: {:?}", error)))?;
        Ok(ResourceService::new(resource_element))
    }

    pub fn embedded() -> Result<ResourceService> {
        ResourceService::from_xml(DEFAULT_STRINGS_XML)
    }

    pub fn get_resource_string_by_name(&self, name: &str) -> Option<String> {
        for string_element in &self.resource_element.strings {
            if string_element.name == name {
                return Some(string_element.content.clone())
            }
        }
        None
    }

    /// Like [`get_resource_string_by_name`] but falls back to the name itself.
    ///
    /// [`get_resource_string_by_name`]: ResourceService::get_resource_string_by_name
    pub fn message(&self, name: &str) -> String {
        self.get_resource_string_by_name(name).unwrap_or_else(|| name.to_string())
    }

    pub fn render_resource_template_string_by_name<T: Serialize>(&self, name: &str, data: &T) -> Option<String> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(no_escape);
        let template_string = self.get_resource_string_by_name(name)?;
        match handlebars.render_template(template_string.as_str(), data) {
            Ok(rendered) => Some(rendered),
            Err(_) => None
        }
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> String {
        self.render_resource_template_string_by_name(name, data).unwrap_or_else(|| name.to_string())
    }
}
