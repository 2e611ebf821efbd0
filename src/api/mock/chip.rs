use crate::api::mock::Line;

pub struct Chip {
    name: String
}

impl Chip {
    pub fn new(name: &str) -> Result<Self, String> {
        log::debug!("Opening mocked chip \"{}\"", name);
        Ok(Chip { name: name.to_string() })
    }

    pub fn get_line(&mut self, offset: u32) -> Result<Line, String> {
        Ok(Line::new(&self.name, offset))
    }
}
