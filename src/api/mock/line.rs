use crate::api::mock::{ LineHandle, LineRequestFlags };

pub struct Line {
    chip_name: String,
    offset: u32
}

impl Line {
    pub(crate) fn new(chip_name: &str, offset: u32) -> Self {
        Line { chip_name: chip_name.to_string(), offset }
    }

    pub fn request(&self, flags: LineRequestFlags, default: u8, consumer: &str) -> Result<LineHandle, String> {
        if !flags.contains(LineRequestFlags::OUTPUT) {
            return Err(format!("{} line {} must be requested as output", self.chip_name, self.offset));
        }
        Ok(LineHandle::new(self.offset, default, consumer))
    }
}
