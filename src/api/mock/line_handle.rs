use std::sync::atomic::{ AtomicU8, Ordering };

pub struct LineHandle {
    offset: u32,
    consumer: String,
    value: AtomicU8
}

impl LineHandle {
    pub(crate) fn new(offset: u32, default: u8, consumer: &str) -> Self {
        LineHandle { offset, consumer: consumer.to_string(), value: AtomicU8::new(default) }
    }

    pub fn set_value(&self, value: u8) -> Result<(), String> {
        log::trace!("{} (line {}) <- {}", self.consumer, self.offset, value);
        self.value.store(value, Ordering::SeqCst);
        Ok(())
    }

    pub fn get_value(&self) -> Result<u8, String> {
        Ok(self.value.load(Ordering::SeqCst))
    }
}
