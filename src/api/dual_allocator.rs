use crate::api::models::{ VolumePair, VOLUME_CAP_CL };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slider {
    Alcohol,
    Soft
}

impl Slider {
    pub fn other(self) -> Slider {
        match self {
            Slider::Alcohol => Slider::Soft,
            Slider::Soft => Slider::Alcohol
        }
    }
}

type Listener = Box<dyn FnMut(&VolumePair) + Send>;

/// Two sliders sharing one glass. A value that would overflow the glass is
/// clamped to whatever room the other slider leaves.
#[derive(Default)]
pub struct DualAllocator {
    values: VolumePair,
    listener: Option<Listener>
}

impl DualAllocator {
    pub fn new() -> DualAllocator {
        DualAllocator::default()
    }

    /// `listener` runs after every [`set_value`], e.g. to redraw the glass.
    ///
    /// [`set_value`]: DualAllocator::set_value
    pub fn with_listener<F>(listener: F) -> DualAllocator
    where
        F: FnMut(&VolumePair) + Send + 'static
    {
        DualAllocator { values: VolumePair::default(), listener: Some(Box::new(listener)) }
    }

    pub fn values(&self) -> VolumePair {
        self.values
    }

    pub fn value(&self, slider: Slider) -> u32 {
        match slider {
            Slider::Alcohol => self.values.alcohol_cl(),
            Slider::Soft => self.values.soft_cl()
        }
    }

    /// Returns the value the slider actually took.
    pub fn set_value(&mut self, slider: Slider, requested: u32) -> u32 {
        let other = self.value(slider.other());
        let accepted = requested.min(VOLUME_CAP_CL - other);
        self.values = match slider {
            Slider::Alcohol => VolumePair::from_parts(accepted, other),
            Slider::Soft => VolumePair::from_parts(other, accepted)
        };
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.values);
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{ Arc, Mutex };

    #[test]
    fn test_second_slider_clamps() {
        let mut allocator = DualAllocator::new();
        assert_eq!(allocator.set_value(Slider::Alcohol, 20), 20);
        assert_eq!(allocator.set_value(Slider::Soft, 10), 5);
        assert_eq!(allocator.values(), VolumePair::new(20, 5).unwrap());
    }

    #[test]
    fn test_lowering_frees_room() {
        let mut allocator = DualAllocator::new();
        allocator.set_value(Slider::Alcohol, 20);
        allocator.set_value(Slider::Soft, 10);
        allocator.set_value(Slider::Alcohol, 5);
        assert_eq!(allocator.set_value(Slider::Soft, 10), 10);
        assert_eq!(allocator.values().total_cl(), 15);
    }

    #[test]
    fn test_cap_holds_for_any_sequence() {
        let mut allocator = DualAllocator::new();
        let requests = [30u32, 0, 25, 7, 13, 25, 1, 24, 18, 99, 3, 12];
        for (step, requested) in requests.iter().enumerate() {
            let slider = if step % 2 == 0 { Slider::Alcohol } else { Slider::Soft };
            let accepted = allocator.set_value(slider, *requested);
            assert!(accepted <= *requested);
            assert!(allocator.values().total_cl() <= VOLUME_CAP_CL);
        }
    }

    #[test]
    fn test_listener_sees_every_set() {
        let seen = Arc::new(Mutex::new(vec![]));
        let sink = seen.clone();
        let mut allocator = DualAllocator::with_listener(move |values| sink.lock().unwrap().push(*values));
        allocator.set_value(Slider::Soft, 30);
        allocator.set_value(Slider::Alcohol, 4);
        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![VolumePair::new(0, 25).unwrap(), VolumePair::new(0, 25).unwrap()]);
    }
}
