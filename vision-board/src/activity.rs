//! Activity enable switch on a GPIO input (high = enabled)

use embedded_hal::digital::InputPin;
use vision_core::ActivitySwitch;

/// Input pin read as the activity switch
pub struct EnablePin<P>(P);

impl<P: InputPin> EnablePin<P> {
    pub fn new(pin: P) -> Self {
        Self(pin)
    }
}

impl<P: InputPin> ActivitySwitch for EnablePin<P> {
    fn is_enabled(&mut self) -> bool {
        // An unreadable pin counts as off
        self.0.is_high().unwrap_or(false)
    }
}
