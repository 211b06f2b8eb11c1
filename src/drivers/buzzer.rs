//! Active buzzer on a single GPIO (high = sounding).

use embedded_hal::digital::OutputPin;

pub struct BuzzerDriver<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> BuzzerDriver<P> {
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self { pin, on: false })
    }

    pub fn set(&mut self, on: bool) -> Result<(), P::Error> {
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
