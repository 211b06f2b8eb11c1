//! UART link adapter (ESP-IDF `UartDriver`, 8N1, no flow control).
//!
//! Implements [`Link`] so both node services run unchanged on the board.
//! Reads never block; writes block until the driver has queued the bytes.

use esp_idf_hal::delay::{BLOCK, NON_BLOCK};
use esp_idf_hal::gpio::{AnyIOPin, InputPin, OutputPin};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::uart::{config::Config, Uart, UartDriver};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::sys::EspError;
use log::info;

use crate::protocol::transport::Link;

pub struct UartLink {
    driver: UartDriver<'static>,
}

impl UartLink {
    pub fn new(
        uart: impl Peripheral<P = impl Uart> + 'static,
        tx: impl Peripheral<P = impl OutputPin> + 'static,
        rx: impl Peripheral<P = impl InputPin> + 'static,
        baud: u32,
    ) -> Result<Self, EspError> {
        let config = Config::default().baudrate(Hertz(baud));
        let driver = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &config,
        )?;
        info!("UART link up at {} baud", baud);
        Ok(Self { driver })
    }
}

impl Link for UartLink {
    type Error = EspError;

    fn read_byte(&mut self) -> Result<Option<u8>, EspError> {
        let mut buf = [0u8; 1];
        let n = self.driver.read(&mut buf, NON_BLOCK)?;
        Ok((n == 1).then_some(buf[0]))
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.driver.write(data)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        self.driver.wait_tx_done(BLOCK)
    }
}
