//! `HidTransport` binding: boot-style USB mouse over embassy-usb

use embassy_time::{Duration, with_timeout};
use embassy_usb::class::hid::HidWriter;
use embassy_usb::driver::Driver;
use log::warn;
use vision_core::report::{MOUSE_REPORT_SIZE, MouseReport};
use vision_core::{HidTransport, MouseButton};

/// Give up on a report when the host is not polling
const REPORT_TIMEOUT: Duration = Duration::from_millis(100);

/// USB mouse that remembers which buttons are down
pub struct UsbMouse<'d, D: Driver<'d>> {
    writer: HidWriter<'d, D, MOUSE_REPORT_SIZE>,
    buttons: u8,
}

impl<'d, D: Driver<'d>> UsbMouse<'d, D> {
    pub fn new(writer: HidWriter<'d, D, MOUSE_REPORT_SIZE>) -> Self {
        Self { writer, buttons: 0 }
    }

    async fn send(&mut self, report: MouseReport) {
        match with_timeout(REPORT_TIMEOUT, self.writer.write(&report.to_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("[USB] Report dropped: {:?}", e),
            Err(_) => warn!("[USB] Report timed out, is the host connected?"),
        }
    }
}

impl<'d, D: Driver<'d>> HidTransport for UsbMouse<'d, D> {
    async fn move_cursor(&mut self, dx: i8, dy: i8) {
        self.send(MouseReport::buttons(self.buttons).with_motion(dx, dy))
            .await;
    }

    async fn set_button(&mut self, button: MouseButton, down: bool) {
        let report = MouseReport::buttons(self.buttons).with_button(button, down);
        self.buttons = report.buttons;
        self.send(report).await;
    }
}
