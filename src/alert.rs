//! The ALRT pin is open-drain and is pulled low by the gauge on a threshold event.
//! The pin passed in here must already be configured with a pull-up, most HALs do
//! that when the input is created.

use embedded_hal_async::{delay, digital};

/// The input takes a while to settle after the pull-up is enabled. Waiting for an
/// edge earlier than that gives a spurious alert
pub const PULL_UP_SETTLE_MS: u32 = 10;

/// Watches the alert line. Edges are only reported to the log for now
pub struct AlertMonitor<P, D> {
    pin: P,
    delay: D,
    armed: bool,
}

impl<P, D, E> AlertMonitor<P, D>
where
    P: digital::Wait<Error = E>,
    D: delay::DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            pin,
            delay,
            armed: false,
        }
    }

    /// Lets the pull-up settle. Called implicitly by [`Self::wait_for_alert`]
    pub async fn arm(&mut self) {
        if !self.armed {
            self.delay.delay_ms(PULL_UP_SETTLE_MS).await;
            self.armed = true;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Waits for the next falling edge on the alert line
    pub async fn wait_for_alert(&mut self) -> Result<(), E> {
        self.arm().await;
        self.pin.wait_for_falling_edge().await?;

        info!("alert");

        Ok(())
    }

    /// Logs every alert until the pin fails
    pub async fn run(&mut self) -> E {
        loop {
            if let Err(e) = self.wait_for_alert().await {
                warn!("alert pin failed");
                return e;
            }
        }
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}
