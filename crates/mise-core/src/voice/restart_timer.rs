use crate::voice::ControllerInput;

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::trace;

/// A single cancelable resubscription timer.
///
/// Scheduling replaces any timer already pending. The firing carries the
/// generation it was scheduled under, so a timer that outlives its session
/// is discarded by the state machine.
#[derive(Debug, Default)]
pub(crate) struct RestartTimer {
    handle: Option<JoinHandle<()>>,
}

impl RestartTimer {
    pub(crate) fn schedule(
        &mut self,
        delay: Duration,
        generation: u64,
        tx: mpsc::UnboundedSender<ControllerInput>,
    ) {
        self.cancel();

        trace!(generation, delay_ms = delay.as_millis(), "Restart scheduled");

        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(ControllerInput::RestartDue { generation }).is_err() {
                trace!(generation, "Controller gone, restart dropped");
            }
        }));
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub(crate) fn is_scheduled(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RestartTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
