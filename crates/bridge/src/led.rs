//! Plays LED ring animations on an Xbox 360 OUT endpoint.

use padlink_hid_common::OutputEndpoint;
use padlink_hid_xbox_protocol::{LedFrame, SpinSequence};
use tracing::{debug, warn};

/// Show a single pattern. Failures are logged; the ring is cosmetic.
pub async fn show<O: OutputEndpoint>(output: &mut O, frame: LedFrame) -> bool {
    match output.write_all(&frame.command()).await {
        Ok(()) => true,
        Err(e) => {
            warn!(?frame, error = %e, "LED write failed");
            false
        }
    }
}

/// Run the whole sequence, sleeping between frames. Returns the frame left
/// on the ring.
pub async fn play<O: OutputEndpoint>(output: &mut O, sequence: SpinSequence) -> Option<LedFrame> {
    let target = sequence.target();
    let mut last = None;
    let mut steps = 0u32;
    for step in sequence {
        show(output, step.frame).await;
        tokio::time::sleep(step.hold).await;
        last = Some(step.frame);
        steps = steps.saturating_add(1);
    }
    debug!(?target, ?last, steps, "LED spin finished");
    last
}
