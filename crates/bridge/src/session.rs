//! Per-controller decode loop.
//!
//! One session owns the endpoints, the decoder state and the sink for the
//! lifetime of the controller. Everything runs sequentially: the start-up
//! phase (LED spin or handshake) completes before the first decoded read.

use std::time::Duration;

use padlink_hid_common::{HidCommonError, InputEndpoint, OutputEndpoint};
use padlink_hid_xbox_protocol::xbox_one::START_COMMAND;
use padlink_hid_xbox_protocol::{
    Decoder, DeviceModel, InputEvent, KeyMap, PlayerSlot, ReportDecoder, SpinSequence,
};
use tracing::{debug, info, warn};

use crate::error::BridgeError;
use crate::led;
use crate::sink::EventSink;

/// Space-separated lowercase hex, as printed in the read logs.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Dump every read until the first error. Returns how many reports were read.
pub async fn run_readonly<I: InputEndpoint>(input: &mut I, timeout: Duration) -> usize {
    let mut count = 0usize;
    loop {
        match input.read_report(timeout).await {
            Ok(report) => {
                count = count.saturating_add(1);
                info!(len = report.len(), data = %hex(&report), "read");
            }
            Err(e) => {
                info!(error = %e, reports = count, "read failed, stopping");
                return count;
            }
        }
    }
}

/// Timing and player assignment for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub read_timeout: Duration,
    pub drain_timeout: Duration,
    pub player: PlayerSlot,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(60),
            drain_timeout: Duration::from_secs(1),
            player: PlayerSlot::One,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub reports: u64,
    pub events: u64,
    pub directives: u64,
    pub timeouts: u64,
    pub read_errors: u64,
    pub malformed: u64,
    pub sink_errors: u64,
}

pub struct Session<I, O, S> {
    model: DeviceModel,
    input: I,
    output: O,
    sink: S,
    decoder: Decoder,
    keymap: KeyMap,
    settings: SessionSettings,
    stats: SessionStats,
}

impl<I, O, S> Session<I, O, S>
where
    I: InputEndpoint,
    O: OutputEndpoint,
    S: EventSink,
{
    pub fn new(
        model: DeviceModel,
        input: I,
        output: O,
        sink: S,
        keymap: KeyMap,
        settings: SessionSettings,
    ) -> Self {
        Self {
            model,
            input,
            output,
            sink,
            decoder: Decoder::for_family(model.family),
            keymap,
            settings,
            stats: SessionStats::default(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Family-specific start-up: LED spin and drain, or the start handshake.
    pub async fn start(&mut self) -> Result<(), BridgeError> {
        if self.model.family.has_led_ring() {
            let shown =
                led::play(&mut self.output, SpinSequence::for_player(self.settings.player)).await;
            info!(player = self.settings.player.number(), ?shown, "LED ring set");
            let drained = self.drain().await;
            debug!(drained, "drained pending input");
        } else {
            self.output
                .write_all(&START_COMMAND)
                .await
                .map_err(BridgeError::Handshake)?;
            info!(command = %hex(&START_COMMAND), "start command sent");
        }
        Ok(())
    }

    /// Discard whatever the device queued before we started listening.
    async fn drain(&mut self) -> usize {
        let mut drained = 0usize;
        while let Ok(report) = self.input.read_report(self.settings.drain_timeout).await {
            debug!(len = report.len(), data = %hex(&report), "drain");
            drained = drained.saturating_add(1);
        }
        drained
    }

    /// One read-decode-forward cycle. Only a lost device is an error.
    pub async fn step(&mut self) -> Result<Vec<InputEvent>, BridgeError> {
        let report = match self.input.read_report(self.settings.read_timeout).await {
            Ok(report) => report,
            Err(HidCommonError::Timeout(after)) => {
                self.stats.timeouts = self.stats.timeouts.saturating_add(1);
                debug!(?after, "read timed out");
                return Ok(Vec::new());
            }
            Err(e) if e.is_transient() => {
                self.stats.read_errors = self.stats.read_errors.saturating_add(1);
                warn!(error = %e, "read failed, skipping");
                return Ok(Vec::new());
            }
            Err(e) => return Err(BridgeError::Disconnected(e)),
        };

        self.stats.reports = self.stats.reports.saturating_add(1);
        debug!(len = report.len(), data = %hex(&report), "read");

        let events = match self.decoder.decode(&report) {
            Ok(events) => events,
            Err(e) => {
                self.stats.malformed = self.stats.malformed.saturating_add(1);
                warn!(error = %e, len = report.len(), "malformed report skipped");
                return Ok(Vec::new());
            }
        };

        for event in &events {
            self.stats.events = self.stats.events.saturating_add(1);
            info!("{event}");
            self.forward(event);
        }
        Ok(events)
    }

    fn forward(&mut self, event: &InputEvent) {
        let Some(directive) = self.keymap.directive(event) else {
            return;
        };
        match self.sink.send(directive) {
            Ok(()) => {
                self.stats.directives = self.stats.directives.saturating_add(1);
            }
            Err(e) => {
                self.stats.sink_errors = self.stats.sink_errors.saturating_add(1);
                warn!(error = %e, ?directive, "event sink write failed");
            }
        }
    }

    /// Start up, then decode until the device goes away.
    pub async fn run(mut self) -> Result<SessionStats, BridgeError> {
        self.start().await?;
        info!(family = %self.model.family, "decoding");
        loop {
            if let Err(e) = self.step().await {
                info!(stats = ?self.stats(), "session ended");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::recording::RecordingSink;
    use padlink_hid_common::mock::MockEndpoint;
    use padlink_hid_xbox_protocol::{Control, Edge, identify};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn model(vid: u16, pid: u16) -> Result<DeviceModel, Box<dyn std::error::Error>> {
        identify(vid, pid).ok_or_else(|| "unknown model".into())
    }

    fn session(
        model: DeviceModel,
        mock: &MockEndpoint,
        sink: &RecordingSink,
        player: PlayerSlot,
    ) -> Session<MockEndpoint, MockEndpoint, RecordingSink> {
        Session::new(
            model,
            mock.clone(),
            mock.clone(),
            sink.clone(),
            KeyMap::default(),
            SessionSettings {
                player,
                ..SessionSettings::default()
            },
        )
    }

    fn report_360(byte3: u8) -> Vec<u8> {
        let mut report = vec![0u8; 20];
        report[1] = 0x14;
        report[3] = byte3;
        report
    }

    fn input_one(byte2: u8, lx: i16) -> Vec<u8> {
        let mut report = vec![0u8; 18];
        report[0] = 0x20;
        report[4] = byte2;
        report[10..12].copy_from_slice(&lx.to_le_bytes());
        report
    }

    #[test]
    fn hex_format() {
        assert_eq!(hex(&[0x05, 0x20, 0xff]), "05 20 ff");
        assert_eq!(hex(&[]), "");
    }

    #[tokio::test]
    async fn readonly_reads_until_first_error() {
        let mock = MockEndpoint::new();
        mock.queue_read(vec![0x00, 0x14]);
        mock.queue_read(vec![0x01]);
        mock.queue_timeout();
        mock.queue_read(vec![0x02]);
        let mut input = mock.clone();
        assert_eq!(run_readonly(&mut input, Duration::from_secs(60)).await, 2);
        assert_eq!(mock.pending_reads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn xbox360_start_spins_then_drains() -> TestResult {
        let mock = MockEndpoint::new();
        mock.queue_read(report_360(0x10));
        mock.queue_read(report_360(0x00));
        let sink = RecordingSink::default();
        let mut session = session(model(0x045e, 0x028e)?, &mock, &sink, PlayerSlot::One);

        session.start().await?;

        let writes = mock.get_write_history();
        assert_eq!(writes.len(), 2 + 16 + 1);
        assert_eq!(writes.last(), Some(&vec![0x01, 0x03, 0x06]));
        // Both queued reports were drained, then the drain stopped on the
        // empty queue.
        assert_eq!(mock.pending_reads(), 0);
        assert_eq!(
            mock.read_timeouts(),
            vec![Duration::from_secs(1); 3]
        );
        assert!(sink.sent().is_empty());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn onza_start_uses_the_led_ring() -> TestResult {
        let mock = MockEndpoint::new();
        let sink = RecordingSink::default();
        let mut session = session(model(0x1689, 0xfd00)?, &mock, &sink, PlayerSlot::One);
        session.start().await?;
        let writes = mock.get_write_history();
        assert_eq!(writes.last(), Some(&vec![0x01, 0x03, 0x06]));
        assert!(!writes.contains(&START_COMMAND.to_vec()));
        Ok(())
    }

    #[tokio::test]
    async fn xbox_one_start_sends_handshake() -> TestResult {
        let mock = MockEndpoint::new();
        let sink = RecordingSink::default();
        let mut session = session(model(0x045e, 0x02d1)?, &mock, &sink, PlayerSlot::One);
        session.start().await?;
        assert_eq!(mock.get_write_history(), vec![vec![0x05, 0x20]]);
        Ok(())
    }

    #[tokio::test]
    async fn short_handshake_is_fatal() -> TestResult {
        let mock = MockEndpoint::new();
        mock.limit_writes(1);
        let sink = RecordingSink::default();
        let mut session = session(model(0x045e, 0x02d1)?, &mock, &sink, PlayerSlot::One);
        let err = session.start().await.err().ok_or("expected handshake failure")?;
        assert!(matches!(
            err,
            BridgeError::Handshake(HidCommonError::ShortWrite { .. })
        ));
        assert_eq!(err.exit_code(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn button_edges_become_directives() -> TestResult {
        let mock = MockEndpoint::new();
        let sink = RecordingSink::default();
        let mut session = session(model(0x045e, 0x02d1)?, &mock, &sink, PlayerSlot::One);

        mock.queue_read(input_one(0x10, 0));
        mock.queue_read(input_one(0x10, 0));
        mock.queue_read(input_one(0x00, 0));

        assert_eq!(session.step().await?, vec![InputEvent::pressed(Control::A)]);
        assert!(session.step().await?.is_empty());
        assert_eq!(session.step().await?, vec![InputEvent::released(Control::A)]);
        assert_eq!(sink.sent(), vec!["d ".to_string(), "u ".to_string()]);
        assert_eq!(session.stats().directives, 2);
        Ok(())
    }

    #[tokio::test]
    async fn axis_pseudo_buttons_are_forwarded() -> TestResult {
        let mock = MockEndpoint::new();
        let sink = RecordingSink::default();
        let mut session = session(model(0x045e, 0x02d1)?, &mock, &sink, PlayerSlot::One);

        mock.queue_read(input_one(0, 20_000));
        mock.queue_read(input_one(0, 20_000));
        mock.queue_read(input_one(0, -20_000));

        session.step().await?;
        session.step().await?;
        session.step().await?;
        assert_eq!(sink.sent(), vec!["dl", "ul", "dh"]);
        Ok(())
    }

    #[tokio::test]
    async fn xbox360_buttons_use_the_same_keymap() -> TestResult {
        let mock = MockEndpoint::new();
        let sink = RecordingSink::default();
        let mut session = session(model(0x045e, 0x028e)?, &mock, &sink, PlayerSlot::One);

        mock.queue_read(report_360(0x10));
        let events = session.step().await?;
        assert_eq!(events, vec![InputEvent::pressed(Control::A)]);
        assert_eq!(sink.sent(), vec!["d "]);
        Ok(())
    }

    #[tokio::test]
    async fn unmapped_and_analog_events_stay_local() -> TestResult {
        let mock = MockEndpoint::new();
        let sink = RecordingSink::default();
        let mut session = session(model(0x045e, 0x028e)?, &mock, &sink, PlayerSlot::One);

        let mut report = report_360(0x04);
        report[4] = 0x80;
        mock.queue_read(report);
        let events = session.step().await?;
        assert_eq!(events.len(), 2);
        assert!(events.contains(&InputEvent::Button {
            control: Control::Guide,
            edge: Edge::Pressed
        }));
        assert!(sink.sent().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn transient_errors_and_malformed_reports_are_skipped() -> TestResult {
        let mock = MockEndpoint::new();
        let sink = RecordingSink::default();
        let mut session = session(model(0x045e, 0x028e)?, &mock, &sink, PlayerSlot::One);

        mock.queue_timeout();
        mock.queue_read_error("babble");
        mock.queue_read(vec![0u8; 19]);
        mock.queue_read(report_360(0x10));

        assert!(session.step().await?.is_empty());
        assert!(session.step().await?.is_empty());
        assert!(session.step().await?.is_empty());
        assert_eq!(session.step().await?, vec![InputEvent::pressed(Control::A)]);

        let stats = session.stats();
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.read_errors, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.reports, 2);
        assert_eq!(mock.read_timeouts(), vec![Duration::from_secs(60); 4]);
        Ok(())
    }

    #[tokio::test]
    async fn sink_failures_do_not_stop_decoding() -> TestResult {
        let mock = MockEndpoint::new();
        let sink = RecordingSink::failing();
        let mut session = session(model(0x045e, 0x02d1)?, &mock, &sink, PlayerSlot::One);

        mock.queue_read(input_one(0x10, 0));
        mock.queue_read(input_one(0x30, 0));
        assert_eq!(session.step().await?.len(), 1);
        assert_eq!(session.step().await?.len(), 1);
        assert_eq!(session.stats().sink_errors, 2);
        assert_eq!(session.stats().directives, 0);
        Ok(())
    }

    #[tokio::test]
    async fn disconnect_ends_the_run() -> TestResult {
        let mock = MockEndpoint::new();
        let sink = RecordingSink::default();
        let session = session(model(0x045e, 0x02d1)?, &mock, &sink, PlayerSlot::One);

        mock.queue_read(input_one(0x10, 0));
        mock.queue_timeout();
        let err = session.run().await.err().ok_or("expected disconnect")?;
        assert!(matches!(
            err,
            BridgeError::Disconnected(HidCommonError::Disconnected)
        ));
        assert_eq!(sink.sent(), vec!["d "]);
        assert_eq!(mock.get_write_history(), vec![vec![0x05, 0x20]]);
        Ok(())
    }

    #[tokio::test]
    async fn guide_status_has_no_release() -> TestResult {
        let mock = MockEndpoint::new();
        let sink = RecordingSink::default();
        let mut session = session(model(0x045e, 0x02d1)?, &mock, &sink, PlayerSlot::One);

        mock.queue_read(vec![0x07, 0x20, 0x00, 0x00, 0x01, 0x00]);
        mock.queue_read(vec![0x07, 0x20, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(
            session.step().await?,
            vec![InputEvent::pressed(Control::Guide)]
        );
        assert!(session.step().await?.is_empty());
        Ok(())
    }
}
