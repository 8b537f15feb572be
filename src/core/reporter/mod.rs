//! # Reporter Module
//!
//! Turns pipeline events into progress output.
//!
//! The pipeline never renders anything itself. It publishes events, and a
//! [`ProgressSink`] running on its own thread decides how to show them. A
//! slow or broken sink cannot affect the run because event delivery is fire
//! and forget.

use crate::events::{Event, EventReceiver, PipelineEvent, RunStatus};

/// Destination for progress output
pub trait ProgressSink: Send {
    /// The run counters changed
    fn report(&self, status: &RunStatus);

    /// Any other event; ignored by default
    fn event(&self, _event: &Event) {}

    /// The run is over; `status` holds the final counters
    fn finish(&self, _status: &RunStatus) {}
}

/// The status line text, without the animated dots
pub fn format_status(status: &RunStatus) -> String {
    let mut line = format!(
        "keep: {} / trash: {} / total: {}",
        status.kept, status.trashed, status.total
    );
    if status.still_scanning {
        line.push_str(" (scanning)");
    }
    line
}

/// Feed every event from `receiver` into `sink` until the senders are gone.
///
/// Returns the last status seen.
pub fn drive(receiver: EventReceiver, sink: &dyn ProgressSink) -> RunStatus {
    let mut last = RunStatus::default();

    while let Some(event) = receiver.recv() {
        match event {
            Event::Pipeline(PipelineEvent::Status(status)) => {
                last = status;
                sink.report(&status);
            }
            other => sink.event(&other),
        }
    }

    sink.finish(&last);
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventChannel, TrashEvent};
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<String>>,
        others: Mutex<usize>,
        finished: Mutex<Option<RunStatus>>,
    }

    impl ProgressSink for Recorder {
        fn report(&self, status: &RunStatus) {
            self.lines.lock().unwrap().push(format_status(status));
        }

        fn event(&self, _event: &Event) {
            *self.others.lock().unwrap() += 1;
        }

        fn finish(&self, status: &RunStatus) {
            *self.finished.lock().unwrap() = Some(*status);
        }
    }

    fn status(kept: usize, trashed: usize, total: usize, still_scanning: bool) -> RunStatus {
        RunStatus {
            kept,
            trashed,
            total,
            still_scanning,
        }
    }

    #[test]
    fn status_line_while_scanning() {
        assert_eq!(
            format_status(&status(3, 1, 10, true)),
            "keep: 3 / trash: 1 / total: 10 (scanning)"
        );
    }

    #[test]
    fn status_line_after_scanning() {
        assert_eq!(
            format_status(&status(9, 1, 10, false)),
            "keep: 9 / trash: 1 / total: 10"
        );
    }

    #[test]
    fn drive_routes_status_and_other_events() {
        let (sender, receiver) = EventChannel::new();
        sender.send(Event::Pipeline(PipelineEvent::Status(status(0, 0, 1, true))));
        sender.send(Event::Trash(TrashEvent::Scheduled {
            path: PathBuf::from("old.mp3"),
        }));
        sender.send(Event::Pipeline(PipelineEvent::Status(status(1, 1, 2, false))));
        drop(sender);

        let recorder = Recorder::default();
        let last = drive(receiver, &recorder);

        assert_eq!(last, status(1, 1, 2, false));
        assert_eq!(recorder.lines.lock().unwrap().len(), 2);
        assert_eq!(*recorder.others.lock().unwrap(), 1);
        assert_eq!(*recorder.finished.lock().unwrap(), Some(last));
    }

    #[test]
    fn drive_without_events_finishes_with_zero_counters() {
        let (sender, receiver) = EventChannel::new();
        drop(sender);

        let recorder = Recorder::default();
        assert_eq!(drive(receiver, &recorder), RunStatus::default());
        assert!(recorder.finished.lock().unwrap().is_some());
    }
}
