use std::{
    io::{self, Read},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc::{channel, Receiver, RecvTimeoutError, Sender},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use osprey_link::{LinkConfig, LinkError, LinkReader, LinkState};
use osprey_telemetry::{
    name::FieldName, value::FieldValue, LineDecoder, TelemetrySnapshot, TelemetryState,
};

const READ_TIMEOUT: Duration = Duration::from_millis(50);

enum Chunk {
    Bytes(Vec<u8>),
    Unplug,
}

/// Stands in for a serial port: chunks arrive from the test, idle reads time out.
struct FakePort {
    chunks: Receiver<Chunk>,
    closed: Arc<AtomicBool>,
    pending: Vec<u8>,
}

impl Read for FakePort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.chunks.recv_timeout(READ_TIMEOUT) {
                Ok(Chunk::Bytes(bytes)) => self.pending = bytes,
                Ok(Chunk::Unplug) => return Err(io::Error::from_raw_os_error(5)),
                Err(RecvTimeoutError::Timeout) => return Err(io::ErrorKind::TimedOut.into()),
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }

        let len = self.pending.len().min(buf.len());
        buf[..len].copy_from_slice(&self.pending[..len]);
        self.pending.drain(..len);

        Ok(len)
    }
}

impl Drop for FakePort {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

struct Harness {
    reader: LinkReader,
    telemetry: Arc<TelemetryState>,
    chunks: Sender<Chunk>,
    closed: Arc<AtomicBool>,
    updates: Arc<AtomicUsize>,
}

fn harness() -> Harness {
    let (chunks, rx) = channel();
    let closed = Arc::new(AtomicBool::new(false));
    let updates = Arc::new(AtomicUsize::new(0));
    let telemetry = Arc::new(TelemetryState::new());

    let reader = LinkReader::spawn(
        "fake",
        FakePort {
            chunks: rx,
            closed: Arc::clone(&closed),
            pending: Vec::new(),
        },
        LineDecoder::default(),
        Arc::clone(&telemetry),
        {
            let updates = Arc::clone(&updates);
            move || {
                updates.fetch_add(1, Ordering::SeqCst);
            }
        },
    );

    Harness {
        reader,
        telemetry,
        chunks,
        closed,
        updates,
    }
}

impl Harness {
    fn send(&self, bytes: &[u8]) {
        self.chunks.send(Chunk::Bytes(bytes.to_vec())).unwrap();
    }

    fn wait_for(&self, mut done: impl FnMut(&TelemetrySnapshot) -> bool) -> TelemetrySnapshot {
        let deadline = Instant::now() + Duration::from_secs(5);

        loop {
            let snapshot = self.telemetry.snapshot();

            if done(&snapshot) {
                return snapshot;
            }

            assert!(Instant::now() < deadline, "timed out waiting for telemetry");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn wait_for_state(&self, state: LinkState) {
        let deadline = Instant::now() + Duration::from_secs(5);

        while self.reader.state() != state {
            assert!(Instant::now() < deadline, "reader never reached {state:?}");
            thread::sleep(Duration::from_millis(5));
        }
    }
}

#[test]
fn lines_are_applied_in_order() {
    let link = harness();

    link.send(b"Battery Voltage: 11.8\r\nDistance Right: 42\n");
    link.send(b"Altitude: 10\nAltitude: 20\nAltitude: 30\n");

    let snapshot = link.wait_for(|snapshot| snapshot.applied() == 5);

    assert_eq!(
        snapshot.value(FieldName::BatteryVoltage),
        Some(&FieldValue::Float(11.8))
    );
    assert_eq!(
        snapshot.value(FieldName::DistanceRight),
        Some(&FieldValue::Integer(42))
    );
    assert_eq!(
        snapshot.value(FieldName::Altitude),
        Some(&FieldValue::Float(30.0))
    );
    assert!(link.updates.load(Ordering::SeqCst) >= 5);
}

#[test]
fn split_lines_are_reassembled() {
    let link = harness();

    link.send(b"Main Mo");
    thread::sleep(READ_TIMEOUT * 3);
    link.send(b"de: Loiter\n");

    let snapshot = link.wait_for(|snapshot| snapshot.is_set(FieldName::MainMode));

    assert_eq!(
        snapshot.value(FieldName::MainMode),
        Some(&FieldValue::Text("Loiter".into()))
    );
}

#[test]
fn noise_does_not_stop_the_link() {
    let link = harness();

    link.send(b"Foo: bar\n\xff\xfe garbage\nAltitude: notanumber\n:::\n");
    link.send(b"Heading: 270.5\n");

    let snapshot = link.wait_for(|snapshot| snapshot.is_set(FieldName::Heading));

    assert!(!snapshot.is_set(FieldName::Altitude));
    assert_eq!(snapshot.discarded(), 4);
    assert_eq!(link.reader.state(), LinkState::Connected);
    assert_eq!(link.reader.take_error(), None);
}

#[test]
fn stop_returns_while_idle_and_closes_the_device() {
    let mut link = harness();

    thread::sleep(READ_TIMEOUT);

    let started = Instant::now();
    link.reader.stop();

    assert!(started.elapsed() < READ_TIMEOUT * 10);
    assert!(link.closed.load(Ordering::SeqCst));
    assert_eq!(link.reader.state(), LinkState::Stopped);
    assert_eq!(link.reader.take_error(), None);

    // Second stop is a no-op.
    link.reader.stop();
    assert_eq!(link.reader.state(), LinkState::Stopped);
}

#[test]
fn unplug_is_reported_exactly_once() {
    let link = harness();

    link.send(b"Roll: 1.5\n");
    link.chunks.send(Chunk::Unplug).unwrap();

    link.wait_for_state(LinkState::Disconnected);

    assert_eq!(link.reader.take_error(), Some(LinkError::Disconnected));
    assert_eq!(link.reader.take_error(), None);
    assert!(link.closed.load(Ordering::SeqCst));
    assert_eq!(
        link.telemetry.snapshot().value(FieldName::Roll),
        Some(&FieldValue::Float(1.5))
    );
}

#[test]
fn end_of_stream_is_a_disconnect() {
    let Harness {
        mut reader, chunks, ..
    } = harness();

    drop(chunks);

    let deadline = Instant::now() + Duration::from_secs(5);
    while reader.state() != LinkState::Disconnected {
        assert!(Instant::now() < deadline);
        thread::sleep(Duration::from_millis(5));
    }

    reader.stop();
    assert_eq!(reader.take_error(), Some(LinkError::Disconnected));
}

#[test]
fn arming_over_the_link_starts_the_timer_once() {
    let link = harness();

    link.send(b"Armed or Not: no\n");
    link.wait_for(|snapshot| snapshot.is_set(FieldName::Armed));
    assert_eq!(link.telemetry.arm_timer().elapsed(), None);

    link.send(b"Armed or Not: YES\n");
    link.wait_for(|snapshot| snapshot.applied() == 2);
    let armed_at = link.telemetry.arm_timer().started_at();
    assert!(armed_at.is_some());

    link.send(b"Armed or Not: no\nArmed or Not: Yes\n");
    link.wait_for(|snapshot| snapshot.applied() == 4);
    assert_eq!(link.telemetry.arm_timer().started_at(), armed_at);
}

#[cfg(unix)]
#[test]
fn missing_port_reports_not_found() {
    for _ in 0..2 {
        let result = LinkReader::open(
            "/dev/osprey-no-such-port",
            LinkConfig::default(),
            Arc::new(TelemetryState::new()),
            || {},
        );

        assert_eq!(result.err(), Some(LinkError::NotFound));
    }
}

/// Never sends a newline, like a link opened at the wrong baud rate.
struct Babbler;

impl Read for Babbler {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        thread::sleep(Duration::from_millis(1));

        let len = buf.len().min(16);
        buf[..len].fill(b'x');

        Ok(len)
    }
}

#[test]
fn stop_returns_while_bytes_keep_arriving_without_newlines() {
    let telemetry = Arc::new(TelemetryState::new());
    let mut reader = LinkReader::spawn(
        "babbler",
        Babbler,
        LineDecoder::default(),
        Arc::clone(&telemetry),
        || {},
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    while telemetry.snapshot().discarded() == 0 {
        assert!(Instant::now() < deadline, "overlong line was never discarded");
        thread::sleep(Duration::from_millis(5));
    }

    let (done_tx, done_rx) = channel();
    thread::spawn(move || {
        reader.stop();
        let _ = done_tx.send(reader.state());
    });

    assert_eq!(
        done_rx.recv_timeout(Duration::from_secs(3)),
        Ok(LinkState::Stopped)
    );
    // One overlong line, however long it runs.
    assert_eq!(telemetry.snapshot().discarded(), 1);
    assert_eq!(telemetry.snapshot().applied(), 0);
}

#[test]
fn overlong_line_is_dropped_and_the_next_one_decodes() {
    let link = harness();

    link.send(&[b'x'; 2000]);
    link.send(b"\nRoll: 1.5\n");

    let snapshot = link.wait_for(|snapshot| snapshot.is_set(FieldName::Roll));

    assert_eq!(snapshot.discarded(), 1);
    assert_eq!(
        snapshot.value(FieldName::Roll),
        Some(&FieldValue::Float(1.5))
    );
    assert_eq!(link.reader.state(), LinkState::Connected);
}
