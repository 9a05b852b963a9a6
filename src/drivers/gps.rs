//! GPS position sensor.
//!
//! The real sensor is an [`NmeaReader`]: a background thread that reads
//! NMEA lines from the receiver's serial device, decodes them with
//! `nmea_parser` and merges every GGA, RMC and GLL message into a shared
//! [`GpsRecord`]. The scheduler only copies the latest record under the
//! mutex and never waits for the receiver.
//!
//! Serial noise is expected while the receiver powers up. Lines are decoded
//! lossily and anything the parser rejects is skipped; only end of stream,
//! the stop flag or a hard I/O error end the thread.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use kleine_common::SignalQuality;
use nmea_parser::chrono::{DateTime, Utc};
use nmea_parser::gnss::GgaQualityIndicator;
use nmea_parser::{NmeaParser, ParsedMessage};

use super::PositionSensor;
use super::sensors::fake_signal;
use crate::error::SensorError;
use crate::state::GpsReading;

/// How long `close` waits for the reader thread before detaching it.
const READER_JOIN_TIMEOUT: Duration = Duration::from_millis(1500);

const KNOTS_TO_KMH: f64 = 1.852;

// =============================================================================
// Shared record
// =============================================================================

/// Accumulated receiver state. Each sentence fills in the fields it
/// carries; fields it lacks keep their previous value.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct GpsRecord {
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude: Option<f32>,
    altitude_units: Option<String>,
    timestamp: Option<String>,
    status: Option<char>,
    fix_quality: Option<u8>,
    satellites: Option<u8>,
    speed_kmh: Option<f32>,
    heading: Option<f32>,
}

fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn time_of_day(timestamp: Option<DateTime<Utc>>) -> Option<String> {
    timestamp.map(|t| t.format("%H:%M:%S").to_string())
}

fn status(active: Option<bool>) -> Option<char> {
    active.map(|active| if active { 'A' } else { 'V' })
}

impl GpsRecord {
    /// Merge one decoded message. Messages without position data are ignored.
    pub fn apply(&mut self, message: ParsedMessage) {
        match message {
            ParsedMessage::Gga(gga) => {
                merge(&mut self.timestamp, time_of_day(gga.timestamp));
                merge(&mut self.latitude, gga.latitude);
                merge(&mut self.longitude, gga.longitude);
                let has_fix = !matches!(gga.quality, GgaQualityIndicator::Invalid);
                merge(&mut self.fix_quality, Some(u8::from(has_fix)));
                merge(&mut self.satellites, gga.satellite_count);
                if gga.altitude.is_some() {
                    self.altitude = gga.altitude.map(|alt| alt as f32);
                    self.altitude_units = Some("M".to_string());
                }
            }
            ParsedMessage::Rmc(rmc) => {
                merge(&mut self.timestamp, time_of_day(rmc.timestamp));
                merge(&mut self.status, status(rmc.status_active));
                merge(&mut self.latitude, rmc.latitude);
                merge(&mut self.longitude, rmc.longitude);
                merge(&mut self.speed_kmh, rmc.sog_knots.map(|knots| (knots * KNOTS_TO_KMH) as f32));
                merge(&mut self.heading, rmc.bearing.map(|course| course as f32));
            }
            ParsedMessage::Gll(gll) => {
                merge(&mut self.latitude, gll.latitude);
                merge(&mut self.longitude, gll.longitude);
                merge(&mut self.timestamp, time_of_day(gll.timestamp));
                merge(&mut self.status, status(gll.data_valid));
            }
            _ => {}
        }
    }

    /// The record as a reading, or `None` until a position has been seen.
    pub fn reading(&self) -> Option<GpsReading> {
        let (latitude, longitude) = (self.latitude?, self.longitude?);
        Some(GpsReading {
            latitude,
            longitude,
            latitude_dir: if latitude >= 0.0 { 'N' } else { 'S' },
            longitude_dir: if longitude >= 0.0 { 'E' } else { 'W' },
            altitude: self.altitude,
            altitude_units: self.altitude_units.clone().unwrap_or_default(),
            timestamp: self.timestamp.clone(),
            status: self.status,
            signal_quality: SignalQuality::from_gps(self.fix_quality, self.satellites),
            satellites: self.satellites,
            speed_kmh: self.speed_kmh,
            heading: self.heading,
        })
    }
}

// =============================================================================
// NMEA reader thread
// =============================================================================

pub struct NmeaReader {
    record: Arc<Mutex<GpsRecord>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl NmeaReader {
    /// Open the serial device at `path` and start reading.
    pub fn open(path: &Path, log_sentences: bool) -> Result<Self, SensorError> {
        let file = File::open(path)?;
        log::info!("reading NMEA from {}", path.display());
        Ok(Self::spawn(BufReader::new(file), log_sentences))
    }

    /// Start a reader thread over any line source.
    pub fn spawn<R>(source: R, log_sentences: bool) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let record = Arc::new(Mutex::new(GpsRecord::default()));
        let stop = Arc::new(AtomicBool::new(false));

        let thread_record = Arc::clone(&record);
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("nmea-reader".into())
            .spawn(move || read_lines(source, &thread_record, &thread_stop, log_sentences));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("could not start NMEA reader thread: {}", err);
                None
            }
        };
        Self { record, stop, handle }
    }

    /// Copy of the current record.
    pub fn snapshot(&self) -> GpsRecord {
        self.record.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// True once the reader thread has ended (EOF, error or stop).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

fn read_lines<R: BufRead>(mut source: R, record: &Mutex<GpsRecord>, stop: &AtomicBool, log_sentences: bool) {
    let mut parser = NmeaParser::new();
    let mut buffer = Vec::new();

    while !stop.load(Ordering::Relaxed) {
        buffer.clear();
        match source.read_until(b'\n', &mut buffer) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) if matches!(err.kind(), ErrorKind::Interrupted | ErrorKind::InvalidData) => continue,
            Err(err) => {
                log::warn!(target: "kleine::gps", "serial read failed: {}", err);
                break;
            }
        }

        let line = String::from_utf8_lossy(&buffer);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if log_sentences {
            log::trace!(target: "kleine::gps", "{}", line);
        }
        match parser.parse_sentence(line) {
            Ok(message) => record.lock().unwrap_or_else(PoisonError::into_inner).apply(message),
            Err(err) => log::debug!(target: "kleine::gps", "skipping sentence: {:?}", err),
        }
    }
    log::debug!(target: "kleine::gps", "NMEA reader stopped");
}

impl PositionSensor for NmeaReader {
    fn poll_position(&mut self) -> Result<Option<GpsReading>, SensorError> {
        Ok(self.snapshot().reading())
    }

    fn close(&mut self) -> Result<(), SensorError> {
        self.stop.store(true, Ordering::Relaxed);
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        // A silent receiver leaves the thread blocked in read; give it one
        // sentence interval and detach it otherwise.
        let deadline = Instant::now() + READER_JOIN_TIMEOUT;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
        if handle.is_finished() {
            handle
                .join()
                .map_err(|_| SensorError::Unavailable("nmea reader (panicked)"))?;
        } else {
            log::warn!("NMEA reader still blocked on the serial device, detaching it");
        }
        Ok(())
    }
}

// =============================================================================
// Mock
// =============================================================================

/// Fixed position with a speed that slowly sweeps up and down.
#[derive(Debug)]
pub struct MockGps {
    base: GpsReading,
    started: Instant,
}

impl MockGps {
    pub fn new(latitude: f64, longitude: f64, altitude: f32) -> Self {
        let base = GpsReading {
            latitude,
            longitude,
            latitude_dir: if latitude >= 0.0 { 'N' } else { 'S' },
            longitude_dir: if longitude >= 0.0 { 'E' } else { 'W' },
            altitude: Some(altitude),
            altitude_units: "M".to_string(),
            timestamp: Some("12:34:56".to_string()),
            status: Some('A'),
            signal_quality: SignalQuality::Good,
            satellites: Some(8),
            speed_kmh: Some(0.0),
            heading: Some(90.0),
        };
        Self {
            base,
            started: Instant::now(),
        }
    }

    pub fn reading_at(&self, t: f32) -> GpsReading {
        GpsReading {
            speed_kmh: Some(fake_signal(t, 0.0, 120.0, 0.05).round()),
            ..self.base.clone()
        }
    }
}

impl PositionSensor for MockGps {
    fn poll_position(&mut self) -> Result<Option<GpsReading>, SensorError> {
        Ok(Some(self.reading_at(self.started.elapsed().as_secs_f32())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const NO_FIX_GGA: &str = "$GNGGA,000000,,,,,0,00,,,M,,M,,*78";

    fn wait_finished(reader: &NmeaReader) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !reader.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn read_all(bytes: Vec<u8>) -> NmeaReader {
        let reader = NmeaReader::spawn(Cursor::new(bytes), false);
        wait_finished(&reader);
        reader
    }

    fn parsed(sentence: &str) -> ParsedMessage {
        NmeaParser::new().parse_sentence(sentence).unwrap()
    }

    #[test]
    fn test_record_needs_position() {
        let record = GpsRecord::default();
        assert_eq!(record.reading(), None);
    }

    #[test]
    fn test_reader_merges_sentences() {
        let stream = format!("{}\ngarbage line\n{}\n", GGA, RMC);
        let mut reader = read_all(stream.into_bytes());

        let reading = reader.poll_position().unwrap().expect("position after GGA");
        assert!((reading.latitude - 48.1173).abs() < 1e-4);
        assert_eq!(reading.latitude_dir, 'N');
        assert_eq!(reading.longitude_dir, 'E');
        assert_eq!(reading.altitude, Some(545.4));
        assert_eq!(reading.altitude_units, "M");
        assert_eq!(reading.timestamp.as_deref(), Some("12:35:19"));
        assert_eq!(reading.status, Some('A'), "status comes from RMC");
        assert_eq!(reading.satellites, Some(8), "satellites come from GGA");
        assert_eq!(reading.signal_quality, SignalQuality::Good);
        let speed = reading.speed_kmh.unwrap();
        assert!((speed - 22.4 * 1.852).abs() < 0.01);
        assert_eq!(reading.heading, Some(84.4));
        reader.close().unwrap();
    }

    #[test]
    fn test_reader_survives_non_utf8_noise() {
        let mut stream = b"\xff\xfe noise\n".to_vec();
        stream.extend_from_slice(GGA.as_bytes());
        stream.push(b'\n');
        let mut reader = read_all(stream);

        let reading = reader.poll_position().unwrap();
        assert!(reading.is_some(), "a valid GGA after a noisy line must still be applied");
        reader.close().unwrap();
    }

    #[test]
    fn test_corrupted_checksum_is_skipped() {
        let tampered = GGA.replace("545.4", "545.5");
        let mut reader = read_all(format!("{}\n", tampered).into_bytes());
        assert_eq!(reader.poll_position().unwrap(), None);
        reader.close().unwrap();
    }

    #[test]
    fn test_missing_fields_keep_previous_values() {
        let mut record = GpsRecord::default();
        record.apply(parsed(GGA));
        record.apply(parsed(NO_FIX_GGA));
        let reading = record.reading().unwrap();
        assert!((reading.latitude - 48.1173).abs() < 1e-4, "no-fix GGA keeps the last position");
        assert_eq!(reading.altitude, Some(545.4), "no-fix GGA keeps the last altitude");
        assert_eq!(reading.signal_quality, SignalQuality::Poor);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut reader = NmeaReader::spawn(Cursor::new(Vec::new()), false);
        reader.close().unwrap();
        reader.close().unwrap();
    }

    #[test]
    fn test_mock_gps_always_has_fix() {
        let mut gps = MockGps::new(37.7749, -122.4194, 16.0);
        let reading = gps.poll_position().unwrap().unwrap();
        assert_eq!(reading.longitude_dir, 'W');
        assert_eq!(reading.status, Some('A'));
        let speed = gps.reading_at(10.0).speed_kmh.unwrap();
        assert!((0.0..=120.0).contains(&speed));
    }
}
