//! Acquisition loop
//!
//! A single cooperative loop owns every component. Each iteration:
//!
//! 1. polls the calibration button and recalibrates on a press,
//! 2. once per metrics period, samples current, derives irradiance,
//!    refreshes temperature/humidity when their slower period is due,
//!    publishes the snapshot and redraws the display,
//! 3. gives the publisher one chance to answer a client.
//!
//! Within a tick the reading is complete before it is published or drawn,
//! so no observer sees a partially updated reading.

use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;

use crate::config::{MeterConfig, ScheduleConfig};
use crate::error::{LoopError, TransportError};
use crate::meter::Panel;
use crate::reading::{Reading, Snapshot};
use crate::scheduler::{EdgeDetector, PeriodicTask};
use crate::screen::{layout_reading, CALIBRATED_TEXT, CALIBRATING_TEXT, SPLASH_TEXT};
use crate::traits::{
    CharacterDisplay, Clock, CurrentSensor, EnvironmentSensor, ServiceOutcome, SnapshotPublisher,
};

/// Everything the station drives
pub struct Components<D, C, E, P, B, K, T> {
    pub display: D,
    pub current: C,
    pub environment: E,
    pub publisher: P,
    /// Calibration button, pulled up, active-low
    pub button: B,
    pub clock: K,
    pub delay: T,
}

/// What one iteration did
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepReport {
    /// A button press triggered a recalibration
    pub calibrated: bool,
    /// The reading taken on a metrics tick
    pub reading: Option<Reading>,
    /// Result of the publisher service pass
    pub service: Result<ServiceOutcome, TransportError>,
}

/// The irradiance station
pub struct Station<D, C, E, P, B, K, T> {
    display: D,
    current: C,
    environment: E,
    publisher: P,
    button: B,
    clock: K,
    delay: T,
    panel: Panel,
    schedule: ScheduleConfig,
    columns: u8,
    metrics_task: PeriodicTask,
    environment_task: PeriodicTask,
    button_edge: EdgeDetector,
}

impl<D, C, E, P, B, K, T> Station<D, C, E, P, B, K, T>
where
    D: CharacterDisplay,
    C: CurrentSensor,
    E: EnvironmentSensor,
    P: SnapshotPublisher,
    B: InputPin,
    K: Clock,
    T: DelayNs,
{
    pub fn new(components: Components<D, C, E, P, B, K, T>, config: &MeterConfig) -> Self {
        let now = components.clock.now_ms();
        Self {
            display: components.display,
            current: components.current,
            environment: components.environment,
            publisher: components.publisher,
            button: components.button,
            clock: components.clock,
            delay: components.delay,
            panel: Panel::new(&config.panel),
            schedule: config.schedule,
            columns: config.display.columns,
            metrics_task: PeriodicTask::new("metrics", config.schedule.metrics_period_ms, now),
            environment_task: PeriodicTask::new(
                "environment",
                config.schedule.environment_period_ms,
                now,
            ),
            button_edge: EdgeDetector::new(),
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn current_sensor(&self) -> &C {
        &self.current
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Boot sequence: splash, initial calibration, start the periods
    ///
    /// The periods start even if calibration fails; the offset then stays
    /// at its previous value.
    pub async fn start(&mut self) -> Result<(), LoopError> {
        info!("solar station starting");
        self.show_message(SPLASH_TEXT).await;
        self.delay.delay_ms(self.schedule.splash_ms).await;

        let result = self.calibrate().await;

        let now = self.clock.now_ms();
        self.metrics_task.reset(now);
        self.environment_task.reset(now);
        result
    }

    /// Zero the current sensor, with on-screen progress
    ///
    /// Must only be run with no current flowing through the sensor.
    pub async fn calibrate(&mut self) -> Result<(), LoopError> {
        info!("calibrating current offset");
        self.show_message(CALIBRATING_TEXT).await;

        if let Err(e) = self.current.calibrate().await {
            self.clear_display().await;
            return Err(e.into());
        }
        info!("offset: {} A", self.current.offset());

        self.show_message(CALIBRATED_TEXT).await;
        self.delay.delay_ms(self.schedule.splash_ms).await;
        self.clear_display().await;
        Ok(())
    }

    /// One loop iteration, without the pacing delay
    pub async fn step(&mut self) -> Result<StepReport, LoopError> {
        let high = self.button.is_high().map_err(|_| LoopError::Input)?;
        let calibrated = if self.button_edge.poll(high) {
            info!("button pressed, recalibrating");
            self.calibrate().await?;
            true
        } else {
            false
        };

        let now = self.clock.now_ms();
        let reading = if self.metrics_task.poll(now) {
            Some(self.measure(now).await?)
        } else {
            None
        };

        let service = self.publisher.service().await;
        match service {
            Ok(ServiceOutcome::Served(route)) => debug!("served {}", route),
            Ok(_) => {}
            Err(e) => warn!("publisher service failed: {}", e),
        }

        Ok(StepReport {
            calibrated,
            reading,
            service,
        })
    }

    /// One iteration followed by the pacing delay, or by the error
    /// backoff when the iteration failed
    pub async fn tick(&mut self) -> Result<StepReport, LoopError> {
        let result = self.step().await;
        match &result {
            Ok(_) => self.delay.delay_ms(self.schedule.loop_pacing_ms).await,
            Err(e) => {
                error!("loop iteration failed: {}", e);
                self.delay.delay_ms(self.schedule.error_backoff_ms).await;
            }
        }
        result
    }

    /// Run forever
    pub async fn run(&mut self) -> ! {
        if let Err(e) = self.start().await {
            error!("initial calibration failed: {}", e);
        }

        loop {
            let _ = self.tick().await;
        }
    }

    async fn measure(&mut self, now: u64) -> Result<Reading, LoopError> {
        let current_a = self.current.read_current().await?;
        let irradiance_w_m2 = self.panel.irradiance(current_a);

        if self.environment_task.poll(now) {
            if let Err(e) = self.environment.measure().await {
                warn!("environment read failed, keeping last values: {}", e);
            }
        }

        let reading = Reading {
            current_a,
            irradiance_w_m2,
            temperature_c: self.environment.temperature(),
            humidity_pct: self.environment.humidity(),
        };

        self.publisher.broadcast(Snapshot::from(&reading));
        info!(
            "I: {}mA, W: {}W/m2, T: {}C, H: {}%",
            reading.current_ma(),
            reading.irradiance_w_m2,
            reading.temperature_c,
            reading.humidity_pct
        );
        self.draw(&reading).await;

        Ok(reading)
    }

    async fn draw(&mut self, reading: &Reading) {
        for field in layout_reading(reading, self.columns) {
            let result = match self.display.set_cursor(field.line, field.col).await {
                Ok(()) => self.display.write(&field.text).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                warn!("display update failed: {}", e);
            }
        }
    }

    async fn show_message(&mut self, text: &str) {
        if let Err(e) = self.display.show_message(text).await {
            warn!("display update failed: {}", e);
        }
    }

    async fn clear_display(&mut self) {
        if let Err(e) = self.display.clear().await {
            warn!("display clear failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::string::String;
    use std::vec::Vec;

    use embassy_futures::block_on;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    use super::*;
    use crate::error::SensorError;
    use crate::http::Route;

    // Shared time in nanoseconds; the delay advances it, the clock reads it
    #[derive(Clone, Default)]
    struct FakeTime(Rc<Cell<u64>>);

    impl FakeTime {
        fn advance_ms(&self, ms: u64) {
            self.0.set(self.0.get() + ms * 1_000_000);
        }
    }

    impl Clock for FakeTime {
        fn now_ms(&self) -> u64 {
            self.0.get() / 1_000_000
        }
    }

    impl DelayNs for FakeTime {
        async fn delay_ns(&mut self, ns: u32) {
            self.0.set(self.0.get() + ns as u64);
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Cursor(u8, u8),
        Write(String),
    }

    #[derive(Default)]
    struct FakeDisplay {
        ops: Vec<Op>,
        fail: bool,
    }

    impl FakeDisplay {
        fn writes(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Write(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl CharacterDisplay for FakeDisplay {
        async fn clear(&mut self) -> Result<(), TransportError> {
            self.ops.push(Op::Clear);
            if self.fail {
                Err(TransportError::Bus)
            } else {
                Ok(())
            }
        }

        async fn set_cursor(&mut self, line: u8, col: u8) -> Result<(), TransportError> {
            self.ops.push(Op::Cursor(line, col));
            if self.fail {
                Err(TransportError::Bus)
            } else {
                Ok(())
            }
        }

        async fn write(&mut self, text: &str) -> Result<(), TransportError> {
            self.ops.push(Op::Write(text.into()));
            if self.fail {
                Err(TransportError::Bus)
            } else {
                Ok(())
            }
        }
    }

    struct FakeCurrent {
        amps: f32,
        offset: f32,
        calibrations: u32,
        reads: u32,
        fail: bool,
    }

    impl FakeCurrent {
        fn new(amps: f32) -> Self {
            Self {
                amps,
                offset: 0.0,
                calibrations: 0,
                reads: 0,
                fail: false,
            }
        }
    }

    impl CurrentSensor for FakeCurrent {
        async fn read_current(&mut self) -> Result<f32, SensorError> {
            if self.fail {
                return Err(SensorError::Adc);
            }
            self.reads += 1;
            Ok(self.amps)
        }

        async fn calibrate(&mut self) -> Result<(), SensorError> {
            if self.fail {
                return Err(SensorError::Adc);
            }
            self.calibrations += 1;
            self.offset = -0.01;
            Ok(())
        }

        fn offset(&self) -> f32 {
            self.offset
        }
    }

    struct FakeEnvironment {
        next: (f32, f32),
        current: (f32, f32),
        measurements: u32,
        fail: bool,
    }

    impl FakeEnvironment {
        fn new(temperature: f32, humidity: f32) -> Self {
            Self {
                next: (temperature, humidity),
                current: (0.0, 0.0),
                measurements: 0,
                fail: false,
            }
        }
    }

    impl EnvironmentSensor for FakeEnvironment {
        async fn measure(&mut self) -> Result<(), SensorError> {
            self.measurements += 1;
            if self.fail {
                return Err(SensorError::Environment);
            }
            self.current = self.next;
            Ok(())
        }

        fn temperature(&self) -> f32 {
            self.current.0
        }

        fn humidity(&self) -> f32 {
            self.current.1
        }
    }

    #[derive(Default)]
    struct FakePublisher {
        broadcasts: Vec<Snapshot>,
        services: u32,
        pending: Option<Route>,
        fail: bool,
    }

    impl SnapshotPublisher for FakePublisher {
        fn broadcast(&mut self, snapshot: Snapshot) {
            self.broadcasts.push(snapshot);
        }

        async fn service(&mut self) -> Result<ServiceOutcome, TransportError> {
            self.services += 1;
            if self.fail {
                return Err(TransportError::Accept);
            }
            Ok(match self.pending.take() {
                Some(route) => ServiceOutcome::Served(route),
                None => ServiceOutcome::Idle,
            })
        }
    }

    /// Replays a level sequence, then stays released
    struct FakeButton {
        levels: Vec<bool>,
        fail: bool,
    }

    impl FakeButton {
        fn released() -> Self {
            Self::levels(&[])
        }

        fn levels(levels: &[bool]) -> Self {
            let mut levels = levels.to_vec();
            levels.reverse();
            Self {
                levels,
                fail: false,
            }
        }
    }

    impl ErrorType for FakeButton {
        type Error = ErrorKind;
    }

    impl InputPin for FakeButton {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            Ok(self.levels.pop().unwrap_or(true))
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    type TestStation =
        Station<FakeDisplay, FakeCurrent, FakeEnvironment, FakePublisher, FakeButton, FakeTime, FakeTime>;

    fn station_with(amps: f32, button: FakeButton) -> (TestStation, FakeTime) {
        let time = FakeTime::default();
        let components = Components {
            display: FakeDisplay::default(),
            current: FakeCurrent::new(amps),
            environment: FakeEnvironment::new(25.0, 60.0),
            publisher: FakePublisher::default(),
            button,
            clock: time.clone(),
            delay: time.clone(),
        };
        (Station::new(components, &MeterConfig::default()), time)
    }

    #[test]
    fn test_start_shows_splash_then_calibrates() {
        let (mut station, time) = station_with(0.135, FakeButton::released());
        block_on(station.start()).unwrap();

        assert_eq!(
            station.display().writes(),
            ["SOLAR STATION", "INITIALIZING....", "OFFSET DONE"]
        );
        assert_eq!(station.display().ops.last(), Some(&Op::Clear));
        assert_eq!(station.current_sensor().calibrations, 1);
        assert_eq!(station.current_sensor().offset(), -0.01);
        // Splash and "OFFSET DONE" each hold for a second
        assert_eq!(time.now_ms(), 2000);
    }

    #[test]
    fn test_button_sequence_calibrates_once() {
        let (mut station, _time) =
            station_with(0.135, FakeButton::levels(&[true, true, false, false, true]));

        let calibrations: Vec<bool> = (0..5)
            .map(|_| block_on(station.step()).unwrap().calibrated)
            .collect();

        assert_eq!(calibrations, [false, false, true, false, false]);
        assert_eq!(station.current_sensor().calibrations, 1);
    }

    #[test]
    fn test_reading_on_metrics_tick() {
        let (mut station, time) = station_with(0.135, FakeButton::released());
        block_on(station.start()).unwrap();

        let report = block_on(station.step()).unwrap();
        assert!(report.reading.is_none());
        assert!(station.publisher().broadcasts.is_empty());

        time.advance_ms(1000);
        let report = block_on(station.step()).unwrap();
        let reading = report.reading.unwrap();
        assert_eq!(reading.current_a, 0.135);
        assert!((reading.irradiance_w_m2 - 450.0).abs() < 1e-3);
        // Environment period (2 s) not yet elapsed
        assert_eq!(reading.temperature_c, 0.0);
        assert_eq!(station.environment().measurements, 0);

        let broadcasts = &station.publisher().broadcasts;
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0], Snapshot::from(&reading));
    }

    #[test]
    fn test_environment_on_slower_period() {
        let (mut station, time) = station_with(0.135, FakeButton::released());
        block_on(station.start()).unwrap();

        time.advance_ms(1000);
        block_on(station.step()).unwrap();
        time.advance_ms(1000);
        let reading = block_on(station.step()).unwrap().reading.unwrap();

        assert_eq!(station.environment().measurements, 1);
        assert_eq!(reading.temperature_c, 25.0);
        assert_eq!(reading.humidity_pct, 60.0);
    }

    #[test]
    fn test_environment_failure_keeps_last_values() {
        let (mut station, time) = station_with(0.135, FakeButton::released());
        block_on(station.start()).unwrap();

        time.advance_ms(2000);
        block_on(station.step()).unwrap();

        station.environment.fail = true;
        station.environment.next = (99.0, 99.0);
        time.advance_ms(2000);
        let reading = block_on(station.step()).unwrap().reading.unwrap();

        assert_eq!(station.environment().measurements, 2);
        assert_eq!(reading.temperature_c, 25.0);
        assert_eq!(reading.humidity_pct, 60.0);
    }

    #[test]
    fn test_publisher_serviced_every_step() {
        let (mut station, time) = station_with(0.135, FakeButton::released());
        block_on(station.start()).unwrap();

        for _ in 0..10 {
            block_on(station.step()).unwrap();
            time.advance_ms(10);
        }
        assert_eq!(station.publisher().services, 10);
        assert!(station.publisher().broadcasts.is_empty());

        station.publisher.pending = Some(Route::Data);
        let report = block_on(station.step()).unwrap();
        assert_eq!(report.service, Ok(ServiceOutcome::Served(Route::Data)));
    }

    #[test]
    fn test_publisher_error_does_not_fail_step() {
        let (mut station, time) = station_with(0.135, FakeButton::released());
        station.publisher.fail = true;
        time.advance_ms(1000);

        let report = block_on(station.step()).unwrap();
        assert_eq!(report.service, Err(TransportError::Accept));
        assert!(report.reading.is_some());
    }

    #[test]
    fn test_display_refresh_layout() {
        let (mut station, time) = station_with(0.135, FakeButton::released());
        time.advance_ms(2000);
        block_on(station.step()).unwrap();

        assert_eq!(
            station.display().ops,
            [
                Op::Cursor(0, 0),
                Op::Write("25.0C ".into()),
                Op::Cursor(0, 6),
                Op::Write(" 450.0W/m2".into()),
                Op::Cursor(1, 0),
                Op::Write("60.0% ".into()),
                Op::Cursor(1, 6),
                Op::Write(" 135.0mA  ".into()),
            ]
        );
    }

    #[test]
    fn test_no_current_message() {
        let (mut station, time) = station_with(0.0, FakeButton::released());
        time.advance_ms(1000);
        let reading = block_on(station.step()).unwrap().reading.unwrap();

        assert_eq!(reading.irradiance_w_m2, 0.0);
        assert_eq!(station.display().writes()[0], "NO CURRENT      ");
    }

    #[test]
    fn test_display_errors_do_not_fail_step() {
        let (mut station, time) = station_with(0.135, FakeButton::released());
        station.display.fail = true;
        block_on(station.start()).unwrap();

        time.advance_ms(1000);
        let report = block_on(station.step()).unwrap();
        assert!(report.reading.is_some());
        assert_eq!(station.publisher().broadcasts.len(), 1);
    }

    #[test]
    fn test_current_error_fails_step() {
        let (mut station, time) = station_with(0.135, FakeButton::released());
        station.current.fail = true;
        time.advance_ms(1000);

        assert_eq!(
            block_on(station.step()),
            Err(LoopError::Sensor(SensorError::Adc))
        );
        assert!(station.publisher().broadcasts.is_empty());
    }

    #[test]
    fn test_failed_calibration_clears_progress_message() {
        let (mut station, _time) = station_with(0.135, FakeButton::released());
        station.current.fail = true;

        assert_eq!(
            block_on(station.start()),
            Err(LoopError::Sensor(SensorError::Adc))
        );
        assert_eq!(station.display().ops.last(), Some(&Op::Clear));
    }

    #[test]
    fn test_button_error_fails_step() {
        let (mut station, _time) = station_with(0.135, FakeButton::released());
        station.button.fail = true;
        assert_eq!(block_on(station.step()), Err(LoopError::Input));
    }

    #[test]
    fn test_tick_paces_successful_iterations() {
        let (mut station, time) = station_with(0.135, FakeButton::released());

        block_on(station.tick()).unwrap();
        assert_eq!(time.now_ms(), 10);
        block_on(station.tick()).unwrap();
        assert_eq!(time.now_ms(), 20);
    }

    #[test]
    fn test_tick_backs_off_after_failure_and_resumes() {
        let (mut station, time) = station_with(0.135, FakeButton::released());
        station.current.fail = true;
        time.advance_ms(1000);

        assert_eq!(
            block_on(station.tick()),
            Err(LoopError::Sensor(SensorError::Adc))
        );
        assert_eq!(time.now_ms(), 2000);

        // Sensor recovered; the next due tick produces a reading
        station.current.fail = false;
        let report = block_on(station.tick()).unwrap();
        assert!(report.reading.is_some());
        assert_eq!(time.now_ms(), 2010);
        assert_eq!(station.publisher().broadcasts.len(), 1);
    }

    #[test]
    fn test_late_tick_is_not_bunched() {
        let (mut station, time) = station_with(0.135, FakeButton::released());

        time.advance_ms(1500);
        assert!(block_on(station.step()).unwrap().reading.is_some());
        time.advance_ms(600);
        assert!(block_on(station.step()).unwrap().reading.is_none());
        time.advance_ms(400);
        assert!(block_on(station.step()).unwrap().reading.is_some());
        assert_eq!(station.current_sensor().reads, 2);
    }
}
