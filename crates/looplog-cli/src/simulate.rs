//! A simulated proportional position controller used by `looplog record`.

use looplog::{Field, Format};

const GAIN: f64 = 0.05;
const PLANT_RATE: f64 = 40.0;
const STEP_EVERY: u64 = 100;

/// Fields written by the simulated control loop.
///
/// They are declared here in the order that reads naturally for the
/// controller; [`ControlLog::columns`] decides the file layout.
pub struct ControlLog {
    pub saturated: Field,
    pub output: Field,
    pub position: Field,
    pub setpoint: Field,
    pub loop_counter: Field,
    pub status: Field,
}

impl Default for ControlLog {
    fn default() -> Self {
        Self {
            saturated: Field::new("Saturated"),
            output: Field::with_format("Output", Format::Fixed(2)),
            position: Field::new("Position"),
            setpoint: Field::with_format("Setpoint", Format::Fixed(1)),
            loop_counter: Field::new("Loop Counter"),
            status: Field::new("OpModeStatus"),
        }
    }
}

impl ControlLog {
    pub fn columns(&self) -> [&Field; 6] {
        [
            &self.status,
            &self.loop_counter,
            &self.setpoint,
            &self.position,
            &self.output,
            &self.saturated,
        ]
    }
}

/// First order plant driven by a clamped proportional controller.
#[derive(Debug, Default)]
pub struct Plant {
    pub position: f64,
    pub setpoint: f64,
}

impl Plant {
    /// Advance the loop by `dt` seconds and return the controller output.
    pub fn step(&mut self, iteration: u64, dt: f64) -> (f64, bool) {
        if iteration % STEP_EVERY == 0 {
            self.setpoint = if (iteration / STEP_EVERY) % 2 == 0 { 100.0 } else { 0.0 };
        }
        let raw = GAIN * (self.setpoint - self.position);
        let output = raw.clamp(-1.0, 1.0);
        self.position += output * PLANT_RATE * dt;
        (output, (raw - output).abs() > f64::EPSILON)
    }
}
