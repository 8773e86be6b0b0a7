use std::f32::consts::TAU;

/// Brightness multiplier for a light level in `0..=255`.
pub fn light_color(level: u8) -> f32 {
    0.1 + 0.9 * f32::from(level) / 256.0
}

/// Day/night clock advanced once per world tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Sky {
    time: f32,
    day_length: f32,
    days: u64,
}

impl Sky {
    pub fn new(day_length: f32) -> Self {
        Self {
            time: 0.0,
            day_length,
            days: 0,
        }
    }

    /// Moves the clock forward by `dt` seconds in constant time, however many
    /// days that spans.
    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
        if self.time >= self.day_length {
            let elapsed = (self.time / self.day_length).floor();
            self.days = self.days.saturating_add(elapsed as u64);
            self.time = self.time.rem_euclid(self.day_length);
        }
    }

    /// Seconds since the start of the current day.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn days(&self) -> u64 {
        self.days
    }

    /// Position in the current day, 0 at dawn, 0.5 at dusk.
    pub fn day_fraction(&self) -> f32 {
        self.time / self.day_length
    }

    /// Sky light level; full during the middle of the day, zero at night.
    pub fn light_level(&self) -> u8 {
        let elevation = (self.day_fraction() * TAU).sin().max(0.0);
        (elevation * 255.0).round() as u8
    }

    pub fn brightness(&self) -> f32 {
        light_color(self.light_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_color_range() {
        assert_eq!(light_color(0), 0.1);
        assert!((light_color(128) - 0.55).abs() < 1e-6);
        assert!(light_color(255) < 1.0);
    }

    #[test]
    fn test_day_rollover() {
        let mut sky = Sky::new(10.0);
        sky.advance(4.0);
        assert_eq!(sky.time(), 4.0);
        sky.advance(7.0);
        assert_eq!(sky.days(), 1);
        assert_eq!(sky.time(), 1.0);
    }

    #[test]
    fn test_long_pause_rolls_over_in_one_step() {
        let mut sky = Sky::new(1200.0);
        sky.advance(1.0e12);
        assert!(sky.time() >= 0.0 && sky.time() < 1200.0);
        assert!(sky.days() > 800_000_000);

        let days = sky.days();
        sky.advance(1200.0);
        assert_eq!(sky.days(), days + 1);
    }

    #[test]
    fn test_noon_is_brightest() {
        let mut sky = Sky::new(100.0);
        sky.advance(25.0);
        assert_eq!(sky.light_level(), 255);
        sky.advance(50.0);
        assert_eq!(sky.light_level(), 0);
        assert_eq!(sky.brightness(), 0.1);
    }
}
