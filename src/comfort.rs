//! Apparent ("feels like") temperature model
//!
//! Combines three empirical formulas by air temperature band:
//!
//! | Band            | Formula                                   |
//! |-----------------|-------------------------------------------|
//! | T ≤ 8 °C        | wind chill                                |
//! | 8 < T ≤ 12      | wind chill blended into Steadman          |
//! | 12 < T ≤ 25     | Steadman apparent temperature             |
//! | 25 < T ≤ 29     | Steadman blended into heat index          |
//! | T > 29          | heat index (Rothfusz regression)          |
//!
//! Wind is supplied at the 10 m reference height and scaled to roughly 2 m
//! before use. Below 1.3 m/s the result is pulled back toward air temperature.

use serde::{Deserialize, Serialize};

/// Factor converting a 10 m wind speed to near-surface (~2 m) wind speed
pub const SURFACE_WIND_FACTOR: f64 = 0.6;

/// Surface wind (m/s) below which the result is blended toward air temperature
pub const LOW_WIND_DAMPING_MS: f64 = 1.3;

const WIND_CHILL_UPPER_C: f64 = 8.0;
const STEADMAN_LOWER_C: f64 = 12.0;
const STEADMAN_UPPER_C: f64 = 25.0;
const HEAT_INDEX_LOWER_C: f64 = 29.0;

// Rothfusz-style heat index coefficients
const HI_C1: f64 = -8.78469475556;
const HI_C2: f64 = 1.61139411;
const HI_C3: f64 = 2.33854883889;
const HI_C4: f64 = -0.14611605;
const HI_C5: f64 = -0.012308094;
const HI_C6: f64 = -0.0164248277778;
const HI_C7: f64 = 0.002211732;
const HI_C8: f64 = 0.00072546;
const HI_C9: f64 = -0.000003582;

/// Compute the apparent temperature in °C.
///
/// * `air_temp_c` - air temperature in °C
/// * `relative_humidity_pct` - relative humidity in %
/// * `wind_speed_10m_ms` - wind speed at 10 m in m/s
pub fn apparent_temperature(
    air_temp_c: f64,
    relative_humidity_pct: f64,
    wind_speed_10m_ms: f64,
) -> f64 {
    let t = air_temp_c;
    let v = surface_wind_speed(wind_speed_10m_ms);
    let e = vapor_pressure(t, relative_humidity_pct);

    let raw = if t <= WIND_CHILL_UPPER_C {
        wind_chill(t, v)
    } else if t <= STEADMAN_LOWER_C {
        cold_transition(t, e, v)
    } else if t <= STEADMAN_UPPER_C {
        steadman(t, e, v)
    } else if t <= HEAT_INDEX_LOWER_C {
        warm_transition(t, relative_humidity_pct, e, v)
    } else {
        heat_index(t, relative_humidity_pct)
    };

    if v < LOW_WIND_DAMPING_MS {
        lerp(t, raw, v / LOW_WIND_DAMPING_MS)
    } else {
        raw
    }
}

/// Scale a 10 m wind speed to near-surface height, clamping negatives to zero
pub fn surface_wind_speed(wind_speed_10m_ms: f64) -> f64 {
    (wind_speed_10m_ms * SURFACE_WIND_FACTOR).max(0.0)
}

/// Actual vapor pressure in hPa from Tetens' formula
pub(crate) fn vapor_pressure(t: f64, relative_humidity_pct: f64) -> f64 {
    6.11 * 10f64.powf(7.5 * t / (t + 237.3)) * (relative_humidity_pct / 100.0)
}

/// Wind chill index, `v` in m/s
pub(crate) fn wind_chill(t: f64, v: f64) -> f64 {
    if v <= 0.0 {
        return t;
    }
    let v_kmh_pow = (v * 3.6).powf(0.16);
    13.12 + 0.6215 * t - 11.37 * v_kmh_pow + 0.3965 * t * v_kmh_pow
}

/// Steadman apparent temperature, `e` in hPa and `v` in m/s
pub(crate) fn steadman(t: f64, e: f64, v: f64) -> f64 {
    t + 0.33 * e - 0.70 * v - 4.0
}

pub(crate) fn heat_index(t: f64, rh: f64) -> f64 {
    HI_C1
        + HI_C2 * t
        + HI_C3 * rh
        + HI_C4 * t * rh
        + HI_C5 * t * t
        + HI_C6 * rh * rh
        + HI_C7 * t * t * rh
        + HI_C8 * t * rh * rh
        + HI_C9 * t * t * rh * rh
}

pub(crate) fn cold_transition(t: f64, e: f64, v: f64) -> f64 {
    let weight = (t - WIND_CHILL_UPPER_C) / (STEADMAN_LOWER_C - WIND_CHILL_UPPER_C);
    lerp(wind_chill(t, v), steadman(t, e, v), weight)
}

pub(crate) fn warm_transition(t: f64, rh: f64, e: f64, v: f64) -> f64 {
    let weight = (t - STEADMAN_UPPER_C) / (HEAT_INDEX_LOWER_C - STEADMAN_UPPER_C);
    lerp(steadman(t, e, v), heat_index(t, rh), weight)
}

/// Linear interpolation with `t` clamped to `[0, 1]`
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// A single weather reading for which a feels-like value is wanted
///
/// Used both for the station's own sensor reading and for forecast readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortReading {
    pub temperature: f64,
    pub humidity: f64,
    /// Wind speed at 10 m in m/s
    pub wind_speed_10m: f64,
}

impl ComfortReading {
    pub const fn new(temperature: f64, humidity: f64, wind_speed_10m: f64) -> Self {
        Self {
            temperature,
            humidity,
            wind_speed_10m,
        }
    }

    /// Near-surface wind speed actually felt, in m/s
    pub fn surface_wind_speed(&self) -> f64 {
        surface_wind_speed(self.wind_speed_10m)
    }

    pub fn apparent_temperature(&self) -> f64 {
        apparent_temperature(self.temperature, self.humidity, self.wind_speed_10m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_band_boundaries_agree() {
        let (rh, v) = (60.0, 4.0);

        let e = vapor_pressure(8.0, rh);
        assert!(close(cold_transition(8.0, e, v), wind_chill(8.0, v)));

        let e = vapor_pressure(12.0, rh);
        assert!(close(cold_transition(12.0, e, v), steadman(12.0, e, v)));

        let e = vapor_pressure(25.0, rh);
        assert!(close(warm_transition(25.0, rh, e, v), steadman(25.0, e, v)));

        let e = vapor_pressure(29.0, rh);
        assert!(close(warm_transition(29.0, rh, e, v), heat_index(29.0, rh)));
    }

    #[test]
    fn test_band_selection_is_continuous() {
        // 10 m wind of 5 m/s is 3 m/s at the surface, past the damping range
        for t in [8.0, 12.0, 25.0, 29.0] {
            let below = apparent_temperature(t - 1e-7, 70.0, 5.0);
            let above = apparent_temperature(t + 1e-7, 70.0, 5.0);
            assert!((below - above).abs() < 1e-4, "jump at {t}: {below} vs {above}");
        }
    }

    #[test]
    fn test_known_values() {
        // Steadman band, wind above the damping threshold
        let e = vapor_pressure(20.0, 50.0);
        assert!(close(apparent_temperature(20.0, 50.0, 5.0), 20.0 + 0.33 * e - 0.70 * 3.0 - 4.0));

        // Wind chill band: cold and windy feels colder
        assert!(apparent_temperature(0.0, 80.0, 10.0) < 0.0);

        // Heat index band: hot and humid feels hotter
        assert!(apparent_temperature(33.0, 80.0, 5.0) > 33.0);
    }

    #[test]
    fn test_low_wind_damping() {
        // Surface wind 0.65 m/s is halfway through the damping range
        let t = 0.0;
        let raw = wind_chill(t, 0.65);
        let damped = apparent_temperature(t, 50.0, 0.65 / SURFACE_WIND_FACTOR);
        assert!(close(damped, lerp(t, raw, 0.5)));
    }

    #[test]
    fn test_negative_wind_is_calm() {
        assert_eq!(surface_wind_speed(-3.0), 0.0);
        assert_eq!(apparent_temperature(5.0, 40.0, -3.0), 5.0);
    }

    #[test]
    fn test_comfort_reading() {
        let reading = ComfortReading::new(20.0, 50.0, 5.0);
        assert!(close(reading.surface_wind_speed(), 3.0));
        assert_eq!(reading.apparent_temperature(), apparent_temperature(20.0, 50.0, 5.0));
    }

    #[test]
    fn test_lerp_clamps() {
        assert_eq!(lerp(1.0, 3.0, -1.0), 1.0);
        assert_eq!(lerp(1.0, 3.0, 2.0), 3.0);
        assert_eq!(lerp(1.0, 3.0, 0.5), 2.0);
    }

    proptest! {
        #[test]
        fn calm_air_feels_like_air_temperature(t in -40.0f64..50.0, rh in 0.0f64..100.0) {
            prop_assert_eq!(apparent_temperature(t, rh, 0.0), t);
        }

        #[test]
        fn apparent_temperature_is_deterministic(
            t in -40.0f64..50.0,
            rh in 0.0f64..100.0,
            wind in 0.0f64..30.0,
        ) {
            let first = apparent_temperature(t, rh, wind);
            let second = apparent_temperature(t, rh, wind);
            prop_assert_eq!(first.to_bits(), second.to_bits());
        }
    }
}
