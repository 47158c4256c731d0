use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Window level/width pair.
///
/// `level` is the intensity mapped to mid-gray, `width` the span of
/// intensities mapped to the full black-to-white range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowParameters {
    pub level: i32,
    pub width: i32,
}

impl Default for WindowParameters {
    fn default() -> Self {
        Self::new(40, 380)
    }
}

impl WindowParameters {
    pub const fn new(level: i32, width: i32) -> Self {
        Self { level, width }
    }

    /// Build the per-sample transform for these parameters.
    pub fn transform(&self) -> WindowTransform {
        WindowTransform::new(*self)
    }

    fn pack(self) -> u64 {
        ((self.level as u32 as u64) << 32) | self.width as u32 as u64
    }

    fn unpack(bits: u64) -> Self {
        Self {
            level: (bits >> 32) as u32 as i32,
            width: bits as u32 as i32,
        }
    }
}

/// Linear window transform from raw samples to 8-bit intensities.
///
/// ```text
/// low  = level - |width| / 2
/// high = level + |width| / 2
/// s <= low  -> 0
/// s >= high -> 255
/// otherwise -> round(255 * (s - low) / (high - low))
/// ```
///
/// The division is done in `f64` and rounding is half away from zero
/// ([`f64::round`]), so with level 40 / width 400 the sample 40 maps to 128.
/// A zero width is a binary threshold at `level`: samples `>= level` map to
/// 255, all others to 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowTransform {
    low: f64,
    high: f64,
    span: f64,
}

impl WindowTransform {
    pub fn new(params: WindowParameters) -> Self {
        let level = params.level as f64;
        let half = params.width.unsigned_abs() as f64 / 2.0;
        let (low, high) = (level - half, level + half);
        Self {
            low,
            high,
            span: high - low,
        }
    }

    #[inline]
    pub fn apply(&self, sample: i32) -> u8 {
        let s = sample as f64;
        if self.span == 0.0 {
            return if s >= self.low { 255 } else { 0 };
        }
        if s <= self.low {
            0
        } else if s >= self.high {
            255
        } else {
            // Multiply before dividing; 255 / span is not exact in f64
            (255.0 * (s - self.low) / self.span).round().clamp(0.0, 255.0) as u8
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

/// Shared, mutable window parameters.
///
/// Level and width live in one atomic word, so [`SharedWindow::get`] always
/// returns a pair that was stored together.
#[derive(Debug)]
pub struct SharedWindow {
    bits: AtomicU64,
}

impl Default for SharedWindow {
    fn default() -> Self {
        Self::new(WindowParameters::default())
    }
}

impl SharedWindow {
    pub fn new(params: WindowParameters) -> Self {
        Self {
            bits: AtomicU64::new(params.pack()),
        }
    }

    pub fn get(&self) -> WindowParameters {
        WindowParameters::unpack(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, params: WindowParameters) {
        self.bits.store(params.pack(), Ordering::Release);
    }

    pub fn set_level(&self, level: i32) {
        self.update(|params| params.level = level);
    }

    pub fn set_width(&self, width: i32) {
        self.update(|params| params.width = width);
    }

    fn update(&self, change: impl Fn(&mut WindowParameters)) {
        // The closure always returns Some, so fetch_update only retries on
        // contention and cannot fail.
        self.bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let mut params = WindowParameters::unpack(bits);
                change(&mut params);
                Some(params.pack())
            })
            .ok();
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown window preset: {0}")]
pub struct UnknownPreset(pub String);

/// Common CT window presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Abdomen,
    Bone,
    Brain,
    Lungs,
    Mediastinum,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Abdomen,
        Preset::Bone,
        Preset::Brain,
        Preset::Lungs,
        Preset::Mediastinum,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Abdomen => "Abdomen",
            Preset::Bone => "Bone",
            Preset::Brain => "Brain",
            Preset::Lungs => "Lungs",
            Preset::Mediastinum => "Mediastinum",
        }
    }

    pub fn parameters(&self) -> WindowParameters {
        match self {
            Preset::Abdomen => WindowParameters::new(40, 400),
            Preset::Bone => WindowParameters::new(400, 1800),
            Preset::Brain => WindowParameters::new(40, 80),
            Preset::Lungs => WindowParameters::new(600, 1500),
            Preset::Mediastinum => WindowParameters::new(50, 350),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abdomen_boundaries() {
        let t = Preset::Abdomen.parameters().transform();
        assert_eq!(t.apply(-160), 0);
        assert_eq!(t.apply(240), 255);
        assert_eq!(t.apply(40), 128);
        assert_eq!(t.apply(200), 230);
        assert_eq!(t.apply(-1000), 0);
        assert_eq!(t.apply(3000), 255);
    }

    #[test]
    fn test_half_way_samples_round_up() {
        for (level, width) in [(40, 400), (50, 350), (-7, 333), (600, 1500), (0, 2)] {
            let t = WindowParameters::new(level, width).transform();
            let low = level as f64 - width as f64 / 2.0;
            for s in (low.ceil() as i32)..=(low + width as f64) as i32 {
                let expected = (255.0 * (s as f64 - low) / width as f64).round() as u8;
                assert_eq!(t.apply(s), expected, "level {level} width {width} sample {s}");
            }
        }
    }

    #[test]
    fn test_concurrent_setters_keep_both_updates() {
        let shared = std::sync::Arc::new(SharedWindow::new(WindowParameters::new(0, 0)));
        let levels = {
            let shared = std::sync::Arc::clone(&shared);
            std::thread::spawn(move || (1..=1000).for_each(|level| shared.set_level(level)))
        };
        let widths = {
            let shared = std::sync::Arc::clone(&shared);
            std::thread::spawn(move || (1..=1000).for_each(|width| shared.set_width(-width)))
        };
        levels.join().unwrap();
        widths.join().unwrap();
        assert_eq!(shared.get(), WindowParameters::new(1000, -1000));
    }

    #[test]
    fn test_zero_width_threshold() {
        let t = WindowParameters::new(0, 0).transform();
        assert_eq!(t.apply(-1), 0);
        assert_eq!(t.apply(i32::MIN), 0);
        assert_eq!(t.apply(0), 255);
        assert_eq!(t.apply(1), 255);
    }

    #[test]
    fn test_negative_width_uses_magnitude() {
        let pos = WindowParameters::new(100, 200).transform();
        let neg = WindowParameters::new(100, -200).transform();
        for s in -50..250 {
            assert_eq!(pos.apply(s), neg.apply(s));
        }
    }

    #[test]
    fn test_monotonic() {
        let t = WindowParameters::new(-7, 333).transform();
        let mut prev = 0u8;
        for s in -400..400 {
            let p = t.apply(s);
            assert!(p >= prev, "p({s})={p} < p({})={prev}", s - 1);
            prev = p;
        }
    }

    #[test]
    fn test_extreme_parameters() {
        let t = WindowParameters::new(i32::MAX, i32::MIN).transform();
        assert_eq!(t.apply(i32::MIN), 0);
        assert_eq!(t.apply(i32::MAX), 128);
    }

    #[test]
    fn test_pack_round_trips_negative_values() {
        let shared = SharedWindow::new(WindowParameters::new(-1024, -1));
        assert_eq!(shared.get(), WindowParameters::new(-1024, -1));
        shared.set_level(i32::MIN);
        shared.set_width(i32::MAX);
        assert_eq!(shared.get(), WindowParameters::new(i32::MIN, i32::MAX));
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("lungs".parse::<Preset>(), Ok(Preset::Lungs));
        assert_eq!(" BONE ".parse::<Preset>(), Ok(Preset::Bone));
        assert_eq!(
            "liver".parse::<Preset>(),
            Err(UnknownPreset("liver".to_string()))
        );
        assert_eq!(Preset::Mediastinum.to_string(), "Mediastinum");
    }
}
