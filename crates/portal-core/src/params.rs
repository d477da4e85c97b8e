//! Debug parameters: every tunable the debug panel and the config file can
//! touch, with the defaults the diorama ships with.

use glam::Vec3;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{FIREFLY_COUNT, MAX_PIXEL_RATIO};
use crate::error::ConfigError;

pub const FIREFLY_SIZE_RANGE: (f32, f32) = (0.0, 500.0);

/// 24-bit `0xRRGGBB` colour. Serializes as `"#rrggbb"`, deserializes from
/// either that form or a plain integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HexColor(pub u32);

impl HexColor {
    /// Accepts `#rrggbb`, `0xrrggbb` or bare `rrggbb`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(HexColor)
    }

    /// Channels divided by 255, no transfer function applied.
    pub fn to_vec3(self) -> Vec3 {
        let r = (self.0 >> 16) & 0xff;
        let g = (self.0 >> 8) & 0xff;
        let b = self.0 & 0xff;
        Vec3::new(r as f32, g as f32, b as f32) / 255.0
    }

    pub fn to_css(self) -> String {
        format!("#{:06x}", self.0 & 0xff_ffff)
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u32),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) if n <= 0xff_ffff => Ok(HexColor(n)),
            Repr::Number(n) => Err(de::Error::custom(format!(
                "colour {n:#x} does not fit in 24 bits"
            ))),
            Repr::Text(s) => {
                HexColor::parse(&s).ok_or_else(|| de::Error::custom(format!("invalid colour {s:?}")))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugParams {
    pub clear_color: HexColor,
    pub portal_color_start: HexColor,
    pub portal_color_end: HexColor,
    pub lamp_color: HexColor,
    // Fog is configured but left off, as the diorama always shipped it.
    pub fog_near: f32,
    pub fog_far: f32,
    pub load_delay_ms: u32,
    pub firefly_size: f32,
    pub firefly_count: usize,
    pub firefly_seed: Option<u64>,
    pub max_pixel_ratio: f32,
    pub intro_duration: f32,
    pub firefly_intro_delay: f32,
}

impl Default for DebugParams {
    fn default() -> Self {
        Self {
            clear_color: HexColor(0x0a1111),
            portal_color_start: HexColor(0xffe8aa),
            portal_color_end: HexColor(0xffffff),
            lamp_color: HexColor(0xffffe5),
            fog_near: 8.0,
            fog_far: 11.0,
            load_delay_ms: 13_000,
            firefly_size: 100.0,
            firefly_count: FIREFLY_COUNT,
            firefly_seed: None,
            max_pixel_ratio: MAX_PIXEL_RATIO,
            intro_duration: 2.24,
            firefly_intro_delay: 1.0,
        }
    }
}

impl DebugParams {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let params: DebugParams = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let params = Self::from_json_str(&text)?;
        log::info!("[params] loaded {}", path.display());
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = FIREFLY_SIZE_RANGE;
        if !(min..=max).contains(&self.firefly_size) {
            return Err(ConfigError::OutOfRange {
                field: "firefly_size",
                value: self.firefly_size,
                min,
                max,
            });
        }
        if self.firefly_count == 0 {
            return Err(ConfigError::Invalid("firefly_count must be at least 1".into()));
        }
        if self.fog_near > self.fog_far {
            return Err(ConfigError::Invalid(format!(
                "fog_near ({}) is past fog_far ({})",
                self.fog_near, self.fog_far
            )));
        }
        if self.max_pixel_ratio <= 0.0 {
            return Err(ConfigError::Invalid("max_pixel_ratio must be positive".into()));
        }
        if self.intro_duration < 0.0 || self.firefly_intro_delay < 0.0 {
            return Err(ConfigError::Invalid("intro timings must not be negative".into()));
        }
        Ok(())
    }

    pub fn load_delay_secs(&self) -> f32 {
        self.load_delay_ms as f32 / 1000.0
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
