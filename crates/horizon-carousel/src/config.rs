//! Carousel configuration.
//!
//! [`CarouselConfig`] holds every user-tunable property of the widget. Each
//! field can be changed at runtime; [`CarouselConfig::diff`] reports the
//! minimal [`Recompute`] work a change requires so the widget never relays
//! itself out for a color change.
//!
//! Configurations can be read from TOML:
//!
//! ```
//! use horizon_carousel::{CarouselConfig, IndicatorPosition};
//!
//! let config = CarouselConfig::from_toml_str(r##"
//!     inset_indicators = false
//!     indicator_position = "start"
//!     indicator_color = "#FF000080"
//! "##).unwrap();
//!
//! assert_eq!(config.indicator_position, IndicatorPosition::Start);
//! assert_eq!(config.indicator_offset, 16.0);
//! ```

use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constraints::AnchorLine;
use crate::error::ConfigError;
use crate::geometry::{Color, Orientation};
use horizon_carousel_core::logging::targets;

// ============================================================================
// IndicatorPosition
// ============================================================================

/// Edge of the carousel the indicator strip attaches to.
///
/// `Top` and `Bottom` page horizontally; `Start` and `End` page vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndicatorPosition {
    Top,
    #[default]
    Bottom,
    Start,
    End,
}

impl IndicatorPosition {
    /// All positions in ordinal order.
    pub const ALL: [IndicatorPosition; 4] = [
        IndicatorPosition::Top,
        IndicatorPosition::Bottom,
        IndicatorPosition::Start,
        IndicatorPosition::End,
    ];

    /// Look up a position by its attribute ordinal (`0..=3`).
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// The attribute ordinal of this position.
    pub fn ordinal(self) -> u8 {
        match self {
            IndicatorPosition::Top => 0,
            IndicatorPosition::Bottom => 1,
            IndicatorPosition::Start => 2,
            IndicatorPosition::End => 3,
        }
    }

    /// Look up a position by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "top" => Some(IndicatorPosition::Top),
            "bottom" => Some(IndicatorPosition::Bottom),
            "start" | "left" => Some(IndicatorPosition::Start),
            "end" | "right" => Some(IndicatorPosition::End),
            _ => None,
        }
    }

    /// Lowercase name, as written in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            IndicatorPosition::Top => "top",
            IndicatorPosition::Bottom => "bottom",
            IndicatorPosition::Start => "start",
            IndicatorPosition::End => "end",
        }
    }

    /// Paging orientation implied by this position.
    pub fn orientation(self) -> Orientation {
        match self {
            IndicatorPosition::Top | IndicatorPosition::Bottom => Orientation::Horizontal,
            IndicatorPosition::Start | IndicatorPosition::End => Orientation::Vertical,
        }
    }

    /// The carousel edge this position attaches to (left-to-right layout).
    pub fn edge(self) -> AnchorLine {
        match self {
            IndicatorPosition::Top => AnchorLine::Top,
            IndicatorPosition::Bottom => AnchorLine::Bottom,
            IndicatorPosition::Start => AnchorLine::Left,
            IndicatorPosition::End => AnchorLine::Right,
        }
    }
}

/// Untyped form of a position as it appears in a configuration document.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPosition {
    Name(String),
    Ordinal(i64),
    Other(serde::de::IgnoredAny),
}

impl RawPosition {
    /// Resolve to a position, falling back to the default on anything unknown.
    fn resolve(self) -> IndicatorPosition {
        let resolved = match &self {
            RawPosition::Name(name) => IndicatorPosition::from_name(name),
            RawPosition::Ordinal(ordinal) => IndicatorPosition::from_ordinal(*ordinal),
            RawPosition::Other(_) => None,
        };

        resolved.unwrap_or_else(|| {
            let shown = match self {
                RawPosition::Name(name) => name,
                RawPosition::Ordinal(ordinal) => ordinal.to_string(),
                RawPosition::Other(_) => "<non-scalar>".to_string(),
            };
            tracing::warn!(
                target: targets::CONFIG,
                value = %shown,
                "unsupported indicator position, falling back to bottom"
            );
            IndicatorPosition::default()
        })
    }
}

impl<'de> Deserialize<'de> for IndicatorPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(RawPosition::deserialize(deserializer)?.resolve())
    }
}

impl Serialize for IndicatorPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ============================================================================
// Recompute (bitflags)
// ============================================================================

/// A set of recompute steps represented as bit flags.
///
/// # Example
///
/// ```
/// use horizon_carousel::Recompute;
///
/// let work = Recompute::CONSTRAINTS | Recompute::PADDING;
/// assert!(work.contains(Recompute::PADDING));
/// assert!(!work.contains(Recompute::INDICATORS));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Recompute(u8);

impl Recompute {
    /// Nothing to do.
    pub const NONE: Recompute = Recompute(0);
    /// Repaint the paging surface background.
    pub const BACKGROUND: Recompute = Recompute(1 << 0);
    /// Discard and rebuild the indicator handles.
    pub const INDICATORS: Recompute = Recompute(1 << 1);
    /// Re-derive the paging orientation.
    pub const ORIENTATION: Recompute = Recompute(1 << 2);
    /// Re-derive the attachment rules between pager and strip.
    pub const CONSTRAINTS: Recompute = Recompute(1 << 3);
    /// Re-derive the carousel's own padding.
    pub const PADDING: Recompute = Recompute(1 << 4);
    /// Restyle existing indicators in place.
    pub const INDICATOR_STYLE: Recompute = Recompute(1 << 5);
    /// Everything an adapter attach or item-count change needs.
    pub const STRUCTURE: Recompute = Recompute(
        Self::INDICATORS.0 | Self::ORIENTATION.0 | Self::CONSTRAINTS.0 | Self::PADDING.0,
    );
    /// All steps.
    pub const ALL: Recompute = Recompute(0b11_1111);

    /// Check if this set contains all of the given steps.
    pub fn contains(&self, other: Recompute) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if this set shares any step with `other`.
    pub fn intersects(&self, other: Recompute) -> bool {
        (self.0 & other.0) != 0
    }

    /// Check if this set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Steps that change the geometry of the pager or strip.
    pub fn affects_layout(&self) -> bool {
        self.intersects(Self::STRUCTURE)
    }
}

impl BitOr for Recompute {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Recompute(self.0 | rhs.0)
    }
}

impl BitOrAssign for Recompute {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Recompute {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Recompute(self.0 & rhs.0)
    }
}

// ============================================================================
// CarouselConfig
// ============================================================================

/// User-tunable carousel properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig", into = "RawConfig")]
pub struct CarouselConfig {
    /// Draw the indicator strip over the pager instead of beside it.
    pub inset_indicators: bool,
    /// Gap between the strip and the pager (or the pager edge, when inset).
    pub indicator_offset: f32,
    /// Edge the strip attaches to; also selects the paging orientation.
    pub indicator_position: IndicatorPosition,
    /// Whether indicators are built at all.
    pub show_indicators: bool,
    pub indicator_color: Color,
    /// Side length of one indicator.
    pub indicator_size: f32,
    /// Distance between neighbouring indicators.
    pub indicator_spacing: f32,
    /// Scale of the active indicator relative to an inactive one.
    pub indicator_active_scale_factor: f32,
    /// Paging surface background.
    pub background_color: Color,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            inset_indicators: true,
            indicator_offset: 16.0,
            indicator_position: IndicatorPosition::Bottom,
            show_indicators: true,
            indicator_color: Color::WHITE,
            indicator_size: 5.0,
            indicator_spacing: 10.0,
            indicator_active_scale_factor: 1.8,
            background_color: Color::TRANSPARENT,
        }
    }
}

impl CarouselConfig {
    /// Parse a configuration from a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(source)?;
        raw.validate()
    }

    /// Write the configuration as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(&RawConfig::from(self.clone()))?)
    }

    // =========================================================================
    // Builder Pattern Methods
    // =========================================================================

    /// Set inset mode using builder pattern.
    #[inline]
    pub fn with_inset_indicators(mut self, inset: bool) -> Self {
        self.inset_indicators = inset;
        self
    }

    /// Set the indicator offset using builder pattern.
    #[inline]
    pub fn with_indicator_offset(mut self, offset: f32) -> Self {
        self.indicator_offset = offset;
        self
    }

    /// Set the indicator position using builder pattern.
    #[inline]
    pub fn with_indicator_position(mut self, position: IndicatorPosition) -> Self {
        self.indicator_position = position;
        self
    }

    /// Set indicator visibility using builder pattern.
    #[inline]
    pub fn with_show_indicators(mut self, show: bool) -> Self {
        self.show_indicators = show;
        self
    }

    /// Set the indicator color using builder pattern.
    #[inline]
    pub fn with_indicator_color(mut self, color: Color) -> Self {
        self.indicator_color = color;
        self
    }

    /// Set the indicator size using builder pattern.
    #[inline]
    pub fn with_indicator_size(mut self, size: f32) -> Self {
        self.indicator_size = size;
        self
    }

    /// Set the indicator spacing using builder pattern.
    #[inline]
    pub fn with_indicator_spacing(mut self, spacing: f32) -> Self {
        self.indicator_spacing = spacing;
        self
    }

    /// Set the active scale factor using builder pattern.
    #[inline]
    pub fn with_indicator_active_scale_factor(mut self, factor: f32) -> Self {
        self.indicator_active_scale_factor = factor;
        self
    }

    /// Set the background color using builder pattern.
    #[inline]
    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Compute the minimal work needed to move from `old` to `new`.
    pub fn diff(old: &CarouselConfig, new: &CarouselConfig) -> Recompute {
        let mut work = Recompute::NONE;

        if old.background_color != new.background_color {
            work |= Recompute::BACKGROUND;
        }
        if old.show_indicators != new.show_indicators {
            work |= Recompute::INDICATORS | Recompute::CONSTRAINTS;
        }
        if old.indicator_position != new.indicator_position {
            work |= Recompute::INDICATORS
                | Recompute::ORIENTATION
                | Recompute::CONSTRAINTS
                | Recompute::PADDING;
        }
        if old.inset_indicators != new.inset_indicators {
            work |= Recompute::CONSTRAINTS | Recompute::PADDING;
        }
        if old.indicator_offset != new.indicator_offset {
            work |= Recompute::CONSTRAINTS;
        }
        if old.indicator_color != new.indicator_color
            || old.indicator_size != new.indicator_size
            || old.indicator_spacing != new.indicator_spacing
        {
            work |= Recompute::INDICATOR_STYLE;
        }
        if old.indicator_active_scale_factor != new.indicator_active_scale_factor {
            work |= Recompute::PADDING | Recompute::INDICATOR_STYLE;
        }

        work
    }
}

/// On-disk shape of [`CarouselConfig`]: colors as hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct RawConfig {
    inset_indicators: bool,
    indicator_offset: f32,
    indicator_position: IndicatorPosition,
    show_indicators: bool,
    indicator_color: String,
    indicator_size: f32,
    indicator_spacing: f32,
    indicator_active_scale_factor: f32,
    background_color: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        CarouselConfig::default().into()
    }
}

impl From<CarouselConfig> for RawConfig {
    fn from(config: CarouselConfig) -> Self {
        Self {
            inset_indicators: config.inset_indicators,
            indicator_offset: config.indicator_offset,
            indicator_position: config.indicator_position,
            show_indicators: config.show_indicators,
            indicator_color: config.indicator_color.to_hex(),
            indicator_size: config.indicator_size,
            indicator_spacing: config.indicator_spacing,
            indicator_active_scale_factor: config.indicator_active_scale_factor,
            background_color: config.background_color.to_hex(),
        }
    }
}

impl TryFrom<RawConfig> for CarouselConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        raw.validate()
    }
}

impl RawConfig {
    fn validate(self) -> Result<CarouselConfig, ConfigError> {
        Ok(CarouselConfig {
            inset_indicators: self.inset_indicators,
            indicator_offset: non_negative("indicator_offset", self.indicator_offset)?,
            indicator_position: self.indicator_position,
            show_indicators: self.show_indicators,
            indicator_color: color("indicator_color", &self.indicator_color)?,
            indicator_size: non_negative("indicator_size", self.indicator_size)?,
            indicator_spacing: non_negative("indicator_spacing", self.indicator_spacing)?,
            indicator_active_scale_factor: positive(
                "indicator_active_scale_factor",
                self.indicator_active_scale_factor,
            )?,
            background_color: color("background_color", &self.background_color)?,
        })
    }
}

fn color(field: &'static str, value: &str) -> Result<Color, ConfigError> {
    Color::from_hex(value).ok_or_else(|| ConfigError::InvalidColor {
        field,
        value: value.to_string(),
    })
}

fn non_negative(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidDimension { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidDimension { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CarouselConfig::default();
        assert!(config.inset_indicators);
        assert_eq!(config.indicator_offset, 16.0);
        assert_eq!(config.indicator_position, IndicatorPosition::Bottom);
        assert!(config.show_indicators);
        assert_eq!(config.indicator_color, Color::WHITE);
        assert_eq!(config.indicator_size, 5.0);
        assert_eq!(config.indicator_spacing, 10.0);
        assert_eq!(config.indicator_active_scale_factor, 1.8);
        assert_eq!(config.background_color, Color::TRANSPARENT);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = CarouselConfig::from_toml_str("").unwrap();
        assert_eq!(config, CarouselConfig::default());
    }

    #[test]
    fn test_position_by_name_and_ordinal() {
        let by_name = CarouselConfig::from_toml_str("indicator_position = \"END\"").unwrap();
        assert_eq!(by_name.indicator_position, IndicatorPosition::End);

        let by_ordinal = CarouselConfig::from_toml_str("indicator_position = 0").unwrap();
        assert_eq!(by_ordinal.indicator_position, IndicatorPosition::Top);
    }

    #[test]
    fn test_unknown_position_falls_back_to_bottom() {
        for doc in [
            "indicator_position = \"diagonal\"",
            "indicator_position = 7",
            "indicator_position = -1",
            "indicator_position = true",
        ] {
            let config = CarouselConfig::from_toml_str(doc).unwrap();
            assert_eq!(config.indicator_position, IndicatorPosition::Bottom, "{doc}");
        }
    }

    #[test]
    fn test_invalid_color() {
        let err = CarouselConfig::from_toml_str("indicator_color = \"white\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidColor {
                field: "indicator_color",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_dimension() {
        let err = CarouselConfig::from_toml_str("indicator_size = -2.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDimension {
                field: "indicator_size",
                ..
            }
        ));

        let err = CarouselConfig::from_toml_str("indicator_active_scale_factor = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDimension { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = CarouselConfig::from_toml_str("indicator_size = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CarouselConfig::default()
            .with_inset_indicators(false)
            .with_indicator_position(IndicatorPosition::Start)
            .with_indicator_color(Color::from_rgba8(10, 20, 30, 128))
            .with_background_color(Color::BLACK);

        let text = config.to_toml_string().unwrap();
        assert!(text.contains("indicator_position = \"start\""));
        assert_eq!(CarouselConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_diff_color_only_restyles() {
        let old = CarouselConfig::default();
        let new = old.clone().with_indicator_color(Color::BLACK);
        let work = CarouselConfig::diff(&old, &new);

        assert_eq!(work, Recompute::INDICATOR_STYLE);
        assert!(!work.affects_layout());
    }

    #[test]
    fn test_diff_position() {
        let old = CarouselConfig::default();
        let new = old.clone().with_indicator_position(IndicatorPosition::Top);

        assert_eq!(
            CarouselConfig::diff(&old, &new),
            Recompute::INDICATORS
                | Recompute::ORIENTATION
                | Recompute::CONSTRAINTS
                | Recompute::PADDING
        );
    }

    #[test]
    fn test_diff_table() {
        let base = CarouselConfig::default();
        let cases = [
            (
                base.clone().with_background_color(Color::BLACK),
                Recompute::BACKGROUND,
            ),
            (
                base.clone().with_show_indicators(false),
                Recompute::INDICATORS | Recompute::CONSTRAINTS,
            ),
            (
                base.clone().with_inset_indicators(false),
                Recompute::CONSTRAINTS | Recompute::PADDING,
            ),
            (base.clone().with_indicator_offset(4.0), Recompute::CONSTRAINTS),
            (base.clone().with_indicator_size(8.0), Recompute::INDICATOR_STYLE),
            (
                base.clone().with_indicator_spacing(2.0),
                Recompute::INDICATOR_STYLE,
            ),
            (
                base.clone().with_indicator_active_scale_factor(2.0),
                Recompute::PADDING | Recompute::INDICATOR_STYLE,
            ),
            (base.clone(), Recompute::NONE),
        ];

        for (new, expected) in cases {
            assert_eq!(CarouselConfig::diff(&base, &new), expected, "{new:?}");
        }
    }
}
