//! Condition scores, damage categories and severity tiers.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Road quality from 0 (worst) to 100 (best).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConditionScore(f64);

impl ConditionScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    /// Score given to roads nobody has reported on yet.
    pub const DEFAULT: Self = Self(50.0);

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] for non-finite values or values
    /// outside `[0, 100]`.
    pub fn new(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() || !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(CoreError::InvalidInput(format!(
                "condition score must be within [0, 100], got {value}"
            )));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for ConditionScore {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for ConditionScore {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConditionScore> for f64 {
    fn from(score: ConditionScore) -> Self {
        score.0
    }
}

impl fmt::Display for ConditionScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display band for a condition score. Ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Poor,
    Fair,
    Good,
}

impl SeverityTier {
    /// Upper bound (inclusive) of the `Poor` band.
    pub const POOR_MAX: f64 = 33.0;
    /// Upper bound (inclusive) of the `Fair` band.
    pub const FAIR_MAX: f64 = 66.0;

    #[must_use]
    pub fn from_score(score: ConditionScore) -> Self {
        let value = score.value();
        if value <= Self::POOR_MAX {
            SeverityTier::Poor
        } else if value <= Self::FAIR_MAX {
            SeverityTier::Fair
        } else {
            SeverityTier::Good
        }
    }

    /// Hex color used to draw roads in this tier.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            SeverityTier::Poor => "#ff4d4d",
            SeverityTier::Fair => "#ffcc00",
            SeverityTier::Good => "#00e676",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeverityTier::Poor => write!(f, "poor"),
            SeverityTier::Fair => write!(f, "fair"),
            SeverityTier::Good => write!(f, "good"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: SeverityTier,
    pub color: &'static str,
}

/// Map a stored score to its display tier and color.
#[must_use]
pub fn classify(score: ConditionScore) -> Classification {
    let tier = SeverityTier::from_score(score);
    Classification {
        tier,
        color: tier.color(),
    }
}

/// Source of a damage report, as labelled by the upload layer.
///
/// Deserialization is total: unrecognised labels become `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum DamageCategory {
    Image,
    Video,
    #[default]
    Unknown,
}

impl DamageCategory {
    /// Score written when a report carries no numeric estimate.
    #[must_use]
    pub fn default_score(self) -> ConditionScore {
        match self {
            DamageCategory::Image => ConditionScore(10.0),
            DamageCategory::Video => ConditionScore(70.0),
            DamageCategory::Unknown => ConditionScore::DEFAULT,
        }
    }

    /// `image/*` and `video/*` map to their categories; anything else is unknown.
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Self {
        let top_level = mime
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match top_level.as_str() {
            "image" => DamageCategory::Image,
            "video" => DamageCategory::Video,
            _ => DamageCategory::Unknown,
        }
    }
}

impl FromStr for DamageCategory {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "IMAGE" => DamageCategory::Image,
            "VIDEO" => DamageCategory::Video,
            _ => DamageCategory::Unknown,
        })
    }
}

impl From<String> for DamageCategory {
    fn from(label: String) -> Self {
        match label.parse() {
            Ok(category) => category,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for DamageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DamageCategory::Image => write!(f, "IMAGE"),
            DamageCategory::Video => write!(f, "VIDEO"),
            DamageCategory::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// What a report tells us about the road: a category, or an explicit score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreInput {
    Category(DamageCategory),
    Raw(ConditionScore),
}

impl From<DamageCategory> for ScoreInput {
    fn from(category: DamageCategory) -> Self {
        ScoreInput::Category(category)
    }
}

impl From<ConditionScore> for ScoreInput {
    fn from(score: ConditionScore) -> Self {
        ScoreInput::Raw(score)
    }
}

/// Score to write to every matched road for this report.
///
/// An explicit score wins; otherwise the category's default applies.
#[must_use]
pub fn resolve_score(input: ScoreInput) -> ConditionScore {
    match input {
        ScoreInput::Raw(score) => score,
        ScoreInput::Category(category) => category.default_score(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(v: f64) -> ConditionScore {
        ConditionScore::new(v).expect("valid score")
    }

    #[test]
    fn classify_representative_scores() {
        assert_eq!(classify(score(20.0)).tier, SeverityTier::Poor);
        assert_eq!(classify(score(50.0)).tier, SeverityTier::Fair);
        assert_eq!(classify(score(90.0)).tier, SeverityTier::Good);
    }

    #[test]
    fn classify_band_boundaries() {
        assert_eq!(classify(score(33.0)).tier, SeverityTier::Poor);
        assert_eq!(classify(score(34.0)).tier, SeverityTier::Fair);
        assert_eq!(classify(score(66.0)).tier, SeverityTier::Fair);
        assert_eq!(classify(score(67.0)).tier, SeverityTier::Good);
        assert_eq!(classify(score(0.0)).tier, SeverityTier::Poor);
        assert_eq!(classify(score(100.0)).tier, SeverityTier::Good);
    }

    #[test]
    fn classify_attaches_tier_color() {
        let c = classify(score(10.0));
        assert_eq!(c.color, "#ff4d4d");
        assert_eq!(classify(score(50.0)).color, "#ffcc00");
        assert_eq!(classify(score(80.0)).color, "#00e676");
    }

    #[test]
    fn classify_is_monotonic() {
        let mut previous = SeverityTier::Poor;
        for step in 0..=400 {
            let tier = classify(score(f64::from(step) * 0.25)).tier;
            assert!(tier >= previous, "tier regressed at {}", f64::from(step) * 0.25);
            previous = tier;
        }
    }

    #[test]
    fn resolve_score_category_defaults() {
        assert_eq!(resolve_score(DamageCategory::Image.into()).value(), 10.0);
        assert_eq!(resolve_score(DamageCategory::Video.into()).value(), 70.0);
        assert_eq!(resolve_score(DamageCategory::Unknown.into()).value(), 50.0);
    }

    #[test]
    fn resolve_score_prefers_raw_score() {
        assert_eq!(resolve_score(score(42.5).into()).value(), 42.5);
    }

    #[test]
    fn category_from_str_is_total() {
        assert_eq!("IMAGE".parse::<DamageCategory>(), Ok(DamageCategory::Image));
        assert_eq!("video".parse::<DamageCategory>(), Ok(DamageCategory::Video));
        assert_eq!("AUDIO".parse::<DamageCategory>(), Ok(DamageCategory::Unknown));
        assert_eq!("".parse::<DamageCategory>(), Ok(DamageCategory::Unknown));
    }

    #[test]
    fn category_from_mime_type() {
        assert_eq!(DamageCategory::from_mime_type("image/jpeg"), DamageCategory::Image);
        assert_eq!(DamageCategory::from_mime_type("video/mp4"), DamageCategory::Video);
        assert_eq!(
            DamageCategory::from_mime_type("application/pdf"),
            DamageCategory::Unknown
        );
    }

    #[test]
    fn category_deserializes_unknown_values_to_unknown() {
        let c: DamageCategory = serde_json::from_str("\"LIDAR\"").unwrap();
        assert_eq!(c, DamageCategory::Unknown);
        let c: DamageCategory = serde_json::from_str("\"IMAGE\"").unwrap();
        assert_eq!(c, DamageCategory::Image);
    }

    #[test]
    fn condition_score_rejects_out_of_range() {
        assert!(ConditionScore::new(-0.1).is_err());
        assert!(ConditionScore::new(100.1).is_err());
        assert!(ConditionScore::new(f64::NAN).is_err());
        let parsed: Result<ConditionScore, _> = serde_json::from_str("150");
        assert!(parsed.is_err());
    }

    #[test]
    fn severity_tier_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SeverityTier::Fair).unwrap(), "\"fair\"");
    }
}
