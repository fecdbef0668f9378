//! # Validation Module
//!
//! Payload rules checked before anything is sent to the ad platform.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard form                                               │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Sync engine (THIS MODULE)                                    │
//! │  ├── Creative asset counts and lengths                                 │
//! │  ├── Final URL shape                                                   │
//! │  └── Bid values → micros                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ad platform                                                  │
//! │  └── Policy review (reported back as a remote failure)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A validation failure is a precondition failure: the entity stays in the
//! creation status it had.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;
use crate::micros::Micros;
use crate::{
    DESCRIPTION_MAX_CHARS, HEADLINE_MAX_CHARS, MAX_DESCRIPTIONS, MAX_HEADLINES, MIN_DESCRIPTIONS,
    MIN_HEADLINES,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Creative Limits
// =============================================================================

/// Asset limits applied to responsive ads.
///
/// Defaults are the platform's published limits; deployments may tighten
/// them through engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreativeLimits {
    pub min_headlines: usize,
    pub max_headlines: usize,
    pub min_descriptions: usize,
    pub max_descriptions: usize,
    pub headline_max_chars: usize,
    pub description_max_chars: usize,
}

impl Default for CreativeLimits {
    fn default() -> Self {
        CreativeLimits {
            min_headlines: MIN_HEADLINES,
            max_headlines: MAX_HEADLINES,
            min_descriptions: MIN_DESCRIPTIONS,
            max_descriptions: MAX_DESCRIPTIONS,
            headline_max_chars: HEADLINE_MAX_CHARS,
            description_max_chars: DESCRIPTION_MAX_CHARS,
        }
    }
}

impl CreativeLimits {
    /// Checks that the limits are internally coherent.
    pub fn check(&self) -> Result<(), String> {
        if self.min_headlines == 0 || self.min_descriptions == 0 {
            return Err("minimum asset counts must be at least 1".to_string());
        }
        if self.min_headlines > self.max_headlines {
            return Err(format!(
                "min_headlines ({}) exceeds max_headlines ({})",
                self.min_headlines, self.max_headlines
            ));
        }
        if self.min_descriptions > self.max_descriptions {
            return Err(format!(
                "min_descriptions ({}) exceeds max_descriptions ({})",
                self.min_descriptions, self.max_descriptions
            ));
        }
        if self.headline_max_chars == 0 || self.description_max_chars == 0 {
            return Err("character limits must be at least 1".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Creative Assets
// =============================================================================

/// Assets ready for submission, already cut down to the platform maximums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreativeAssets {
    pub headlines: Vec<String>,
    pub descriptions: Vec<String>,
    pub final_urls: Vec<String>,
    /// Display path segments shown after the final URL's domain.
    pub path1: Option<String>,
    pub path2: Option<String>,
}

impl CreativeAssets {
    /// Attaches the optional display paths; blank segments are dropped.
    pub fn with_display_paths(mut self, path1: Option<&str>, path2: Option<&str>) -> Self {
        self.path1 = display_path(path1);
        self.path2 = display_path(path2);
        self
    }
}

fn display_path(segment: Option<&str>) -> Option<String> {
    segment
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validates responsive ad assets and returns the submission payload.
///
/// ## Rules
/// - Only the first `max_headlines` / `max_descriptions` entries are kept
/// - At least `min_headlines` headlines and `min_descriptions` descriptions
/// - No blank entries; each entry within its character limit
/// - `final_url` is an absolute http(s) URL
///
/// ## Example
/// ```rust
/// use adlaunch_core::validation::{validate_creative_assets, CreativeLimits};
///
/// let headlines: Vec<String> = ["Fast Shoes", "Free Shipping", "Shop Today"]
///     .iter().map(|s| s.to_string()).collect();
/// let descriptions: Vec<String> = ["Lightweight trainers.", "Order by 5pm."]
///     .iter().map(|s| s.to_string()).collect();
///
/// let assets = validate_creative_assets(
///     &headlines,
///     &descriptions,
///     "https://example.com/shoes",
///     &CreativeLimits::default(),
/// ).unwrap();
/// assert_eq!(assets.final_urls, vec!["https://example.com/shoes".to_string()]);
/// ```
pub fn validate_creative_assets(
    headlines: &[String],
    descriptions: &[String],
    final_url: &str,
    limits: &CreativeLimits,
) -> ValidationResult<CreativeAssets> {
    let headlines = take_assets(
        "headlines",
        headlines,
        limits.min_headlines,
        limits.max_headlines,
        limits.headline_max_chars,
    )?;
    let descriptions = take_assets(
        "descriptions",
        descriptions,
        limits.min_descriptions,
        limits.max_descriptions,
        limits.description_max_chars,
    )?;
    let final_url = validate_final_url(final_url)?;

    Ok(CreativeAssets {
        headlines,
        descriptions,
        final_urls: vec![final_url],
        path1: None,
        path2: None,
    })
}

fn take_assets(
    field: &str,
    items: &[String],
    min: usize,
    max: usize,
    max_chars: usize,
) -> ValidationResult<Vec<String>> {
    let kept: Vec<String> = items.iter().take(max).cloned().collect();

    if kept.len() < min {
        return Err(ValidationError::TooFew {
            field: field.to_string(),
            min,
            actual: kept.len(),
        });
    }

    for (index, item) in kept.iter().enumerate() {
        if item.trim().is_empty() {
            return Err(ValidationError::Required {
                field: format!("{field}[{index}]"),
            });
        }
        if item.chars().count() > max_chars {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                index,
                max: max_chars,
            });
        }
    }

    Ok(kept)
}

/// Validates a landing page URL.
///
/// ## Rules
/// - Must not be empty
/// - Must parse as an absolute URL with an `http` or `https` scheme
pub fn validate_final_url(raw: &str) -> ValidationResult<String> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "final_url".to_string(),
        });
    }

    let parsed = Url::parse(raw).map_err(|e| ValidationError::InvalidFormat {
        field: "final_url".to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        other => Err(ValidationError::InvalidFormat {
            field: "final_url".to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a bid in currency units and converts it to micros.
///
/// ## Rules
/// - Must be finite and strictly positive
/// - Must not round down to zero micros
///
/// ## Example
/// ```rust
/// use adlaunch_core::validation::validate_bid_value;
///
/// assert_eq!(validate_bid_value(0.75).unwrap().value(), 750_000);
/// assert!(validate_bid_value(0.0).is_err());
/// assert!(validate_bid_value(-2.0).is_err());
/// ```
pub fn validate_bid_value(units: f64) -> ValidationResult<Micros> {
    Micros::from_units(units).ok_or_else(|| ValidationError::MustBePositive {
        field: "bid".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
