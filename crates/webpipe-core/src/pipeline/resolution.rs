//! Output resolution planning.
//!
//! Automatic mode keeps the native aspect ratio and picks a standard width.
//! Custom mode snaps the requested size to the nearest configured aspect
//! ratio, so output is never stretched non-uniformly.

use std::cmp::Ordering;

use crate::config::ResolutionConfig;
use crate::error::PlanError;
use crate::types::{AspectRatio, Dimensions, ResolutionMode};

/// Computes output dimensions from native dimensions and a mode.
#[derive(Debug, Clone)]
pub struct ResolutionPlanner {
    standard_widths: Vec<u32>,
    aspect_ratios: Vec<AspectRatio>,
}

impl ResolutionPlanner {
    /// Create a planner from the resolution tables.
    pub fn new(config: ResolutionConfig) -> Self {
        Self {
            standard_widths: config.standard_widths,
            aspect_ratios: config.aspect_ratios,
        }
    }

    /// The dimensions used for unattended runs: the first candidate.
    pub fn plan(&self, native: Dimensions, mode: ResolutionMode) -> Result<Dimensions, PlanError> {
        self.candidates(native, mode)?
            .into_iter()
            .next()
            .ok_or(PlanError::NoCandidates)
    }

    /// All candidate dimensions, most preferred first.
    ///
    /// Automatic mode yields one candidate per standard width. Custom mode
    /// yields the single snapped size.
    pub fn candidates(
        &self,
        native: Dimensions,
        mode: ResolutionMode,
    ) -> Result<Vec<Dimensions>, PlanError> {
        if native.width == 0 || native.height == 0 {
            return Err(PlanError::ZeroDimension {
                width: native.width,
                height: native.height,
            });
        }

        match mode {
            ResolutionMode::Automatic => Ok(self
                .standard_widths
                .iter()
                .map(|&width| Dimensions::new(width, height_for_width(width, native)))
                .collect()),
            ResolutionMode::Custom { width, height } => {
                Ok(vec![self.snap(Dimensions::new(width, height))?])
            }
        }
    }

    /// Nearest configured aspect ratio to `requested`. Ties go to the ratio
    /// listed first.
    pub fn nearest_ratio(&self, requested: Dimensions) -> Result<AspectRatio, PlanError> {
        if requested.width == 0 || requested.height == 0 {
            return Err(PlanError::ZeroDimension {
                width: requested.width,
                height: requested.height,
            });
        }

        let mut best: Option<AspectRatio> = None;
        for &candidate in &self.aspect_ratios {
            best = match best {
                Some(current)
                    if compare_distance(requested, candidate, current) != Ordering::Less =>
                {
                    Some(current)
                }
                _ => Some(candidate),
            };
        }
        best.ok_or(PlanError::NoCandidates)
    }

    /// Snap requested dimensions onto the nearest aspect ratio.
    ///
    /// The width is rounded down to a whole number of ratio units (at least
    /// one) and the height derived from the same count, so the result has
    /// exactly the chosen ratio.
    pub fn snap(&self, requested: Dimensions) -> Result<Dimensions, PlanError> {
        let ratio = self.nearest_ratio(requested)?;
        let units = (requested.width / ratio.width).max(1) as u64;
        Ok(Dimensions::new(
            saturate(units * ratio.width as u64),
            saturate(units * ratio.height as u64),
        ))
    }
}

/// Height for `width` preserving the native aspect ratio, rounded to the
/// nearest integer and never below 1.
fn height_for_width(width: u32, native: Dimensions) -> u32 {
    let w = native.width as u64;
    let scaled = (width as u64 * native.height as u64 + w / 2) / w;
    saturate(scaled.max(1))
}

/// Order `a` against `b` by distance from the requested ratio.
///
/// |req_w/req_h - n/d| is compared through cross-multiplication so equal
/// distances compare equal exactly.
fn compare_distance(requested: Dimensions, a: AspectRatio, b: AspectRatio) -> Ordering {
    let distance = |r: AspectRatio| -> u128 {
        let lhs = requested.width as i128 * r.height as i128;
        let rhs = r.width as i128 * requested.height as i128;
        (lhs - rhs).unsigned_abs()
    };
    // Common factor requested.height cancels; each side keeps the other's denominator.
    let da = distance(a) * b.height as u128;
    let db = distance(b) * a.height as u128;
    da.cmp(&db)
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> ResolutionPlanner {
        ResolutionPlanner::new(ResolutionConfig::default())
    }

    fn is_standard_ratio(dims: Dimensions) -> bool {
        [AspectRatio::new(4, 3), AspectRatio::new(16, 9)]
            .iter()
            .any(|r| dims.width as u64 * r.height as u64 == dims.height as u64 * r.width as u64)
    }

    #[test]
    fn test_automatic_landscape() {
        let dims = planner()
            .plan(Dimensions::new(3000, 2000), ResolutionMode::Automatic)
            .unwrap();
        assert_eq!(dims, Dimensions::new(1920, 1280));
    }

    #[test]
    fn test_automatic_candidates_in_preference_order() {
        let candidates = planner()
            .candidates(Dimensions::new(3000, 2000), ResolutionMode::Automatic)
            .unwrap();
        assert_eq!(
            candidates,
            vec![
                Dimensions::new(1920, 1280),
                Dimensions::new(1440, 960),
                Dimensions::new(1280, 853),
            ]
        );
    }

    #[test]
    fn test_automatic_portrait_rounds_to_nearest() {
        let dims = planner()
            .plan(Dimensions::new(3024, 4032), ResolutionMode::Automatic)
            .unwrap();
        assert_eq!(dims, Dimensions::new(1920, 2560));
    }

    #[test]
    fn test_automatic_never_zero_height() {
        let p = planner();
        for width in [1, 2, 7, 640, 1920, 4000, 100_000, u32::MAX] {
            for height in [1, 2, 3, 480, 1080, 9999, 65_535] {
                let dims = p
                    .plan(Dimensions::new(width, height), ResolutionMode::Automatic)
                    .unwrap();
                assert!(dims.height >= 1, "{width}x{height}");
                assert_eq!(dims.width, 1920, "{width}x{height}");
            }
        }
    }

    #[test]
    fn test_zero_native_height_is_an_error() {
        let err = planner()
            .plan(Dimensions::new(3000, 0), ResolutionMode::Automatic)
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::ZeroDimension {
                width: 3000,
                height: 0
            }
        );
    }

    #[test]
    fn test_custom_square_snaps_to_four_thirds() {
        let dims = planner()
            .plan(
                Dimensions::new(800, 600),
                ResolutionMode::Custom {
                    width: 1000,
                    height: 1000,
                },
            )
            .unwrap();
        assert_eq!(dims, Dimensions::new(1000, 750));
    }

    #[test]
    fn test_custom_widescreen_keeps_request() {
        let dims = planner()
            .plan(
                Dimensions::new(800, 600),
                ResolutionMode::Custom {
                    width: 1920,
                    height: 1080,
                },
            )
            .unwrap();
        assert_eq!(dims, Dimensions::new(1920, 1080));
    }

    #[test]
    fn test_equidistant_request_prefers_first_ratio() {
        // 14/9 sits exactly halfway between 4/3 (12/9) and 16/9.
        let ratio = planner().nearest_ratio(Dimensions::new(14, 9)).unwrap();
        assert_eq!(ratio, AspectRatio::new(4, 3));

        let ratio = planner().nearest_ratio(Dimensions::new(1400, 900)).unwrap();
        assert_eq!(ratio, AspectRatio::new(4, 3));
    }

    #[test]
    fn test_custom_results_have_exact_ratio() {
        let p = planner();
        for width in [1, 3, 4, 17, 100, 999, 1000, 1280, 1921, 4096] {
            for height in [1, 2, 9, 100, 720, 1000, 1081, 5000] {
                let dims = p
                    .plan(
                        Dimensions::new(10, 10),
                        ResolutionMode::Custom { width, height },
                    )
                    .unwrap();
                assert!(is_standard_ratio(dims), "{width}x{height} -> {dims}");
                assert!(dims.width >= 1 && dims.height >= 1);
            }
        }
    }

    #[test]
    fn test_custom_zero_request_is_an_error() {
        let err = planner()
            .plan(
                Dimensions::new(800, 600),
                ResolutionMode::Custom {
                    width: 0,
                    height: 600,
                },
            )
            .unwrap_err();
        assert!(matches!(err, PlanError::ZeroDimension { .. }));
    }

    #[test]
    fn test_empty_tables_have_no_candidates() {
        let p = ResolutionPlanner::new(ResolutionConfig {
            standard_widths: vec![],
            aspect_ratios: vec![],
        });
        assert_eq!(
            p.plan(Dimensions::new(10, 10), ResolutionMode::Automatic),
            Err(PlanError::NoCandidates)
        );
        assert_eq!(
            p.nearest_ratio(Dimensions::new(10, 10)),
            Err(PlanError::NoCandidates)
        );
    }
}
