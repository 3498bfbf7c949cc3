// ── Derived view computations ──
//
// Pure functions over slice values. Nothing here is stored: consumers
// compute on read so derived values can never go stale independently of
// their inputs.

use chrono::{DateTime, Utc, Weekday};

use crate::model::{BrewByWeightConfig, DiagStatus, DiagnosticsRun, ShotSession, Statistics};

/// Elapsed time of the current shot, derived locally between pushes.
///
/// `None` when no shot is active or the session never recorded a start.
pub fn elapsed_shot(shot: &ShotSession, now: DateTime<Utc>) -> Option<chrono::Duration> {
    if !shot.active {
        return None;
    }
    let start = shot.start_time?;
    Some((now - start).max(chrono::Duration::zero()))
}

/// Progress toward the brew-by-weight target as a fraction in `[0, 1]`.
///
/// A zero (or negative) target yields `0.0` rather than a division
/// error — an unset target means "no progress to show".
pub fn weight_to_target_fraction(weight: f64, config: &BrewByWeightConfig) -> f64 {
    if config.target_weight <= 0.0 {
        return 0.0;
    }
    (weight / config.target_weight).clamp(0.0, 1.0)
}

/// Overall status of a diagnostics run.
///
/// A run still in progress is `Running` regardless of the counts so
/// far; otherwise the header counts decide, severity first:
/// `fail > warn > pass > skip`. The header is used rather than the
/// accumulated results because individual `result` frames can be lost
/// while the terminal summary still arrives.
pub fn diagnostics_summary(run: &DiagnosticsRun) -> DiagStatus {
    if run.is_running {
        return DiagStatus::Running;
    }

    let header = &run.header;
    if header.fail_count > 0 {
        DiagStatus::Fail
    } else if header.warn_count > 0 {
        DiagStatus::Warn
    } else if header.pass_count > 0 {
        DiagStatus::Pass
    } else {
        DiagStatus::Skip
    }
}

/// Per-day shot counts for the current week, Sunday first.
///
/// Uses the appliance's breakdown when present. Older firmware only
/// reports a weekly total; the fallback spreads it evenly (rounded)
/// across the week and pins today to the exact `shots_today` count.
pub fn weekly_shots(stats: &Statistics, today: Weekday) -> [u32; 7] {
    if let Some(breakdown) = &stats.weekly_breakdown {
        if breakdown.len() == 7 {
            let mut days = [0u32; 7];
            days.copy_from_slice(breakdown);
            return days;
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let per_day = (f64::from(stats.weekly_count) / 7.0).round() as u32;
    let mut days = [per_day; 7];
    days[today.num_days_from_sunday() as usize] = stats.shots_today;
    days
}

/// Estimated cost of the given energy at the configured tariff.
pub fn energy_cost(kwh: f64, price_per_kwh: f64) -> f64 {
    kwh * price_per_kwh
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::DiagHeader;

    #[test]
    fn elapsed_shot_requires_an_active_session() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 30).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();

        let shot = ShotSession {
            active: true,
            start_time: Some(start),
            ..ShotSession::default()
        };
        assert_eq!(elapsed_shot(&shot, now).unwrap().num_seconds(), 30);

        let idle = ShotSession {
            active: false,
            start_time: Some(start),
            ..ShotSession::default()
        };
        assert!(elapsed_shot(&idle, now).is_none());
    }

    #[test]
    fn zero_target_yields_zero_fraction() {
        let config = BrewByWeightConfig {
            target_weight: 0.0,
            ..BrewByWeightConfig::default()
        };
        assert_eq!(weight_to_target_fraction(25.0, &config), 0.0);
    }

    #[test]
    fn fraction_is_clamped_to_unit_interval() {
        let config = BrewByWeightConfig {
            target_weight: 36.0,
            ..BrewByWeightConfig::default()
        };
        assert_eq!(weight_to_target_fraction(18.0, &config), 0.5);
        assert_eq!(weight_to_target_fraction(50.0, &config), 1.0);
        assert_eq!(weight_to_target_fraction(-2.0, &config), 0.0);
    }

    #[test]
    fn summary_severity_follows_the_header_counts() {
        let mut run = DiagnosticsRun {
            header: DiagHeader {
                pass_count: 4,
                skip_count: 1,
                ..DiagHeader::default()
            },
            ..DiagnosticsRun::default()
        };
        assert_eq!(diagnostics_summary(&run), DiagStatus::Pass);

        run.header.warn_count = 1;
        assert_eq!(diagnostics_summary(&run), DiagStatus::Warn);

        run.header.fail_count = 1;
        assert_eq!(diagnostics_summary(&run), DiagStatus::Fail);

        // In progress trumps everything.
        run.is_running = true;
        assert_eq!(diagnostics_summary(&run), DiagStatus::Running);
    }

    #[test]
    fn summary_survives_lost_result_frames() {
        // Per-test frames were dropped, but the terminal summary made
        // it: the header alone must still report the failure.
        let run = DiagnosticsRun {
            header: DiagHeader {
                fail_count: 1,
                pass_count: 4,
                ..DiagHeader::default()
            },
            results: Vec::new(),
            ..DiagnosticsRun::default()
        };
        assert_eq!(diagnostics_summary(&run), DiagStatus::Fail);
    }

    #[test]
    fn empty_run_summarizes_as_skip() {
        assert_eq!(
            diagnostics_summary(&DiagnosticsRun::default()),
            DiagStatus::Skip
        );
    }

    #[test]
    fn weekly_fallback_spreads_the_total_and_pins_today() {
        let stats = Statistics {
            weekly_count: 21,
            shots_today: 4,
            weekly_breakdown: None,
            ..Statistics::default()
        };
        assert_eq!(weekly_shots(&stats, Weekday::Wed), [3, 3, 3, 4, 3, 3, 3]);
    }

    #[test]
    fn weekly_breakdown_from_the_appliance_wins() {
        let stats = Statistics {
            weekly_count: 21,
            shots_today: 4,
            weekly_breakdown: Some(vec![0, 1, 2, 3, 4, 5, 6]),
            ..Statistics::default()
        };
        assert_eq!(weekly_shots(&stats, Weekday::Wed), [0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn malformed_breakdown_falls_back() {
        let stats = Statistics {
            weekly_count: 14,
            shots_today: 2,
            weekly_breakdown: Some(vec![1, 2, 3]),
            ..Statistics::default()
        };
        assert_eq!(weekly_shots(&stats, Weekday::Sun), [2, 2, 2, 2, 2, 2, 2]);
    }
}
