use crate::models::SleepLog;
use crate::util::TimePolicy;
use std::f64::consts::TAU;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SleepSummary {
    pub count: usize,
    pub avg_hours: f64,
    pub avg_quality: f64,
    /// Minutes past local midnight.
    pub avg_bedtime: u32,
    pub avg_wake: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TrendPoint {
    pub label: String,
    pub hours: f64,
    pub quality: i32,
}

/// `None` for an empty slice.
pub(crate) fn summarize(logs: &[SleepLog], time: &TimePolicy) -> Option<SleepSummary> {
    if logs.is_empty() {
        return None;
    }
    let n = logs.len() as f64;

    let avg_hours = logs.iter().map(SleepLog::duration_hours).sum::<f64>() / n;
    let avg_quality = logs.iter().map(|l| f64::from(l.quality)).sum::<f64>() / n;
    let avg_bedtime = circular_mean(logs.iter().map(|l| time.minute_of_day(l.bedtime)));
    let avg_wake = circular_mean(logs.iter().map(|l| time.minute_of_day(l.wake_time)));

    Some(SleepSummary {
        count: logs.len(),
        avg_hours,
        avg_quality,
        avg_bedtime,
        avg_wake,
    })
}

/// Mean clock time, so 23:00 and 01:00 average to midnight rather than noon.
fn circular_mean(minutes: impl Iterator<Item = u32>) -> u32 {
    let (sin, cos) = minutes.fold((0.0, 0.0), |(s, c), m| {
        let angle = f64::from(m) / MINUTES_PER_DAY * TAU;
        (s + angle.sin(), c + angle.cos())
    });
    let angle = sin.atan2(cos).rem_euclid(TAU);
    ((angle / TAU * MINUTES_PER_DAY).round() as u32) % (24 * 60)
}

/// One point per log, oldest first, for logs fetched newest first.
pub(crate) fn trend(logs: &[SleepLog], time: &TimePolicy) -> Vec<TrendPoint> {
    logs.iter()
        .rev()
        .map(|l| TrendPoint {
            label: format!(
                "{} {}",
                time.weekday_label(l.bedtime),
                time.format_date(l.bedtime).get(..5).unwrap_or_default()
            ),
            hours: l.duration_hours(),
            quality: l.quality,
        })
        .collect()
}

pub(crate) fn format_hours(hours: f64) -> String {
    format!("{hours:.1}h")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum QualityBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityBand {
    pub fn of(quality: i32) -> Self {
        match quality {
            q if q >= 80 => QualityBand::Excellent,
            q if q >= 60 => QualityBand::Good,
            q if q >= 40 => QualityBand::Fair,
            _ => QualityBand::Poor,
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            QualityBand::Excellent => "bg-green-100 text-green-800",
            QualityBand::Good => "bg-blue-100 text-blue-800",
            QualityBand::Fair => "bg-yellow-100 text-yellow-800",
            QualityBand::Poor => "bg-red-100 text-red-800",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn log(id: &str, bed: &str, wake: &str, quality: i32) -> SleepLog {
        SleepLog {
            id: id.into(),
            user_id: "u-1".into(),
            bedtime: at(bed),
            wake_time: at(wake),
            quality,
            mood: None,
            notes: None,
            created_at: at(wake),
        }
    }

    #[test]
    fn test_summary_averages() {
        let logs = vec![
            log("b", "2024-01-02T23:00:00Z", "2024-01-03T07:00:00Z", 90),
            log("a", "2024-01-02T01:00:00Z", "2024-01-02T08:00:00Z", 70),
        ];
        let s = summarize(&logs, &TimePolicy::utc()).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.avg_hours, 7.5);
        assert_eq!(s.avg_quality, 80.0);
        assert_eq!(s.avg_bedtime, 0);
        assert_eq!(s.avg_wake, 7 * 60 + 30);
        assert_eq!(format_hours(s.avg_hours), "7.5h");
    }

    #[test]
    fn test_summary_of_nothing() {
        assert!(summarize(&[], &TimePolicy::utc()).is_none());
    }

    #[test]
    fn test_trend_is_chronological() {
        let logs = vec![
            log("new", "2024-01-02T23:00:00Z", "2024-01-03T07:00:00Z", 90),
            log("old", "2024-01-01T23:00:00Z", "2024-01-02T06:00:00Z", 50),
        ];
        let points = trend(&logs, &TimePolicy::utc());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "seg 01/01");
        assert_eq!(points[0].hours, 7.0);
        assert_eq!(points[1].quality, 90);
    }

    #[test]
    fn test_quality_bands() {
        assert_eq!(QualityBand::of(80), QualityBand::Excellent);
        assert_eq!(QualityBand::of(79), QualityBand::Good);
        assert_eq!(QualityBand::of(40), QualityBand::Fair);
        assert_eq!(QualityBand::of(39), QualityBand::Poor);
        assert!(QualityBand::of(95).badge_class().contains("green"));
    }
}
