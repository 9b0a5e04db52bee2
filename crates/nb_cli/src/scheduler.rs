use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};

use crate::app::App;

/// First instant strictly after `now` whose wall-clock time is `at`.
pub fn next_fire_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

/// Runs forever, one run per day at `at` local time. Failed runs are logged and the
/// loop carries on.
pub async fn run_daily(app: &App, at: NaiveTime) {
    loop {
        let now = Local::now().naive_local();
        let next = next_fire_after(now, at);
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::info!("⏰ Next run at {} (in {}s)", next.format("%Y-%m-%d %H:%M"), wait.as_secs());
        tokio::time::sleep(wait).await;

        let report = app.run(Local::now().naive_local()).await;
        if report.is_success() {
            tracing::info!("✅ {}", report);
        } else {
            tracing::error!("❌ {}", report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_fires_later_today() {
        let now = day(3).and_hms_opt(8, 59, 59).unwrap();
        assert_eq!(next_fire_after(now, at(9, 0)), day(3).and_time(at(9, 0)));
    }

    #[test]
    fn test_fires_tomorrow_when_time_has_passed() {
        let now = day(3).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(next_fire_after(now, at(9, 0)), day(4).and_time(at(9, 0)));

        let now = day(31).and_hms_opt(23, 30, 0).unwrap();
        assert_eq!(
            next_fire_after(now, at(0, 15)),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_time(at(0, 15))
        );
    }
}
