//! Review scheduling algorithm
//!
//! Decides how long a card is suspended before its next review, how its
//! difficulty evolves and which study status it moves to, from the grade
//! the learner gave it.
//!
//! Grades:
//! - Again: forgot the answer
//! - Hard: recalled with serious difficulty
//! - Good: recalled after hesitation
//! - Easy: recalled instantly
//!
//! All functions are pure. The current time is always passed in by the
//! caller; nothing here reads the system clock.

use chrono::{DateTime, Days, Duration, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{Result, SchedulerError};
use super::models::{
    CardState, CardStatus, Grade, ReviewRecord, ReviewRequest, MAX_DIFFICULTY, MIN_DIFFICULTY,
};

/// Floor for the review-phase base factor
const MIN_BASE_FACTOR: f64 = 1.3;

/// Base factor of a card with difficulty 0
const INITIAL_BASE_FACTOR: f64 = 2.5;

/// Base factor lost per difficulty point
const BASE_FACTOR_PER_DIFFICULTY: f64 = 0.15;

/// Days of maximum interval granted per difficulty point below 6
const MAX_INTERVAL_DAYS_PER_LEVEL: f64 = 365.0;

/// How sub-day intervals (< 1 day) are turned into a due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubDayPolicy {
    /// Add `ceil(interval)` calendar days, then set the hour to
    /// `now.hour + round(interval * 24)`. This is the compatible behaviour:
    /// a 0.2 day interval at 10:00 lands on tomorrow at 15:00.
    CalendarHour,
    /// Add exactly `interval * 24` hours to `now`, rounded to the second.
    Elapsed,
}

impl Default for SubDayPolicy {
    fn default() -> Self {
        Self::CalendarHour
    }
}

/// Scheduler settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    pub sub_day_policy: SubDayPolicy,
}

/// Reject difficulties outside [0, 5] (and NaN) before doing any arithmetic
fn validate_difficulty(difficulty: f64) -> Result<f64> {
    if difficulty.is_finite() && (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        Ok(difficulty)
    } else {
        Err(SchedulerError::InvalidDifficulty(difficulty))
    }
}

/// Study status after grading a card that was in `current`
pub fn next_status(current: CardStatus, grade: Grade) -> CardStatus {
    use CardStatus::*;
    use Grade::*;

    match (current, grade) {
        (New, _) => Learning,
        (Learning, Again | Hard) => Learning,
        (Learning, Good | Easy) => Review,
        (Review, Again) => Relearning,
        (Review, Hard | Good | Easy) => Review,
        (Relearning, Again | Hard) => Relearning,
        (Relearning, Good | Easy) => Review,
    }
}

/// Difficulty after grading, clamped to [0, 5]
pub fn next_difficulty(current: f64, grade: Grade) -> Result<f64> {
    let current = validate_difficulty(current)?;
    let delta = match grade {
        Grade::Again => 1.0,
        Grade::Hard => 0.5,
        Grade::Good => 0.0,
        Grade::Easy => -0.5,
    };
    Ok((current + delta).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY))
}

/// Review-phase interval multiplier; decreases with difficulty
pub fn base_factor(difficulty: f64) -> f64 {
    (INITIAL_BASE_FACTOR - BASE_FACTOR_PER_DIFFICULTY * difficulty).max(MIN_BASE_FACTOR)
}

/// Longest interval, in days, a card in review may be given
pub fn max_interval(difficulty: f64) -> f64 {
    MAX_INTERVAL_DAYS_PER_LEVEL * (6.0 - difficulty)
}

/// Interval in days until the next review.
///
/// `status` is the status the card had before this review, not the one
/// returned by [`next_status`].
pub fn review_interval(difficulty: f64, status: CardStatus, grade: Grade) -> Result<f64> {
    let difficulty = validate_difficulty(difficulty)?;

    let interval = match status {
        CardStatus::New => match grade {
            Grade::Again => 0.0,
            Grade::Hard => 0.1,
            Grade::Good => 0.2,
            Grade::Easy => 1.0,
        },
        CardStatus::Learning | CardStatus::Relearning => match grade {
            Grade::Again => 0.1,
            Grade::Hard => 0.5,
            Grade::Good => 1.0,
            Grade::Easy => 3.0,
        },
        CardStatus::Review => {
            let factor = base_factor(difficulty);
            let raw = match grade {
                Grade::Again => 0.1,
                Grade::Hard => 0.5 * factor,
                Grade::Good => factor,
                Grade::Easy => 1.5 * factor,
            };
            raw.min(max_interval(difficulty))
        }
    };

    Ok(interval)
}

/// Turn an interval in days into a wall-clock due date.
///
/// Whole days are added as calendar days, without any daylight saving
/// adjustment.
pub fn naive_due_date_for_interval(
    interval: f64,
    now: NaiveDateTime,
    policy: SubDayPolicy,
) -> Result<NaiveDateTime> {
    if !interval.is_finite() || interval < 0.0 {
        return Err(SchedulerError::InvalidInterval(interval));
    }

    let due = match policy {
        SubDayPolicy::CalendarHour => {
            let whole_days = interval.ceil() as u64;
            let base = now
                .checked_add_days(Days::new(whole_days))
                .ok_or(SchedulerError::DateOutOfRange)?;

            if interval < 1.0 {
                // Overwrite the hour; overflow past 23 rolls into the next day
                let hours_to_add = (interval * 24.0).round() as i64;
                base.with_hour(0)
                    .and_then(|hour_zero| {
                        hour_zero.checked_add_signed(Duration::hours(
                            now.hour() as i64 + hours_to_add,
                        ))
                    })
                    .ok_or(SchedulerError::DateOutOfRange)?
            } else {
                base
            }
        }
        SubDayPolicy::Elapsed => {
            let seconds = (interval * 86_400.0).round() as i64;
            let delta = Duration::try_seconds(seconds).ok_or(SchedulerError::DateOutOfRange)?;
            now.checked_add_signed(delta)
                .ok_or(SchedulerError::DateOutOfRange)?
        }
    };

    Ok(due)
}

/// [`naive_due_date_for_interval`] on a UTC timestamp
pub fn due_date_for_interval(
    interval: f64,
    now: DateTime<Utc>,
    policy: SubDayPolicy,
) -> Result<DateTime<Utc>> {
    let due = naive_due_date_for_interval(interval, now.naive_utc(), policy)?;
    Ok(Utc.from_utc_datetime(&due))
}

/// Due date for the next review, using the compatible sub-day policy
pub fn next_due_date(
    difficulty: f64,
    status: CardStatus,
    grade: Grade,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let interval = review_interval(difficulty, status, grade)?;
    due_date_for_interval(interval, now, SubDayPolicy::CalendarHour)
}

/// Result of applying a grade to a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub state: CardState,
    pub record: ReviewRecord,
}

/// What a grade would do to a card, without applying it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub grade: Grade,
    pub interval: f64,
    pub label: String,
    pub status: CardStatus,
    pub difficulty: f64,
    pub due_date: DateTime<Utc>,
}

/// Applies grades to card states according to its [`SchedulerConfig`]
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Compute the next state of `state` after it was graded `grade` at `now`.
    ///
    /// Either the whole next state is returned or an error is, never a
    /// partially updated state.
    pub fn review(&self, state: &CardState, grade: Grade, now: DateTime<Utc>) -> Result<ReviewOutcome> {
        let interval = review_interval(state.difficulty, state.status, grade)?;
        let difficulty = next_difficulty(state.difficulty, grade)?;
        let status = next_status(state.status, grade);
        let due_date = due_date_for_interval(interval, now, self.config.sub_day_policy)?;

        log::debug!(
            "Scheduled card {}: {} -> {} ({}), difficulty {} -> {}, due {}",
            state.card_id,
            state.status,
            status,
            grade,
            state.difficulty,
            difficulty,
            due_date
        );

        let record = ReviewRecord {
            id: review_record_id(state.card_id, now),
            card_id: state.card_id,
            grade,
            status_before: state.status,
            status_after: status,
            difficulty_before: state.difficulty,
            difficulty_after: difficulty,
            interval,
            reviewed_at: now,
            due_date,
        };

        Ok(ReviewOutcome {
            state: CardState {
                card_id: state.card_id,
                difficulty,
                status,
                due_date,
            },
            record,
        })
    }

    /// Outcome of every grade for `state`, in order Again, Hard, Good, Easy.
    /// Used to label the grade buttons with the interval each would give.
    pub fn preview(&self, state: &CardState, now: DateTime<Utc>) -> Result<[Preview; 4]> {
        let preview_for = |grade: Grade| -> Result<Preview> {
            let outcome = self.review(state, grade, now)?;
            Ok(Preview {
                grade,
                interval: outcome.record.interval,
                label: format_interval(outcome.record.interval),
                status: outcome.state.status,
                difficulty: outcome.state.difficulty,
                due_date: outcome.state.due_date,
            })
        };

        Ok([
            preview_for(Grade::Again)?,
            preview_for(Grade::Hard)?,
            preview_for(Grade::Good)?,
            preview_for(Grade::Easy)?,
        ])
    }

    /// Reschedule many independent cards. A bad card does not stop the batch;
    /// its slot holds the error instead.
    pub fn reschedule_all(
        &self,
        requests: &[ReviewRequest],
        now: DateTime<Utc>,
    ) -> Vec<Result<ReviewOutcome>> {
        requests
            .iter()
            .map(|request| {
                let outcome = self.review(&request.card, request.grade, now);
                if let Err(e) = &outcome {
                    log::warn!("Skipping card {}: {}", request.card.card_id, e);
                }
                outcome
            })
            .collect()
    }
}

/// Deterministic id for the review of `card_id` at `reviewed_at`
fn review_record_id(card_id: Uuid, reviewed_at: DateTime<Utc>) -> Uuid {
    Uuid::new_v5(&card_id, reviewed_at.to_rfc3339().as_bytes())
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: f64) -> String {
    if days < 1.0 {
        let hours = (days.max(0.0) * 24.0).round() as i64;
        return if hours == 0 {
            "now".to_string()
        } else {
            format!("{}h", hours)
        };
    }

    let days = days.ceil() as i64;
    if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn card(difficulty: f64, status: CardStatus) -> CardState {
        CardState {
            card_id: Uuid::new_v4(),
            difficulty,
            status,
            due_date: at(2024, 1, 1, 0, 0),
        }
    }

    #[test]
    fn test_status_table() {
        use CardStatus::*;
        use Grade::*;

        let expected = [
            (New, [Learning, Learning, Learning, Learning]),
            (Learning, [Learning, Learning, Review, Review]),
            (Review, [Relearning, Review, Review, Review]),
            (Relearning, [Relearning, Relearning, Review, Review]),
        ];

        for (status, row) in expected {
            for (grade, want) in [Again, Hard, Good, Easy].into_iter().zip(row) {
                assert_eq!(next_status(status, grade), want, "{} / {}", status, grade);
            }
        }
    }

    #[test]
    fn test_status_examples() {
        assert_eq!(next_status(CardStatus::New, Grade::Good), CardStatus::Learning);
        assert_eq!(next_status(CardStatus::Learning, Grade::Good), CardStatus::Review);
        assert_eq!(next_status(CardStatus::Review, Grade::Again), CardStatus::Relearning);
        assert_eq!(next_status(CardStatus::Relearning, Grade::Easy), CardStatus::Review);
    }

    #[test]
    fn test_difficulty_examples() {
        assert_eq!(next_difficulty(3.0, Grade::Again).unwrap(), 4.0);
        assert_eq!(next_difficulty(3.0, Grade::Hard).unwrap(), 3.5);
        assert_eq!(next_difficulty(3.0, Grade::Good).unwrap(), 3.0);
        assert_eq!(next_difficulty(3.0, Grade::Easy).unwrap(), 2.5);
        assert_eq!(next_difficulty(0.0, Grade::Easy).unwrap(), 0.0);
        assert_eq!(next_difficulty(5.0, Grade::Again).unwrap(), 5.0);
    }

    #[test]
    fn test_difficulty_saturates() {
        let mut d = 2.0;
        for _ in 0..20 {
            d = next_difficulty(d, Grade::Again).unwrap();
        }
        assert_eq!(d, MAX_DIFFICULTY);

        for _ in 0..20 {
            d = next_difficulty(d, Grade::Easy).unwrap();
        }
        assert_eq!(d, MIN_DIFFICULTY);
    }

    #[test]
    fn test_difficulty_bounds_and_monotonicity() {
        for step in 0..=50 {
            let d = step as f64 * 0.1;
            let results: Vec<f64> = Grade::ALL
                .iter()
                .map(|g| next_difficulty(d, *g).unwrap())
                .collect();

            for r in &results {
                assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(r));
            }
            // ALL is weakest first, so difficulty must not increase along it
            for pair in results.windows(2) {
                assert!(pair[0] >= pair[1], "d={} results={:?}", d, results);
            }
        }
    }

    #[test]
    fn test_out_of_range_difficulty_rejected() {
        assert_eq!(
            next_difficulty(5.5, Grade::Good),
            Err(SchedulerError::InvalidDifficulty(5.5))
        );
        assert!(next_difficulty(-0.1, Grade::Good).is_err());
        assert!(next_difficulty(f64::NAN, Grade::Good).is_err());
        assert!(review_interval(6.0, CardStatus::Review, Grade::Good).is_err());
    }

    #[test]
    fn test_new_card_intervals() {
        let intervals: Vec<f64> = Grade::ALL
            .iter()
            .map(|g| review_interval(0.0, CardStatus::New, *g).unwrap())
            .collect();
        assert_eq!(intervals, vec![0.0, 0.1, 0.2, 1.0]);
    }

    #[test]
    fn test_learning_intervals_match_relearning() {
        for grade in Grade::ALL {
            assert_eq!(
                review_interval(1.0, CardStatus::Learning, grade).unwrap(),
                review_interval(1.0, CardStatus::Relearning, grade).unwrap()
            );
        }
        assert_eq!(review_interval(1.0, CardStatus::Learning, Grade::Easy).unwrap(), 3.0);
    }

    #[test]
    fn test_review_interval_uses_base_factor() {
        assert!(approx(base_factor(2.5), 2.125));
        assert!(approx(
            review_interval(2.5, CardStatus::Review, Grade::Good).unwrap(),
            2.125
        ));
        assert!(approx(
            review_interval(2.5, CardStatus::Review, Grade::Hard).unwrap(),
            1.0625
        ));
        assert_eq!(review_interval(2.5, CardStatus::Review, Grade::Again).unwrap(), 0.1);
    }

    #[test]
    fn test_hardest_card_easy_review() {
        assert!(approx(base_factor(5.0), 1.75));
        let interval = review_interval(5.0, CardStatus::Review, Grade::Easy).unwrap();
        assert!(approx(interval, 2.625));
        assert!(interval < max_interval(5.0));
        assert_eq!(max_interval(5.0), 365.0);
    }

    #[test]
    fn test_review_interval_never_exceeds_cap() {
        for step in 0..=50 {
            let d = step as f64 * 0.1;
            for grade in Grade::ALL {
                let interval = review_interval(d, CardStatus::Review, grade).unwrap();
                assert!(interval <= max_interval(d));
            }
        }
    }

    #[test]
    fn test_sub_day_due_date_overrides_hour() {
        let now = at(2024, 1, 1, 10, 0);
        let due = next_due_date(0.0, CardStatus::New, Grade::Good, now).unwrap();
        assert_eq!(due, at(2024, 1, 2, 15, 0));
    }

    #[test]
    fn test_whole_day_due_date() {
        let now = at(2024, 1, 1, 0, 0);
        let due = next_due_date(2.5, CardStatus::Review, Grade::Good, now).unwrap();
        assert_eq!(due, at(2024, 1, 4, 0, 0));
    }

    #[test]
    fn test_again_on_new_card_is_due_now() {
        let now = at(2024, 3, 10, 8, 30);
        let due = next_due_date(0.0, CardStatus::New, Grade::Again, now).unwrap();
        assert_eq!(due, now);
    }

    #[test]
    fn test_sub_day_hour_overflow_rolls_over() {
        // 0.5 days at 20:00 -> tomorrow at hour 32 -> the day after at 08:00
        let now = at(2024, 12, 31, 20, 15);
        let due = next_due_date(1.0, CardStatus::Learning, Grade::Hard, now).unwrap();
        assert_eq!(due, at(2025, 1, 2, 8, 15));
    }

    #[test]
    fn test_calendar_days_cross_month_and_leap_day() {
        let now = at(2024, 2, 28, 9, 0);
        let due = next_due_date(0.0, CardStatus::Learning, Grade::Easy, now).unwrap();
        assert_eq!(due, at(2024, 3, 2, 9, 0));
    }

    #[test]
    fn test_elapsed_policy_adds_exact_hours() {
        let now = at(2024, 1, 1, 10, 0);
        let due = due_date_for_interval(0.2, now, SubDayPolicy::Elapsed).unwrap();
        assert_eq!(due, now + Duration::seconds(17_280));

        let calendar = due_date_for_interval(0.2, now, SubDayPolicy::CalendarHour).unwrap();
        assert_eq!(calendar, at(2024, 1, 2, 15, 0));
    }

    #[test]
    fn test_elapsed_policy_keeps_fractional_days() {
        let now = at(2024, 1, 1, 0, 0);
        let due = due_date_for_interval(2.125, now, SubDayPolicy::Elapsed).unwrap();
        assert_eq!(due, at(2024, 1, 3, 3, 0));
    }

    #[test]
    fn test_negative_interval_rejected() {
        let now = at(2024, 1, 1, 0, 0);
        assert!(due_date_for_interval(-1.0, now, SubDayPolicy::CalendarHour).is_err());
    }

    #[test]
    fn test_huge_interval_is_out_of_range() {
        let now = at(2024, 1, 1, 0, 0);
        for policy in [SubDayPolicy::CalendarHour, SubDayPolicy::Elapsed] {
            assert_eq!(
                due_date_for_interval(1e12, now, policy),
                Err(SchedulerError::DateOutOfRange)
            );
        }
    }

    #[test]
    fn test_due_date_never_before_now() {
        let scheduler = Scheduler::default();
        let elapsed = Scheduler::new(SchedulerConfig {
            sub_day_policy: SubDayPolicy::Elapsed,
        });
        let now = at(2024, 6, 15, 23, 59);

        for status in CardStatus::ALL {
            for step in 0..=10 {
                let state = card(step as f64 * 0.5, status);
                for grade in Grade::ALL {
                    for s in [&scheduler, &elapsed] {
                        let outcome = s.review(&state, grade, now).unwrap();
                        assert!(outcome.state.due_date >= now);
                    }
                }
            }
        }
    }

    #[test]
    fn test_review_composes_all_rules() {
        let scheduler = Scheduler::default();
        let state = card(2.5, CardStatus::Review);
        let now = at(2024, 1, 1, 0, 0);

        let outcome = scheduler.review(&state, Grade::Good, now).unwrap();

        assert_eq!(outcome.state.card_id, state.card_id);
        assert_eq!(outcome.state.status, CardStatus::Review);
        assert_eq!(outcome.state.difficulty, 2.5);
        assert_eq!(outcome.state.due_date, at(2024, 1, 4, 0, 0));
        assert_eq!(outcome.record.status_before, CardStatus::Review);
        assert_eq!(outcome.record.reviewed_at, now);
        assert!(approx(outcome.record.interval, 2.125));
    }

    #[test]
    fn test_review_interval_uses_status_before_review() {
        // A learning card graded Good becomes Review but is scheduled
        // with the learning table (1 day), not the review table.
        let scheduler = Scheduler::default();
        let state = card(0.0, CardStatus::Learning);
        let now = at(2024, 1, 1, 12, 0);

        let outcome = scheduler.review(&state, Grade::Good, now).unwrap();
        assert_eq!(outcome.state.status, CardStatus::Review);
        assert_eq!(outcome.state.due_date, at(2024, 1, 2, 12, 0));
    }

    #[test]
    fn test_review_record_id_is_deterministic() {
        let scheduler = Scheduler::default();
        let state = card(1.0, CardStatus::Learning);
        let now = at(2024, 1, 1, 0, 0);

        let a = scheduler.review(&state, Grade::Hard, now).unwrap();
        let b = scheduler.review(&state, Grade::Hard, now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_state_produces_no_outcome() {
        let scheduler = Scheduler::default();
        let state = card(7.0, CardStatus::Review);
        let result = scheduler.review(&state, Grade::Good, at(2024, 1, 1, 0, 0));
        assert_eq!(result, Err(SchedulerError::InvalidDifficulty(7.0)));
    }

    #[test]
    fn test_preview_orders_by_grade() {
        let scheduler = Scheduler::default();
        let state = card(0.0, CardStatus::New);
        let now = at(2024, 1, 1, 10, 0);

        let previews = scheduler.preview(&state, now).unwrap();
        let grades: Vec<Grade> = previews.iter().map(|p| p.grade).collect();
        assert_eq!(grades, Grade::ALL.to_vec());

        let labels: Vec<&str> = previews.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["now", "2h", "5h", "1d"]);
    }

    #[test]
    fn test_reschedule_all_keeps_going_after_error() {
        let scheduler = Scheduler::default();
        let now = at(2024, 1, 1, 0, 0);
        let requests = vec![
            ReviewRequest { card: card(0.0, CardStatus::New), grade: Grade::Good },
            ReviewRequest { card: card(9.0, CardStatus::Review), grade: Grade::Good },
            ReviewRequest { card: card(4.0, CardStatus::Review), grade: Grade::Again },
        ];

        let results = scheduler.reschedule_all(&requests, now);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(
            results[2].as_ref().unwrap().state.status,
            CardStatus::Relearning
        );
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0.0), "now");
        assert_eq!(format_interval(0.1), "2h");
        assert_eq!(format_interval(0.5), "12h");
        assert_eq!(format_interval(1.0), "1d");
        assert_eq!(format_interval(2.125), "3d");
        assert_eq!(format_interval(7.0), "1w");
        assert_eq!(format_interval(14.0), "2w");
        assert_eq!(format_interval(30.0), "1mo");
        assert_eq!(format_interval(90.0), "3mo");
        assert_eq!(format_interval(365.0), "1y");
        assert_eq!(format_interval(730.0), "2y");
    }
}
