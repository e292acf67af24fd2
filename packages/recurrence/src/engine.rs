// ABOUTME: Occurrence expansion for recurrence rules
// ABOUTME: Pure next-occurrence and windowed enumeration over daily, weekly, monthly and yearly rules

use std::collections::VecDeque;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, SubsecRound, Utc};
use tasklane_core::{RecurrenceRule, RecurrenceType};
use tracing::warn;

/// Upper bound on periods scanned by one expansion. Rules such as "every 12
/// months on the 31st" anchored in a short month never produce anything.
const MAX_PERIODS: u64 = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl From<RecurrenceType> for Frequency {
    fn from(kind: RecurrenceType) -> Self {
        match kind {
            RecurrenceType::Daily | RecurrenceType::Custom => Frequency::Daily,
            RecurrenceType::Weekly => Frequency::Weekly,
            RecurrenceType::Monthly => Frequency::Monthly,
            RecurrenceType::Yearly => Frequency::Yearly,
        }
    }
}

/// Ordered occurrences of a rule, starting at its anchor.
///
/// The anchor fixes the time of day and the default day selectors. It is itself
/// an occurrence only when it matches the selectors.
#[derive(Debug, Clone)]
pub struct Occurrences {
    anchor: DateTime<Utc>,
    anchor_date: NaiveDate,
    time: NaiveTime,
    frequency: Frequency,
    interval: u64,
    /// Weekly selectors as offsets from Monday, sorted
    weekdays: Vec<u64>,
    month_day: u32,
    until: Option<DateTime<Utc>>,
    count: Option<u32>,
    period: u64,
    scanned: u64,
    emitted: u32,
    pending: VecDeque<DateTime<Utc>>,
    done: bool,
}

impl Occurrences {
    pub fn new(rule: &RecurrenceRule, anchor: DateTime<Utc>) -> Self {
        let anchor_date = anchor.date_naive();

        let mut weekdays: Vec<u64> = rule
            .days_of_week
            .iter()
            .flatten()
            .filter(|d| **d <= 6)
            .map(|d| (u64::from(*d) + 6) % 7)
            .collect();
        weekdays.sort_unstable();
        weekdays.dedup();
        if weekdays.is_empty() {
            weekdays.push(u64::from(anchor_date.weekday().num_days_from_monday()));
        }

        Self {
            anchor,
            anchor_date,
            time: anchor.time(),
            frequency: rule.kind.into(),
            interval: u64::from(rule.interval.max(1)),
            weekdays,
            month_day: rule.day_of_month.unwrap_or(anchor_date.day()).clamp(1, 31),
            // UNTIL carries whole seconds in RRULE text
            until: rule.end_date.map(|until| until.trunc_subsecs(0)),
            count: rule.count,
            period: 0,
            scanned: 0,
            emitted: 0,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Jump over whole periods that lie entirely before `instant`.
    ///
    /// Only possible without a `count`, since counted rules need every earlier
    /// occurrence to know how many remain.
    pub fn skip_to(mut self, instant: DateTime<Utc>) -> Self {
        if self.count.is_some() || instant <= self.anchor || self.period != 0 {
            return self;
        }

        let target = instant.date_naive();
        let elapsed = match self.frequency {
            Frequency::Daily => (target - self.anchor_date).num_days(),
            Frequency::Weekly => (week_start(target) - week_start(self.anchor_date)).num_days() / 7,
            Frequency::Monthly => month_index(target) - month_index(self.anchor_date),
            Frequency::Yearly => i64::from(target.year() - self.anchor_date.year()),
        };

        let whole_periods = u64::try_from(elapsed).unwrap_or(0) / self.interval;
        self.period = whole_periods.saturating_sub(1);
        self
    }

    /// Dates produced by the `period`-th step of the rule, in order. `None` once
    /// the calendar range is exhausted.
    fn period_dates(&self, period: u64) -> Option<Vec<NaiveDate>> {
        let step = period.checked_mul(self.interval)?;

        match self.frequency {
            Frequency::Daily => Some(vec![self.anchor_date.checked_add_days(Days::new(step))?]),
            Frequency::Weekly => {
                let start = week_start(self.anchor_date)
                    .checked_add_days(Days::new(step.checked_mul(7)?))?;
                self.weekdays
                    .iter()
                    .map(|offset| start.checked_add_days(Days::new(*offset)))
                    .collect()
            }
            Frequency::Monthly => {
                let index = month_index(self.anchor_date).checked_add(i64::try_from(step).ok()?)?;
                let year = i32::try_from(index.div_euclid(12)).ok()?;
                let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
                // Months without the requested day are skipped, not rolled over
                Some(
                    NaiveDate::from_ymd_opt(year, month, self.month_day)
                        .into_iter()
                        .collect(),
                )
            }
            Frequency::Yearly => {
                let year = i64::from(self.anchor_date.year()).checked_add(i64::try_from(step).ok()?)?;
                let year = i32::try_from(year).ok()?;
                Some(
                    NaiveDate::from_ymd_opt(year, self.anchor_date.month(), self.anchor_date.day())
                        .into_iter()
                        .collect(),
                )
            }
        }
    }
}

impl Iterator for Occurrences {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(candidate) = self.pending.pop_front() {
                let past_end = self.until.is_some_and(|until| candidate > until);
                let used_up = self.count.is_some_and(|count| self.emitted >= count);
                if past_end || used_up {
                    self.done = true;
                    self.pending.clear();
                    return None;
                }
                self.emitted += 1;
                return Some(candidate);
            }

            if self.done {
                return None;
            }
            if self.scanned >= MAX_PERIODS {
                warn!(
                    "Stopped expanding recurrence after {} periods without a match",
                    MAX_PERIODS
                );
                self.done = true;
                return None;
            }

            match self.period_dates(self.period) {
                Some(dates) => {
                    for date in dates {
                        let candidate = date.and_time(self.time).and_utc();
                        if candidate >= self.anchor {
                            self.pending.push_back(candidate);
                        }
                    }
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
            self.period += 1;
            self.scanned += 1;
        }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// First occurrence of `rule` (anchored at `anchor`) strictly after `after`.
///
/// `None` when the rule is exhausted by its end date or count.
pub fn next_occurrence(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
    after: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    Occurrences::new(rule, anchor)
        .skip_to(after)
        .find(|candidate| *candidate > after)
}

/// Every occurrence with `start <= occurrence <= end`.
pub fn occurrences_in_range(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    if end < start {
        return Vec::new();
    }

    Occurrences::new(rule, anchor)
        .skip_to(start)
        .skip_while(|candidate| *candidate < start)
        .take_while(|candidate| *candidate <= end)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_weekly_monday_rule_moves_one_week() {
        let monday = at(2024, 1, 1, 9);
        let rule = RecurrenceRule::weekly_on(&[1]);
        assert_eq!(next_occurrence(&rule, monday, monday), Some(at(2024, 1, 8, 9)));
    }

    #[test]
    fn test_daily_interval_is_respected() {
        let anchor = at(2024, 1, 1, 7);
        let rule = RecurrenceRule::daily().with_interval(3);
        assert_eq!(next_occurrence(&rule, anchor, anchor), Some(at(2024, 1, 4, 7)));
        assert_eq!(
            next_occurrence(&rule, anchor, at(2024, 1, 4, 7)),
            Some(at(2024, 1, 7, 7))
        );
    }

    #[test]
    fn test_zero_interval_is_coerced_to_one() {
        let anchor = at(2024, 1, 1, 7);
        let rule = RecurrenceRule::daily().with_interval(0);
        assert_eq!(next_occurrence(&rule, anchor, anchor), Some(at(2024, 1, 2, 7)));
    }

    #[test]
    fn test_weekly_multiple_days_and_interval() {
        // Wednesday anchor, Mondays and Fridays every other week
        let anchor = at(2024, 1, 3, 10);
        let rule = RecurrenceRule::weekly_on(&[1, 5]).with_interval(2);

        let got = occurrences_in_range(&rule, anchor, anchor, at(2024, 1, 31, 0));
        assert_eq!(
            got,
            vec![at(2024, 1, 5, 10), at(2024, 1, 15, 10), at(2024, 1, 19, 10), at(2024, 1, 29, 10)]
        );
    }

    #[test]
    fn test_weekly_defaults_to_anchor_weekday() {
        let thursday = at(2024, 2, 1, 18);
        let rule = RecurrenceRule::new(RecurrenceType::Weekly, 1);
        assert_eq!(next_occurrence(&rule, thursday, thursday), Some(at(2024, 2, 8, 18)));
    }

    #[test]
    fn test_sunday_selector_falls_at_end_of_week() {
        let monday = at(2024, 1, 1, 9);
        let rule = RecurrenceRule::weekly_on(&[0]);
        assert_eq!(next_occurrence(&rule, monday, monday), Some(at(2024, 1, 7, 9)));
    }

    #[test]
    fn test_monthly_skips_months_without_the_day() {
        let anchor = at(2024, 1, 31, 12);
        let rule = RecurrenceRule::monthly_on(31);
        assert_eq!(next_occurrence(&rule, anchor, anchor), Some(at(2024, 3, 31, 12)));
    }

    #[test]
    fn test_monthly_defaults_to_anchor_day() {
        let anchor = at(2024, 1, 15, 8);
        let rule = RecurrenceRule::new(RecurrenceType::Monthly, 2);
        assert_eq!(next_occurrence(&rule, anchor, anchor), Some(at(2024, 3, 15, 8)));
    }

    #[test]
    fn test_yearly_leap_day_skips_to_next_leap_year() {
        let anchor = at(2024, 2, 29, 9);
        let rule = RecurrenceRule::new(RecurrenceType::Yearly, 1);
        assert_eq!(next_occurrence(&rule, anchor, anchor), Some(at(2028, 2, 29, 9)));
    }

    #[test]
    fn test_custom_rules_behave_daily() {
        let anchor = at(2024, 1, 1, 9);
        let rule = RecurrenceRule::new(RecurrenceType::Custom, 2);
        assert_eq!(next_occurrence(&rule, anchor, anchor), Some(at(2024, 1, 3, 9)));
    }

    #[test]
    fn test_end_date_is_inclusive_and_exhausts() {
        let anchor = at(2024, 1, 1, 9);
        let rule = RecurrenceRule::daily().until(at(2024, 1, 2, 9));
        assert_eq!(next_occurrence(&rule, anchor, anchor), Some(at(2024, 1, 2, 9)));
        assert_eq!(next_occurrence(&rule, anchor, at(2024, 1, 2, 9)), None);

        let weekly = RecurrenceRule::weekly_on(&[1]).until(at(2024, 1, 5, 0));
        assert_eq!(next_occurrence(&weekly, anchor, anchor), None);
    }

    #[test]
    fn test_count_includes_matching_anchor() {
        let anchor = at(2024, 1, 1, 9);
        let rule = RecurrenceRule::daily().times(3);
        assert_eq!(next_occurrence(&rule, anchor, anchor), Some(at(2024, 1, 2, 9)));
        assert_eq!(next_occurrence(&rule, anchor, at(2024, 1, 2, 9)), Some(at(2024, 1, 3, 9)));
        assert_eq!(next_occurrence(&rule, anchor, at(2024, 1, 3, 9)), None);
    }

    #[test]
    fn test_anchor_outside_selectors_is_not_counted() {
        // Monday anchor, Tuesdays only, two occurrences in total
        let anchor = at(2024, 1, 1, 9);
        let rule = RecurrenceRule::weekly_on(&[2]).times(2);
        let all: Vec<_> = Occurrences::new(&rule, anchor).collect();
        assert_eq!(all, vec![at(2024, 1, 2, 9), at(2024, 1, 9, 9)]);
    }

    #[test]
    fn test_skip_ahead_matches_full_scan() {
        let anchor = at(2020, 1, 6, 9);
        let after = at(2024, 7, 10, 12);
        let rules = [
            RecurrenceRule::daily().with_interval(5),
            RecurrenceRule::weekly_on(&[2, 4]).with_interval(3),
            RecurrenceRule::monthly_on(30).with_interval(5),
            RecurrenceRule::new(RecurrenceType::Yearly, 2),
        ];

        for rule in &rules {
            let scanned = Occurrences::new(rule, anchor).find(|c| *c > after);
            assert_eq!(next_occurrence(rule, anchor, after), scanned, "rule {:?}", rule);
        }
    }

    #[test]
    fn test_unsatisfiable_rule_terminates() {
        let anchor = at(2024, 2, 10, 9);
        let rule = RecurrenceRule::monthly_on(30).with_interval(12);
        assert_eq!(next_occurrence(&rule, anchor, anchor), None);
    }

    #[test]
    fn test_range_is_inclusive_and_ordered() {
        let anchor = at(2024, 1, 1, 9);
        let rule = RecurrenceRule::daily();
        let got = occurrences_in_range(&rule, anchor, at(2024, 1, 3, 9), at(2024, 1, 5, 9));
        assert_eq!(got, vec![at(2024, 1, 3, 9), at(2024, 1, 4, 9), at(2024, 1, 5, 9)]);

        assert!(occurrences_in_range(&rule, anchor, at(2024, 1, 5, 9), at(2024, 1, 3, 9)).is_empty());
    }
}
