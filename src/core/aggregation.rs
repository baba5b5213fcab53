//! Stateless dashboard queries over a cleaned dataset.
//!
//! Every query takes the dataset by shared reference and builds a fresh
//! result table. Records are placed on the calendar by
//! [`CleanRecord::event_date`](crate::domain::model::CleanRecord::event_date).

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeMap, HashMap};

use crate::domain::model::{
    AggregateResult, CleanedDataset, DailyCumulative, QueryKind, WeekCount, ZipCount,
};

/// Number of zip codes the ranking keeps.
pub const TOP_ZIP_CODES: usize = 5;

pub fn run_query(dataset: &CleanedDataset, kind: QueryKind) -> AggregateResult {
    match kind {
        QueryKind::BusiestWeek => AggregateResult::BusiestWeek(busiest_week(dataset)),
        QueryKind::TopZipCodes => {
            AggregateResult::TopZipCodes(top_zip_codes(dataset, TOP_ZIP_CODES))
        }
        QueryKind::DailyCumulativeTotal => {
            AggregateResult::DailyCumulativeTotal(daily_cumulative_total(dataset))
        }
    }
}

/// Open-house counts per ISO week, in calendar order.
pub fn weekly_counts(dataset: &CleanedDataset) -> Vec<WeekCount> {
    let mut counts: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for record in dataset.records() {
        let iso = record.event_date().iso_week();
        *counts.entry((iso.year(), iso.week())).or_default() += 1;
    }

    counts
        .into_iter()
        .filter_map(|((year, week), open_house_count)| {
            let start_of_week = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
            let end_of_week = NaiveDate::from_isoywd_opt(year, week, Weekday::Sun)?;
            Some(WeekCount {
                year,
                week,
                start_of_week,
                end_of_week,
                open_house_count,
            })
        })
        .collect()
}

/// The single week with the most open houses; the earliest such week on a tie.
/// Empty when the dataset is empty.
pub fn busiest_week(dataset: &CleanedDataset) -> Vec<WeekCount> {
    let mut best: Option<WeekCount> = None;
    // weekly_counts is in calendar order, so only a strictly larger count replaces.
    for week in weekly_counts(dataset) {
        let replace = best
            .as_ref()
            .map_or(true, |current| week.open_house_count > current.open_house_count);
        if replace {
            best = Some(week);
        }
    }
    best.into_iter().collect()
}

/// Zip codes ranked by open-house count, descending, ties by zip code ascending.
/// Records without a zip code are not ranked.
pub fn top_zip_codes(dataset: &CleanedDataset, limit: usize) -> Vec<ZipCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for zipcode in dataset.records().iter().filter_map(|r| r.zipcode.as_deref()) {
        *counts.entry(zipcode).or_default() += 1;
    }

    let mut ranked: Vec<ZipCount> = counts
        .into_iter()
        .map(|(zipcode, open_house_count)| ZipCount {
            zipcode: zipcode.to_string(),
            open_house_count,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.open_house_count
            .cmp(&a.open_house_count)
            .then_with(|| a.zipcode.cmp(&b.zipcode))
    });
    ranked.truncate(limit);
    ranked
}

/// Running total of open houses per day, in date order.
pub fn daily_cumulative_total(dataset: &CleanedDataset) -> Vec<DailyCumulative> {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in dataset.records() {
        *per_day.entry(record.event_date()).or_default() += 1;
    }

    per_day
        .into_iter()
        .scan(0u64, |running, (open_house_date, count)| {
            *running += count;
            Some(DailyCumulative {
                open_house_date,
                daily_cumulative_total: *running,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CleanRecord;
    use chrono::{DateTime, Utc};

    fn record(key: usize, date: &str, zipcode: Option<&str>) -> CleanRecord {
        let start: DateTime<Utc> = format!("{date}T08:00:00Z").parse().unwrap();
        CleanRecord {
            open_house_key: format!("oh-{key}"),
            listing_key: Some(format!("listing-{key}")),
            open_house_method: Some("In-person".to_string()),
            open_house_start_time: start,
            open_house_end_time: start + chrono::Duration::hours(2),
            open_house_date: Some(date.parse().unwrap()),
            state: Some("CA".to_string()),
            zipcode: zipcode.map(str::to_string),
            date_modified: start,
        }
    }

    fn dataset(records: Vec<CleanRecord>) -> CleanedDataset {
        CleanedDataset::from_records(records).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_dataset_gives_empty_results() {
        let empty = CleanedDataset::default();
        for kind in QueryKind::ALL {
            let result = run_query(&empty, kind);
            assert_eq!(result.kind(), kind);
            assert!(result.is_empty());
        }
    }

    #[test]
    fn test_daily_cumulative_total_running_sum() {
        let mut records = Vec::new();
        for day in ["2023-03-01", "2023-03-02", "2023-03-03"] {
            for _ in 0..10 {
                records.push(record(records.len(), day, Some("92630")));
            }
        }

        let totals = daily_cumulative_total(&dataset(records));

        let values: Vec<u64> = totals.iter().map(|r| r.daily_cumulative_total).collect();
        assert_eq!(values, vec![10, 20, 30]);
        assert_eq!(totals[0].open_house_date, date("2023-03-01"));
        assert_eq!(totals[2].open_house_date, date("2023-03-03"));
    }

    #[test]
    fn test_daily_cumulative_total_sorted_regardless_of_input_order() {
        let records = vec![
            record(0, "2023-03-05", None),
            record(1, "2023-03-01", None),
            record(2, "2023-03-05", None),
            record(3, "2023-02-27", None),
        ];
        let data = dataset(records);

        let totals = daily_cumulative_total(&data);

        let dates: Vec<NaiveDate> = totals.iter().map(|r| r.open_house_date).collect();
        assert_eq!(dates, vec![date("2023-02-27"), date("2023-03-01"), date("2023-03-05")]);
        assert!(totals
            .windows(2)
            .all(|w| w[0].daily_cumulative_total <= w[1].daily_cumulative_total));
        assert_eq!(
            totals.last().unwrap().daily_cumulative_total,
            data.len() as u64
        );
    }

    #[test]
    fn test_top_zip_codes_keeps_five_highest() {
        let zips = [("A", 100), ("B", 90), ("C", 80), ("D", 70), ("E", 60), ("F", 50)];
        let mut records = Vec::new();
        for (zip, count) in zips {
            for _ in 0..count {
                records.push(record(records.len(), "2023-03-01", Some(zip)));
            }
        }

        let top = top_zip_codes(&dataset(records), TOP_ZIP_CODES);

        let names: Vec<&str> = top.iter().map(|z| z.zipcode.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(top[0].open_house_count, 100);
        assert_eq!(top[4].open_house_count, 60);
    }

    #[test]
    fn test_top_zip_codes_ties_break_by_zip() {
        let records = vec![
            record(0, "2023-03-01", Some("92630")),
            record(1, "2023-03-01", Some("10001")),
            record(2, "2023-03-01", Some("55555")),
            record(3, "2023-03-01", Some("55555")),
            record(4, "2023-03-01", None),
        ];

        let top = top_zip_codes(&dataset(records), TOP_ZIP_CODES);

        let names: Vec<&str> = top.iter().map(|z| z.zipcode.as_str()).collect();
        assert_eq!(names, vec!["55555", "10001", "92630"]);
    }

    #[test]
    fn test_busiest_week_bounds_and_count() {
        // ISO week 13 of 2023 runs Monday 03-27 to Sunday 04-02.
        let mut records = Vec::new();
        for day in ["2023-03-27", "2023-03-29", "2023-04-02", "2023-04-03", "2023-03-20"] {
            records.push(record(records.len(), day, None));
        }

        let busiest = busiest_week(&dataset(records));

        assert_eq!(
            busiest,
            vec![WeekCount {
                year: 2023,
                week: 13,
                start_of_week: date("2023-03-27"),
                end_of_week: date("2023-04-02"),
                open_house_count: 3,
            }]
        );
    }

    #[test]
    fn test_busiest_week_tie_picks_earliest() {
        let records = vec![
            record(0, "2023-05-01", None),
            record(1, "2023-05-02", None),
            record(2, "2023-01-02", None),
            record(3, "2023-01-03", None),
        ];

        let busiest = busiest_week(&dataset(records));

        assert_eq!(busiest.len(), 1);
        assert_eq!(busiest[0].start_of_week, date("2023-01-02"));
    }

    #[test]
    fn test_busiest_week_uses_iso_year_at_boundary() {
        // 2021-01-01 belongs to ISO week 53 of 2020.
        let records = vec![
            record(0, "2020-12-28", None),
            record(1, "2021-01-01", None),
            record(2, "2021-01-03", None),
        ];

        let busiest = busiest_week(&dataset(records));

        assert_eq!(busiest[0].year, 2020);
        assert_eq!(busiest[0].week, 53);
        assert_eq!(busiest[0].open_house_count, 3);
    }

    #[test]
    fn test_busiest_week_matches_direct_grouping() {
        let days = ["2023-06-01", "2023-06-05", "2023-06-06", "2023-06-12", "2023-06-13", "2023-06-14"];
        let records: Vec<CleanRecord> = days
            .iter()
            .enumerate()
            .map(|(i, d)| record(i, d, None))
            .collect();
        let data = dataset(records);

        let mut direct: HashMap<(i32, u32), u64> = HashMap::new();
        for r in data.records() {
            let iso = r.event_date().iso_week();
            *direct.entry((iso.year(), iso.week())).or_default() += 1;
        }
        let max = direct.values().copied().max().unwrap();

        assert_eq!(busiest_week(&data)[0].open_house_count, max);
    }

    #[test]
    fn test_event_date_falls_back_to_start_time() {
        let mut r = record(0, "2023-03-01", None);
        r.open_house_date = None;

        let totals = daily_cumulative_total(&dataset(vec![r]));
        assert_eq!(totals[0].open_house_date, date("2023-03-01"));
    }
}
