use chrono::{Duration, NaiveDate};
use manpower_ledger::data::Value;
use manpower_ledger::dataset::Dataset;
use manpower_ledger::filter::{DateRange, FilterState};
use manpower_ledger::normalize::{NumberLocale, Normalizer};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn group(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::new();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
}

fn pnl_rows() -> impl Strategy<Value = Vec<(i64, usize, usize, u32)>> {
    prop::collection::vec((0i64..90, 0usize..3, 0usize..2, 0u32..1_000_000), 0..40)
}

fn build_pnl(rows: &[(i64, usize, usize, u32)]) -> Dataset {
    const PROJECTS: [&str; 3] = ["Alpha", "Beta", "Gamma"];
    const STATUSES: [&str; 2] = ["Profitable", "Loss"];
    let headers = ["Month", "Project Name", "Status", "Revenue"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let raw = rows
        .iter()
        .map(|(offset, project, status, revenue)| {
            vec![
                (base_date() + Duration::days(*offset)).format("%Y-%m-%d").to_string(),
                PROJECTS[*project].to_string(),
                STATUSES[*status].to_string(),
                format!("Rp {}", group(u64::from(*revenue))),
            ]
        })
        .collect();
    Normalizer::default().normalize_dataset(Dataset::from_raw("pnl", &headers, raw))
}

proptest! {
    #[test]
    fn decorated_rupiah_parses_to_its_value(
        value in 0u64..10_000_000_000u64,
        negative in any::<bool>(),
    ) {
        let locale = NumberLocale::default();
        let sign = if negative { "-" } else { "" };
        let parsed = locale.parse_number(&format!("Rp {sign}{}", group(value)));
        let expected = if negative { -Decimal::from(value) } else { Decimal::from(value) };
        prop_assert_eq!(parsed, Some(expected));
    }

    #[test]
    fn normalizing_twice_changes_nothing(rows in pnl_rows()) {
        let once = build_pnl(&rows);
        let twice = Normalizer::default().normalize_dataset(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn filter_application_order_does_not_matter(rows in pnl_rows(), a in 0i64..90, b in 0i64..90) {
        let data = build_pnl(&rows);
        let range = DateRange::new(
            base_date() + Duration::days(a),
            base_date() + Duration::days(b),
        );
        let by_date = FilterState::default().with_date_range(Some(range));
        let by_project = FilterState::default().with_project(Some("Beta".to_string()));
        let combined = by_date.clone().with_project(Some("Beta".to_string()));

        let date_then_project =
            by_project.apply(&by_date.apply(&data, Some("Month")), Some("Month"));
        let project_then_date =
            by_date.apply(&by_project.apply(&data, Some("Month")), Some("Month"));
        prop_assert_eq!(&date_then_project, &project_then_date);
        prop_assert_eq!(&date_then_project, &combined.apply(&data, Some("Month")));
    }

    #[test]
    fn disjoint_date_ranges_partition_rows(rows in pnl_rows(), split in 1i64..89) {
        let data = build_pnl(&rows);
        let early = FilterState::default().with_date_range(Some(DateRange::new(
            base_date(),
            base_date() + Duration::days(split - 1),
        )));
        let late = FilterState::default().with_date_range(Some(DateRange::new(
            base_date() + Duration::days(split),
            base_date() + Duration::days(89),
        )));
        let early_rows = early.apply(&data, Some("Month")).len();
        let late_rows = late.apply(&data, Some("Month")).len();
        prop_assert_eq!(early_rows + late_rows, data.len());
    }

    #[test]
    fn chaining_disjoint_date_ranges_leaves_nothing(rows in pnl_rows(), split in 1i64..89) {
        let data = build_pnl(&rows);
        let early = FilterState::default().with_date_range(Some(DateRange::new(
            base_date(),
            base_date() + Duration::days(split - 1),
        )));
        let late = FilterState::default().with_date_range(Some(DateRange::new(
            base_date() + Duration::days(split),
            base_date() + Duration::days(89),
        )));
        let chained = late.apply(&early.apply(&data, Some("Month")), Some("Month"));
        prop_assert!(chained.is_empty());
    }

    #[test]
    fn filtered_rows_always_satisfy_the_selection(rows in pnl_rows(), status in 0usize..2) {
        let data = build_pnl(&rows);
        let selected = ["Profitable", "Loss"][status];
        let state = FilterState::default().with_status(Some(selected.to_string()));
        let filtered = state.apply(&data, Some("Month"));
        let idx = filtered.column_index("Status").expect("status column");
        for row in &filtered.rows {
            prop_assert_eq!(row[idx].as_ref(), Some(&Value::Text(selected.to_string())));
        }
    }
}
