use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use manpower_ledger::aggregate::{CompensationLayout, compensation_rollup};
use manpower_ledger::dataset::Dataset;
use manpower_ledger::normalize::Normalizer;

const ROLES: [&str; 4] = ["Engineer", "Analyst", "Designer", "Manager"];
const TEAMS: [&str; 3] = ["Dev", "Ops", "Data"];

fn salary_history(employees: usize, months: u32) -> Dataset {
    let headers = [
        "Growth Month",
        "Employee Name",
        "Employee_id",
        "Role",
        "Team",
        "Current Salary",
        "Total Cost",
        "Growth %",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect::<Vec<_>>();
    let mut rows = Vec::with_capacity(employees * months as usize);
    for employee in 0..employees {
        for month in 1..=months {
            let salary = 8_000_000 + employee as u64 * 10_000 + u64::from(month) * 50_000;
            rows.push(vec![
                format!("2024-{month:02}"),
                format!("Employee {employee:05}"),
                format!("E{employee}"),
                ROLES[employee % ROLES.len()].to_string(),
                TEAMS[employee % TEAMS.len()].to_string(),
                format!("Rp {salary}"),
                format!("Rp {}", salary + salary / 5),
                format!("{}%", month % 7),
            ]);
        }
    }
    Normalizer::default().normalize_dataset(Dataset::from_raw("Salary_Growth", &headers, rows))
}

fn bench_rollup(c: &mut Criterion) {
    let mut group = c.benchmark_group("compensation_rollup");
    for employees in [100usize, 1_000, 5_000] {
        let dataset = salary_history(employees, 12);
        let layout = CompensationLayout::detect(&dataset).expect("layout");
        group.bench_with_input(BenchmarkId::from_parameter(employees), &dataset, |b, data| {
            b.iter(|| compensation_rollup(black_box(data), black_box(&layout)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rollup);
criterion_main!(benches);
