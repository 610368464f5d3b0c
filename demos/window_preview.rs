// Prints the window query issued for one observation against every default
// environmental dataset. Needs no network access.
use chrono::NaiveDate;
use cyano_colocalize::{
    build_window, render_sql, uses_month_fallback, Catalog, Observation, ResolvedDataset,
    TemporalCoverage,
};

fn main() {
    let Some(time) = NaiveDate::from_ymd_opt(2016, 4, 20).and_then(|d| d.and_hms_opt(6, 30, 0))
    else {
        return;
    };
    let observation = Observation::new(time, 21.5, -158.0, 5.0);

    // Pretend every non-climatology dataset covers 2002..2022.
    let coverage = TemporalCoverage::new(
        NaiveDate::from_ymd_opt(2002, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(time),
        NaiveDate::from_ymd_opt(2022, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(time),
    );

    for dataset in Catalog::default().environmental {
        let coverage = if dataset.is_climatology {
            TemporalCoverage::default()
        } else {
            coverage
        };
        let resolved = ResolvedDataset::new(dataset, coverage);
        match build_window(&observation, &resolved) {
            Ok(window) => println!(
                "{} (month fallback: {})\n  {}\n",
                resolved.table(),
                uses_month_fallback(&observation, &resolved),
                render_sql(&window)
            ),
            Err(e) => eprintln!("{}: {}", resolved.table(), e),
        }
    }
}
