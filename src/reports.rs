use crate::types::{AggregatedRow, ComparisonRow, Metric, SalesRecord, TopRow};
use crate::util::round2;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Group records by `(region, year, month)`, summing sales and items.
///
/// Output is sorted by key.
pub fn aggregate_sales(data: &[SalesRecord]) -> Vec<AggregatedRow> {
    #[derive(Default)]
    struct Acc {
        sales: f64,
        items: i64,
    }
    let mut map: HashMap<(String, i32, u32), Acc> = HashMap::new();
    for r in data {
        let e = map.entry((r.region.clone(), r.year, r.month)).or_default();
        e.sales += r.total_sales;
        e.items = match e.items.checked_add(r.total_items) {
            Some(v) => v,
            None => {
                tracing::warn!(
                    "Item total for {} {}-{:02} overflows, capped",
                    r.region,
                    r.year,
                    r.month
                );
                e.items.saturating_add(r.total_items)
            }
        };
    }
    let mut rows: Vec<AggregatedRow> = map
        .into_iter()
        .map(|((region, year, month), acc)| AggregatedRow {
            region,
            year,
            month,
            total_sales: acc.sales,
            total_items: acc.items,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.region
            .cmp(&b.region)
            .then(a.year.cmp(&b.year))
            .then(a.month.cmp(&b.month))
    });
    rows
}

/// Join the `month` rows of `year1` and `year2` on region.
///
/// Regions absent from either year are dropped. Growth is only computed for
/// `Metric::Growth`; when year1 sales are zero it stays `None`.
pub fn compare_regions(
    table: &[AggregatedRow],
    year1: i32,
    year2: i32,
    month: u32,
    metric: Metric,
) -> Vec<ComparisonRow> {
    let in_month = |year: i32| -> BTreeMap<&str, &AggregatedRow> {
        table
            .iter()
            .filter(|r| r.year == year && r.month == month)
            .map(|r| (r.region.as_str(), r))
            .collect()
    };
    let first = in_month(year1);
    let second = in_month(year2);

    let mut rows = Vec::new();
    for (region, a) in &first {
        let Some(b) = second.get(region) else {
            tracing::debug!("{} has no data for {}-{:02}, dropped", region, year2, month);
            continue;
        };
        let growth_pct = if metric == Metric::Growth {
            growth(a.total_sales, b.total_sales)
        } else {
            None
        };
        if metric == Metric::Growth && growth_pct.is_none() {
            tracing::debug!("{}: growth undefined, {} sales were zero", region, year1);
        }
        rows.push(ComparisonRow {
            region: region.to_string(),
            sales_year1: a.total_sales,
            sales_year2: b.total_sales,
            items_year1: a.total_items,
            items_year2: b.total_items,
            growth_pct,
        });
    }
    rows
}

fn growth(before: f64, after: f64) -> Option<f64> {
    if before == 0.0 {
        return None;
    }
    let pct = (after - before) / before * 100.0;
    pct.is_finite().then_some(pct)
}

/// The `n` rows with the largest metric value, descending.
///
/// Ties keep their input order. Rows whose metric is undefined are skipped.
pub fn top_regions(rows: &[ComparisonRow], metric: Metric, n: usize) -> Vec<TopRow> {
    let mut ranked: Vec<(&str, f64)> = rows
        .iter()
        .filter_map(|r| r.metric_value(metric).map(|v| (r.region.as_str(), v)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
        .into_iter()
        .take(n)
        .map(|(region, value)| TopRow {
            region: region.to_string(),
            metric: round2(value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(region: &str, year: i32, month: u32, sales: f64, items: i64) -> SalesRecord {
        SalesRecord {
            region: crate::normalize::canonical_region(region),
            year,
            month,
            total_sales: sales,
            total_items: items,
        }
    }

    fn agg(region: &str, year: i32, month: u32, sales: f64, items: i64) -> AggregatedRow {
        AggregatedRow {
            region: region.to_string(),
            year,
            month,
            total_sales: sales,
            total_items: items,
        }
    }

    #[test]
    fn spellings_merge_into_one_row() {
        let rows = aggregate_sales(&[
            rec("Mexico", 2022, 1, 100.0, 2),
            rec("México", 2022, 1, 50.0, 3),
        ]);
        assert_eq!(rows, vec![agg("México", 2022, 1, 150.0, 5)]);
    }

    #[test]
    fn one_row_per_key_with_exact_sums() {
        let data = vec![
            rec("Jalisco", 2022, 1, 10.25, 1),
            rec("Jalisco", 2022, 2, 7.0, 1),
            rec("Jalisco", 2022, 1, 0.5, 4),
            rec("Sonora", 2022, 1, 3.0, 1),
            rec("Jalisco", 2023, 1, 1.0, 1),
            rec("Jalisco", 2022, 1, 2.0, 2),
        ];
        let rows = aggregate_sales(&data);
        let mut keys: Vec<_> = rows.iter().map(|r| (&r.region, r.year, r.month)).collect();
        let before = keys.len();
        keys.dedup();
        assert_eq!(keys.len(), before);
        assert_eq!(rows.len(), 4);

        for row in &rows {
            let expected: f64 = data
                .iter()
                .filter(|r| r.region == row.region && r.year == row.year && r.month == row.month)
                .map(|r| r.total_sales)
                .sum();
            assert_eq!(row.total_sales, expected);
        }
        assert_eq!(rows[0], agg("Jalisco", 2022, 1, 12.75, 7));
    }

    #[test]
    fn huge_item_counts_saturate_instead_of_wrapping() {
        let csv = "final_region,year,month_num,total_sales,total_items\n\
                   Jalisco,2022,1,1,9000000000000000000\n\
                   Jalisco,2022,1,1,9000000000000000000\n";
        let (records, report) = crate::loader::load_sales_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(report.loaded_rows, 2);
        let rows = aggregate_sales(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_items, i64::MAX);
        assert_eq!(rows[0].total_sales, 2.0);
    }

    #[test]
    fn growth_is_percentage_change() {
        let table = vec![agg("Jalisco", 2021, 3, 200.0, 4), agg("Jalisco", 2022, 3, 300.0, 6)];
        let rows = compare_regions(&table, 2021, 2022, 3, Metric::Growth);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].growth_pct, Some(50.0));
        assert_eq!(rows[0].metric_value(Metric::Growth), Some(50.0));
    }

    #[test]
    fn zero_baseline_leaves_growth_undefined() {
        let table = vec![
            agg("Colima", 2021, 1, 0.0, 0),
            agg("Colima", 2022, 1, 80.0, 2),
            agg("Jalisco", 2021, 1, 100.0, 1),
            agg("Jalisco", 2022, 1, 90.0, 1),
        ];
        let rows = compare_regions(&table, 2021, 2022, 1, Metric::Growth);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region, "Colima");
        assert_eq!(rows[0].growth_pct, None);

        let top = top_regions(&rows, Metric::Growth, 5);
        assert_eq!(top, vec![TopRow { region: "Jalisco".into(), metric: -10.0 }]);
    }

    #[test]
    fn region_missing_in_one_year_is_dropped() {
        let table = vec![
            agg("Jalisco", 2021, 1, 1.0, 1),
            agg("Jalisco", 2022, 1, 2.0, 1),
            agg("Sonora", 2021, 1, 5.0, 1),
            agg("Sonora", 2022, 2, 5.0, 1),
        ];
        let rows = compare_regions(&table, 2021, 2022, 1, Metric::TotalSales);
        let regions: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(regions, vec!["Jalisco"]);
    }

    #[test]
    fn swapping_years_swaps_reported_values() {
        let table = vec![
            agg("Jalisco", 2021, 1, 1.0, 10),
            agg("Jalisco", 2022, 1, 2.0, 20),
            agg("Sonora", 2021, 1, 3.0, 30),
            agg("Sonora", 2022, 1, 4.0, 40),
            agg("Puebla", 2022, 1, 9.0, 90),
        ];
        let forward = compare_regions(&table, 2021, 2022, 1, Metric::TotalSales);
        let backward = compare_regions(&table, 2022, 2021, 1, Metric::TotalSales);
        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(&backward) {
            assert_eq!(f.region, b.region);
            assert_eq!(f.sales_year1, b.sales_year2);
            assert_eq!(f.sales_year2, b.sales_year1);
            assert_eq!(f.items_year2, b.items_year1);
        }
        assert_eq!(forward[0].metric_value(Metric::TotalSales), Some(2.0));
        assert_eq!(backward[0].metric_value(Metric::TotalSales), Some(1.0));
    }

    #[test]
    fn same_year_compares_with_itself() {
        let table = vec![agg("Jalisco", 2022, 1, 5.0, 1)];
        let rows = compare_regions(&table, 2022, 2022, 1, Metric::Growth);
        assert_eq!(rows[0].growth_pct, Some(0.0));
    }

    #[test]
    fn top_regions_is_bounded_and_descending() {
        let names = ["A", "B", "C", "D", "E", "F", "G"];
        let mut table = Vec::new();
        for (i, name) in names.iter().enumerate() {
            table.push(agg(name, 2021, 1, 1.0, 1));
            table.push(agg(name, 2022, 1, (i as f64 * 7.0) % 5.0 + 0.333, i as i64));
        }
        let rows = compare_regions(&table, 2021, 2022, 1, Metric::TotalSales);
        let top = top_regions(&rows, Metric::TotalSales, 5);
        assert_eq!(top.len(), 5);
        assert!(top.windows(2).all(|w| w[0].metric >= w[1].metric));
        assert!(top.iter().all(|r| r.metric == round2(r.metric)));
    }

    #[test]
    fn top_regions_returns_fewer_when_short() {
        let table = vec![
            agg("Jalisco", 2021, 1, 1.0, 3),
            agg("Jalisco", 2022, 1, 2.0, 4),
            agg("Sonora", 2021, 1, 1.0, 7),
            agg("Sonora", 2022, 1, 2.0, 9),
        ];
        let rows = compare_regions(&table, 2021, 2022, 1, Metric::TotalItems);
        let top = top_regions(&rows, Metric::TotalItems, 5);
        assert_eq!(
            top,
            vec![
                TopRow { region: "Sonora".into(), metric: 9.0 },
                TopRow { region: "Jalisco".into(), metric: 4.0 },
            ]
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let table = vec![
            agg("Colima", 2021, 1, 1.0, 1),
            agg("Colima", 2022, 1, 5.0, 1),
            agg("Durango", 2021, 1, 1.0, 1),
            agg("Durango", 2022, 1, 5.0, 1),
        ];
        let rows = compare_regions(&table, 2021, 2022, 1, Metric::TotalSales);
        let top = top_regions(&rows, Metric::TotalSales, 5);
        assert_eq!(top[0].region, "Colima");
        assert_eq!(top[1].region, "Durango");
    }
}
