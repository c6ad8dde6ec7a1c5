use crate::*;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Datelike, NaiveDate};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() >> 11) % (end_exclusive - start)
    }

    fn gen_range_i64(&mut self, start: i64, end_exclusive: i64) -> i64 {
        start + self.gen_range_u64(0, (end_exclusive - start) as u64) as i64
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() >> 33) & 1 == 1
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[derive(Clone, Debug)]
struct Task {
    id: &'static str,
    team: &'static str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    after: Vec<String>,
}

fn task(
    id: &'static str,
    team: &'static str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Task {
    Task {
        id,
        team,
        start,
        end,
        after: Vec::new(),
    }
}

fn accessors() -> Accessors<Task> {
    Accessors::new(|t: &Task| t.id.to_string(), |t: &Task| t.start, |t: &Task| t.end)
        .with_dependencies(|t: &Task| t.after.clone())
}

fn slices_for(sizes: &[u32]) -> Vec<VirtualSlice> {
    let mut start = 0u64;
    sizes
        .iter()
        .enumerate()
        .map(|(index, &size)| {
            let s = VirtualSlice { index, start, size };
            start += size as u64;
            s
        })
        .collect()
}

#[test]
fn month_day_header_clips_first_and_last_month() {
    let roots = build_header(&HeaderMode::MonthDay, d(2024, 1, 15), d(2024, 3, 10), 50, true);
    assert_eq!(roots.len(), 1);
    let year = &roots[0];
    assert_eq!(year.id, "2024");
    assert_eq!(year.level, HeaderLevel::Year);
    assert_eq!(year.children.len(), 3);

    let months: Vec<(&str, usize)> = year
        .children
        .iter()
        .map(|m| (m.id.as_str(), m.children.len()))
        .collect();
    assert_eq!(months, vec![("2024-01", 17), ("2024-02", 29), ("2024-03", 10)]);
    assert_eq!(year.children[0].children[0].id, "2024-01-15");
    assert_eq!(year.children[2].children[9].id, "2024-03-10");

    let leaves = header_leaves(&roots);
    assert_eq!(leaves.len(), 56);
    assert_eq!(year.size_px, 2800);
    assert_eq!(leaves.iter().map(|l| l.size_px).sum::<u64>(), 2800);
    assert_eq!(year.children[1].offset_px, 17 * 50);
}

#[test]
fn degenerate_range_yields_empty_header() {
    let roots = build_header(&HeaderMode::WeekDay, d(2024, 3, 10), d(2024, 3, 9), 50, true);
    assert!(roots.is_empty());
    let w = DateWindow::explicit(d(2024, 3, 10), d(2024, 3, 9));
    assert!(w.is_degenerate());
    assert_eq!(w.day_count(), 0);
    assert_eq!(w.days().count(), 0);
}

#[test]
fn week_day_header_keeps_straddling_week_in_its_first_year() {
    // Sat 2024-12-28 .. Sun 2025-01-05, weeks start on Monday.
    let roots = build_header(&HeaderMode::WeekDay, d(2024, 12, 28), d(2025, 1, 5), 40, true);
    assert_eq!(roots.len(), 1);
    let weeks = &roots[0].children;
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[0].id, "2024-W52");
    assert_eq!(weeks[0].leaf_count(), 2);
    assert_eq!(weeks[1].id, "2025-W01");
    assert_eq!(weeks[1].leaf_count(), 7);
    assert_eq!(weeks[1].label, "W01");
    assert_eq!(roots[0].size_px, 9 * 40);
}

#[test]
fn sunday_week_numbers_count_from_the_week_of_january_first() {
    assert_eq!(week_number(d(2023, 12, 31), false), WeekNumber { year: 2024, week: 1 });
    assert_eq!(week_number(d(2024, 1, 7), false), WeekNumber { year: 2024, week: 2 });
    assert_eq!(week_number(d(2024, 1, 7), true), WeekNumber { year: 2024, week: 1 });
}

#[test]
fn header_tiles_random_ranges() {
    let mut rng = Lcg::new(7);
    for _ in 0..200 {
        let start = add_days(d(2023, 1, 1), rng.gen_range_i64(0, 900));
        let end = add_days(start, rng.gen_range_i64(0, 420));
        let cw = rng.gen_range_u32(1, 80);
        let monday = rng.gen_bool();
        let mode = if rng.gen_bool() {
            HeaderMode::MonthDay
        } else {
            HeaderMode::WeekDay
        };
        let roots = build_header(&mode, start, end, cw, monday);

        let leaves = header_leaves(&roots);
        let expected: Vec<NaiveDate> = DateWindow::explicit(start, end).days().collect();
        assert_eq!(leaves.len(), expected.len());
        for (i, (leaf, day)) in leaves.iter().zip(&expected).enumerate() {
            assert_eq!(leaf.date, *day);
            assert_eq!(leaf.id, day_id(*day));
            assert_eq!(leaf.offset_px, i as u64 * cw as u64);
            assert_eq!(leaf.size_px, cw as u64);
        }

        fn check_sizes(node: &HeaderNode) {
            if node.is_leaf() {
                return;
            }
            assert_eq!(
                node.size_px,
                node.children.iter().map(|c| c.size_px).sum::<u64>()
            );
            assert_eq!(node.offset_px, node.children[0].offset_px);
            node.children.iter().for_each(check_sizes);
        }
        roots.iter().for_each(check_sizes);
    }
}

#[test]
fn header_levels_and_total_height() {
    let roots = build_header(&HeaderMode::MonthDay, d(2024, 1, 30), d(2024, 2, 2), 50, true);
    let levels = header_levels(&roots, true);
    assert_eq!(levels.len(), 3);
    assert_eq!(levels[0].len(), 1);
    assert_eq!(levels[1].len(), 2);
    assert_eq!(levels[2].len(), 4);
    let without_year = header_levels(&roots, false);
    assert_eq!(without_year.len(), 2);

    assert_eq!(total_header_height(3, &[30, 0], 34, Some(20)), 30 * 3 + 20);
    assert_eq!(total_header_height(2, &[], 34, None), 68);
}

#[test]
fn custom_header_mode_delegates_to_builder() {
    let mode = HeaderMode::Custom(
        CustomHeader::new(|start, end, cw, _| {
            let days = day_offset(end, start) as u64 + 1;
            vec![HeaderNode {
                id: "all".into(),
                label: "All".into(),
                level: HeaderLevel::Day,
                date: start,
                offset_px: 0,
                size_px: days * cw as u64,
                children: Vec::new(),
            }]
        })
        .with_period_end(|date, _| date.day() == 15),
    );
    let roots = build_header(&mode, d(2024, 1, 1), d(2024, 1, 10), 10, true);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].size_px, 100);
    assert!(is_period_end(&mode, d(2024, 1, 15), true));
    assert!(!is_period_end(&mode, d(2024, 1, 31), true));
    assert!(is_period_end(&HeaderMode::MonthDay, d(2024, 2, 29), true));
    assert!(is_period_end(&HeaderMode::WeekDay, d(2024, 1, 7), true));
    assert!(is_period_end(&HeaderMode::WeekDay, d(2024, 1, 6), false));
}

#[test]
fn pixel_round_trip_for_random_dates() {
    let mut rng = Lcg::new(11);
    for _ in 0..1000 {
        let origin = add_days(d(2024, 6, 1), rng.gen_range_i64(-2000, 2000));
        let date = add_days(origin, rng.gen_range_i64(-3000, 3000));
        let cw = rng.gen_range_u32(1, 200);
        let x = pixel_x(date, origin, cw);
        assert_eq!(date_from_pixel(x as f64, origin, cw), date);
    }
}

#[test]
fn window_includes_every_intersecting_row_plus_overscan() {
    let mut rng = Lcg::new(3);
    for _ in 0..150 {
        let count = rng.gen_range_usize(1, 300);
        let sizes: Vec<u32> = (0..count).map(|_| rng.gen_range_u32(1, 80)).collect();
        let overscan = rng.gen_range_usize(0, 6);
        let w = Window::new(WindowOptions::from_sizes(sizes.clone()).with_overscan(overscan));
        let total: u64 = sizes.iter().map(|&s| s as u64).sum();
        assert_eq!(w.total_size(), total);

        let view = rng.gen_range_u32(1, 900);
        let max = total.saturating_sub(view as u64);
        let offset = rng.gen_range_u64(0, max + 1);

        let mut start = 0u64;
        let mut hit = Vec::new();
        for (i, &s) in sizes.iter().enumerate() {
            let end = start + s as u64;
            if start < offset + view as u64 && end > offset {
                hit.push(i);
            }
            start = end;
        }
        let first = hit[0];
        let last = *hit.last().unwrap();
        let expected = IndexRange {
            start_index: first.saturating_sub(overscan),
            end_index: (last + 1 + overscan).min(count),
        };
        assert_eq!(w.virtual_range_for(offset, view), expected);

        let mut slices = Vec::new();
        w.for_each_slice_for(offset, view, |s| slices.push(s));
        assert_eq!(slices.len(), expected.len());
        for s in &slices {
            assert_eq!(Some(s.start), w.item_start(s.index));
            assert_eq!(s.size, sizes[s.index]);
        }
    }
}

#[test]
fn window_count_changes_are_incremental() {
    let sizes: Arc<[u32]> = (0..50u32).map(|i| 10 + i % 7).collect::<Vec<_>>().into();
    let shared = Arc::clone(&sizes);
    let mut w = Window::new(WindowOptions::new(20, move |i| shared[i]));
    assert_eq!(w.total_size(), sizes[..20].iter().map(|&s| s as u64).sum::<u64>());
    w.set_count(50);
    assert_eq!(w.total_size(), sizes.iter().map(|&s| s as u64).sum::<u64>());
    w.set_count(5);
    assert_eq!(w.total_size(), sizes[..5].iter().map(|&s| s as u64).sum::<u64>());
    assert_eq!(w.item_start(4), Some(sizes[..4].iter().map(|&s| s as u64).sum::<u64>()));
}

#[test]
fn resizing_a_row_above_the_viewport_keeps_content_in_place() {
    let mut w = Window::new(WindowOptions::new(100, |_| 20));
    w.set_viewport_and_scroll(100, 200);
    assert_eq!(w.resize_item(2, 30), 10);
    assert_eq!(w.scroll_offset(), 210);
    assert_eq!(w.resize_item(50, 40), 0);
    assert_eq!(w.scroll_offset(), 210);
    assert_eq!(w.total_size(), 100 * 20 + 10 + 20);
}

#[test]
fn scroll_to_index_alignment() {
    let mut w = Window::new(WindowOptions::new(100, |_| 10).with_padding(5, 5));
    w.set_viewport_size(50);
    assert_eq!(w.scroll_to_index_offset(10, Align::Start), 105);
    assert_eq!(w.scroll_to_index_offset(10, Align::End), 65);
    assert_eq!(w.scroll_to_index_offset(10, Align::Center), 85);
    assert_eq!(w.scroll_to_index_offset(99, Align::Start), w.max_scroll_offset());
    assert_eq!(w.scroll_to_index_offset(2, Align::Auto), 0);
}

#[test]
fn visible_day_columns_follow_uniform_cells() {
    let w = DateWindow::explicit(d(2024, 1, 1), d(2024, 1, 10));
    assert_eq!(
        w.visible_days(0, 120, 50, 1),
        IndexRange {
            start_index: 0,
            end_index: 4
        }
    );
    assert_eq!(w.date_at_x(99.0, 50), d(2024, 1, 2));
    assert_eq!(w.x_of(d(2024, 1, 3), 50), 100);
}

#[test]
fn leaf_bar_position_and_width() {
    let rows = RowSet::flat(
        vec![task("a", "x", Some(d(2024, 1, 10)), Some(d(2024, 1, 12)))],
        |t| t.id.to_string(),
    );
    let window = DateWindow::explicit(d(2024, 1, 10), d(2024, 3, 1));
    let params = LayoutParams {
        cell_width: 50,
        min_bar_range_days: 1,
        ..LayoutParams::default()
    };
    let bars = layout_bars(&rows, &slices_for(&[34]), &window, &accessors(), &[], &params);
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].x_px, 0.0);
    assert_eq!(bars[0].width_px, 150.0);
    assert_eq!(bars[0].y_px, 0.0);
    assert_eq!(bars[0].height_px, 34.0);
    assert!(!bars[0].hidden);
    assert!(bars[0].draggable());
}

#[test]
fn bars_measure_from_the_stable_origin() {
    let rows = RowSet::flat(
        vec![task("a", "x", Some(d(2024, 1, 10)), Some(d(2024, 1, 10)))],
        |t| t.id.to_string(),
    );
    let window = DateWindow::explicit(d(2024, 1, 1), d(2024, 2, 1)).shift_days(-10);
    let bars = layout_bars(
        &rows,
        &slices_for(&[34]),
        &window,
        &accessors(),
        &[],
        &LayoutParams::default(),
    );
    assert_eq!(bars[0].x_px, 9.0 * 50.0);
    assert_eq!(window.origin_offset_px(50), 500);
}

#[test]
fn missing_dates_hide_bars_but_keep_minimum_width() {
    let mut rng = Lcg::new(21);
    for _ in 0..300 {
        let base = add_days(d(2024, 1, 1), rng.gen_range_i64(0, 200));
        let start = rng.gen_bool().then_some(base);
        let end = rng
            .gen_bool()
            .then(|| add_days(base, rng.gen_range_i64(-5, 30)));
        let min_days = rng.gen_range_u32(1, 5);
        let cw = rng.gen_range_u32(1, 90);
        let params = LayoutParams {
            cell_width: cw,
            min_bar_range_days: min_days,
            group_gap: 0,
            has_first_group_gap: false,
        };
        let rows = RowSet::flat(vec![task("t", "x", start, end)], |t| t.id.to_string());
        let window = DateWindow::explicit(d(2024, 1, 1), d(2024, 12, 31));
        let bars = layout_bars(&rows, &slices_for(&[30]), &window, &accessors(), &[], &params);
        let bar = &bars[0];
        assert_eq!(bar.hidden, start.is_none() || end.is_none());
        assert_eq!(bar.empty_range, start.is_none() && end.is_none());
        assert!(bar.width_px >= (min_days * cw) as f64);
        assert_eq!(bar.draggable(), !bar.hidden);
    }
}

#[test]
fn end_only_bar_starts_min_range_before_end() {
    let rows = RowSet::flat(vec![task("t", "x", None, Some(d(2024, 1, 20)))], |t| {
        t.id.to_string()
    });
    let window = DateWindow::explicit(d(2024, 1, 1), d(2024, 2, 1));
    let params = LayoutParams {
        min_bar_range_days: 2,
        ..LayoutParams::default()
    };
    let bars = layout_bars(&rows, &slices_for(&[34]), &window, &accessors(), &[], &params);
    assert_eq!(bars[0].x_px, 17.0 * 50.0);
    assert_eq!(bars[0].width_px, 3.0 * 50.0);
    assert!(bars[0].hidden);
    assert!(!bars[0].empty_range);
}

fn grouped_tasks() -> Vec<Task> {
    vec![
        task("a", "red", Some(d(2024, 1, 5)), Some(d(2024, 1, 8))),
        task("b", "blue", Some(d(2024, 1, 2)), Some(d(2024, 1, 3))),
        task("c", "red", Some(d(2024, 1, 1)), Some(d(2024, 1, 4))),
        task("d", "blue", None, Some(d(2024, 1, 20))),
    ]
}

#[test]
fn grouped_rows_follow_first_seen_order() {
    let acc = accessors();
    let spec = GroupSpec::new("team", |t: &Task| t.team.to_string());
    let specs = core::slice::from_ref(&spec);
    let rows = RowSet::grouped(grouped_tasks(), |t| t.id.to_string(), specs, &Expanded::All);
    let ids: Vec<&str> = rows.rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["team:red", "a", "c", "team:blue", "b", "d"]);
    assert_eq!(rows.index_of("team:blue"), Some(3));
    assert_eq!(
        rows.row(1).and_then(Row::group_tag).map(|t| t.value.as_str()),
        Some("red")
    );

    let mut open = IdSet::new();
    open.insert("blue".to_string());
    let partial =
        RowSet::grouped(grouped_tasks(), |t| t.id.to_string(), specs, &Expanded::Values(open));
    let ids: Vec<&str> = partial.rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["team:red", "team:blue", "b", "d"]);

    let collapsed = RowSet::grouped(grouped_tasks(), |t| t.id.to_string(), specs, &Expanded::None);
    assert_eq!(collapsed.len(), 2);
    let view = collapsed.group_view(&collapsed.rows()[0]).unwrap();
    assert_eq!(view.leaves().len(), 2);
    let agg = GroupAggregate::min_start_max_end(&view, &acc);
    assert_eq!(agg.start, Some(d(2024, 1, 1)));
    assert_eq!(agg.end, Some(d(2024, 1, 8)));
    assert_eq!(agg.count, 2);

    assert_eq!(rows.row_sizes(34, 10, false), vec![34, 34, 34, 44, 34, 34]);
    assert_eq!(rows.row_sizes(34, 10, true)[0], 44);
}

#[test]
fn group_bars_need_an_aggregate_builder() {
    let acc = accessors();
    let window = DateWindow::explicit(d(2024, 1, 1), d(2024, 2, 1));
    let params = LayoutParams::default();

    let plain = GroupSpec::new("team", |t: &Task| t.team.to_string());
    let plain = core::slice::from_ref(&plain);
    let rows = RowSet::grouped(grouped_tasks(), |t| t.id.to_string(), plain, &Expanded::All);
    let sizes = rows.row_sizes(34, 10, false);
    let slices = slices_for(&sizes);
    let bars = layout_bars(&rows, &slices, &window, &acc, plain, &params);
    assert_eq!(bars.len(), 4);
    assert!(bars.iter().all(|b| !b.is_group_aggregate));

    let agg = GroupSpec::new("team", |t: &Task| t.team.to_string())
        .with_min_start_max_end(&acc)
        .with_fixed_x(true);
    let bars = layout_bars(&rows, &slices, &window, &acc, core::slice::from_ref(&agg), &params);
    assert_eq!(bars.len(), 6);
    let red = &bars[0];
    assert!(red.is_group_aggregate);
    assert_eq!(red.id, "team:red");
    assert_eq!(red.x_px, 0.0);
    assert_eq!(red.width_px, 8.0 * 50.0);
    assert_eq!((red.y_px, red.height_px), (0.0, 34.0));
    assert!(!red.draggable());

    let blue = &bars[3];
    assert_eq!(blue.row_index, 3);
    assert_eq!(blue.y_px, (34.0 * 3.0) + 10.0);
    assert_eq!(blue.height_px, 34.0);
    // Only "b" contributes a start; "d" still widens the end.
    assert_eq!(blue.start_at, Some(d(2024, 1, 2)));
    assert_eq!(blue.end_at, Some(d(2024, 1, 20)));
}

#[test]
fn group_bars_use_the_row_set_specs_unless_overridden() {
    let acc = accessors();
    let window = DateWindow::explicit(d(2024, 1, 1), d(2024, 2, 1));
    let params = LayoutParams::default();
    let agg = GroupSpec::new("team", |t: &Task| t.team.to_string())
        .with_min_start_max_end(&acc);
    let rows = RowSet::grouped(
        grouped_tasks(),
        |t| t.id.to_string(),
        core::slice::from_ref(&agg),
        &Expanded::All,
    );
    assert_eq!(rows.groups().len(), 1);
    let slices = slices_for(&rows.row_sizes(34, 10, false));

    let bars = layout_bars(&rows, &slices, &window, &acc, &[], &params);
    assert_eq!(bars.len(), 6);
    assert_eq!(bars.iter().filter(|b| b.is_group_aggregate).count(), 2);

    let plain = GroupSpec::new("team", |t: &Task| t.team.to_string());
    let bars = layout_bars(&rows, &slices, &window, &acc, &[plain], &params);
    assert_eq!(bars.len(), 4);

    // A flat set has no specs to fall back on.
    let flat = RowSet::flat(grouped_tasks(), |t| t.id.to_string());
    assert!(flat.groups().is_empty());
}

#[test]
fn nested_groups_cover_their_subtree() {
    let acc = accessors();
    let specs = [
        GroupSpec::new("team", |t: &Task| t.team.to_string())
            .with_min_start_max_end(&acc),
        GroupSpec::new("span", |t: &Task| {
            if t.start.is_some() { "planned" } else { "loose" }.to_string()
        })
        .with_min_start_max_end(&acc),
    ];
    let rows = RowSet::grouped(grouped_tasks(), |t| t.id.to_string(), &specs, &Expanded::All);
    let ids: Vec<&str> = rows.rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "team:red",
            "team:red/span:planned",
            "a",
            "c",
            "team:blue",
            "team:blue/span:planned",
            "b",
            "team:blue/span:loose",
            "d",
        ]
    );
    let depths: Vec<Option<usize>> = rows.rows().iter().map(Row::group_depth).collect();
    assert_eq!(depths, vec![Some(0), Some(1), None, None, Some(0), Some(1), None, Some(1), None]);
    assert_eq!(
        rows.get("a").and_then(Row::group_tag).map(|t| t.value.as_str()),
        Some("planned")
    );
    let blue = rows.group_view(&rows.rows()[4]).unwrap();
    assert_eq!(blue.leaves().len(), 2);

    // Every group row reserves the gap, at any depth.
    assert_eq!(rows.row_sizes(34, 10, false), vec![34, 44, 34, 34, 44, 44, 34, 44, 34]);

    let window = DateWindow::explicit(d(2024, 1, 1), d(2024, 2, 1));
    let slices = slices_for(&rows.row_sizes(34, 10, false));
    let bars = layout_bars(&rows, &slices, &window, &acc, &[], &LayoutParams::default());
    assert_eq!(bars.len(), 9);
    let bar = |id: &str| bars.iter().find(|b| b.id == id).unwrap();

    let red = bar("team:red");
    assert!(red.is_group_aggregate);
    assert_eq!((red.x_px, red.width_px), (0.0, 8.0 * 50.0));
    let red_planned = bar("team:red/span:planned");
    assert_eq!((red_planned.x_px, red_planned.width_px), (0.0, 8.0 * 50.0));
    assert_eq!(red_planned.y_px, 34.0 + 10.0);

    let blue = bar("team:blue");
    assert_eq!((blue.x_px, blue.width_px), (50.0, 19.0 * 50.0));
    let blue_planned = bar("team:blue/span:planned");
    assert_eq!((blue_planned.x_px, blue_planned.width_px), (50.0, 2.0 * 50.0));
    let loose = bar("team:blue/span:loose");
    assert_eq!((loose.start_at, loose.end_at), (None, Some(d(2024, 1, 20))));

    let mut open = IdSet::new();
    open.insert("team:blue".to_string());
    open.insert("team:blue/span:loose".to_string());
    let partial =
        RowSet::grouped(grouped_tasks(), |t| t.id.to_string(), &specs, &Expanded::Values(open));
    let ids: Vec<&str> = partial.rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "team:red",
            "team:blue",
            "team:blue/span:planned",
            "team:blue/span:loose",
            "d",
        ]
    );
    assert_eq!(partial.group_view(&partial.rows()[2]).unwrap().leaves().len(), 1);
}

#[test]
fn edges_resolve_visible_rows_only() {
    let mut tasks = vec![
        task("a", "x", Some(d(2024, 1, 1)), Some(d(2024, 1, 2))),
        task("b", "x", Some(d(2024, 1, 3)), Some(d(2024, 1, 4))),
        task("c", "x", Some(d(2024, 1, 5)), Some(d(2024, 1, 6))),
    ];
    tasks[1].after = vec!["a".into(), "ghost".into()];
    tasks[2].after = vec!["a".into(), "b".into()];
    let rows = RowSet::flat(tasks, |t| t.id.to_string());
    let slices = slices_for(&[34, 34, 34]);

    let all = layout_edges(&rows, &slices, &accessors());
    let ids: Vec<&str> = all.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a:b", "a:c", "b:c"]);

    let only_b = layout_edges(&rows, &slices[1..2], &accessors());
    assert_eq!(only_b, vec![Edge::new("a", "b")]);
}

#[test]
fn schedule_layout_indexes_bars_and_overrides_transiently() {
    let rows = RowSet::flat(
        vec![
            task("a", "x", Some(d(2024, 1, 1)), Some(d(2024, 1, 2))),
            task("b", "x", Some(d(2024, 1, 3)), Some(d(2024, 1, 4))),
        ],
        |t| t.id.to_string(),
    );
    let window = DateWindow::explicit(d(2024, 1, 1), d(2024, 2, 1));
    let mut layout = ScheduleLayout::compute(
        &rows,
        &slices_for(&[34, 34]),
        &window,
        &accessors(),
        &[],
        &LayoutParams::default(),
    );
    assert_eq!(layout.index().len(), 2);
    assert_eq!(layout.bar("b").map(|b| b.x_px), Some(100.0));
    assert_eq!(
        layout.try_bar("zzz"),
        Err(GanttError::BarNotFound {
            bar_id: "zzz".into()
        })
    );

    let mut moved = layout.bar("b").unwrap().clone();
    moved.x_px = 400.0;
    layout.set_override(moved);
    assert_eq!(layout.bar("b").map(|b| b.x_px), Some(400.0));
    layout.clear_override();
    assert_eq!(layout.bar("b").map(|b| b.x_px), Some(100.0));

    let created = create_bar(
        &rows,
        "a",
        120.0,
        d(2024, 1, 10),
        &slices_for(&[34])[0],
        &window,
        &LayoutParams::default(),
    )
    .unwrap();
    assert!(created.creating);
    assert_eq!(created.start_at, Some(d(2024, 1, 10)));
    assert_eq!(created.end_at, Some(d(2024, 1, 12)));

    let mut fresh = created.clone();
    fresh.id = "new".into();
    layout.set_override(fresh);
    assert_eq!(layout.bars().len(), 3);
    assert!(layout.override_bar().is_some_and(|b| b.id == "new"));
    layout.clear_override();
    assert_eq!(layout.bars().len(), 2);
    assert!(layout.bar("new").is_none());
}

#[test]
fn create_bar_clamps_end_and_rejects_unknown_rows() {
    let rows = RowSet::flat(vec![task("a", "x", None, None)], |t| t.id.to_string());
    let window = DateWindow::explicit(d(2024, 1, 1), d(2024, 2, 1));
    let slice = VirtualSlice {
        index: 0,
        start: 0,
        size: 34,
    };
    let params = LayoutParams::default();
    let narrow = create_bar(&rows, "a", 30.0, d(2024, 1, 5), &slice, &window, &params).unwrap();
    assert_eq!(narrow.start_at, narrow.end_at);
    let err = create_bar(&rows, "nope", 30.0, d(2024, 1, 5), &slice, &window, &params);
    assert_eq!(
        err,
        Err(GanttError::RowNotFound {
            row_id: "nope".into()
        })
    );
}

fn sample_bar(x: f64, width: f64) -> Bar {
    Bar {
        id: "a".into(),
        owner_row_id: "a".into(),
        row_index: 0,
        start_at: None,
        end_at: None,
        x_px: x,
        y_px: 0.0,
        width_px: width,
        height_px: 34.0,
        min_width_px: 50.0,
        hidden: false,
        empty_range: false,
        is_group_aggregate: false,
        fixed_x: false,
        creating: false,
    }
}

#[test]
fn resize_end_converts_snapped_edges_to_dates() {
    let origin = d(2024, 1, 1);
    // Days 2..4 (origin + 2 .. origin + 4).
    let bar = sample_bar(100.0, 150.0);
    assert_eq!(on_resize_end(50, &bar, origin), (d(2024, 1, 3), d(2024, 1, 5)));

    let mut grow = DragSession::begin(&bar, DragMode::ResizeEnd).unwrap();
    grow.update(30.0);
    let change = grow.finish(&BarEditor::new(50), origin);
    assert_eq!(change.row_id, "a");
    assert_eq!((change.start_at, change.end_at), (d(2024, 1, 3), d(2024, 1, 6)));
    assert_eq!(change.width_px, 200.0);

    let mut nudge = DragSession::begin(&bar, DragMode::ResizeEnd).unwrap();
    nudge.update(10.0);
    assert_eq!(nudge.preview().width_px, 160.0);
    let change = nudge.finish(&BarEditor::new(50), origin);
    assert_eq!(change.end_at, d(2024, 1, 5));

    let mut left = DragSession::begin(&bar, DragMode::ResizeStart).unwrap();
    left.update(-30.0);
    let change = left.finish(&BarEditor::new(50), origin);
    assert_eq!((change.start_at, change.end_at), (d(2024, 1, 2), d(2024, 1, 5)));

    let mut shrink = DragSession::begin(&bar, DragMode::ResizeEnd).unwrap();
    shrink.update(-500.0);
    assert_eq!(shrink.preview().width_px, 50.0);
}

#[test]
fn move_drag_floors_the_left_edge() {
    let origin = d(2024, 1, 1);
    let bar = sample_bar(100.0, 150.0);
    let mut s = DragSession::begin(&bar, DragMode::Move).unwrap();
    s.update(140.0);
    let change = s.finish(&BarEditor::new(50), origin);
    assert_eq!(change.x_px, 200.0);
    assert_eq!((change.start_at, change.end_at), (d(2024, 1, 5), d(2024, 1, 7)));
}

#[test]
fn hidden_and_fixed_bars_reject_drags() {
    let mut hidden = sample_bar(0.0, 50.0);
    hidden.hidden = true;
    assert!(DragSession::begin(&hidden, DragMode::Move).is_none());
    let mut fixed = sample_bar(0.0, 50.0);
    fixed.fixed_x = true;
    assert!(DragSession::begin(&fixed, DragMode::ResizeEnd).is_none());
    assert_eq!(cell_index_at(-1.0, 50), -1);
    assert_eq!(cell_index_at(99.0, 50), 1);
}

#[test]
fn milestones_and_rest_days_decorate_visible_columns() {
    let window = DateWindow::explicit(d(2024, 1, 1), d(2024, 1, 31));
    let milestones = Milestones::new(vec![
        Milestone::new(d(2024, 1, 10)).with_label("beta"),
        Milestone::new(d(2024, 1, 3)).with_color("red"),
    ]);
    assert_eq!(
        milestones.milestone_for(d(2024, 1, 10)).map(Milestone::color_or_default),
        Some(DEFAULT_MILESTONE_COLOR)
    );
    assert!(milestones.milestone_for(d(2024, 1, 11)).is_none());

    let decorator = DayDecorator::new(HeaderMode::WeekDay, true)
        .with_milestones(milestones)
        .with_rest_day(|date| date == d(2024, 1, 1));
    let range = IndexRange {
        start_index: 0,
        end_index: 8,
    };
    let tags = |date: NaiveDate| (date.day() % 2 == 0).then_some("late");
    let days = decorator.decorate(&window, range, 50, tags, Some(&"late"));
    assert_eq!(days.len(), 8);
    assert!(days[0].is_rest);
    assert!(!days[5].is_rest); // Saturday, but the host predicate wins.
    assert!(days[6].is_period_end); // Sunday closes a Monday-start week.
    assert_eq!(days[2].milestone.as_ref().and_then(|m| m.color.as_deref()), Some("red"));
    assert_eq!(days[3].x_px, 150);
    assert!(days[1].emphasized);
    assert!(!days[0].emphasized);

    let weekend = DayDecorator::default();
    assert!(weekend.is_rest(d(2024, 1, 6)));
    assert!(!weekend.is_rest(d(2024, 1, 5)));
}

#[test]
fn alert_map_is_memoized_per_window_and_revision() {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&builds);
    let mut alerts: AlertOverlay<Task, Vec<NaiveDate>, &'static str> = AlertOverlay::new(
        move |_w: &DateWindow, tasks: &[Task]| {
            counter.fetch_add(1, Ordering::SeqCst);
            tasks.iter().filter_map(|t| t.end).collect()
        },
        |date, ends: &Vec<NaiveDate>| ends.contains(&date).then_some("due"),
    );
    let tasks = vec![task("a", "x", None, Some(d(2024, 1, 4)))];
    let w = DateWindow::explicit(d(2024, 1, 1), d(2024, 1, 31));
    assert!(alerts.tag_for(d(2024, 1, 4)).is_none());

    alerts.refresh(&w, &tasks, 0);
    alerts.refresh(&w, &tasks, 0);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(alerts.tag_for(d(2024, 1, 4)), Some("due"));

    alerts.refresh(&w.shift_days(1), &tasks, 0);
    alerts.refresh(&w.shift_days(1), &tasks, 1);
    assert_eq!(builds.load(Ordering::SeqCst), 3);
}

#[test]
fn options_validation_resolves_the_range_form() {
    let explicit = GanttOptions::explicit(d(2024, 1, 1), d(2024, 3, 1))
        .validate()
        .unwrap();
    assert_eq!(
        explicit.range().window(),
        DateWindow::explicit(d(2024, 1, 1), d(2024, 3, 1))
    );
    assert_eq!(explicit.cell_width, 50);

    let anchored = GanttOptions {
        anchor: Some(d(2024, 5, 31)),
        ..GanttOptions::default()
    }
    .validate()
    .unwrap();
    assert_eq!(
        anchored.range(),
        RangeSource::Anchored {
            anchor: d(2024, 5, 31),
            buffer: BufferSpec::new(3, 2)
        }
    );

    let both =
        GanttOptions::explicit(d(2024, 1, 1), d(2024, 3, 1)).with_anchor(d(2024, 2, 1), [2u32]);
    assert_eq!(both.validate(), Err(GanttError::ConflictingRange));

    let half = GanttOptions {
        start_at: Some(d(2024, 1, 1)),
        ..GanttOptions::default()
    };
    assert_eq!(half.validate(), Err(GanttError::IncompleteRange));
    assert_eq!(GanttOptions::default().validate(), Err(GanttError::IncompleteRange));

    let zero = GanttOptions::explicit(d(2024, 1, 1), d(2024, 3, 1)).with_cell_width(0);
    assert_eq!(zero.validate(), Err(GanttError::InvalidCellWidth { width: 0 }));
}

struct ShortMonths;

impl HeaderLabels for ShortMonths {
    fn month(&self, first_day: NaiveDate) -> String {
        ["Jan", "Feb", "Mar"][first_day.month0() as usize % 3].to_string()
    }
}

#[test]
fn custom_labels_leave_ids_and_geometry_alone() {
    let roots = build_header_with(
        &ShortMonths,
        &HeaderMode::MonthDay,
        d(2024, 1, 30),
        d(2024, 2, 2),
        40,
        true,
    );
    assert_eq!(roots.len(), 1);
    let months = &roots[0].children;
    assert_eq!((months[0].id.as_str(), months[0].label.as_str()), ("2024-01", "Jan"));
    assert_eq!((months[1].id.as_str(), months[1].label.as_str()), ("2024-02", "Feb"));
    assert_eq!(months[1].offset_px, 80);
    assert_eq!(months[1].children[0].label, "1");
}

#[test]
fn column_window_virtualizes_table_columns() {
    let widths = [120u32, 80, 200, 60, 60, 150];
    let mut cols = ColumnWindow::new(WindowOptions::from_sizes(widths.to_vec()).with_overscan(1));
    cols.set_viewport_and_scroll_clamped(250, 130);
    assert_eq!(cols.total_size(), 670);
    assert_eq!(
        cols.visible_range(),
        IndexRange {
            start_index: 1,
            end_index: 3
        }
    );
    let starts: Vec<u64> = cols.slices().iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![0, 120, 200, 400]);
}
