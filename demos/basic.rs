use chrono::NaiveDate;
use gantt_virtual::{
    Accessors, GanttOptions, LayoutParams, RowSet, RowWindow, ScheduleLayout, WindowOptions,
    build_header, header_levels,
};

#[derive(Clone, Debug)]
struct Task {
    id: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    after: Vec<String>,
}

fn main() {
    // Example: one layout pass by hand.
    //
    // A host would:
    // - validate options once and materialize the date window
    // - build the header whenever the window, cell width or mode changes
    // - window the rows on every vertical scroll and lay out bars for the visible slice
    let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).expect("valid date");
    let options = GanttOptions::explicit(day(1, 15), day(3, 10))
        .validate()
        .expect("explicit range is valid");
    let window = options.range().window();

    let header = build_header(
        &options.mode,
        window.start_at,
        window.end_at,
        options.cell_width,
        options.week_starts_monday,
    );
    for (depth, level) in header_levels(&header, true).iter().enumerate() {
        let ids: Vec<&str> = level.iter().take(4).map(|n| n.id.as_str()).collect();
        println!("header level {depth}: {} cells, first {ids:?}", level.len());
    }

    let tasks: Vec<Task> = (0..1_000u32)
        .map(|i| Task {
            id: format!("task-{i}"),
            start: Some(day(1, 15) + chrono::Days::new(u64::from(i % 40))),
            end: (i % 7 != 0).then(|| day(1, 17) + chrono::Days::new(u64::from(i % 40))),
            after: if i > 0 {
                vec![format!("task-{}", i - 1)]
            } else {
                Vec::new()
            },
        })
        .collect();
    let accessors = Accessors::new(|t: &Task| t.id.clone(), |t: &Task| t.start, |t: &Task| t.end)
        .with_dependencies(|t: &Task| t.after.clone());
    let rows = RowSet::flat(tasks, |t| t.id.clone());

    let sizes = rows.row_sizes(options.row_height, options.group_gap, options.has_first_group_gap);
    let mut rw = RowWindow::new(WindowOptions::from_sizes(sizes).with_overscan(options.overscan));
    rw.set_viewport_and_scroll_clamped(400, 12_000);

    let params: LayoutParams = options.layout_params();
    let layout = ScheduleLayout::compute(&rows, &rw.slices(), &window, &accessors, &[], &params);
    println!(
        "rows {:?}: {} bars, {} edges, content height {}",
        rw.virtual_range(),
        layout.bars().len(),
        layout.edges().len(),
        rw.total_size()
    );
    for bar in layout.bars().iter().take(3) {
        println!(
            "  {} x={} w={} y={} hidden={}",
            bar.id, bar.x_px, bar.width_px, bar.y_px, bar.hidden
        );
    }
}
