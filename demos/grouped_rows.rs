use chrono::NaiveDate;
use gantt_virtual::{
    Accessors, DateWindow, Expanded, GroupSpec, LayoutParams, RowSet, RowWindow, ScheduleLayout,
    WindowOptions,
};

#[derive(Clone, Debug)]
struct Task {
    id: &'static str,
    team: &'static str,
    start: NaiveDate,
    end: NaiveDate,
}

fn main() {
    // Example: group rows with an aggregate bar spanning their leaves.
    //
    // The engine does not decide how a group's extent is computed: the host attaches an
    // aggregate builder to the `GroupSpec` (here the conventional min start / max end). The row
    // set keeps its specs, so the layout finds the builder without being handed it again.
    let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).expect("valid date");
    let tasks = vec![
        Task { id: "design", team: "web", start: day(3), end: day(7) },
        Task { id: "api", team: "core", start: day(1), end: day(12) },
        Task { id: "build", team: "web", start: day(8), end: day(20) },
        Task { id: "deploy", team: "core", start: day(13), end: day(14) },
    ];
    let accessors = Accessors::new(
        |t: &Task| t.id.to_string(),
        |t: &Task| Some(t.start),
        |t: &Task| Some(t.end),
    );
    let specs = [GroupSpec::new("team", |t: &Task| t.team.to_string())
        .with_min_start_max_end(&accessors)
        .with_fixed_x(true)];
    let rows = RowSet::grouped(tasks, |t| t.id.to_string(), &specs, &Expanded::All);

    let params = LayoutParams {
        group_gap: 12,
        ..LayoutParams::default()
    };
    let sizes = rows.row_sizes(34, params.group_gap, params.has_first_group_gap);
    let mut rw = RowWindow::new(WindowOptions::from_sizes(sizes).with_padding(0, params.group_gap));
    rw.set_viewport_size(600);

    let window = DateWindow::explicit(day(1), day(30));
    let layout = ScheduleLayout::compute(
        &rows,
        &rw.slices(),
        &window,
        &accessors,
        &[],
        &params,
    );
    for bar in layout.bars() {
        let kind = if bar.is_group_aggregate { "group" } else { "task" };
        println!(
            "{kind:>5} {:<10} x={:>4} w={:>4} y={:>4} draggable={}",
            bar.id,
            bar.x_px,
            bar.width_px,
            bar.y_px,
            bar.draggable()
        );
    }
}
