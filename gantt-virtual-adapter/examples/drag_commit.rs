use chrono::NaiveDate;
use gantt_virtual::{Accessors, DragMode, GanttOptions, RowSet};
use gantt_virtual_adapter::Controller;

#[derive(Clone, Debug)]
struct Task {
    id: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

fn main() {
    // Example: a resize gesture that ends in a snapped date proposal.
    //
    // The controller never mutates host data. The host receives the record and the proposed
    // dates, updates its own store, then hands the new rows back with set_rows.
    let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).expect("valid date");
    let mut tasks = vec![
        Task {
            id: "design".into(),
            start: Some(day(2)),
            end: Some(day(5)),
        },
        Task {
            id: "build".into(),
            start: Some(day(8)),
            end: Some(day(19)),
        },
    ];
    let accessors = Accessors::new(|t: &Task| t.id.clone(), |t: &Task| t.start, |t: &Task| t.end);
    let options = GanttOptions::explicit(day(1), day(31));
    let mut c = Controller::new(
        options,
        accessors,
        RowSet::flat(tasks.clone(), |t| t.id.clone()),
    )
    .expect("explicit range is valid");
    c.on_viewport(1200, 400, 0);
    c.flush_layout(0);

    c.begin_drag("design", DragMode::ResizeEnd)
        .expect("bar is laid out");
    for delta in [10.0, 40.0, 95.0, 118.0] {
        c.drag_to(delta);
        let preview = c.layout().bar("design").expect("preview bar");
        println!("delta={delta} preview x={} w={}", preview.x_px, preview.width_px);
    }

    let change = c
        .finish_edit(|task, change| {
            println!(
                "commit {}: {:?}..{:?} -> {}..{}",
                task.id, task.start, task.end, change.start_at, change.end_at
            );
        })
        .expect("row still exists")
        .expect("a drag was active");

    if let Some(t) = tasks.iter_mut().find(|t| t.id == change.row_id) {
        t.start = Some(change.start_at);
        t.end = Some(change.end_at);
    }
    c.set_rows(RowSet::flat(tasks, |t| t.id.clone()), 16);
    c.flush_layout(16);
    let bar = c.layout().bar("design").expect("bar after commit");
    println!("after commit: x={} w={}", bar.x_px, bar.width_px);
}
