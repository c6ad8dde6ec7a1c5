use chrono::NaiveDate;
use gantt_virtual::{Accessors, BufferSpec, GanttOptions, RowSet};
use gantt_virtual_adapter::{Controller, Easing};

#[derive(Clone, Debug)]
struct Task {
    id: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

fn main() {
    // Example: infinite horizontal scrolling driven by a host event loop.
    //
    // An adapter would:
    // - forward every scroll event to on_scroll and apply the returned offset before painting
    // - call tick(now_ms, idle) from a frame callback or timer
    // - redraw the header whenever the date window moved, and bars whenever a layout ran
    let anchor = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
    let tasks: Vec<Task> = (0..200u64)
        .map(|i| Task {
            id: format!("task-{i}"),
            start: Some(anchor + chrono::Days::new(i % 30)),
            end: Some(anchor + chrono::Days::new(i % 30 + 4)),
        })
        .collect();
    let accessors = Accessors::new(|t: &Task| t.id.clone(), |t: &Task| t.start, |t: &Task| t.end);
    let rows = RowSet::flat(tasks, |t| t.id.clone());

    let options = GanttOptions::anchored(anchor, BufferSpec::new(1, 1))
        .with_infinite(true)
        .with_buffer_days(14);
    let mut c = Controller::new(options, accessors, rows).expect("anchored options are valid");
    c.on_viewport(800, 600, 0);
    c.flush_layout(0);
    println!(
        "window={}..{} x={} bars={}",
        c.date_window().start_at,
        c.date_window().end_at,
        c.scroll_state().x,
        c.bars().len()
    );

    // The user drags the scrollbar hard to the left: every event at the edge grows the window.
    let mut now_ms = 0u64;
    for _ in 0..3 {
        now_ms += 16;
        let out = c.on_scroll(0, 0, now_ms);
        if let Some(shift) = out.shift {
            println!(
                "t={now_ms} shift={:?} window={}..{} corrected_x={}",
                shift.edge, shift.window.start_at, shift.window.end_at, out.scroll.x
            );
        }
    }

    // Jump back to the anchor with a short tween, letting the deferred layout catch up.
    let tween = Some((240, Easing::EaseOutCubic));
    c.scroll_to_date(anchor, gantt_virtual::Align::Start, now_ms, tween);
    while c.is_animating() || c.is_layout_pending() {
        now_ms += 16;
        let frame = c.tick(now_ms, true);
        if frame.relaid_out {
            println!("t={now_ms} relayout bars={}", c.bars().len());
        }
    }
    println!("done: x={} origin_offset={}", c.scroll_state().x, c.origin_offset_px());
}
