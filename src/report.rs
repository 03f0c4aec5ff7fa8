use crate::axis::format_tick;
use crate::pipeline::Chart;

/// Print the series tables and axis plan to stdout
pub fn print_series(chart: &Chart) {
    println!("{}", format_series(chart));
}

/// Text report of a chart: one table per series, then the x axis plan
pub fn format_series(chart: &Chart) -> String {
    let mut lines = vec![
        String::new(),
        format!("{:=<60}", ""),
        chart.labels.title.clone(),
        format!("{:=<60}", ""),
        String::new(),
    ];

    for series in &chart.series {
        let mut heading = format!("Series: {}", series.id.label(&chart.labels.key_suffix));
        if let Some(style) = chart.styles.get(&series.id) {
            heading.push_str(&format!("  [{} {:?}]", style.color.hex(), style.marker));
        }
        lines.push(heading);
        lines.push(format!("{:-<40}", ""));
        lines.push(format!("  {:>14} {:>18}", "Input size", "Throughput"));

        for &(x, y) in &series.points {
            lines.push(format!("  {:>14} {:>18.2}", format_tick(x), y));
        }
        lines.push(String::new());
    }

    lines.push(format!("X axis: {}", chart.axis.scale));
    if chart.axis.tick_labels.is_empty() {
        lines.push(format!(
            "  range {} .. {}",
            format_tick(chart.axis.range.0),
            format_tick(chart.axis.range.1)
        ));
    } else {
        lines.push(format!("  ticks {}", chart.axis.tick_labels.join(", ")));
    }

    lines.join("\n")
}
