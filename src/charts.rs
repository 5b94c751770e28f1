use crate::scenario::Scenario;
use crate::tables::read_table;
use plotters::prelude::*;
use std::error::Error;
use std::fs;
use std::path::Path;

/// Load the (scenario, total gain) entries back out of a written summary table
fn load_summary(summary_path: &Path) -> Result<Vec<(Scenario, f64)>, Box<dyn Error>> {
    let table = read_table(summary_path)?;
    if table.header != ["CSV_File", "Optimal_Gain"] {
        return Err(format!(
            "'{}' does not look like a batch summary table",
            summary_path.display()
        )
        .into());
    }

    let mut entries = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let scenario = Scenario::from_gain_path(&row[0])?;
        let gain: f64 = row[1]
            .parse()
            .map_err(|_| format!("Summary gain '{}' is not a number", row[1]))?;
        entries.push((scenario, gain));
    }
    Ok(entries)
}

/// Render both summary charts into charts/
pub fn generate_summary_charts(summary_path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all("charts")?;

    let entries = load_summary(summary_path)?;
    if entries.is_empty() {
        return Err("Summary table has no scenarios to chart".into());
    }

    let gains: Vec<f64> = entries.iter().map(|(_, gain)| *gain).collect();
    generate_gain_histogram(&gains)?;
    generate_gain_by_requesters(&entries)?;

    Ok(())
}

/// Histogram of per-scenario total channel gains, with a mean marker
fn generate_gain_histogram(gains: &[f64]) -> Result<(), Box<dyn Error>> {
    let min_val = gains.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_val = gains.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean_val = gains.iter().sum::<f64>() / gains.len() as f64;

    if max_val <= min_val {
        return Err("All total gains are identical, nothing to bin".into());
    }

    const NUM_BINS: usize = 50;
    let bin_width = (max_val - min_val) / NUM_BINS as f64;

    let mut bins = vec![0u32; NUM_BINS];
    for &gain in gains {
        let bin_idx = ((gain - min_val) / bin_width).floor() as usize;
        bins[bin_idx.min(NUM_BINS - 1)] += 1;
    }

    let max_count = *bins.iter().max().unwrap_or(&0);

    let filename = "charts/optimal_gain_histogram.png";
    let root = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Total Channel Gain Distribution", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(min_val..max_val, 0u32..max_count + max_count / 10)?;

    chart
        .configure_mesh()
        .x_desc("Total Channel Gain")
        .y_desc("Scenarios")
        .draw()?;

    chart
        .draw_series(bins.iter().enumerate().map(|(i, &count)| {
            let x0 = min_val + i as f64 * bin_width;
            let x1 = x0 + bin_width;
            Rectangle::new([(x0, 0), (x1, count)], BLUE.filled())
        }))?
        .label(format!("Scenarios (n={})", gains.len()))
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BLUE.filled()));

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(mean_val, 0), (mean_val, max_count)],
            &BLACK,
        )))?
        .label(format!("Mean: {:.2}", mean_val))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;

    println!("Histogram saved to {}", filename);
    println!(
        "Min: {:.2}, Max: {:.2}, Mean: {:.2}",
        min_val, max_val, mean_val
    );

    Ok(())
}

/// Mean total gain per requester-count: shows how much the greedy matching
/// squeezes out of a fixed channel pool as competition grows
fn generate_gain_by_requesters(entries: &[(Scenario, f64)]) -> Result<(), Box<dyn Error>> {
    // Group totals by requester count, keeping ascending order
    let mut by_fue: Vec<(usize, Vec<f64>)> = Vec::new();
    for (scenario, gain) in entries {
        match by_fue.iter_mut().find(|(fue, _)| *fue == scenario.num_fue) {
            Some((_, gains)) => gains.push(*gain),
            None => by_fue.push((scenario.num_fue, vec![*gain])),
        }
    }
    by_fue.sort_by_key(|(fue, _)| *fue);

    if by_fue.len() < 2 {
        // A single size mix has no trend to plot
        println!("Skipping gain-by-requesters chart: only one size mix in the summary");
        return Ok(());
    }

    let points: Vec<(f64, f64)> = by_fue
        .iter()
        .map(|(fue, gains)| {
            (
                *fue as f64,
                gains.iter().sum::<f64>() / gains.len() as f64,
            )
        })
        .collect();

    let x_min = points.first().map(|(x, _)| *x).unwrap_or(0.0);
    let x_max = points.last().map(|(x, _)| *x).unwrap_or(1.0);
    let y_max = points.iter().map(|(_, y)| *y).fold(f64::NEG_INFINITY, f64::max);

    let filename = "charts/gain_by_requesters.png";
    let root = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Mean Total Gain by Requester Count", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Requesters (FUE)")
        .y_desc("Mean Total Channel Gain")
        .draw()?;

    chart.draw_series(LineSeries::new(points.clone(), &RED))?;
    chart.draw_series(
        points
            .iter()
            .map(|(x, y)| Circle::new((*x, *y), 4, RED.filled())),
    )?;

    root.present()?;

    println!("Chart saved to {}", filename);

    Ok(())
}
