#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_precision_loss)]

//! Loads a word list (one key per line) or random keys into a table, then erases, looks up and
//! reports probe statistics. Finishes with a load factor sweep plotted to
//! `average_probe_distance.png`.
//!
//! Usage: `probe_report [WORDS_FILE]`

use std::{env, error::Error, fs, time::Instant};

use plotters::prelude::*;
use rand::{Rng, distr::Alphanumeric};
use robinhood::{Crc32, GrowthPolicy, Recorder, RobinHoodTable, TableConfig, TableEvent};

// Matches the size of the classic 100k word list benchmark
const RANDOM_KEYS: usize = 100_000;
const ERASED_KEYS: usize = 10_000;
const SWEEP_KEYS: usize = 50_000;
const LOAD_FACTORS: [u8; 8] = [50, 60, 70, 80, 85, 90, 95, 98];
const POLICIES: [GrowthPolicy; 2] = [GrowthPolicy::Rehash, GrowthPolicy::CopyVerbatim];

/// Prints every growth of the table as it happens
#[derive(Debug, Default)]
struct GrowthPrinter;

impl Recorder for GrowthPrinter {
    fn record(&mut self, event: TableEvent) {
        if let TableEvent::Grown { old_capacity, new_capacity, policy } = event {
            println!("  grew {old_capacity} -> {new_capacity} ({policy:?})");
        }
    }
}

fn load_keys() -> Result<Vec<Vec<u8>>, Box<dyn Error>> {
    if let Some(path) = env::args().nth(1) {
        let text = fs::read(&path)?;
        let keys: Vec<Vec<u8>> = text
            .split(|&byte| byte == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
            .filter(|line| !line.is_empty())
            .collect();
        println!("Loaded {} keys from {path}", keys.len());
        return Ok(keys);
    }

    let mut rng = rand::rng();
    let keys = (0..RANDOM_KEYS)
        .map(|_| {
            let len = rng.random_range(4..16);
            (&mut rng).sample_iter(Alphanumeric).take(len).collect::<Vec<u8>>()
        })
        .collect();
    println!("Generated {RANDOM_KEYS} random keys");
    Ok(keys)
}

fn run_workload(keys: &[Vec<u8>]) -> Result<(), Box<dyn Error>> {
    let mut table =
        RobinHoodTable::with_hasher_and_recorder(&TableConfig::new(), Crc32, GrowthPrinter)?;

    let start = Instant::now();
    for key in keys {
        table.insert(key.clone(), key.clone());
    }
    println!("Insert took: {:?}", start.elapsed());

    let start = Instant::now();
    let erased = keys.iter().take(ERASED_KEYS).filter(|key| table.erase(key)).count();
    println!("Erase took: {:?} ({erased} erased)", start.elapsed());

    let start = Instant::now();
    let found = keys.iter().filter(|key| table.find(key).is_some()).count();
    println!("Lookup took: {:?} ({found} found)", start.elapsed());

    let stats = table.probe_stats();
    println!("Average Probe Count: {:.4}", table.average_probe_distance());
    println!(
        "Slots: {} occupied, {} tombstones, {} empty of {}; max probe distance {}",
        stats.occupied_slots,
        stats.tombstone_slots,
        stats.empty_slots,
        stats.capacity,
        stats.max_probe_distance
    );
    Ok(())
}

/// Average probe distance and fraction of keys still findable for one configuration
fn sweep_point(
    keys: &[Vec<u8>],
    load_factor_percent: u8,
    policy: GrowthPolicy,
) -> Result<(f64, f64), Box<dyn Error>> {
    let config = TableConfig::new()
        .set_load_factor_percent(load_factor_percent)
        .set_growth_policy(policy);
    let mut table = RobinHoodTable::with_config(&config)?;
    for (i, key) in keys.iter().enumerate() {
        table.insert(key.as_slice(), i);
    }
    let found = keys.iter().filter(|key| table.contains_key(key)).count();
    Ok((table.average_probe_distance(), found as f64 / keys.len().max(1) as f64))
}

fn plot_sweep(results: &[(GrowthPolicy, Vec<(f64, f64)>)]) -> Result<(), Box<dyn Error>> {
    let font_family = "sans-serif";
    let colors = [RGBColor(220, 50, 50), RGBColor(50, 90, 220)];

    let root = BitMapBackend::new("average_probe_distance.png", (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_avg = results
        .iter()
        .flat_map(|(_, points)| points.iter().map(|&(_, avg)| avg))
        .fold(1.0, f64::max) *
        1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Robin Hood Average Probe Distance", (font_family, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(45.0..100.0, 0.0..max_avg)?;

    chart
        .configure_mesh()
        .x_desc("Load Factor (%)")
        .y_desc("Average Probe Distance")
        .axis_desc_style((font_family, 16))
        .draw()?;

    for (index, (policy, points)) in results.iter().enumerate() {
        let color = colors.get(index % colors.len()).copied().unwrap_or(BLACK);
        let line_style = ShapeStyle::from(&color).stroke_width(2);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), line_style))?
            .label(format!("{policy:?}"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
        chart.draw_series(points.iter().map(|&point| Circle::new(point, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let keys = load_keys()?;
    run_workload(&keys)?;

    let sweep_keys = keys.get(..SWEEP_KEYS.min(keys.len())).unwrap_or_default();
    let mut results = Vec::with_capacity(POLICIES.len());
    for policy in POLICIES {
        println!("Sweeping {policy:?}");
        let mut points = Vec::with_capacity(LOAD_FACTORS.len());
        for percent in LOAD_FACTORS {
            let (avg, found) = sweep_point(sweep_keys, percent, policy)?;
            println!("  {percent}%: avg probe distance {avg:.3}, {:.2}% findable", found * 100.0);
            points.push((f64::from(percent), avg));
        }
        results.push((policy, points));
    }

    plot_sweep(&results)?;
    println!("Wrote average_probe_distance.png");
    Ok(())
}
