// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Polyrange CLI - tree diagnostics on generated box sets

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use nalgebra::Point3;
use polyrange::{
    ClosestRangeSearcher, Range3, RangeTree, RangeTreePairSearcher, SimpleRangeClashTester,
    TreeStatisticsCollector,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Parser)]
#[command(name = "polyrange")]
#[command(about = "Polyrange - range tree diagnostics and clash search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a tree from random boxes and print its shape statistics
    Stats {
        /// Number of leaf boxes
        #[arg(short, long, default_value = "10000")]
        leaves: usize,

        /// Seed for the box generator
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Half-width of the cube the boxes are scattered in
        #[arg(long, default_value = "100.0")]
        spread: f64,

        /// Maximum box side length
        #[arg(long, default_value = "1.0")]
        size: f64,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build two trees and search them for close box pairs
    Clash {
        /// Number of leaf boxes per tree
        #[arg(short, long, default_value = "10000")]
        leaves: usize,

        /// Seed for the box generator
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Half-width of the cube the boxes are scattered in
        #[arg(long, default_value = "100.0")]
        spread: f64,

        /// Maximum box side length
        #[arg(long, default_value = "1.0")]
        size: f64,

        /// Clash envelope distance
        #[arg(short, long, default_value = "0.1")]
        envelope: f64,

        /// X offset of the second box set
        #[arg(long, default_value = "0.0")]
        offset: f64,

        /// Check only x and y (plan view)
        #[arg(long)]
        plan: bool,

        /// Stop after this many hits
        #[arg(long)]
        max_hits: Option<usize>,
    },

    /// Find the box closest to a target point
    Closest {
        /// Number of leaf boxes
        #[arg(short, long, default_value = "10000")]
        leaves: usize,

        /// Seed for the box generator
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Half-width of the cube the boxes are scattered in
        #[arg(long, default_value = "100.0")]
        spread: f64,

        /// Maximum box side length
        #[arg(long, default_value = "1.0")]
        size: f64,

        /// Target point
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values = ["0.0", "0.0", "0.0"])]
        target: Vec<f64>,

        /// Starting search distance
        #[arg(short, long, default_value = "1000.0")]
        distance: f64,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats {
            leaves,
            seed,
            spread,
            size,
            json,
        } => stats_command(leaves, seed, spread, size, json)?,
        Commands::Clash {
            leaves,
            seed,
            spread,
            size,
            envelope,
            offset,
            plan,
            max_hits,
        } => clash_command(leaves, seed, spread, size, envelope, offset, plan, max_hits)?,
        Commands::Closest {
            leaves,
            seed,
            spread,
            size,
            target,
            distance,
        } => closest_command(leaves, seed, spread, size, &target, distance)?,
        Commands::Version => {
            println!("Polyrange v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Random boxes scattered in a cube of half-width `spread` centered at
/// `(center_x, 0, 0)`, sides up to `size`.
fn random_boxes(count: usize, seed: u64, spread: f64, size: f64, center_x: f64) -> Vec<Range3> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = center_x + rng.gen_range(-spread..spread);
            let y = rng.gen_range(-spread..spread);
            let z = rng.gen_range(-spread..spread);
            let dx = rng.gen_range(0.0..size);
            let dy = rng.gen_range(0.0..size);
            let dz = rng.gen_range(0.0..size);
            Range3::new(Point3::new(x, y, z), Point3::new(x + dx, y + dy, z + dz))
        })
        .collect()
}

fn build_tree(boxes: &[Range3]) -> RangeTree<usize> {
    let mut tree = RangeTree::new();
    for (i, &b) in boxes.iter().enumerate() {
        tree.add(i, b);
    }
    tree
}

fn stats_command(leaves: usize, seed: u64, spread: f64, size: f64, json: bool) -> Result<()> {
    let boxes = random_boxes(leaves, seed, spread, size, 0.0);

    let start = std::time::Instant::now();
    let tree = build_tree(&boxes);
    let build_time = start.elapsed();

    let mut stats = TreeStatisticsCollector::new();
    tree.traverse(&mut stats);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "═".repeat(60).bright_black());
    println!("{}", "Tree Statistics".bold());
    println!("{}", "═".repeat(60).bright_black());
    println!(
        "  {} {} in {:.2?}",
        "Built:".bright_black(),
        format!("{} leaves", stats.leaf_count).cyan(),
        build_time
    );
    println!(
        "  {} {}",
        "Interior nodes:".bright_black(),
        stats.interior_count.to_string().cyan()
    );
    println!(
        "  {} {}",
        "Fringe nodes:".bright_black(),
        stats.fringe_count.to_string().cyan()
    );
    println!(
        "  {} {}",
        "Max depth:".bright_black(),
        stats.max_depth.to_string().cyan()
    );
    println!(
        "  {} {:.3} / {:.3} / {:.3}",
        "Fringe extent² min/mean/max:".bright_black(),
        stats.fringe_extent_squared_min,
        stats.mean_fringe_extent_squared(),
        stats.fringe_extent_squared_max
    );
    println!(
        "  {} {}",
        "Σ (leaves per fringe)²:".bright_black(),
        stats.fringe_leaf_count_squared_sum.to_string().cyan()
    );
    println!("{}", "═".repeat(60).bright_black());

    Ok(())
}

fn clash_command(
    leaves: usize,
    seed: u64,
    spread: f64,
    size: f64,
    envelope: f64,
    offset: f64,
    plan: bool,
    max_hits: Option<usize>,
) -> Result<()> {
    let tree_a = build_tree(&random_boxes(leaves, seed, spread, size, 0.0));
    let tree_b = build_tree(&random_boxes(leaves, seed.wrapping_add(1), spread, size, offset));

    let mut tester = SimpleRangeClashTester::new(envelope);
    if plan {
        tester.axis_count = 2;
    }
    tester.max_hits = max_hits;

    let mut searcher = RangeTreePairSearcher::new();
    let start = std::time::Instant::now();
    let completed = searcher.search(&tree_a, &tree_b, &mut tester);
    let search_time = start.elapsed();

    println!("{}", "═".repeat(60).bright_black());
    println!("{}", "Clash Search".bold());
    println!("{}", "═".repeat(60).bright_black());
    println!(
        "  {} {} x {} boxes, envelope {}",
        "Input:".bright_black(),
        leaves,
        leaves,
        envelope.to_string().cyan()
    );
    println!(
        "  {} {} in {:.2?}{}",
        "Hits:".bright_black(),
        tester.hits().len().to_string().green(),
        search_time,
        if completed { "" } else { " (stopped early)" }
    );
    for (a, b) in tester.hits().iter().take(10) {
        println!("    {} {} - {}", "pair".bright_black(), a, b);
    }
    if tester.hits().len() > 10 {
        println!("    ... {} more", tester.hits().len() - 10);
    }
    println!("{}", "═".repeat(60).bright_black());

    Ok(())
}

fn closest_command(
    leaves: usize,
    seed: u64,
    spread: f64,
    size: f64,
    target: &[f64],
    distance: f64,
) -> Result<()> {
    let tree = build_tree(&random_boxes(leaves, seed, spread, size, 0.0));
    let target = Point3::new(target[0], target[1], target[2]);

    let mut searcher = ClosestRangeSearcher::new(target, distance);
    let start = std::time::Instant::now();
    tree.traverse(&mut searcher);
    let search_time = start.elapsed();

    println!("{}", "═".repeat(60).bright_black());
    println!("{}", "Closest Range".bold());
    println!("{}", "═".repeat(60).bright_black());
    match searcher.closest_payload() {
        Some(&payload) => {
            let point = searcher.closest_point().unwrap();
            println!(
                "  {} box {} at distance {:.4} in {:.2?}",
                "Found:".bright_black(),
                payload.to_string().green(),
                searcher.closest_distance_squared().sqrt(),
                search_time
            );
            println!(
                "  {} ({:.4}, {:.4}, {:.4})",
                "Closest point:".bright_black(),
                point.x,
                point.y,
                point.z
            );
        }
        None => {
            println!(
                "  {} no box within {} of the target",
                "Found:".bright_black(),
                distance.to_string().red()
            );
        }
    }
    println!("{}", "═".repeat(60).bright_black());

    Ok(())
}
