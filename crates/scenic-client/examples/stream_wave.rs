// SPDX-License-Identifier: Apache-2.0
//! Real-time streaming demo: a grid of bouncing spheres.
//!
//! The opposite delivery mode from `orbit_animation`: nothing is
//! precomputed. Each iteration batches fresh transforms for every sphere
//! and pushes them, budgeting a frame period around the potentially
//! blocking send.
//!
//! Run a viewer on the default endpoint (or pass one as the first
//! argument), then: `cargo run --example stream_wave`

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use scenic_client::{default_endpoint, Update, Viewer};
use scenic_proto::TransformInput;
use tracing::info;

const GRID: i32 = 5;
const SPACING: f32 = 2.0;
const TARGET_FPS: f64 = 60.0;
const FRAMES: u32 = 600;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let addr = std::env::args().nth(1).unwrap_or_else(default_endpoint);
    let mut viewer =
        Viewer::connect_to(addr.as_str()).with_context(|| format!("connect {addr}"))?;

    viewer.clear()?;
    viewer.stop_animation()?;
    viewer.add_box(
        "ground",
        15.0,
        15.0,
        0.02,
        0x333333,
        TransformInput::at([0.0, 0.0, -0.01]),
    )?;

    let mut spheres = Vec::new();
    for i in 0..GRID {
        for j in 0..GRID {
            let name = format!("sphere_{i}_{j}");
            let x = (i as f32 - GRID as f32 / 2.0 + 0.5) * SPACING;
            let y = (j as f32 - GRID as f32 / 2.0 + 0.5) * SPACING;
            let color = ((255 * i as u32 / GRID as u32) << 16)
                | ((255 * j as u32 / GRID as u32) << 8)
                | 128;
            viewer.add_sphere(&name, 0.3, color, TransformInput::at([x, y, 0.3]))?;
            // Phase offset per cell gives the grid a travelling wave.
            spheres.push((name, x, y, (i + j) as f32 * 0.3));
        }
    }

    let frame_budget = Duration::from_secs_f64(1.0 / TARGET_FPS);
    let start = Instant::now();

    for frame in 0..FRAMES {
        let loop_start = Instant::now();
        let t = start.elapsed().as_secs_f32();

        let updates = spheres.iter().map(|(name, x, y, phase)| {
            let z = 0.3 + 0.5 * (1.5 * t + phase).sin().abs();
            (name.clone(), Update::at([*x, *y, z]))
        });
        viewer.batch_update(updates.collect::<Vec<_>>())?;

        if frame % 60 == 0 {
            let fps = f64::from(frame) / start.elapsed().as_secs_f64().max(1e-6);
            info!(frame, fps, "streaming");
        }

        // Frame pacing: the send may have eaten part of the budget.
        if let Some(remaining) = frame_budget.checked_sub(loop_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    let events = viewer.poll_events();
    info!(events = events.len(), "done streaming");
    viewer.disconnect();
    Ok(())
}
