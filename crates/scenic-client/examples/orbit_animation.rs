// SPDX-License-Identifier: Apache-2.0
//! Precomputed playback demo: a small solar system.
//!
//! Connects to a viewer, declares the sun and planets, builds a looping
//! timeline by sampling orbit positions, and hands the whole thing to the
//! renderer in one `load_animation` call. After that the renderer plays it
//! back on its own; this process can exit.
//!
//! Run a viewer on the default endpoint (or pass one as the first
//! argument), then: `cargo run --example orbit_animation`

use std::f32::consts::TAU;

use anyhow::{Context, Result};
use scenic_client::{default_endpoint, Viewer};
use scenic_proto::TransformInput;
use scenic_timeline::{FrameContent, Timeline};
use tracing::info;

struct Planet {
    name: &'static str,
    radius: f32,
    color: u32,
    orbit_radius: f32,
    period: f32,
}

const PLANETS: &[Planet] = &[
    Planet { name: "mercury", radius: 0.15, color: 0x888888, orbit_radius: 2.0, period: 2.0 },
    Planet { name: "venus", radius: 0.25, color: 0xFFAA55, orbit_radius: 3.0, period: 3.5 },
    Planet { name: "earth", radius: 0.30, color: 0x4488FF, orbit_radius: 4.5, period: 5.0 },
    Planet { name: "mars", radius: 0.20, color: 0xFF4422, orbit_radius: 6.0, period: 7.0 },
];

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let addr = std::env::args().nth(1).unwrap_or_else(default_endpoint);
    let mut viewer =
        Viewer::connect_to(addr.as_str()).with_context(|| format!("connect {addr}"))?;

    viewer.clear()?;
    viewer.add_sphere("sun", 1.0, 0xFFDD00, TransformInput::at([0.0, 0.0, 0.0]))?;
    for planet in PLANETS {
        viewer.add_sphere(planet.name, planet.radius, planet.color, TransformInput::default())?;
    }

    let mut timeline = Timeline::from_function(
        |t| {
            let mut content = FrameContent::new().transform("sun", TransformInput::at([0.0; 3]));
            for planet in PLANETS {
                let angle = TAU * t as f32 / planet.period;
                content = content.transform(
                    planet.name,
                    TransformInput::at([
                        planet.orbit_radius * angle.cos(),
                        planet.orbit_radius * angle.sin(),
                        0.0,
                    ]),
                );
            }
            content
        },
        10.0,
        30,
        true,
    );

    timeline.add_marker_colored(0.0, "Animation start", 0x00FF00);
    timeline.add_marker_colored(5.0, "Halfway point", 0xFFFF00);

    viewer.load_animation(&timeline)?;
    info!(
        frames = timeline.n_frames(),
        duration = timeline.duration(),
        "animation loaded; renderer owns playback now"
    );

    viewer.disconnect();
    Ok(())
}
