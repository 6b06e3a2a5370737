//! Pool Sim entry point
//!
//! Builds a demo table with a few seeded circular obstacles, breaks with the
//! cue ball and runs until everything is at rest. Prints a JSON summary of the
//! run (table, events, final ball states) to stdout.
//!
//! Usage: `pool-sim [settings.json]`. Set `RUST_LOG=debug` for per-event logs.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use serde::Serialize;

    use pool_sim::sim::{Ball, CircularSegment, CueStrike, Event, RunSummary, Simulation, Table};
    use pool_sim::{PhysicalConstants, SimSettings, Vec3};

    /// Seed for demo obstacle placement
    const DEMO_SEED: u64 = 0x5EED_CAFE;
    const DEMO_OBSTACLES: usize = 4;

    #[derive(Serialize)]
    struct Report<'a> {
        settings: &'a SimSettings,
        table: &'a Table,
        summary: RunSummary,
        events: &'a [Event],
        balls: Vec<&'a Ball>,
    }

    /// Standard table plus a few random circular obstacles clear of the cue ball lane
    fn demo_table(constants: &PhysicalConstants) -> Result<Table, pool_sim::SimError> {
        let mut rng = Pcg32::seed_from_u64(DEMO_SEED);
        let mut builder = Table::builder(constants);
        let (w, l, h) = (constants.table_width, constants.table_length, constants.cushion_height);

        for i in 0..DEMO_OBSTACLES {
            let radius = rng.random_range(0.02..0.06);
            let x = if rng.random_bool(0.5) {
                rng.random_range(0.1..w * 0.3)
            } else {
                rng.random_range(w * 0.7..w - 0.1)
            };
            let y = rng.random_range(l * 0.4..l - 0.2);
            let obstacle = CircularSegment::new(format!("c{i}"), Vec3::new(x, y, h), radius)?;
            builder = builder.circular(obstacle);
        }

        builder.build()
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let settings = match std::env::args().nth(1) {
            Some(path) => SimSettings::load(&path).unwrap_or_else(|e| {
                log::warn!("Could not load settings from {path}: {e}; using defaults");
                SimSettings::default()
            }),
            None => {
                log::info!("Using default settings");
                SimSettings::default()
            }
        };

        let constants = PhysicalConstants::STANDARD;
        let table = demo_table(&constants)?;
        let mut sim = Simulation::new(table, constants, settings.clone())?;

        let center = sim.table().center();
        sim.add_ball("cue", Vec3::new(center.x, center.y * 0.5, 0.0))?;
        sim.add_ball("1", Vec3::new(center.x + 0.2, center.y * 1.5, 0.0))?;
        sim.strike("cue", &CueStrike::new(3.0, 80.0).with_english(0.2, 0.3))?;

        let summary = sim.run()?;

        let report = Report {
            settings: &settings,
            table: sim.table(),
            summary,
            events: sim.events(),
            balls: sim.balls().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pool Sim starting...");

    if let Err(e) = native::run() {
        log::error!("{e}");
        eprintln!("pool-sim: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on wasm; a host renderer drives `Simulation` directly
}
