//! Hanabee entry point
//!
//! Native builds run a headless round driven by a simple auto-aim bot and
//! print the result as JSON. Browser builds go through `hanabee::web`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use hanabee::consts::MAX_FRAME_DT;
    use hanabee::{GameEvent, GameState, Settings, TickInput, tick};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_from(Path::new(&path)),
        None => Settings::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x48414e41);

    log::info!("Hanabee (headless) starting with seed {}", seed);
    let mut state = GameState::with_settings(seed, settings);
    state.start();

    // Bot fires at the highest target every quarter second
    let dt = MAX_FRAME_DT / 2.0;
    let mut cooldown = 0.0;
    let mut result = None;
    while result.is_none() {
        cooldown -= dt;
        let mut input = TickInput::default();
        if cooldown <= 0.0 {
            input.pointer = state
                .targets()
                .iter()
                .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|t| t.pos);
            cooldown = 0.25;
        }
        tick(&mut state, &input, dt);

        for event in state.drain_events() {
            match event {
                GameEvent::ChainResolved { targets, points } if targets > 1 => {
                    log::info!("Chain x{} for {} points", targets, points);
                }
                GameEvent::RoundEnded(r) => result = Some(r),
                _ => {}
            }
        }
    }

    match result.map(|r| serde_json::to_string_pretty(&r)) {
        Some(Ok(json)) => println!("{}", json),
        Some(Err(e)) => log::error!("Could not serialize result: {}", e),
        None => {}
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point lives in hanabee::web
}
