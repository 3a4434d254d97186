use firefly::observer::{PhaseAdapter, PulseAdapter};
use firefly::phase::{PhaseConfig, PhaseEngine};
use firefly::pulse::{PulseConfig, PulseEngine};
use tracing::info;

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h" || args[1] == "help") {
        print_help();
        return;
    }
    let json = args.iter().any(|a| a == "--json");

    match args.get(1).map(String::as_str) {
        None | Some("pulse") => run_pulse_demo(json),
        Some("kuramoto") => run_kuramoto_demo(json),
        Some("--json") => run_pulse_demo(true),
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    }
}

fn print_help() {
    println!("firefly (coupled-oscillator synchronization demos)");
    println!("usage:");
    println!("  cargo run -- pulse      Mirollo-Strogatz pulse-coupled demo");
    println!("  cargo run -- kuramoto   Kuramoto mean-field demo");
    println!("  cargo run -- --help");
    println!("flags:");
    println!("  --json                  dump a final snapshot as JSON");
}

fn run_pulse_demo(json: bool) {
    let cfg = PulseConfig::default();
    let mut engine = match PulseEngine::new(cfg) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("bad configuration: {e}");
            std::process::exit(2);
        }
    };

    info!(
        n = cfg.oscillator_count,
        coupling = cfg.coupling_strength,
        alpha = cfg.alpha,
        threshold = cfg.threshold,
        "pulse demo starting"
    );

    // Simulated 60 FPS driver: each frame hands the engine a fixed real-time
    // slice, which run_for converts into whole integration ticks.
    let frame = 1.0 / 60.0;
    for frame_idx in 0..3_000u32 {
        engine.run_for(frame);

        if frame_idx % 300 == 0 {
            println!(
                "t={:7.2}  ticks={:6}  fires={:5}  sync={:.3}",
                engine.tick_count() as f32 * cfg.dt,
                engine.tick_count(),
                engine.fire_count(),
                engine.synchronization()
            );
        }
    }

    info!(
        fires = engine.fire_count(),
        sync = engine.synchronization(),
        "pulse demo finished"
    );

    if json {
        dump_json(&PulseAdapter::new(&engine).snapshot());
    }
}

fn run_kuramoto_demo(json: bool) {
    let cfg = PhaseConfig::default();
    let mut engine = match PhaseEngine::new(cfg) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("bad configuration: {e}");
            std::process::exit(2);
        }
    };

    info!(
        n = cfg.oscillator_count,
        k = cfg.coupling_k,
        omega0 = cfg.omega0,
        omega_std = cfg.omega_std,
        "kuramoto demo starting"
    );

    let frame = 1.0 / 60.0;
    let mut ticks = 0u64;
    for frame_idx in 0..3_000u32 {
        ticks += engine.run_for(frame) as u64;

        if frame_idx % 300 == 0 {
            println!(
                "t={:7.2}  ticks={:6}  R={:.3}",
                ticks as f32 * cfg.dt,
                ticks,
                engine.order_parameter()
            );
        }
    }

    info!(r = engine.order_parameter(), "kuramoto demo finished");

    if json {
        dump_json(&PhaseAdapter::new(&engine).snapshot());
    }
}

#[cfg(feature = "serde")]
fn dump_json<T: serde::Serialize>(snapshot: &T) {
    match serde_json::to_string_pretty(snapshot) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("snapshot serialization failed: {e}"),
    }
}

#[cfg(not(feature = "serde"))]
fn dump_json<T>(_snapshot: &T) {
    eprintln!("--json requires the `serde` feature");
}
