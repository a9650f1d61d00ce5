//! gesture_rain — interactive entry point.
//!
//! ```text
//! gesture_rain [--config <path.json>] [--seed <n>] [--stdin-landmarks]
//! ```

use std::path::PathBuf;

use gesture_rain::{run, AppConfig, LandmarkFeed};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║            Gesture Rain — hold time in your hand             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let value_of = |flag: &str| {
        args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
    };

    let mut cfg = match value_of("--config").map(PathBuf::from) {
        Some(path) => match AppConfig::load(&path) {
            Ok(cfg) => {
                println!("  Config: {}", path.display());
                cfg
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    if let Some(seed) = value_of("--seed") {
        match seed.parse() {
            Ok(n)  => cfg.seed = Some(n),
            Err(_) => log::warn!("ignoring non-numeric seed {:?}", seed),
        }
    }

    let feed = if args.iter().any(|a| a == "--stdin-landmarks") {
        println!("  Mode: external detector (JSON lines on stdin)");
        LandmarkFeed::Stdin
    } else {
        println!("  Mode: mouse simulation  (move = hand, hold button = fist)");
        LandmarkFeed::Simulated
    };
    println!();
    println!("  Opening window…");
    println!();

    if let Err(e) = run(cfg, feed) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
