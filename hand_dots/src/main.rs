//! hand_dots — interactive entry point.
//!
//! ```text
//! hand_dots [--quick] [--variant NAME] [--config PATH]
//! ```
//!
//! `--config` wins over `--variant`; with neither (and no `--quick`) the
//! sketch is picked from a menu.

use std::io::{self, Write};

use dot_field::Variant;
use hand_dots::app::run;
use hand_dots::config::AppConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║            Hand Dots — spring-damper dot sketches            ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware available (set leap = true)");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let value_of = |flag: &str| {
        args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
    };

    let cfg = if let Some(path) = value_of("--config") {
        match AppConfig::load(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        }
    } else if let Some(name) = value_of("--variant") {
        match Variant::from_name(&name) {
            Ok(v) => AppConfig::for_variant(v),
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        }
    } else if args.iter().any(|a| a == "--quick") {
        println!("  Quick-start: gesture sketch, keyboard hand\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening window ({}) …", cfg.variant.name());
    println!();

    if let Err(e) = run(cfg) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    println!("  Sketch:");
    for (i, v) in Variant::all().iter().enumerate() {
        println!("    {}. {}", i + 1, v.name());
    }
    let variant = match read_line("  Choice (1–9, default 3): ").trim().parse::<usize>() {
        Ok(n) if (1..=Variant::all().len()).contains(&n) => Variant::all()[n - 1],
        _ => Variant::default(),
    };
    let mut cfg = AppConfig::for_variant(variant);

    cfg.field.spacing = read_line(&format!("  Spacing px (default {}): ", cfg.field.spacing))
        .trim().parse::<f32>().unwrap_or(cfg.field.spacing).clamp(8.0, 200.0);

    let mirror = read_line(&format!("  Mirror view y/n (default {}): ", yes_no(cfg.mirror)));
    match mirror.trim() {
        "y" | "Y" => cfg.mirror = true,
        "n" | "N" => cfg.mirror = false,
        _ => {}
    }

    let midi = read_line(&format!("  MIDI level input y/n (default {}): ", yes_no(cfg.midi_level)));
    match midi.trim() {
        "y" | "Y" => cfg.midi_level = true,
        "n" | "N" => cfg.midi_level = false,
        _ => {}
    }

    if cfg!(feature = "leap") {
        cfg.leap = read_line("  Use LeapMotion y/n (default n): ").trim().eq_ignore_ascii_case("y");
    }

    cfg
}

fn yes_no(b: bool) -> &'static str {
    if b { "y" } else { "n" }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
