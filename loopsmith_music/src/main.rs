// Loopsmith — CLI entry point.
//
// Generates one loop and writes the resolved timeline as JSON.
// The pipeline: key/attributes -> harmony -> melody -> bass -> percussion.
//
// Usage:
//   cargo run -p loopsmith_music -- [output.json] [--measures N] [--tension N]
//     [--depth N] [--intensity N] [--seed N]
//
// Measures must be one of 2, 4, 8, 16. Tension, depth, and intensity are
// 0..=4; --intensity derives tension and depth itself (each lands within one
// step of it) and overrides the other two flags.

use loopsmith_music::loops::Loop;
use loopsmith_music::render::render;
use loopsmith_theory::family::Catalog;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let output_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(|s| s.as_str())
        .unwrap_or("loop.json");
    let measures: usize = parse_flag(&args, "--measures").unwrap_or(4);
    let tension: u8 = parse_flag(&args, "--tension").unwrap_or(2);
    let depth: u8 = parse_flag(&args, "--depth").unwrap_or(2);
    let intensity: Option<u8> = parse_flag(&args, "--intensity");
    let seed: Option<u64> = parse_flag(&args, "--seed");

    if !matches!(measures, 2 | 4 | 8 | 16) {
        eprintln!("--measures must be 2, 4, 8, or 16 (got {measures})");
        std::process::exit(1);
    }
    if tension > 4 || depth > 4 || intensity.is_some_and(|i| i > 4) {
        eprintln!("--tension, --depth, and --intensity must be in 0..=4");
        std::process::exit(1);
    }

    println!("=== Loopsmith ===");
    println!("Output: {output_path}");
    if let Some(s) = seed {
        println!("Seed: {s}");
    }
    println!();

    let mut rng = if let Some(s) = seed {
        StdRng::seed_from_u64(s)
    } else {
        StdRng::from_os_rng()
    };

    let catalog = Catalog::default_catalog();

    println!("[1/3] Choosing key and attributes...");
    let lp = match intensity {
        Some(level) => Loop::from_intensity(measures, level, &mut rng),
        None => Loop::new(measures, tension, depth, &mut rng),
    };
    println!("  Key: {}", lp.key);
    println!(
        "  Measures: {}  Tension: {}  Depth: {}",
        lp.measures, lp.tension, lp.depth
    );

    println!("[2/3] Generating harmony, melody, bass, percussion...");
    let tracks = lp.generate(&catalog, &mut rng);
    println!(
        "  {} chord runs, {} melody runs, {} bass runs.",
        tracks.harmony.compressed.runs().len(),
        tracks.melody.compressed.runs().len(),
        tracks.bass.compressed.runs().len()
    );

    println!("[3/3] Writing timeline to {output_path}...");
    let timeline = render(&lp, &catalog, &tracks);
    let json = match serde_json::to_string_pretty(&timeline) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("  Error serializing timeline: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(output_path, json) {
        eprintln!("  Error writing {output_path}: {e}");
        std::process::exit(1);
    }

    println!();
    println!("{}", timeline.summary());
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
