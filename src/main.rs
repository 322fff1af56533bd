use grimoire_osm::osm::GeocodeCache;
use grimoire_osm::pipeline::{
    DiscoveryConfig, DiscoveryPipeline, FixedDelay, HttpOsmSource, DEFAULT_CITY_RADIUS_KM,
    DEFAULT_POI_RADIUS_M,
};
use grimoire_osm::sink;
use std::io::{self, BufRead, Write};
use std::path::Path;

const DEFAULT_OUTPUT: &str = "regional_restaurants.csv";

fn main() {
    eprintln!("Grimoire \u{2014} regional restaurant survey");
    eprintln!();

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let config = prompt_config(&mut input);
    let output = prompt_with_default(&mut input, "Output CSV filename", DEFAULT_OUTPUT);

    let mut pipeline =
        DiscoveryPipeline::new(HttpOsmSource, FixedDelay::default(), GeocodeCache::load());

    let run = pipeline.run(&config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = sink::write_csv(Path::new(&output), &run.restaurants) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    eprintln!();
    if !run.failures.is_empty() {
        eprintln!("  {} settlement(s) could not be surveyed:", run.failures.len());
        for failure in &run.failures {
            eprintln!("    \u{274C} {}: {}", failure.settlement, failure.error);
        }
    }
    eprintln!(
        "\u{1F4BE} Saved {} restaurants to {}",
        run.restaurants.len(),
        output,
    );
    eprintln!(
        "\u{1F389} Found a total of {} restaurants in the region around {}",
        run.restaurants.len(),
        run.anchor.name,
    );
}

fn prompt_config(input: &mut impl BufRead) -> DiscoveryConfig {
    let mut config = DiscoveryConfig::new(prompt_required(input, "Enter the central city name"));
    config.city_radius_km = prompt_f64(
        input,
        "Radius to search for cities (km)",
        DEFAULT_CITY_RADIUS_KM,
    );
    config.poi_radius_m = prompt_f64(
        input,
        "Radius to search for restaurants around each city (m)",
        DEFAULT_POI_RADIUS_M,
    );
    config.max_settlements = prompt_optional_usize(
        input,
        "Maximum number of cities to search (empty for all)",
    );
    config
}

fn read_line(input: &mut impl BufRead, label: &str) -> String {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    let mut line = String::new();
    if input.read_line(&mut line).is_err() {
        return String::new();
    }
    line.trim().to_string()
}

/// Re-prompt until a non-empty answer arrives.
fn prompt_required(input: &mut impl BufRead, label: &str) -> String {
    loop {
        let answer = read_line(input, label);
        if !answer.is_empty() {
            return answer;
        }
        eprintln!("  A value is required.");
    }
}

fn prompt_with_default(input: &mut impl BufRead, label: &str, default: &str) -> String {
    let answer = read_line(input, &format!("{} [default={}]", label, default));
    if answer.is_empty() {
        default.to_string()
    } else {
        answer
    }
}

fn prompt_f64(input: &mut impl BufRead, label: &str, default: f64) -> f64 {
    loop {
        let answer = read_line(input, &format!("{} [default={}]", label, default));
        if answer.is_empty() {
            return default;
        }
        match answer.parse::<f64>() {
            Ok(v) if v > 0.0 => return v,
            _ => eprintln!("  Enter a positive number."),
        }
    }
}

fn prompt_optional_usize(input: &mut impl BufRead, label: &str) -> Option<usize> {
    loop {
        let answer = read_line(input, label);
        if answer.is_empty() {
            return None;
        }
        match answer.parse::<usize>() {
            Ok(v) if v > 0 => return Some(v),
            _ => eprintln!("  Enter a positive whole number, or leave empty."),
        }
    }
}
