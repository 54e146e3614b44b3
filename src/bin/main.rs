use airfoil_geometry_rs::airfoil::generate::{AirfoilGenerator, Naca4Digit};
use airfoil_geometry_rs::airfoil::normalize::normalize;
use airfoil_geometry_rs::io::{parse_dat, write_dat};
use airfoil_geometry_rs::{Airfoil, GeometryParams, Status};
use std::error::Error;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}

/// A NACA 4-digit designation or the path of a `.dat` file
fn load(source: &str) -> Result<Airfoil, Box<dyn Error>> {
    if let Ok(naca) = Naca4Digit::from_designation(source) {
        return Ok(naca.airfoil(81)?);
    }
    let text = std::fs::read_to_string(source)?;
    Ok(parse_dat(&text)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let source = std::env::args().nth(1).unwrap_or_else(|| "2412".to_string());
    let params = match std::env::args().nth(2) {
        Some(path) => GeometryParams::from_json(&std::fs::read_to_string(path)?)?,
        None => GeometryParams::default(),
    };

    let airfoil = load(&source)?;
    info!(name = airfoil.name(), points = airfoil.points().len(), "loaded");

    let normalized = normalize(&airfoil, &params)?;
    if let Status::Warning(w) = normalized.status {
        warn!(warning = ?w, "normalization");
    }
    let properties = normalized.value.properties(&params)?;

    println!("{}", serde_json::to_string_pretty(&properties.value)?);
    print!("{}", write_dat(normalized.value.name(), &normalized.value));
    Ok(())
}
