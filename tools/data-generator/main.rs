use clap::Parser;
use nodeflow::nodes::FEATURE_COLUMNS;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use std::fs;
use std::path::PathBuf;

/// A CLI tool to generate synthetic daily weather data for the data source node
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// City name; the file is written as `<city>.csv`
    #[arg(short, long, default_value = "houston")]
    city: String,

    /// Directory to write the CSV file into
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,

    /// Number of consecutive days to generate, starting at 2020-01-01
    #[arg(long, default_value_t = 730)]
    days: usize,

    /// Seed for reproducible output; omit for a random series
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of feature cells left empty to exercise gap filling
    #[arg(long, default_value_t = 0.01)]
    missing: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if !(0.0..1.0).contains(&cli.missing) {
        eprintln!("Error: --missing ({}) must be in [0, 1)", cli.missing);
        std::process::exit(1);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    println!("Generating {} days of weather for '{}'...", cli.days, cli.city);

    fs::create_dir_all(&cli.output_dir)?;
    let path = cli.output_dir.join(format!("{}.csv", cli.city));
    let mut writer = csv::Writer::from_path(&path)?;

    let mut header = vec!["date"];
    header.extend(FEATURE_COLUMNS);
    writer.write_record(&header)?;

    let start = days_from_civil(2020, 1, 1);
    for day in 0..cli.days {
        let (y, m, d) = civil_from_days(start + day as i64);
        let mut record = vec![format!("{:04}-{:02}-{:02}", y, m, d)];
        for value in generate_day(&mut rng, day) {
            if rng.random_bool(cli.missing) {
                record.push(String::new());
            } else {
                record.push(format!("{:.2}", value));
            }
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Successfully wrote '{}'", path.display());
    Ok(())
}

/// One day of readings in `FEATURE_COLUMNS` order, following a yearly cycle.
fn generate_day(rng: &mut StdRng, day: usize) -> [f64; 10] {
    let season = (day as f64 / 365.25 * TAU).sin();
    let temp_max = 24.0 + 9.0 * season + rng.random_range(-3.0..3.0);
    let temp_min = temp_max - rng.random_range(6.0..12.0);
    let rain = if rng.random_bool(0.3) {
        rng.random_range(0.2..25.0)
    } else {
        0.0
    };
    let snowfall = if temp_max < 2.0 && rng.random_bool(0.2) {
        rng.random_range(0.1..5.0)
    } else {
        0.0
    };
    let wind_speed = rng.random_range(5.0..30.0);
    let weather_code = match (rain > 0.0, snowfall > 0.0) {
        (_, true) => 71.0,
        (true, _) => 61.0,
        _ => [0.0, 1.0, 2.0, 3.0][rng.random_range(0..4usize)],
    };
    [
        temp_max,
        temp_min,
        rain + snowfall,
        rain,
        snowfall,
        wind_speed,
        wind_speed * rng.random_range(1.3..2.0),
        (18.0 + 8.0 * season + rng.random_range(-4.0..4.0)).max(0.5),
        rng.random_range(10_000.0..45_000.0),
        weather_code,
    ]
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (m + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
fn civil_from_days(z: i64) -> (i64, i64, i64) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe + era * 400 + if m <= 2 { 1 } else { 0 };
    (y, m, d)
}
