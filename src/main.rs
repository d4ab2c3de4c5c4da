mod pipeline;
mod report;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use pipeline::{devices, export, plot, recording, session::ChannelSelection, ChartStyle};

/// Analyze a CPAP machine's EDF+ export into daily and weekly pressure trends.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// An EDF+ recording, or a directory to scan for .edf files
    input: Option<PathBuf>,

    /// File name to pick when INPUT is a directory
    #[arg(long, env = "CPAP_FILE")]
    file: Option<String>,

    /// Channel carrying the AHI signal (overrides the device default)
    #[arg(long, env = "CPAP_AHI_CHANNEL")]
    ahi_channel: Option<String>,

    /// Channel carrying the mask-pressure signal (overrides the device default)
    #[arg(long, env = "CPAP_PRESSURE_CHANNEL")]
    pressure_channel: Option<String>,

    /// Extra device profiles: JSON array of {device, ahi_channel, pressure_channel}
    #[arg(long, env = "CPAP_PROFILES")]
    profiles: Option<PathBuf>,

    /// Where to write the daily aggregate CSV
    #[arg(long, env = "CPAP_CSV_OUTPUT", default_value = "cpap_analysis.csv")]
    csv_output: PathBuf,

    /// Directory for the rendered 7-day charts
    #[arg(long, env = "CPAP_CHARTS_DIR", default_value = ".")]
    charts_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    let Some(input) = args.input else {
        println!("No recording selected. Pass an EDF+ file, or a directory containing one.");
        return Ok(());
    };
    let Some(path) = select_recording(&input, args.file.as_deref())? else {
        return Ok(());
    };

    // User-supplied profiles go first so they shadow the built-ins.
    let mut profiles = match &args.profiles {
        Some(path) => devices::load_profiles(path)
            .with_context(|| format!("loading device profiles from {}", path.display()))?,
        None => Vec::new(),
    };
    profiles.extend(devices::builtin_profiles());

    let info = recording::read_metadata(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    if info.device.is_empty() {
        info!("detected machine: unknown device, using fallback channel names");
    } else {
        info!("detected machine: {}", info.device);
    }

    let labels = info.channel_labels();
    let defaults = devices::resolve_defaults(&info.device, &labels, &profiles);
    let ahi = args.ahi_channel.or(defaults.ahi);
    let pressure = args.pressure_channel.or(defaults.pressure);
    let (Some(ahi), Some(pressure)) = (ahi, pressure) else {
        warn!("could not resolve default channels for '{}'", info.device);
        println!(
            "Please select valid AHI and mask-pressure channels with \
             --ahi-channel/--pressure-channel. Available: {}",
            labels.join(", ")
        );
        return Ok(());
    };
    for name in [&ahi, &pressure] {
        if !labels.iter().any(|label| label == name) {
            warn!("channel '{name}' is not in the recording");
            println!(
                "Channel '{}' not found. Available: {}",
                name,
                labels.join(", ")
            );
            return Ok(());
        }
    }

    let selection = ChannelSelection { ahi, pressure };
    let analysis = pipeline::analyze_recording(&path, &selection)
        .with_context(|| format!("analyzing {}", path.display()))?;
    if analysis.daily.is_empty() {
        println!(
            "No overlapping data between '{}' and '{}'; nothing to chart.",
            selection.ahi, selection.pressure
        );
        return Ok(());
    }

    let csv_file = fs::File::create(&args.csv_output)
        .with_context(|| format!("creating {}", args.csv_output.display()))?;
    export::write_daily_csv(csv_file, &analysis.daily)?;
    info!("wrote {}", args.csv_output.display());

    fs::create_dir_all(&args.charts_dir)
        .with_context(|| format!("creating {}", args.charts_dir.display()))?;
    let window = analysis.daily.last_days(7);
    let style = ChartStyle::default();
    let ahi_chart = args.charts_dir.join("ahi_last7.png");
    fs::write(&ahi_chart, plot::render_ahi_png(window, &style)?)?;
    let pressure_chart = args.charts_dir.join("pressure_last7.png");
    fs::write(&pressure_chart, plot::render_pressure_png(window, &style)?)?;
    info!(
        "wrote {} and {}",
        ahi_chart.display(),
        pressure_chart.display()
    );

    report::print_weekly_summary(&analysis.weekly);
    Ok(())
}

/// Resolves the input to a single recording. Directories are scanned
/// non-recursively; with several candidates the user must pick one by name.
/// Returns `None` when there is nothing usable yet (already reported).
fn select_recording(input: &Path, pick: Option<&str>) -> Result<Option<PathBuf>> {
    if input.is_file() {
        return Ok(Some(input.to_path_buf()));
    }
    if !input.is_dir() {
        bail!("{} is neither a file nor a directory", input.display());
    }
    let mut found = list_edf_files(input)?;
    if found.is_empty() {
        warn!("no .edf files in {}", input.display());
        println!("No EDF files found in the specified directory.");
        return Ok(None);
    }
    found.sort();
    if let Some(name) = pick {
        match found
            .iter()
            .find(|p| p.file_name().is_some_and(|f| f == name))
        {
            Some(path) => Ok(Some(path.clone())),
            None => {
                println!("'{}' is not among the recordings in {}:", name, input.display());
                print_file_names(&found);
                Ok(None)
            }
        }
    } else if found.len() == 1 {
        Ok(Some(found.remove(0)))
    } else {
        println!("Multiple recordings found; rerun with --file <name>:");
        print_file_names(&found);
        Ok(None)
    }
}

fn print_file_names(paths: &[PathBuf]) {
    for path in paths {
        if let Some(name) = path.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }
}

fn list_edf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_edf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("edf"));
        if path.is_file() && is_edf {
            files.push(path);
        }
    }
    Ok(files)
}
