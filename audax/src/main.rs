use std::{fs::File, io::BufWriter, io::Write, path::Path};

use anyhow::{Context, Result};
use args::{parse_args, Args};
use audax_core::{
    build_schedule, formatting::format_rfc3339, gpx_track::build_track,
    read::read_route_from_slice, write_schedule_to_writer, AcpRules, ClockFormat,
    ControlPointMode, ScheduleOptions,
};
use clap::builder::styling::AnsiColor;
use env_logger::Builder;
use log::{debug, info, warn};
use logging_timer::time;

mod args;

pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

#[time]
fn main() -> Result<()> {
    configure_logging();
    info!("Starting {PROGRAM_NAME}");

    let args = parse_args();
    debug!("{:?}", &args);
    if args.force {
        info!("'--force' specified, all existing output files will be overwritten");
    }

    let input_files = args.files();
    if input_files.is_empty() {
        warn!("No .gpx files specified, exiting");
        return Ok(());
    }

    let rules = AcpRules::default();
    let options = schedule_options(&args);
    info!(
        "Brevet starts at {}, controls by {:?}",
        format_rfc3339(&args.start)?,
        options.mode
    );

    for f in &input_files {
        match args.output_file(f) {
            Some(output_file) => process_gpx(f, &output_file, &rules, &options, &args)?,
            None => warn!("Output for {:?} already exists, skipping (use --force)", f),
        }
    }

    Ok(())
}

fn schedule_options(args: &Args) -> ScheduleOptions {
    let mode = match args.interval {
        Some(interval_km) => ControlPointMode::RegularInterval { interval_km },
        None => ControlPointMode::Checkpoints,
    };

    let clock_format = if args.twelve_hour {
        ClockFormat::TwelveHour
    } else {
        ClockFormat::TwentyFourHour
    };

    ScheduleOptions {
        mode,
        brevet_distance_km: args.distance,
        route_name: args.name.clone(),
        clock_format,
    }
}

fn process_gpx(
    input_file: &Path,
    output_file: &Path,
    rules: &AcpRules,
    options: &ScheduleOptions,
    args: &Args,
) -> Result<()> {
    info!("Reading GPX file {:?}", input_file);
    let contents =
        std::fs::read(input_file).with_context(|| format!("Failed to read {:?}", input_file))?;

    let doc = read_route_from_slice(&contents)
        .with_context(|| format!("Failed to parse {:?}", input_file))?;
    let track = build_track(doc).with_context(|| format!("Cannot use {:?}", input_file))?;
    let schedule = build_schedule(rules, &track, args.start, options)
        .with_context(|| format!("Failed to calculate controls for {:?}", input_file))?;

    let file =
        File::create(output_file).with_context(|| format!("Failed to create {:?}", output_file))?;
    let mut w = BufWriter::new(file);
    if args.json {
        serde_json::to_writer_pretty(&mut w, &schedule)?;
        writeln!(w)?;
        w.flush()?;
    } else {
        write_schedule_to_writer(&mut w, &schedule)?;
    }

    info!(
        "Wrote {} controls for {:?} to {:?}",
        schedule.controls.len(),
        input_file,
        output_file
    );

    Ok(())
}

fn configure_logging() {
    let mut builder = Builder::from_default_env();

    builder.format(|buf, record| {
        let level_style = buf.default_level_style(record.level());
        let level_style = match record.level() {
            log::Level::Error => level_style.fg_color(Some(AnsiColor::Red.into())),
            log::Level::Warn => level_style.fg_color(Some(AnsiColor::Yellow.into())),
            log::Level::Info => level_style.fg_color(Some(AnsiColor::Green.into())),
            log::Level::Debug => level_style.fg_color(Some(AnsiColor::Blue.into())),
            log::Level::Trace => level_style.fg_color(Some(AnsiColor::Magenta.into())),
        };

        let line_number_style = buf
            .default_level_style(record.level())
            .fg_color(Some(AnsiColor::Cyan.into()));

        match (record.file(), record.line()) {
            (Some(file), Some(line)) => writeln!(
                buf,
                "[{} {level_style}{}{level_style:#} {}/{line_number_style}{}{line_number_style:#}] {}",
                buf.timestamp(),
                record.level(),
                file,
                line,
                record.args()
            ),
            (Some(file), None) => writeln!(
                buf,
                "[{} {level_style}{}{level_style:#} {}] {}",
                buf.timestamp(),
                record.level(),
                file,
                record.args()
            ),
            _ => writeln!(
                buf,
                "[{} {level_style}{}{level_style:#}] {}",
                buf.timestamp(),
                record.level(),
                record.args()
            ),
        }
    });

    builder.init();
}
