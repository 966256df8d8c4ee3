use std::path::{Path, PathBuf};

use clap::Parser;
use time::{format_description::well_known, OffsetDateTime};

/// Returns the parsed command line options.
pub fn parse_args() -> Args {
    Args::parse()
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(
        short,
        long,
        default_value = "false",
        help = "Overwrite output files even if they already exist"
    )]
    pub force: bool,

    #[arg(
        short,
        long,
        value_parser = parse_start_time,
        help = "Start time of the brevet in RFC 3339 format, e.g. 2024-06-01T07:00:00+01:00"
    )]
    pub start: OffsetDateTime,

    #[arg(
        short,
        long,
        help = "Place a control every KM km instead of at the checkpoints found in the GPX"
    )]
    pub interval: Option<f64>,

    #[arg(
        short,
        long,
        help = "The brevet distance in km. Defaults to the length of the track"
    )]
    pub distance: Option<f64>,

    #[arg(short, long, help = "Route name to print instead of the one in the GPX")]
    pub name: Option<String>,

    #[arg(
        long,
        default_value = "false",
        help = "Show clock times in 12-hour format"
    )]
    pub twelve_hour: bool,

    #[arg(
        long,
        default_value = "false",
        help = "Write the schedule as JSON instead of text"
    )]
    pub json: bool,

    #[arg(
        help = "List of files to process. Any file that does not have a 'gpx' extension will be ignored."
    )]
    pub files: Vec<PathBuf>,
}

impl Args {
    /// Returns the input files that look like GPX files.
    pub fn files(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|f| {
                f.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"))
            })
            .cloned()
            .collect()
    }

    /// Returns where the schedule for `input_file` should be written, or
    /// `None` if it already exists and we are not forcing.
    pub fn output_file(&self, input_file: &Path) -> Option<PathBuf> {
        let ext = if self.json {
            "controls.json"
        } else {
            "controls.txt"
        };
        let output = input_file.with_extension(ext);

        if output.exists() && !self.force {
            None
        } else {
            Some(output)
        }
    }
}

fn parse_start_time(s: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(s, &well_known::Rfc3339).map_err(|e| e.to_string())
}
