use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use draco_bridge::{decode_file, encode_file, BridgeModule, EncodeOptions};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "draco-bridge", author, version, about = "Encode meshes and point clouds to Draco and back")]
struct Cli {
    // Set the log level (possible values: error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress an OBJ, PLY or DRC file into a Draco file
    Encode(EncodeArgs),
    /// Decompress a Draco file into OBJ or PLY (picked from the output extension)
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
struct EncodeArgs {
    #[arg(short, long)]
    input: String,
    #[arg(short, long)]
    output: String,
    /// Load the input as a point cloud, ignoring faces
    #[arg(long)]
    point_cloud: bool,
    /// Quantization bits for positions
    #[arg(long = "qp", default_value_t = 11, allow_negative_numbers = true)]
    pos_bits: i32,
    /// Quantization bits for texture coordinates, negative to drop them
    #[arg(long = "qt", default_value_t = 10, allow_negative_numbers = true)]
    tex_coord_bits: i32,
    /// Quantization bits for normals, negative to drop them
    #[arg(long = "qn", default_value_t = 8, allow_negative_numbers = true)]
    normal_bits: i32,
    /// Quantization bits for generic attributes, negative to drop them
    #[arg(long = "qg", default_value_t = 8, allow_negative_numbers = true)]
    generic_bits: i32,
    /// Compression level, 0 (fastest) to 10 (smallest)
    #[arg(long = "cl", default_value_t = 7, allow_negative_numbers = true)]
    compression_level: i32,
    /// Keep points that become identical after dropping attributes
    #[arg(long)]
    no_dedup: bool,
}

impl EncodeArgs {
    fn options(&self) -> EncodeOptions {
        EncodeOptions {
            is_point_cloud: self.point_cloud,
            pos_quantization_bits: self.pos_bits,
            tex_coords_quantization_bits: self.tex_coord_bits,
            normals_quantization_bits: self.normal_bits,
            generic_quantization_bits: self.generic_bits,
            compression_level: self.compression_level,
            deduplicate_point_ids: !self.no_dedup,
            ..Default::default()
        }
    }
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[arg(short, long)]
    input: String,
    #[arg(short, long)]
    output: String,
}

fn run(command: &Command) -> bool {
    match command {
        Command::Encode(args) => match encode_file(&args.input, &args.output, &args.options()) {
            Ok(report) => {
                info!(
                    geometry = %report.geometry,
                    bytes = report.encoded_size,
                    speed = report.speed,
                    "encode finished"
                );
                true
            }
            Err(err) => {
                error!(kind = ?err.kind(), "{}", err);
                false
            }
        },
        Command::Decode(args) => match decode_file(&args.input, &args.output) {
            Ok(report) => {
                info!(
                    geometry = %report.geometry,
                    points = report.num_points,
                    faces = report.num_faces,
                    format = %report.format,
                    "decode finished"
                );
                true
            }
            Err(err) => {
                error!(kind = ?err.kind(), "{}", err);
                false
            }
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_filter(LevelFilter::from(cli.log_level));
    tracing_subscriber::registry().with(fmt_layer).init();

    let mut module = BridgeModule::new();
    module.startup_module();
    let ok = run(&cli.command);
    module.shutdown_module();

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
