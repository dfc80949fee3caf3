//! CLI entry point for the mote tool.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use mote_core::{
    DiscordUploader, FetchClient, Normalizer, Pipeline, PipelineRequest, SizeFitPolicy,
    SourceDescriptor, StdoutSink, build_default_registry,
};
use tracing::debug;

mod cli;

use cli::{Args, FitPolicyArg};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(source = %args.source, guild_id = %args.guild_id, "CLI arguments parsed");

    let descriptor = match SourceDescriptor::classify(&args.source) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let policy = match args.fit_policy {
        FitPolicyArg::BoundingBox => SizeFitPolicy::bounding_box(),
        FitPolicyArg::SizeRatio => SizeFitPolicy::SizeRatio,
    };

    let uploader = DiscordUploader::new(&args.api_base, &args.guild_id, &args.token);
    let pipeline = Pipeline::new(
        build_default_registry(&args.seventv_base),
        FetchClient::new(),
        Normalizer::new(policy),
        Arc::new(uploader),
        &args.working_dir,
    );

    let request = PipelineRequest {
        descriptor,
        suggested_name: args.name.clone(),
        // The CLI operator supplies the bot token directly; permission
        // gating belongs to chat-platform dispatch layers.
        has_manage_emotes: true,
        invocation: std::env::args().collect::<Vec<_>>().join(" "),
    };

    match pipeline.run(&request, &StdoutSink).await {
        Ok(()) => ExitCode::SUCCESS,
        // The pipeline already delivered the terminal notification.
        Err(_) => ExitCode::FAILURE,
    }
}
