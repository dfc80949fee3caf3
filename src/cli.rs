//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use mote_core::constants::{DISCORD_API_BASE, SEVENTV_API_BASE};

/// Grab an emote and upload it to a guild.
///
/// Mote resolves a 7TV emote page, a direct emote-CDN URL, or a chat
/// attachment URL into download candidates, fits the image to the
/// platform's size limits, and uploads it to the guild's emote collection.
#[derive(Parser, Debug)]
#[command(name = "mote")]
#[command(author, version, about)]
pub struct Args {
    /// Emote source: 7TV emote page URL, cdn.7tv.app emote URL, or an
    /// attachment URL
    pub source: String,

    /// Emote name override (2-32 alphanumeric/underscore characters);
    /// defaults to the name the source declares
    #[arg(short, long)]
    pub name: Option<String>,

    /// Target guild id
    #[arg(short, long, env = "MOTE_GUILD_ID")]
    pub guild_id: String,

    /// Bot token used to authorize the upload
    #[arg(short, long, env = "MOTE_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Base URL of the guild emoji API
    #[arg(long, default_value = DISCORD_API_BASE)]
    pub api_base: String,

    /// Base URL of the 7TV emote metadata API
    #[arg(long, default_value = SEVENTV_API_BASE)]
    pub seventv_base: String,

    /// How oversized images are scaled down before re-encoding
    #[arg(long, value_enum, default_value_t = FitPolicyArg::BoundingBox)]
    pub fit_policy: FitPolicyArg,

    /// Directory for request-scoped working files
    #[arg(short = 'w', long, default_value = "/tmp/mote")]
    pub working_dir: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// CLI-facing names for the size-fit policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FitPolicyArg {
    /// Fit the image inside the platform's maximum pixel box.
    BoundingBox,
    /// Scale dimensions by the square root of the byte overshoot.
    SizeRatio,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &[&str] = &["mote", "https://7tv.app/emotes/abc", "-g", "42", "-t", "tok"];

    fn with_extra<'a>(extra: &'a [&'a str]) -> Vec<&'a str> {
        BASE.iter().chain(extra).copied().collect()
    }

    #[test]
    fn test_cli_minimal_args_parse_with_defaults() {
        let args = Args::try_parse_from(BASE).unwrap();
        assert_eq!(args.source, "https://7tv.app/emotes/abc");
        assert_eq!(args.guild_id, "42");
        assert_eq!(args.name, None);
        assert_eq!(args.api_base, DISCORD_API_BASE);
        assert_eq!(args.seventv_base, SEVENTV_API_BASE);
        assert_eq!(args.fit_policy, FitPolicyArg::BoundingBox);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_source_is_required() {
        let result = Args::try_parse_from(["mote", "-g", "42", "-t", "tok"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_name_override() {
        let args = Args::try_parse_from(with_extra(&["--name", "pepeLaugh"])).unwrap();
        assert_eq!(args.name.as_deref(), Some("pepeLaugh"));
    }

    #[test]
    fn test_cli_fit_policy_values() {
        let args = Args::try_parse_from(with_extra(&["--fit-policy", "size-ratio"])).unwrap();
        assert_eq!(args.fit_policy, FitPolicyArg::SizeRatio);

        let result = Args::try_parse_from(with_extra(&["--fit-policy", "bogus"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(with_extra(&["-vv"])).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["mote", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
