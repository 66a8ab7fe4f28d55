use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use remnant_core::VERSION;

/// Remnant - a private, PIN-locked archive of relationship reflections
#[derive(Parser)]
#[command(name = "remnant")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the archive database
    #[arg(short, long, global = true, env = "REMNANT_ARCHIVE")]
    pub archive: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,
}

/// Arguments for the `profile add` command
#[derive(Args)]
pub struct ProfileAddArgs {
    /// Display name (stored unencrypted)
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Relationship type (romantic, friendship, family, professional, other)
    #[arg(long = "type", default_value = "undefined")]
    pub relationship_type: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
}

/// Arguments for the `profile list` command
#[derive(Args)]
pub struct ProfileListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for commands addressing one profile
#[derive(Args)]
pub struct ProfileIdArgs {
    /// Profile ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for the `profile show` command
#[derive(Args)]
pub struct ProfileShowArgs {
    /// Profile ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Create a new profile
    Add(ProfileAddArgs),

    /// List profiles
    List(ProfileListArgs),

    /// Show a profile with its decrypted reflections
    Show(ProfileShowArgs),

    /// Delete a profile and all of its media
    Delete(ProfileIdArgs),
}

/// Arguments for the `reflect` command
#[derive(Args)]
pub struct ReflectArgs {
    /// Profile ID (full UUID)
    #[arg(value_name = "PROFILE_ID")]
    pub profile_id: String,

    /// Section (overview, timeline, thoughts, lessons, patterns, closure)
    #[arg(value_name = "SECTION")]
    pub section: String,

    /// Section text (overrides stdin); empty clears the section
    #[arg(long)]
    pub body: Option<String>,
}

/// Arguments for the `analyze` command
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Profile ID (full UUID)
    #[arg(value_name = "PROFILE_ID")]
    pub profile_id: String,

    /// Section to analyze
    #[arg(value_name = "SECTION")]
    pub section: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `media add` command
#[derive(Args)]
pub struct MediaAddArgs {
    /// Profile ID (full UUID)
    #[arg(value_name = "PROFILE_ID")]
    pub profile_id: String,

    /// File to import
    #[arg(value_name = "FILE")]
    pub file: String,

    /// MIME type of the file
    #[arg(long, default_value = "application/octet-stream")]
    pub mime: String,
}

/// Arguments for the `media list` command
#[derive(Args)]
pub struct MediaListArgs {
    /// Profile ID (full UUID)
    #[arg(value_name = "PROFILE_ID")]
    pub profile_id: String,
}

/// Arguments for the `media export` command
#[derive(Args)]
pub struct MediaExportArgs {
    /// Media ID (full UUID)
    #[arg(value_name = "MEDIA_ID")]
    pub id: String,

    /// Destination path for the decrypted file
    #[arg(value_name = "DEST")]
    pub destination: String,
}

/// Arguments for the `media delete` command
#[derive(Args)]
pub struct MediaDeleteArgs {
    /// Media ID (full UUID)
    #[arg(value_name = "MEDIA_ID")]
    pub id: String,
}

#[derive(Subcommand)]
pub enum MediaCommands {
    /// Encrypt and attach a file to a profile
    Add(MediaAddArgs),

    /// List media attached to a profile
    List(MediaListArgs),

    /// Decrypt a media item to a file
    Export(MediaExportArgs),

    /// Delete a media item
    Delete(MediaDeleteArgs),
}

/// Arguments for the `seal` and `open` commands
#[derive(Args)]
pub struct FileArgs {
    /// Input file
    #[arg(value_name = "IN")]
    pub input: String,

    /// Output file
    #[arg(value_name = "OUT")]
    pub output: String,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up the archive PIN
    Init,

    /// Check a PIN against the stored sentinel
    Verify,

    /// Manage relationship profiles
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Write a reflection section on a profile
    Reflect(ReflectArgs),

    /// Run the configured analyzer over one reflection section
    Analyze(AnalyzeArgs),

    /// Manage encrypted media
    #[command(subcommand)]
    Media(MediaCommands),

    /// Encrypt an arbitrary file with the archive key
    Seal(FileArgs),

    /// Decrypt a file produced by `seal`
    Open(FileArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
