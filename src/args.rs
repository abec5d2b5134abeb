use clap::Parser;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = None,
)]
pub struct Args {
    /// Path to the observed substitution count matrix (flat numeric text).
    #[clap(short, long)]
    pub counts: String,

    /// Additional candidate model files in PAML format. May be repeated.
    #[clap(short, long)]
    pub model: Vec<String>,

    /// Path to scoring settings (YAML). Defaults are used when omitted.
    #[clap(long)]
    pub settings: Option<String>,

    /// Path to log file.
    #[clap(long, default_value = "modelmatcher.log")]
    pub log_file: String,

    /// Verbosity level.
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
