use clap::{Parser, Subcommand};
use stringsfile_cli::{
    Config,
    config::API_KEY_ENV,
    export::run_export_command,
    import::run_import_command,
    merge::run_merge_command,
    report::run_report_command,
    scan::run_scan_command,
    translate::{TranslateOptions, run_translate_command},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stringsutil", author, version, about, long_about = None)]
struct Args {
    /// The strings file to operate on
    #[arg(short = 'f', long = "strings", global = true)]
    strings_file: Option<String>,

    /// Localization function or macro name for `scan` (default `_`)
    #[arg(short = 'n', long = "function", global = true)]
    function: Option<String>,

    /// Add strings that are not in the strings file yet (import)
    #[arg(short = 'a', long, global = true)]
    add: bool,

    /// Remove strings the other file no longer has (merge)
    #[arg(short = 'c', long, global = true)]
    clean: bool,

    /// Target language for `translate` (default: the strings file name)
    #[arg(short = 'l', long = "language", global = true)]
    language: Option<String>,

    /// API key for the translation service
    #[arg(short = 'A', long = "api-key", global = true)]
    api_key: Option<String>,

    /// Base URL of the translation service
    #[arg(short = 'T', long = "url", global = true)]
    url: Option<String>,

    /// Config file (default: ./stringsutil.toml when present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log debug information to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Export strings to a GNU gettext .po, C header (.h) or .strings file.
    Export {
        /// The file to write; its extension picks the format
        output: String,
    },

    /// Import translations from a GNU gettext .po or .strings file.
    Import {
        /// The file to import from
        input: String,
    },

    /// Merge strings from another strings file.
    Merge {
        /// The strings file to merge from
        input: String,
    },

    /// Report untranslated, missing and mismatched strings.
    Report {
        /// Reference strings file holding the current keys
        reference: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error unless every string is translated and current
        #[arg(long)]
        strict: bool,
    },

    /// Scan C/C++ source files for localizable strings.
    Scan {
        /// Source files or glob patterns
        #[arg(required = true)]
        sources: Vec<String>,
    },

    /// Machine-translate untranslated strings via a LibreTranslate service.
    Translate,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: Args) -> Result<(), String> {
    let flags = Config {
        strings_file: args.strings_file,
        scan_function: args.function,
        locale: args.language,
        api_key: args.api_key,
        translate_url: args.url,
    };
    let settings = Config::load(args.config.as_deref())?
        .overridden_by(flags)
        .into_settings(std::env::var(API_KEY_ENV).ok())?;

    match args.commands {
        Commands::Export { output } => run_export_command(&settings.strings_file, &output),
        Commands::Import { input } => {
            run_import_command(&settings.strings_file, &input, args.add)
        }
        Commands::Merge { input } => run_merge_command(&settings.strings_file, &input, args.clean),
        Commands::Report {
            reference,
            json,
            strict,
        } => run_report_command(&settings.strings_file, reference.as_deref(), json, strict),
        Commands::Scan { sources } => {
            run_scan_command(&settings.strings_file, &sources, &settings.scan_function)
        }
        Commands::Translate => run_translate_command(TranslateOptions {
            strings_file: settings.strings_file,
            url: settings.translate_url,
            api_key: settings.api_key,
            language: settings.locale,
        }),
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("stringsutil: {}", e);
        std::process::exit(1);
    }
}
