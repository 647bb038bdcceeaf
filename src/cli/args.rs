use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config YAML file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging for internal details
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Keep rules synchronized with the profiles until Ctrl+C (default)
    Run,
    /// Synchronize installed rules with the enabled profiles once
    Sync,
    /// Print the installed dynamic rules
    Rules,
    /// Print the rules the current profiles compile to, without installing them
    Compile,
    /// List profiles, enabled first
    List,
    /// Create a profile
    Add(ProfileArgs),
    /// Edit a profile; omitted fields keep their current value
    Edit(EditArgs),
    /// Create a disabled copy of a profile
    Clone(IdArgs),
    /// Delete a profile
    Delete(IdArgs),
    /// Enable a profile
    Enable(IdArgs),
    /// Disable a profile
    Disable(IdArgs),
    /// Export profiles to a JSON file
    Export(ExportArgs),
    /// Import profiles from a JSON export; imported profiles start disabled
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Profile display name
    #[arg(long)]
    pub name: String,

    /// URL pattern: domain, URL prefix, path or raw url filter
    #[arg(long)]
    pub url: String,

    /// Header action: add:Name=value, modify:Name=value or delete:Name
    #[arg(long = "header", required = true)]
    pub headers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub url: Option<String>,

    /// Replaces every header when given
    #[arg(long = "header")]
    pub headers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Profile ids to export; all profiles when omitted
    pub ids: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Export file to read
    pub file: PathBuf,

    /// Zero-based entries to import; all entries when omitted
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::parse_from(["modify-headers", "--debug"]);
        assert!(cli.debug);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_add_with_headers() {
        let cli = Cli::parse_from([
            "modify-headers",
            "add",
            "--name",
            "Dev",
            "--url",
            "example.com",
            "--header",
            "add:X-Env=dev",
            "--header",
            "delete:Cookie",
        ]);

        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.name, "Dev");
                assert_eq!(args.headers, vec!["add:X-Env=dev", "delete:Cookie"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_import_selection() {
        let cli = Cli::parse_from([
            "modify-headers",
            "import",
            "profiles.json",
            "--select",
            "0,2",
            "--config",
            "config.yaml",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("config.yaml")));
        match cli.command {
            Some(Commands::Import(args)) => assert_eq!(args.select, vec![0, 2]),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
