use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the provisioning engine.
#[derive(Parser, Debug)]
#[command(
    name = "rigup",
    about = "Declarative machine provisioning engine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the machine-config root directory (default: $RIGUP_ROOT or cwd)
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply a target's declared state to this machine
    Sync(SyncOpts),
    /// Check the document for duplicate names and malformed executors
    Validate,
    /// Declare a new executor
    Add(AddOpts),
    /// Select an executor for a target
    Use(SelectOpts),
    /// Remove an executor from a target's selection
    Cease(SelectOpts),
    /// Open the document in $EDITOR
    Edit,
    /// Print version information
    Version,
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SyncOpts {
    /// Target (machine profile) to apply
    pub target: String,

    /// Replace unmanaged files found at symlink destinations
    #[arg(short, long)]
    pub force: bool,

    /// Run only executors of these kinds (e.g. config-file,system-package)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip executors of these kinds
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,
}

/// Options for the `add` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct AddOpts {
    /// Executor kind (config-file, git-repo, github-release, ...)
    pub kind: String,

    /// Unique executor name
    pub name: String,

    /// Kind-specific parameters as key=value pairs
    pub params: Vec<String>,
}

/// Options for the `use` and `cease` subcommands.
#[derive(Parser, Debug, Clone)]
pub struct SelectOpts {
    /// Target whose selection list is edited
    pub target: String,

    /// Executor name to select or deselect
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_sync_with_target() {
        let cli = Cli::parse_from(["rigup", "sync", "laptop"]);
        assert!(matches!(cli.command, Command::Sync(ref o) if o.target == "laptop"));
    }

    #[test]
    fn parse_sync_force() {
        let cli = Cli::parse_from(["rigup", "sync", "laptop", "--force"]);
        if let Command::Sync(opts) = cli.command {
            assert!(opts.force);
        } else {
            panic!("expected sync command");
        }
    }

    #[test]
    fn parse_sync_kind_filters() {
        let cli = Cli::parse_from([
            "rigup",
            "sync",
            "laptop",
            "--only",
            "config-file,config-directory",
            "--skip",
            "system-package",
        ]);
        if let Command::Sync(opts) = cli.command {
            assert_eq!(opts.only, vec!["config-file", "config-directory"]);
            assert_eq!(opts.skip, vec!["system-package"]);
        } else {
            panic!("expected sync command");
        }
    }

    #[test]
    fn parse_add_with_params() {
        let cli = Cli::parse_from([
            "rigup",
            "add",
            "config-file",
            "vimrc",
            "source=vim/vimrc",
            "destination=~/.vimrc",
        ]);
        if let Command::Add(opts) = cli.command {
            assert_eq!(opts.kind, "config-file");
            assert_eq!(opts.name, "vimrc");
            assert_eq!(opts.params.len(), 2);
        } else {
            panic!("expected add command");
        }
    }

    #[test]
    fn parse_use_and_cease() {
        let cli = Cli::parse_from(["rigup", "use", "laptop", "ripgrep"]);
        assert!(matches!(cli.command, Command::Use(ref o) if o.target == "laptop"));
        let cli = Cli::parse_from(["rigup", "cease", "laptop", "ripgrep"]);
        assert!(matches!(cli.command, Command::Cease(ref o) if o.name == "ripgrep"));
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::parse_from(["rigup", "--root", "/tmp/rig", "validate"]);
        assert_eq!(cli.global.root, Some(std::path::PathBuf::from("/tmp/rig")));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["rigup", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["rigup", "-v", "validate"]);
        assert!(cli.verbose);
    }
}
