//! twig CLI - local version control command line interface

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use twig::ops::{self, MergeOutcome};
use twig::Repo;

#[derive(Parser)]
#[command(name = "twig")]
#[command(about = "local content-addressed version control")]
#[command(version)]
struct Cli {
    /// working directory holding the repository
    #[arg(short = 'C', long, env = "TWIG_DIR", default_value = ".")]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a new repository in the working directory
    Init,

    /// stage a file for the next commit
    Add {
        file: String,
    },

    /// record the staged changes
    Commit {
        message: String,
    },

    /// unstage a file, or remove a tracked file
    Rm {
        file: String,
    },

    /// show the history of the current branch
    Log {
        /// maximum number of commits to show
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },

    /// show every commit ever made
    GlobalLog,

    /// print the ids of commits with the given message
    Find {
        message: String,
    },

    /// show branches, pending changes and untracked files
    Status,

    /// restore a file (`-- <file>`, `<commit> -- <file>`) or switch branches (`<branch>`)
    Checkout {
        /// branch name, or commit id when a file follows `--`
        target: Option<String>,

        /// file to restore
        #[arg(last = true)]
        file: Option<String>,
    },

    /// create a branch at the current commit
    Branch {
        name: String,
    },

    /// delete a branch pointer
    RmBranch {
        name: String,
    },

    /// move the current branch to a commit and check it out
    Reset {
        commit: String,
    },

    /// merge a branch into the current one
    Merge {
        branch: String,
    },

    /// list branches
    Branches,

    /// verify repository integrity
    Fsck,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("TWIG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        // user mistakes are reported, not failures
        Err(e) if e.is_user_error() => {
            println!("{}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> twig::Result<ExitCode> {
    match cli.command {
        Commands::Init => {
            Repo::init(&cli.work_dir)?;
            Ok(ExitCode::SUCCESS)
        }
        command => run_in_repo(&Repo::open(&cli.work_dir)?, command),
    }
}

fn run_in_repo(repo: &Repo, command: Commands) -> twig::Result<ExitCode> {
    match command {
        Commands::Init => return Err(twig::Error::RepoExists(repo.path().to_path_buf())),

        Commands::Add { file } => {
            ops::add(repo, &file)?;
        }

        Commands::Commit { message } => {
            ops::commit(repo, &message)?;
        }

        Commands::Rm { file } => {
            ops::rm(repo, &file)?;
        }

        Commands::Log { max_count } => {
            for entry in ops::log(repo, max_count)? {
                println!("{}", entry);
            }
        }

        Commands::GlobalLog => {
            for entry in ops::global_log(repo)? {
                println!("{}", entry);
            }
        }

        Commands::Find { message } => {
            for hash in ops::find(repo, &message)? {
                println!("{}", hash);
            }
        }

        Commands::Status => {
            println!("{}", ops::status(repo)?);
        }

        Commands::Checkout { target, file } => match (target, file) {
            (None, Some(file)) => ops::checkout_file(repo, &file)?,
            (Some(commit), Some(file)) => ops::checkout_file_at(repo, &commit, &file)?,
            (Some(branch), None) => {
                ops::checkout_branch(repo, &branch)?;
            }
            (None, None) => Cli::command()
                .error(
                    clap::error::ErrorKind::MissingRequiredArgument,
                    "checkout needs a branch, or a file after `--`",
                )
                .exit(),
        },

        Commands::Branch { name } => {
            ops::create_branch(repo, &name)?;
        }

        Commands::RmBranch { name } => {
            ops::delete_branch(repo, &name)?;
        }

        Commands::Reset { commit } => {
            ops::reset(repo, &commit)?;
        }

        Commands::Merge { branch } => match ops::merge(repo, &branch)? {
            MergeOutcome::FastForward(_) => println!("Current branch fast-forwarded."),
            MergeOutcome::AlreadyAncestor => {
                println!("Given branch is an ancestor of the current branch.")
            }
            MergeOutcome::Merged(_) => {}
            MergeOutcome::Conflicted(_) => println!("Encountered a merge conflict."),
        },

        Commands::Branches => {
            for branch in ops::list_branches(repo)? {
                let marker = if branch.current { "*" } else { " " };
                println!("{}{} {}", marker, branch.name, branch.commit.short());
            }
        }

        Commands::Fsck => {
            let report = ops::fsck(repo)?;
            print!("{}", report);
            if !report.is_ok() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
