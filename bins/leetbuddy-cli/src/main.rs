mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "leetbuddy-cli")]
#[command(about = "LeetBuddy CLI - Operate the LeetBuddy judge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the Redis catalog from a problems file
    Seed {
        /// Problems file
        #[arg(short, long, default_value = "config/problems.json")]
        file: String,

        /// Redis connection URL
        #[arg(short, long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
        redis_url: String,
    },

    /// List problems in a problems file
    ListProblems {
        #[arg(short, long, default_value = "config/problems.json")]
        file: String,
    },

    /// List enabled languages
    ListLangs {
        #[arg(short, long, default_value = "config/languages.json")]
        file: String,
    },

    /// Print the program generated for a solution
    Harness {
        /// Problem slug (e.g., two-sum)
        #[arg(short, long)]
        problem: String,

        /// Language name (python, javascript)
        #[arg(short, long)]
        lang: String,

        /// Solution source file
        #[arg(short, long)]
        source: String,

        /// Embed this test case (1-based); free-run harness when omitted
        #[arg(short, long)]
        test_case: Option<u32>,

        /// Problems file
        #[arg(long, default_value = "config/problems.json")]
        catalog: String,
    },

    /// Judge a solution against a problem through Judge0
    Judge {
        /// Problem slug (e.g., two-sum)
        #[arg(short, long)]
        problem: String,

        /// Judge0 language id (71 python, 63 javascript)
        #[arg(short, long)]
        language_id: u32,

        /// Solution source file
        #[arg(short, long)]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed { file, redis_url } => {
            commands::seed(&file, &redis_url).await?;
        }
        Commands::ListProblems { file } => {
            commands::list_problems(&file)?;
        }
        Commands::ListLangs { file } => {
            commands::list_languages(&file)?;
        }
        Commands::Harness {
            problem,
            lang,
            source,
            test_case,
            catalog,
        } => {
            commands::print_harness(&catalog, &problem, &lang, &source, test_case)?;
        }
        Commands::Judge {
            problem,
            language_id,
            source,
        } => {
            commands::judge(&problem, language_id, &source).await?;
        }
    }

    Ok(())
}
