use std::process::ExitCode;

use clap::Parser;
use dynogen_core::init_tracing;

mod generate;

use generate::{GenerateArgs, subcommand_generate};

#[derive(Parser, Debug, Eq, PartialEq)]
#[command(name = "dynogen", author, version, about)]
enum Args {
    /// Build DynamoDB mappers from config
    Generate(GenerateArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = init_tracing() {
        eprintln!("[Warn] {err}");
    }

    let result = match &args {
        Args::Generate(generate) => subcommand_generate(generate).await.map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[Fatal] {err}");
            for cause in err.chain().skip(1) {
                eprintln!("  caused by: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}
