use clap::Parser;

mod cli;
pub mod exit_codes;

use cli::args::Cli;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = cli::logging::init(cli.verbose) {
        eprintln!("warning: logging disabled: {e:#}");
    }

    std::process::exit(cli::commands::collect::run(cli));
}
