use clap::Parser;

use branchcone::runner::run;
use branchcone::runner::Cli;

fn main() {
    let cli = Cli::parse();
    std::process::exit(run(&cli));
}
