use args::Args;
use clap::Parser;

mod args;
mod logger;
mod report;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(&args);

    let config = args.config()?;
    let input = args.read_input()?;

    log::debug!("Inspecting input as {}", config.input.kind);

    match report::render(&config, &input) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            // Always printed, even with logging off.
            eprintln!("{e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}
