//! Binary entrypoint for fontshelf

fn main() {
    if let Err(err) = fontshelf_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
