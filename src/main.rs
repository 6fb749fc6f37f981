mod cli;
mod commands;

fn main() {
    if let Err(err) = cli::run() {
        eprintln!("application error: {err}");
        std::process::exit(i32::from(err.exit_code()));
    }
}
