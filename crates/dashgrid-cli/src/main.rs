#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = dashgrid_cli::run_from_env() {
        eprintln!("dashgrid: {error}");
        std::process::exit(error.exit_code());
    }
}
