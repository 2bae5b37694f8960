use std::process;

fn main() {
    match promcheck_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("promcheck error: {err:#}");
            process::exit(1);
        }
    }
}
