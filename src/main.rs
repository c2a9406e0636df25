fn main() {
    if let Err(e) = annoverify::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
