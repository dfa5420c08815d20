fn main() {
    if let Err(err) = state_diagram_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
