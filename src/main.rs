fn main() {
    if let Err(err) = logicmap::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
