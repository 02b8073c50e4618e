fn main() {
    if let Err(err) = wisa_lib::run() {
        eprintln!("wisa: {err:#}");
        std::process::exit(1);
    }
}
