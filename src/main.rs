fn main() {
    if let Err(err) = manpower_ledger::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
