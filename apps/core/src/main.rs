fn main() {
    let options = match chatfind_core::runtime::parse_cli_args(std::env::args_os()) {
        Ok(options) => options,
        Err(error) => error.exit(),
    };

    if let Err(error) = chatfind_core::runtime::run_with_options(options) {
        eprintln!("[chatfind-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
