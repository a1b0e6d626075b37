fn main() {
    std::process::exit(rpcgen_cli::run());
}
