fn main() {
    std::process::exit(horadric_lib::run());
}
