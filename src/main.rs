fn main() {
    pmcl_lib::run()
}
