fn main() {
    // ESP-IDF images need the sysenv exported for the linker; host builds
    // (simulator, tests) have nothing to generate.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
