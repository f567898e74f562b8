fn main() {
    embuild::espidf::sysenv::output();

    println!("cargo:rerun-if-env-changed=STEPWATCH_REPORT_HOST");
    println!("cargo:rerun-if-env-changed=STEPWATCH_REPORT_PORT");
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASS");
}
