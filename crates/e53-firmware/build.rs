//! Exports the network and cloud credentials as compile-time variables.
//!
//! Values come from the process environment or a `.env` file next to the
//! workspace. Anything left unset falls back to the board defaults in
//! `e53_core::config`.

const VARIABLES: [&str; 6] = [
    "E53_WIFI_SSID",
    "E53_WIFI_PASSWORD",
    "E53_DEVICE_ID",
    "E53_DEVICE_SECRET",
    "E53_SERVER_ADDR",
    "E53_SERVER_PORT",
];

fn main() {
    match dotenvy::dotenv() {
        Ok(path) => println!("cargo:rerun-if-changed={}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => println!("cargo:warning=Ignoring unreadable .env file: {}", e),
    }

    for name in VARIABLES {
        if let Ok(value) = std::env::var(name) {
            println!("cargo:rustc-env={}={}", name, value);
            if name.ends_with("PASSWORD") || name.ends_with("SECRET") {
                println!("cargo:warning=Using {} from environment (hidden)", name);
            } else {
                println!("cargo:warning=Using {} from environment: {}", name, value);
            }
        }
        println!("cargo:rerun-if-env-changed={}", name);
    }

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
