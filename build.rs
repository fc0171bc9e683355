//! Build script for detecting system dependencies and providing installation guidance.
//!
//! The desktop build links OpenCV and plays audio through ALSA on Linux. This
//! script checks for them with pkg-config and prints hints when they are
//! missing.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // The pure core needs no system libraries
    if env::var_os("CARGO_FEATURE_DESKTOP").is_none() {
        return;
    }

    check_pkg_config();
    check_opencv();
    check_alsa();

    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
}

fn pkg_config_version(package: &str) -> Option<String> {
    let output = Command::new("pkg-config").args(["--modversion", package]).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn check_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    match pkg_config_version("opencv4").or_else(|| pkg_config_version("opencv")) {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. Make sure OpenCV is installed.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev");
            println!("cargo:warning=On macOS: brew install opencv");
        }
    }
}

fn check_alsa() {
    // rodio uses ALSA only on Linux
    if !env::var("TARGET").unwrap_or_default().contains("linux") {
        return;
    }

    match pkg_config_version("alsa") {
        Some(version) => println!("cargo:warning=Found ALSA version: {version}"),
        None => {
            println!("cargo:warning=ALSA development files not found. The alarm will not build.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libasound2-dev");
        }
    }
}

fn check_pkg_config() {
    let output = Command::new("pkg-config").arg("--version").output();

    match output {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("cargo:warning=Found pkg-config version: {}", version.trim());
        }
        _ => {
            println!("cargo:warning=pkg-config not found. This is required to find system libraries.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install pkg-config");
            println!("cargo:warning=On macOS: brew install pkg-config");
        }
    }
}
