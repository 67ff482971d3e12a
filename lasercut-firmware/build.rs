//! Build script for lasercut-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates kiosk.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const SECTIONS: &[&str] = &["link", "port", "commands", "display", "input", "job"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate kiosk.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=kiosk.toml");

    let config_path = Path::new("kiosk.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: kiosk.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a kiosk.toml configuration file.            ║\n\
            ║  Please create one in the lasercut-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Cannot read kiosk.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => fail("Invalid TOML syntax in kiosk.toml", &[e.to_string()]),
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_link(&config, &mut errors);
    validate_port(&config, &mut errors);
    validate_display(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid kiosk configuration", &errors);
    }

    println!("cargo:warning=kiosk.toml validated successfully");
}

/// Only known sections, each a table
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };
    for (name, value) in root {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("Unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn validate_link(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(link) = config.get("link") else {
        return;
    };
    for key in [
        "reconnect_delay_ms",
        "settle_delay_ms",
        "handshake_timeout_ms",
        "connect_timeout_ms",
        "link_timeout_ms",
        "baudrate",
    ] {
        if let Some(value) = link.get(key) {
            match value.as_integer() {
                Some(n) if (0..=u32::MAX as i64).contains(&n) => {}
                _ => errors.push(format!("[link] {} must be an integer 0-{}", key, u32::MAX)),
            }
        }
    }
    if let Some(baud) = link.get("baudrate").and_then(|v| v.as_integer()) {
        if baud == 0 {
            errors.push("[link] baudrate cannot be 0".to_string());
        }
    }
}

fn validate_port(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(port) = config.get("port") else {
        return;
    };
    for (key, max_len) in [("transport", 8), ("path", 32)] {
        match port.get(key) {
            Some(toml::Value::String(s)) if s.len() > max_len => {
                errors.push(format!("[port] {} longer than {} bytes", key, max_len))
            }
            Some(toml::Value::String(s)) if s.contains(',') => {
                errors.push(format!("[port] {} cannot contain ','", key))
            }
            Some(toml::Value::String(_)) | None => {}
            Some(_) => errors.push(format!("[port] {} must be a string", key)),
        }
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = config.get("display") else {
        return;
    };

    if let Some(width) = display.get("width").and_then(|v| v.as_integer()) {
        if !(1..=128).contains(&width) {
            errors.push("[display] width must be 1-128".to_string());
        }
    }
    if let Some(height) = display.get("height").and_then(|v| v.as_integer()) {
        if !(8..=64).contains(&height) || height % 8 != 0 {
            errors.push("[display] height must be a multiple of 8, 8-64".to_string());
        }
    }
    if let Some(address) = display.get("i2c_address").and_then(|v| v.as_integer()) {
        if !(0..=0x7F).contains(&address) {
            errors.push("[display] i2c_address must be a 7-bit address".to_string());
        }
    }
    if let Some(rotation) = display.get("rotation") {
        if !matches!(rotation.as_str(), Some("normal") | Some("upside_down")) {
            errors.push("[display] rotation must be 'normal' or 'upside_down'".to_string());
        }
    }
}

fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .flat_map(|l| l.lines())
            .map(|l| {
                let l = if l.len() > 62 {
                    format!("{}...", &l[..59])
                } else {
                    l.to_string()
                };
                format!("║  • {:<62} ║", l)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
