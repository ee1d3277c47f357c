//! Build script of the firmware.
//!
//! - puts `memory.x` on the linker search path and adds the linker scripts
//! - turns `config/wifi_config.json` into `wifi_secrets.rs`
//! - turns `config/time_api.json` into `time_api_config.rs`
//!
//! Missing config files are created with dummy values so a fresh checkout builds.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::print_stdout)]

use std::{
    env, fs,
    fs::File,
    io,
    io::Write,
    path::{Path, PathBuf},
};

fn main() {
    memory_x();
    wifi_secrets().unwrap();
    time_api_config().unwrap();
}

/// Read `config/<name>`, writing `dummy` to it first if it does not exist
fn read_config(name: &str, dummy: &str) -> serde_json::Value {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR environment variable not set");
    let config_path = Path::new(&manifest_dir).join("config").join(name);
    println!("cargo:rerun-if-changed={}", config_path.display());

    let contents = if config_path.exists() {
        fs::read_to_string(&config_path).expect("Could not read config file")
    } else {
        println!("cargo:warning={name} not found, creating it with dummy values");
        fs::create_dir_all(config_path.parent().expect("config path has a parent"))
            .expect("Could not create config directory");
        fs::write(&config_path, dummy).expect("Could not write dummy config file");
        dummy.to_string()
    };

    serde_json::from_str(&contents).expect("Could not parse config file")
}

/// Create `name` in the output directory
fn out_file(name: &str) -> File {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR environment variable not set");
    File::create(Path::new(&out_dir).join(name)).expect("Could not create generated file")
}

/// Generate `wifi_secrets.rs` from `wifi_config.json`
fn wifi_secrets() -> io::Result<()> {
    let config = read_config("wifi_config.json", r#"{"ssid":"dummy","password":"dummy"}"#);
    let ssid = config["ssid"]
        .as_str()
        .expect("ssid not found in wifi_config.json file");
    let password = config["password"]
        .as_str()
        .expect("password not found in wifi_config.json file");

    let mut f = out_file("wifi_secrets.rs");
    writeln!(f, "/// SSID of the network used for time sync")?;
    writeln!(f, "pub const SSID: &str = {ssid:?};")?;
    writeln!(f, "/// WPA2 passphrase of that network")?;
    writeln!(f, "pub const PASSWORD: &str = {password:?};")?;
    Ok(())
}

/// Generate `time_api_config.rs` from `time_api.json`
fn time_api_config() -> io::Result<()> {
    let config = read_config(
        "time_api.json",
        r#"{"baseurl":"http://worldtimeapi.org/api","path":"/timezone/Etc/UTC"}"#,
    );
    let baseurl = config["baseurl"]
        .as_str()
        .expect("baseurl not found in time_api.json file");
    let path = config["path"]
        .as_str()
        .expect("path not found in time_api.json file");

    let mut f = out_file("time_api_config.rs");
    writeln!(f, "/// Endpoint answering with a JSON object that carries `unixtime`")?;
    writeln!(f, "pub const TIME_SERVER_URL: &str = \"{baseurl}{path}\";")?;
    Ok(())
}

/// Handle the `memory.x` linker script
fn memory_x() {
    // Put `memory.x` in our output directory and ensure it's
    // on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=memory.x");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
