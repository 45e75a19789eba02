use std::env;
use std::path::Path;

/// Variables embedded into the firmware with `env!`
const EMBEDDED_VARS: [&str; 2] = ["WIFI_SSID", "WIFI_PASSWORD"];

fn main() {
    load_env_config();

    linker_be_nice();
    // linkall.x has to stay the last linker script
    println!("cargo:rustc-link-arg=-Tlinkall.x");
}

/// Export the WiFi credentials to the compiler.
///
/// Values already present in the environment win over the `.env` file.
fn load_env_config() {
    println!("cargo:rerun-if-changed=.env");
    for var in EMBEDDED_VARS {
        println!("cargo:rerun-if-env-changed={}", var);
    }

    if Path::new(".env").exists() {
        if let Err(e) = dotenvy::dotenv() {
            println!("cargo:warning=Failed to load .env file: {}", e);
        }
    }

    for var in EMBEDDED_VARS {
        let value = env::var(var).unwrap_or_default().trim().to_string();
        if value.is_empty() {
            println!("cargo:warning={} is empty, the board will not be able to join WiFi", var);
        }
        println!("cargo:rustc-env={}={}", var, value);
    }
}

fn linker_be_nice() {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        let kind = &args[1];
        let what = &args[2];

        match kind.as_str() {
            "undefined-symbol" => match what.as_str() {
                "_stack_start" => {
                    eprintln!();
                    eprintln!("💡 Is the linker script `linkall.x` missing?");
                    eprintln!();
                }
                "esp_wifi_preempt_enable"
                | "esp_wifi_preempt_yield_task"
                | "esp_wifi_preempt_task_create" => {
                    eprintln!();
                    eprintln!("💡 `esp-wifi` has no scheduler enabled. Enable the `builtin-scheduler` feature or provide an external scheduler.");
                    eprintln!();
                }
                _ => (),
            },
            _ => {
                std::process::exit(1);
            }
        }

        std::process::exit(0);
    }

    println!(
        "cargo:rustc-link-arg=--error-handling-script={}",
        env::current_exe().unwrap().display()
    );
}
