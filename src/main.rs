//! MonoMind - Entry Point
//!
//! Terminal control panel: lists devices, offers manual toggle/value
//! controls, and sends any other text to the natural language interpreter.

use clap::Parser;
use monomind::command::{route, CommandSession, PanelInput};
use monomind::core::config::HomeConfig;
use monomind::core::error::Result;
use monomind::device::{Device, DeviceCollection, DeviceType};
use monomind::llm::client::LlmClient;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Smart-home control panel with natural language commands
#[derive(Parser, Debug)]
#[command(name = "monomind")]
struct Args {
    /// TOML configuration file (LLM settings and devices)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only list devices in this room
    #[arg(long)]
    room: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("monomind=info")),
        )
        .init();

    let config = match &args.config {
        Some(path) => HomeConfig::from_file(path)?,
        None => HomeConfig::default(),
    };
    let llm_config = config.llm.clone().with_env_overrides();
    llm_config.validate()?;

    let mut home = if config.devices.is_empty() {
        DeviceCollection::demo()
    } else {
        DeviceCollection::new(config.devices)?
    };

    // Create the async runtime for LLM calls
    let rt = Runtime::new()?;

    // Natural language commands are optional - manual controls work without them
    let session = match LlmClient::new(&llm_config) {
        Ok(client) => Some(
            CommandSession::new(client).with_timeout(Duration::from_secs(llm_config.timeout_secs)),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Running without natural language commands");
            None
        }
    };

    let mut room_filter = args.room;

    println!("\n=== MONOMIND ===");
    print_help(session.is_some());

    loop {
        display_devices(&home, room_filter.as_deref());

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        let result = match route(input, &home) {
            PanelInput::Quit => break,
            PanelInput::Help => {
                print_help(session.is_some());
                Ok(())
            }
            PanelInput::ListRooms => {
                println!("Rooms: All, {}", home.rooms().join(", "));
                Ok(())
            }
            PanelInput::Filter(room) => {
                room_filter = room;
                Ok(())
            }
            PanelInput::Toggle(id, is_on) => home.toggle(&id, is_on),
            PanelInput::Step(id, delta) => home.step_value(&id, delta),
            PanelInput::Set(id, value) => home.set_value(&id, value),
            PanelInput::Smart(command) => match &session {
                Some(session) => {
                    println!("Processing request...");
                    rt.block_on(session.submit(&command, &mut home))
                        .map(|outcome| println!("{}", outcome.message()))
                }
                None => {
                    println!("Unknown command. Set LLM_API_KEY to use natural language commands.");
                    Ok(())
                }
            },
        };

        if let Err(e) = result {
            println!("{}", e);
        }
    }

    println!("\nGoodbye! {} of {} devices active.", home.active_count(), home.len());
    Ok(())
}

fn print_help(natural_language: bool) {
    println!("Commands:");
    println!("  on <id> / off <id>   - Switch a device on or off");
    println!("  set <id> <value>     - Set brightness, temperature or fan speed");
    println!("  up <id> / down <id>  - Step a value by one");
    println!("  room [name]          - Filter by room (no name shows all)");
    println!("  rooms                - List rooms");
    println!("  help / h             - Show this help");
    println!("  quit / q             - Exit");
    if natural_language {
        println!("  <any text>           - Smart command, e.g. \"turn off all lights in the living room\"");
    }
    println!();
}

/// Display the device list, optionally filtered by room
fn display_devices(home: &DeviceCollection, room: Option<&str>) {
    println!();
    println!(
        "--- {} devices active | Room: {} ---",
        home.active_count(),
        room.unwrap_or("All")
    );

    let mut shown = 0;
    for device in home.in_room(room) {
        println!("  {}", describe(device));
        shown += 1;
    }
    if shown == 0 {
        println!("  No devices found in this room.");
    }
}

fn describe(device: &Device) -> String {
    let power = if device.is_on { "ON " } else { "OFF" };
    let detail = match device.device_type {
        DeviceType::Lock => {
            if device.is_on {
                "LOCKED".to_string()
            } else {
                "UNLOCKED".to_string()
            }
        }
        _ => match (device.value, &device.status) {
            (Some(value), _) => format!("{}{}", value, device.unit.as_deref().unwrap_or("")),
            (None, Some(status)) => status.clone(),
            (None, None) => String::new(),
        },
    };

    format!(
        "[{}] {:<4} {:<20} {:<12} {:<11} {}",
        power,
        device.id.as_str(),
        device.name,
        device.room,
        device.device_type.label(),
        detail
    )
}
