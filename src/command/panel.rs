//! Routing of typed panel input
//!
//! Manual controls are only recognised when their arguments resolve against
//! the current home (a known device id, a number, a known room). Anything else
//! is a smart command for the interpreter, so "set the mood" or "room
//! temperature to 22" are never swallowed by the manual controls.

use crate::core::types::DeviceId;
use crate::device::collection::DeviceCollection;

/// What a line of input asks the panel to do
#[derive(Debug, Clone, PartialEq)]
pub enum PanelInput {
    Quit,
    Help,
    ListRooms,
    /// Show one room, or every room for `None`
    Filter(Option<String>),
    Toggle(DeviceId, bool),
    Step(DeviceId, f64),
    Set(DeviceId, f64),
    /// Free text for the natural language interpreter
    Smart(String),
}

/// Classify `input` against `home`. `input` must already be non-blank.
pub fn route(input: &str, home: &DeviceCollection) -> PanelInput {
    let input = input.trim();
    match input {
        "quit" | "q" => return PanelInput::Quit,
        "help" | "h" => return PanelInput::Help,
        "rooms" => return PanelInput::ListRooms,
        _ => {}
    }

    let words: Vec<&str> = input.split_whitespace().collect();
    let known = |id: &str| {
        let id = DeviceId::new(id);
        home.get(&id).is_some().then_some(id)
    };

    let routed = match words.as_slice() {
        ["room"] => Some(PanelInput::Filter(None)),
        ["room", name @ ..] => {
            let name = name.join(" ");
            if name.eq_ignore_ascii_case("all") {
                Some(PanelInput::Filter(None))
            } else {
                home.rooms()
                    .into_iter()
                    .find(|room| room.eq_ignore_ascii_case(&name))
                    .map(|room| PanelInput::Filter(Some(room.to_string())))
            }
        }
        ["on", id] => known(*id).map(|id| PanelInput::Toggle(id, true)),
        ["off", id] => known(*id).map(|id| PanelInput::Toggle(id, false)),
        ["up", id] => known(*id).map(|id| PanelInput::Step(id, 1.0)),
        ["down", id] => known(*id).map(|id| PanelInput::Step(id, -1.0)),
        ["set", id, value] => match (known(*id), value.parse::<f64>()) {
            (Some(id), Ok(value)) => Some(PanelInput::Set(id, value)),
            _ => None,
        },
        _ => None,
    };

    routed.unwrap_or_else(|| PanelInput::Smart(input.to_string()))
}
