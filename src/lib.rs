//! MonoMind - smart-home control panel with natural language commands

pub mod command;
pub mod core;
pub mod device;
pub mod llm;
