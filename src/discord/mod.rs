mod bot;
mod commands;
mod handler;

pub use bot::{Data, create_framework};
