pub mod handlers;
pub mod responses;
mod server;

pub use server::{handle_rejection, routes, serve};
