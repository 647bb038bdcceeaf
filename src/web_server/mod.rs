pub mod server;

#[cfg(test)]
mod tests;

pub use server::WebServer;
