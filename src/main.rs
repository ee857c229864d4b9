mod client;
mod components;
mod config;
mod error;
mod model;
mod net;
mod protocol;
mod render;
mod state;
mod util;

use components::app::{App, AppProps};
use config::ClientConfig;
use util::ConsoleLogger;

fn main() {
    let config = ClientConfig::load();
    ConsoleLogger::install(config.level_filter());
    log::info!("turrest client starting, server {}", config.ws_url);
    yew::Renderer::<App>::with_props(AppProps { config }).render();
}
