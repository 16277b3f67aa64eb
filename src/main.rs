use log::info;

use site_behaviors::config;
use site_behaviors::dom::browser;

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting site behaviors");
    browser::start();
}
