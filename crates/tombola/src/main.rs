use relm4::prelude::*;
use tombola::config;
use tombola::gui::app::AppModel;
use tombola::sys::runtime;

fn main() {
    env_logger::init();

    let config = config::load_or_setup();

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx.clone());

    let app = RelmApp::new("org.rondel.tombola");

    app.run::<AppModel>((config, rx));
}
