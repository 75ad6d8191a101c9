// ==================== Imports ====================
use engine::GameLoop;
use game::FlappyFighter;
use wasm_bindgen::prelude::*;

#[macro_use]
pub mod browser;
pub mod engine;
pub mod game;
pub mod settings;

// ==================== Main Functions ====================
/// Main entry for the WebAssembly module
/// - reads settings.json (or the defaults)
/// - loads the sprites, then hands the game to the loop
/// - a failed start is logged and nothing is drawn
#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    // readable panic messages in the browser console
    console_error_panic_hook::set_once();

    browser::spawn_local(async move {
        let settings = settings::load().await;
        let game = FlappyFighter::new(settings);

        if let Err(err) = GameLoop::start(game).await {
            error!("Could not start game loop : {:#}", err);
        }
    });

    Ok(())
}
