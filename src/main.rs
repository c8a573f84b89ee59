//! Matrix Form entry point
//!
//! Web builds bootstrap the page; native builds run a headless session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    matrix_form::platform::web::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Matrix Form (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    headless_session();
}

/// Drive the whole page without a browser and log what happened
#[cfg(not(target_arch = "wasm32"))]
fn headless_session() {
    use matrix_form::form::{FormView, SubmitEvent};
    use matrix_form::platform::headless::HeadlessPage;
    use matrix_form::{Settings, boot};

    struct Submit;

    impl SubmitEvent for Submit {
        fn prevent_default(&self) {}
    }

    let settings = Settings::load();
    let page = HeadlessPage::new(1280.0, 720.0);
    let report = boot(&page, &settings);
    println!("Boot: {:?}", report);

    for frame in 0..120 {
        page.scheduler().run_frame(frame as f64 * 16.7);
    }
    page.resize(800.0, 600.0);
    for frame in 120..180 {
        page.scheduler().run_frame(frame as f64 * 16.7);
    }
    if let Some(rain) = page.rain() {
        let rain = rain.borrow();
        println!(
            "Rain: {} columns, {} glyphs drawn",
            rain.renderer.columns(),
            rain.surface.texts().count()
        );
    }

    page.with_form(|form| {
        for (name, value) in [
            ("nome", "Ada Lovelace"),
            ("email", "ada@example.com"),
            ("senha", "analytical"),
            ("pais", "uk"),
            ("mensagem", "Pronta para sair da Matrix."),
        ] {
            form.view_mut().set_field(name, value);
            form.on_input(Some(name));
        }
        println!("Counter: {:?}", form.view().counter());
        println!("Submit: {:?}", form.on_submit(&Submit));
        if let Some(feedback) = form.view().feedback() {
            println!("Feedback: {}", feedback.message);
        }
    });

    println!(
        "Saved snapshot: {}",
        page.storage()
            .raw(&settings.form.storage_key)
            .unwrap_or_default()
    );
}
