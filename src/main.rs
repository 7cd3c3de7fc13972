use yew_nav_console::components::app::{App, AppProps};
use yew_nav_console::config::AppConfig;

fn main() {
    console_error_panic_hook::set_once();

    let config = AppConfig::from_browser();
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(config.log_level)
            .build(),
    );
    tracing::info!("rosbridge endpoint {}", config.url);

    yew::Renderer::<App>::with_props(AppProps { config }).render();
}
