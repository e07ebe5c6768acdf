mod controls;
mod demo;
mod shapes;
mod studio;
mod textures;

use anyhow::Result;
use tessera_engine::device::GpuInit;
use tessera_engine::logging::{init_logging, LoggingConfig};
use tessera_engine::tess::TessellationConfig;
use tessera_engine::window::{Runtime, RuntimeConfig};

use studio::Studio;

fn main() -> Result<()> {
    init_logging(LoggingConfig::with_default_filter(
        "tessera_engine=info,tessera_studio=info,wgpu=warn",
    ));

    log::info!("keys: 1/2/3 demo, 0 stop, tab shape, t tessellation, w wireframe, space play");
    log::info!("      up/down factor, left/right phong, pgup/pgdn displacement, z/x zoom, esc quit");

    let config = RuntimeConfig {
        title: String::from("tessera studio"),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default(), Studio::new(TessellationConfig::default()))
}
