use grass_block::config::SceneConfig;

fn main() -> anyhow::Result<()> {
    let show_axes = std::env::args().any(|arg| arg == "--axes");
    grass_block::run(SceneConfig::default().with_axes(show_axes))
}
