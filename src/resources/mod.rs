/**
 * Loading of external assets. Native builds read from the `assets` directory,
 * the web build fetches the same paths relative to the page origin.
 */
pub mod texture;

use futures::future::try_join_all;

use crate::data_structures::texture::Texture;

/// Loads all `file_names` concurrently. Fails on the first texture that cannot
/// be fetched or decoded.
pub async fn load_textures(
    file_names: &[&str],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Vec<Texture>> {
    let textures = try_join_all(
        file_names
            .iter()
            .map(|name| texture::load_texture(name, device, queue)),
    )
    .await?;
    log::info!("loaded {} textures", textures.len());
    Ok(textures)
}
