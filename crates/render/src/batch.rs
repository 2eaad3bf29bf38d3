//! Rendering many documents on the rayon pool.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::html::{RenderOptions, Renderer};

/// Options for [`render_batch`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOptions {
    /// Upper bound on worker threads. `None` uses the global rayon pool.
    #[serde(default)]
    pub max_threads: Option<usize>,
    /// Options applied to every input.
    #[serde(default)]
    pub render: RenderOptions,
}

/// Renders every input to HTML, in parallel. Output order matches input order.
pub fn render_batch<S>(inputs: &[S], options: &BatchOptions) -> Vec<String>
where
    S: AsRef<str> + Sync,
{
    let renderer = Renderer::new(options.render.clone());

    let pool = options.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| log::warn!("Falling back to the global thread pool: {e}"))
            .ok()
    });

    let render_all = || -> Vec<String> {
        inputs
            .par_iter()
            .map(|input| renderer.render(input.as_ref()))
            .collect()
    };

    log::debug!("Rendering batch of {} documents", inputs.len());
    match pool {
        Some(pool) => pool.install(render_all),
        None => render_all(),
    }
}
