use anyhow::anyhow;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

use portal_core::{PendingScene, SceneError, SceneGraph};

async fn fetch_text(url: &str) -> anyhow::Result<String> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow!("{e:?}"))?;
    let response: web::Response = response
        .dyn_into()
        .map_err(|e| anyhow!("not a Response: {e:?}"))?;
    if !response.ok() {
        return Err(anyhow!("HTTP {}", response.status()));
    }
    let text = response.text().map_err(|e| anyhow!("{e:?}"))?;
    JsFuture::from(text)
        .await
        .map_err(|e| anyhow!("{e:?}"))?
        .as_string()
        .ok_or_else(|| anyhow!("response body is not text"))
}

/// Starts fetching and parsing `url`. The result is delivered through the
/// returned pending scene once the fetch settles.
pub fn fetch_scene(url: String) -> PendingScene {
    let (tx, pending) = PendingScene::channel();
    wasm_bindgen_futures::spawn_local(async move {
        log::info!("[scene] fetching {url}");
        let result = match fetch_text(&url).await {
            Ok(text) => SceneGraph::from_obj(&text),
            Err(e) => Err(SceneError::Fetch(format!("{url}: {e}"))),
        };
        tx.send(result);
    });
    pending
}
