//! The material binding engine.
//!
//! [`Engine`] wires the components together and is what a host drives from
//! its frame loop:
//!
//! 1. `load_scene()` once the model loader produced its mesh nodes
//! 2. `on_click()` / `on_miss()` for pointer input, forwarding the returned
//!    [`SelectionEvent`] to the UI
//! 3. `apply_texture()` / `update()` from the material controls. Texture
//!    requests come back as [`PendingLoad`]s; the host drives them and hands
//!    the result to `complete_load()`
//! 4. `on_update()` once per frame, then `frame_materials()` to feed the
//!    renderer
//! 5. `capture_composite()` when the user shares the configuration
//!
//! Everything runs on the host's render thread; only the fetches inside
//! pending loads run concurrently with it.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use instant::Duration;

use crate::{
    compositor::Compositor,
    config::EngineConfig,
    data_structures::{
        material::{TextureConfig, TextureParam},
        part::{Category, MeshNode, Part, PartId, SelectionEvent},
    },
    error::BindError,
    glow::GlowAnimator,
    library::{Libraries, TextureItem, UploadedImage},
    material::{MaterialStore, RenderConfig},
    registry::PartRegistry,
    render::SceneRenderer,
    resources::{
        source::{HttpSource, RemoteSource, SourceKind},
        texture::{LoadOutcome, LoadResult, PendingLoad, Request, TextureCache},
    },
    transform::{MapSource, MaterialUniform, RendererMaterialParams, TransformApplier},
};

/// Material of one part for the current frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameMaterial {
    /// `None` means the part keeps the material it shipped with.
    pub params: Option<RendererMaterialParams>,
    pub emissive_intensity: f32,
}

impl FrameMaterial {
    pub fn uniform(&self) -> Option<MaterialUniform> {
        self.params
            .as_ref()
            .map(|params| params.to_uniform(self.emissive_intensity))
    }
}

pub struct Engine {
    config: EngineConfig,
    registry: PartRegistry,
    store: MaterialStore,
    cache: TextureCache,
    glow: GlowAnimator,
    transform: TransformApplier,
    compositor: Compositor,
    libraries: Libraries,
    selected: Option<PartId>,
    derived: RefCell<Option<(u64, Rc<RenderConfig>)>>,
    uploads: u32,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("selected", &self.selected)
            .field("store", &self.store)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Engine fetching remote textures over HTTP.
    pub fn new(config: EngineConfig) -> Self {
        let http = HttpSource::new(config.sources.fetch_timeout);
        Self::with_remote(config, Rc::new(http))
    }

    pub fn with_remote(config: EngineConfig, remote: Rc<dyn RemoteSource>) -> Self {
        Self {
            registry: PartRegistry::new(config.keywords.clone()),
            store: MaterialStore::new(),
            cache: TextureCache::new(config.sources.clone(), remote),
            glow: GlowAnimator::new(config.glow),
            transform: TransformApplier::new(config.alpha_test),
            compositor: Compositor::new(config.composite.clone()),
            libraries: Libraries::default(),
            selected: None,
            derived: RefCell::new(None),
            uploads: 0,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &PartRegistry {
        &self.registry
    }

    pub fn textures(&self) -> &TextureCache {
        &self.cache
    }

    pub fn glow(&self) -> &GlowAnimator {
        &self.glow
    }

    pub fn libraries(&self) -> &Libraries {
        &self.libraries
    }

    /// Replace the scene. Parts, material state and glow of the previous
    /// scene are dropped; loads still in flight for it will be discarded.
    pub fn load_scene(&mut self, nodes: &[MeshNode]) {
        self.registry.load_scene(nodes);
        self.store.clear();
        self.cache.detach_all();
        self.glow.clear();
        self.selected = None;
        for part in self.registry.parts().filter(|part| part.is_interactive()) {
            self.cache.attach(part.id, &part.material_name);
        }
    }

    pub fn selected(&self) -> Option<&Part> {
        self.selected.and_then(|id| self.registry.get(id))
    }

    /// Category of the selection, i.e. the library the UI should show.
    pub fn visible_category(&self) -> Option<Category> {
        self.selected().and_then(|part| part.category)
    }

    pub fn visible_library(&self) -> &[TextureItem] {
        match self.visible_category() {
            Some(category) => self.libraries.get(category),
            None => &[],
        }
    }

    /// Handle a click on a mesh node.
    pub fn on_click(&mut self, node: &MeshNode) -> SelectionEvent {
        let event = self.registry.resolve_click(node);
        match &event {
            SelectionEvent::Select(part) => {
                // Parts clicked before load_scene() saw them still get a side-table entry
                self.cache.attach(part.id, &part.material_name);
                self.glow.start(part.id);
                self.selected = Some(part.id);
                log::info!("Selected {} ({})", part.name, part.id);
            }
            SelectionEvent::Deselect => self.selected = None,
        }
        event
    }

    /// Handle a click that hit nothing.
    pub fn on_miss(&mut self) -> SelectionEvent {
        self.selected = None;
        SelectionEvent::Deselect
    }

    pub fn get(&self, part: PartId) -> Option<&TextureConfig> {
        self.store.get(part)
    }

    /// Bind `url` to the selected part.
    ///
    /// Unsafe URLs are rejected before anything changes. Without a selection
    /// this is a no-op. A returned [`PendingLoad`] must be driven by the host
    /// and its result passed to [`Engine::complete_load`].
    pub fn apply_texture(&mut self, url: &str) -> Result<Option<PendingLoad>, BindError> {
        let Some(part) = self.selected else {
            return Ok(None);
        };
        let request = self.cache.request(part, url)?;
        self.store.apply(part, url);
        Ok(request.into_pending())
    }

    /// Patch one field of the selected part's configuration. Returns whether
    /// there was a selection to apply it to.
    pub fn update(&mut self, param: TextureParam) -> bool {
        match self.selected {
            Some(part) => {
                self.store.update(part, param);
                true
            }
            None => false,
        }
    }

    /// Patch a field given by its control name, e.g. `("scale", "4")`.
    pub fn update_field(&mut self, field: &str, value: &str) -> Result<bool, BindError> {
        let param = TextureParam::parse(field, value).map_err(BindError::InvalidInput)?;
        Ok(self.update(param))
    }

    /// Remove the texture map from the selected part, keeping its other
    /// parameters.
    pub fn clear_texture(&mut self) -> bool {
        match self.selected {
            Some(part) => {
                self.store.clear_source(part);
                self.cache.unbind(part);
                true
            }
            None => false,
        }
    }

    pub fn complete_load(&mut self, load: LoadResult) -> LoadOutcome {
        self.cache.complete(load)
    }

    /// Supersede the running load of `part`, if any.
    pub fn cancel_load(&mut self, part: PartId) -> Result<bool, BindError> {
        if self.registry.get(part).is_none() {
            return Err(BindError::UnknownPart(part));
        }
        Ok(self.cache.cancel(part))
    }

    /// Re-issue texture requests for every configured part whose bound texture
    /// differs from its configuration, e.g. after a failed load.
    pub fn sync_textures(&mut self) -> Vec<PendingLoad> {
        let wanted: Vec<(PartId, String)> = self
            .store
            .iter()
            .filter_map(|(part, config)| Some((part, config.source_url.clone()?)))
            .collect();
        wanted
            .into_iter()
            .filter_map(|(part, url)| match self.cache.request(part, &url) {
                Ok(Request::Pending(load)) => Some(load),
                Ok(_) => None,
                Err(err) => {
                    log::warn!("Skipping texture for {part}: {err}");
                    None
                }
            })
            .collect()
    }

    /// Register an uploaded image under an ephemeral local reference and put
    /// it at the front of the vamp library.
    pub fn upload_texture(&mut self, upload: UploadedImage) -> Result<TextureItem, BindError> {
        self.config.uploads.validate(&upload).inspect_err(|err| {
            log::warn!("Upload rejected: {err}");
        })?;
        self.uploads += 1;
        let url = format!("local://upload-{}/{}", self.uploads, upload.file_name);
        let item = TextureItem::new(format!("upload-{}", self.uploads), &upload.file_name, &url);
        self.cache
            .local_store()
            .insert(url, upload.mime, upload.bytes);
        self.libraries.prepend(Category::Vamp, item.clone());
        Ok(item)
    }

    /// Make bytes available under a local reference, e.g. a generated texture.
    ///
    /// Re-registering a reference replaces its bytes; parts showing the old
    /// decode pick up the new one with the next [`Engine::sync_textures`].
    pub fn register_local(&mut self, url: &str, mime: &str, bytes: Vec<u8>) -> Result<(), BindError> {
        let is_local = self.cache.policy().check(url) == Ok(SourceKind::Local);
        if !is_local || url.starts_with("data:") {
            return Err(BindError::InvalidInput(format!("{url} is not a local reference")));
        }
        let store = self.cache.local_store();
        if store.contains(url) {
            log::info!("Replacing local texture {url}");
        }
        store.insert(url, mime, bytes);
        self.cache.evict(url);
        Ok(())
    }

    /// Drop a local reference together with its decoded texture and library
    /// entry. Parts currently showing it keep the texture until they change.
    pub fn revoke_local(&mut self, url: &str) -> bool {
        let removed = self.cache.local_store().remove(url);
        self.cache.evict(url);
        self.libraries.remove_url(url);
        if removed {
            log::info!("Revoked local texture {url}");
        }
        removed
    }

    /// Advance per-frame animation state.
    pub fn on_update(&mut self, dt: Duration) {
        self.glow.tick(dt);
    }

    /// Display form of the material state, memoized until the next change.
    pub fn render_config(&self) -> Rc<RenderConfig> {
        let revision = self.store.revision();
        let mut derived = self.derived.borrow_mut();
        match derived.as_ref() {
            Some((cached, config)) if *cached == revision => config.clone(),
            _ => {
                let config = Rc::new(self.store.derive(&self.config.render_scale));
                *derived = Some((revision, config.clone()));
                config
            }
        }
    }

    /// Renderer parameters of a configured part.
    pub fn material_params(&self, part: PartId) -> Option<RendererMaterialParams> {
        let render_config = self.render_config();
        let config = render_config.get(&part)?;
        let map = match (&config.source_url, self.cache.bound(part)) {
            // A newer URL that is still loading (or failed) keeps the old texture on screen.
            (Some(_), Some(texture)) => MapSource::Texture(texture.clone()),
            (Some(_), None) => MapSource::Original,
            (None, _) => MapSource::Cleared,
        };
        Some(self.transform.apply_with_map(config, map))
    }

    /// Materials of every interactive part for this frame.
    pub fn frame_materials(&self) -> BTreeMap<PartId, FrameMaterial> {
        self.registry
            .parts()
            .filter(|part| part.is_interactive())
            .map(|part| {
                (
                    part.id,
                    FrameMaterial {
                        params: self.material_params(part.id),
                        emissive_intensity: self.glow.intensity(part.id),
                    },
                )
            })
            .collect()
    }

    /// Render and encode the multi-angle composite.
    pub fn capture_composite<R: SceneRenderer + ?Sized>(
        &self,
        renderer: &mut R,
    ) -> Result<String, BindError> {
        self.compositor.capture_composite(renderer)
    }

    /// Put the renderer's camera back to the configured start view.
    pub fn reset_view<R: SceneRenderer + ?Sized>(&self, renderer: &mut R) {
        renderer.set_camera_pose(&self.config.default_view);
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }
}
