//! Texture loading, deduplication and per-part binding.
//!
//! [`TextureCache`] owns the decoded textures (keyed by URL) and the runtime
//! side table of every interactive part: the material it shipped with, the
//! texture currently bound and the generation of its latest load request.
//!
//! Loads are split in two halves so they can interleave with the render loop:
//! [`TextureCache::request`] validates and hands out a [`PendingLoad`] future,
//! the host drives it and passes the [`LoadResult`] to
//! [`TextureCache::complete`]. Only the completion carrying the part's current
//! generation is applied; anything older was superseded and is dropped.
//! Parts asking for a URL that is already being fetched share that fetch and
//! its decode.

use std::{collections::HashMap, rc::Rc, sync::Arc};

use futures::{
    FutureExt,
    future::{LocalBoxFuture, Shared},
};

use crate::{
    data_structures::{part::PartId, texture::LoadedTexture},
    error::BindError,
    resources::source::{LocalStore, RemoteSource, SourceKind, SourcePolicy},
};

/// Identifies one load request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub part: PartId,
    pub url: String,
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

type TextureFuture = LocalBoxFuture<'static, Result<Arc<LoadedTexture>, BindError>>;

/// A fetch + decode in flight. Drive it with [`PendingLoad::run`].
pub struct PendingLoad {
    pub ticket: LoadTicket,
    future: TextureFuture,
}

impl std::fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLoad")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

impl PendingLoad {
    pub async fn run(self) -> LoadResult {
        let result = self.future.await;
        LoadResult {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug)]
pub struct LoadResult {
    pub ticket: LoadTicket,
    pub result: Result<Arc<LoadedTexture>, BindError>,
}

/// What [`TextureCache::request`] decided.
#[derive(Debug)]
pub enum Request {
    /// The part already shows this URL.
    AlreadyBound,
    /// A load for this URL is already running for the part.
    InFlight,
    /// The URL was cached and is bound now.
    Bound(Arc<LoadedTexture>),
    Pending(PendingLoad),
}

impl Request {
    pub fn into_pending(self) -> Option<PendingLoad> {
        match self {
            Request::Pending(load) => Some(load),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Bound(Arc<LoadedTexture>),
    /// The latest request failed; the previous texture stays bound.
    Failed(BindError),
    /// The request was superseded, cancelled or its scene is gone.
    Discarded,
}

#[derive(Debug, Default)]
struct Binding {
    original_material: String,
    bound: Option<Arc<LoadedTexture>>,
    generation: u64,
    pending: Option<String>,
}

pub struct TextureCache {
    policy: SourcePolicy,
    local: LocalStore,
    remote: Rc<dyn RemoteSource>,
    textures: HashMap<String, Arc<LoadedTexture>>,
    in_flight: HashMap<String, Shared<TextureFuture>>,
    bindings: HashMap<PartId, Binding>,
    next_generation: u64,
}

impl std::fmt::Debug for TextureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureCache")
            .field("policy", &self.policy)
            .field("textures", &self.textures.len())
            .field("in_flight", &self.in_flight.len())
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

impl TextureCache {
    pub fn new(policy: SourcePolicy, remote: Rc<dyn RemoteSource>) -> Self {
        Self {
            policy,
            local: LocalStore::default(),
            remote,
            textures: HashMap::new(),
            in_flight: HashMap::new(),
            bindings: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn policy(&self) -> &SourcePolicy {
        &self.policy
    }

    pub fn local_store(&mut self) -> &mut LocalStore {
        &mut self.local
    }

    /// Validate `url` against the source policy. Blocked URLs are logged.
    pub fn check(&self, url: &str) -> Result<SourceKind, BindError> {
        self.policy.check(url).inspect_err(|_| {
            log::warn!("Unsafe texture URL blocked: {url}");
        })
    }

    /// Start tracking `part`, remembering the material it was loaded with.
    pub fn attach(&mut self, part: PartId, original_material: &str) {
        self.bindings.entry(part).or_insert_with(|| Binding {
            original_material: original_material.to_string(),
            ..Default::default()
        });
    }

    /// Forget every part. Decoded textures stay cached; in-flight loads of the
    /// dropped parts are discarded when they complete.
    pub fn detach_all(&mut self) {
        self.bindings.clear();
    }

    pub fn original_material(&self, part: PartId) -> Option<&str> {
        self.bindings
            .get(&part)
            .map(|binding| binding.original_material.as_str())
    }

    pub fn bound(&self, part: PartId) -> Option<&Arc<LoadedTexture>> {
        self.bindings.get(&part).and_then(|b| b.bound.as_ref())
    }

    pub fn bound_url(&self, part: PartId) -> Option<&str> {
        self.bound(part).map(|texture| texture.url.as_str())
    }

    pub fn is_pending(&self, part: PartId) -> bool {
        self.bindings
            .get(&part)
            .is_some_and(|binding| binding.pending.is_some())
    }

    pub fn cached(&self, url: &str) -> Option<&Arc<LoadedTexture>> {
        self.textures.get(url)
    }

    pub fn cached_count(&self) -> usize {
        self.textures.len()
    }

    /// Ask for `url` to be bound to `part`.
    ///
    /// Rejects unsafe URLs without touching any state. Re-requesting the URL
    /// the part already shows (or is already loading) does nothing.
    pub fn request(&mut self, part: PartId, url: &str) -> Result<Request, BindError> {
        let kind = self.check(url)?;
        let binding = self
            .bindings
            .get_mut(&part)
            .ok_or(BindError::UnknownPart(part))?;

        // Only the current decode of a URL counts; an evicted one is reloaded.
        let shows_current = binding
            .bound
            .as_ref()
            .is_some_and(|t| self.textures.get(url).is_some_and(|c| Arc::ptr_eq(c, t)));
        if shows_current {
            if binding.pending.take().is_some() {
                // A newer request for another URL is running; let it lose.
                self.next_generation += 1;
                binding.generation = self.next_generation;
            }
            return Ok(Request::AlreadyBound);
        }
        if binding.pending.as_deref() == Some(url) {
            return Ok(Request::InFlight);
        }

        self.next_generation += 1;
        binding.generation = self.next_generation;

        if let Some(texture) = self.textures.get(url) {
            binding.pending = None;
            binding.bound = Some(texture.clone());
            log::info!("Bound cached texture {url} to {part}");
            return Ok(Request::Bound(texture.clone()));
        }

        binding.pending = Some(url.to_string());
        let ticket = LoadTicket {
            part,
            url: url.to_string(),
            generation: binding.generation,
        };
        let shared = match self.in_flight.get(url) {
            Some(shared) => {
                log::debug!("Joining running load of {url} for {part}");
                shared.clone()
            }
            None => {
                let owned_url = url.to_string();
                let fetch = match kind {
                    SourceKind::Local => {
                        let fetched = self.local.resolve(url);
                        async move { fetched }.boxed_local()
                    }
                    SourceKind::Remote(remote_url) => self.remote.fetch(remote_url),
                };
                let shared = async move {
                    let fetched = fetch
                        .await
                        .map_err(|err| BindError::load_failure(&owned_url, err))?;
                    LoadedTexture::from_bytes(&fetched.bytes, &owned_url, fetched.format)
                        .map(Arc::new)
                        .map_err(|err| BindError::load_failure(&owned_url, err))
                }
                .boxed_local()
                .shared();
                self.in_flight.insert(url.to_string(), shared.clone());
                shared
            }
        };
        log::debug!("Loading {url} for {part} (generation {})", ticket.generation);
        Ok(Request::Pending(PendingLoad {
            ticket,
            future: shared.boxed_local(),
        }))
    }

    /// Apply the result of a finished load if it is still the latest request
    /// for its part.
    pub fn complete(&mut self, load: LoadResult) -> LoadOutcome {
        let LoadResult { ticket, result } = load;
        if self
            .in_flight
            .get(&ticket.url)
            .is_some_and(|shared| shared.peek().is_some())
        {
            self.in_flight.remove(&ticket.url);
        }
        let Some(binding) = self.bindings.get_mut(&ticket.part) else {
            log::debug!("Dropping load of {} for unknown {}", ticket.url, ticket.part);
            return LoadOutcome::Discarded;
        };
        if binding.generation != ticket.generation {
            log::debug!(
                "Dropping stale load of {} for {} (generation {} < {})",
                ticket.url,
                ticket.part,
                ticket.generation,
                binding.generation
            );
            return LoadOutcome::Discarded;
        }
        binding.pending = None;
        match result {
            Ok(texture) => {
                let texture = self
                    .textures
                    .entry(ticket.url.clone())
                    .or_insert(texture)
                    .clone();
                binding.bound = Some(texture.clone());
                log::info!("Bound texture {} to {}", ticket.url, ticket.part);
                LoadOutcome::Bound(texture)
            }
            Err(err) => {
                log::error!("Texture failed for {}: {}", ticket.part, err);
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Forget the decoded texture of `url` so the next request loads it again.
    /// Parts showing it keep their handle until then.
    pub fn evict(&mut self, url: &str) -> bool {
        self.in_flight.remove(url);
        self.textures.remove(url).is_some()
    }

    /// Supersede any running load for `part`. Returns whether one was running.
    pub fn cancel(&mut self, part: PartId) -> bool {
        let Some(binding) = self.bindings.get_mut(&part) else {
            return false;
        };
        self.next_generation += 1;
        binding.generation = self.next_generation;
        binding.pending.take().is_some()
    }

    /// Remove the bound texture of `part`, cancelling any running load.
    pub fn unbind(&mut self, part: PartId) {
        self.cancel(part);
        if let Some(binding) = self.bindings.get_mut(&part) {
            binding.bound = None;
        }
    }
}
