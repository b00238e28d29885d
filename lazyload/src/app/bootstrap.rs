//! Wiring of the shared loader and per-container sessions.

use std::sync::Arc;

use tracing::info;

use crate::config::LazyLoadOptions;
use crate::error::LazyLoadError;
use crate::fetch::ImageFetcher;
use crate::host::Host;
use crate::loader::Loader;
use crate::session::Session;

/// Lazy loading for every container of one host.
///
/// All sessions started through the same `LazyLoad` share one
/// [`Loader`], so their fetches count against a single queue.
pub struct LazyLoad<H: Host, F: ImageFetcher> {
    host: Arc<H>,
    loader: Arc<Loader<H, F>>,
}

impl<H: Host, F: ImageFetcher> LazyLoad<H, F> {
    /// Creates an engine with a fresh loader.
    pub fn new(host: Arc<H>, fetcher: Arc<F>) -> Self {
        let loader = Arc::new(Loader::new(Arc::clone(&host), fetcher));
        Self { host, loader }
    }

    /// Creates an engine around an existing loader.
    pub fn with_loader(loader: Arc<Loader<H, F>>) -> Self {
        Self {
            host: Arc::clone(loader.host()),
            loader,
        }
    }

    /// Starts lazy loading on `container`.
    ///
    /// Options are merged over the defaults and validated before anything
    /// is bound. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`LazyLoadError::Config`] if the merged options are invalid.
    pub fn attach(
        &self,
        container: H::Element,
        options: &LazyLoadOptions,
    ) -> Result<Arc<Session<H, F>>, LazyLoadError> {
        let config = options.resolve()?;
        Session::start(
            Arc::clone(&self.host),
            Arc::clone(&self.loader),
            container,
            config,
        )
    }

    /// Starts one session per container with the same options.
    ///
    /// The options are validated once; an invalid set attaches nothing.
    pub fn attach_all<I>(
        &self,
        containers: I,
        options: &LazyLoadOptions,
    ) -> Result<Vec<Arc<Session<H, F>>>, LazyLoadError>
    where
        I: IntoIterator<Item = H::Element>,
    {
        let config = options.resolve()?;

        let sessions = containers
            .into_iter()
            .map(|container| {
                Session::start(
                    Arc::clone(&self.host),
                    Arc::clone(&self.loader),
                    container,
                    config.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = sessions.len(), "Containers attached");
        Ok(sessions)
    }

    /// The shared loader.
    pub fn loader(&self) -> &Arc<Loader<H, F>> {
        &self.loader
    }

    /// The host every session runs against.
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }
}

impl<H: Host, F: ImageFetcher> Clone for LazyLoad<H, F> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            loader: Arc::clone(&self.loader),
        }
    }
}
