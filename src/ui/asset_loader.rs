//! egui bytes loader for `asset://` URIs
//!
//! The preview renders image references with the `asset://` scheme; this
//! loader turns the rest of the URI into a request path for the session's
//! asset handler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use eframe::egui;
use egui::load::{Bytes, BytesLoadResult, BytesLoader, BytesPoll, LoadError};

use crate::core::session::Session;

/// URI scheme routed through the asset handler
pub const ASSET_SCHEME: &str = "asset://";

pub struct AssetLoader {
    session: Arc<Session>,
    cache: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl AssetLoader {
    pub const ID: &'static str = "markdowns::AssetLoader";

    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Register on `ctx`
    pub fn install(ctx: &egui::Context, session: Arc<Session>) {
        ctx.add_bytes_loader(Arc::new(Self::new(session)));
    }

    fn cached(&self, uri: &str) -> Option<Arc<[u8]>> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .cloned()
    }
}

impl BytesLoader for AssetLoader {
    fn id(&self) -> &str {
        Self::ID
    }

    fn load(&self, _ctx: &egui::Context, uri: &str) -> BytesLoadResult {
        let Some(reference) = uri.strip_prefix(ASSET_SCHEME) else {
            return Err(LoadError::NotSupported);
        };

        if let Some(bytes) = self.cached(uri) {
            return Ok(BytesPoll::Ready {
                size: None,
                bytes: Bytes::Shared(bytes),
                mime: None,
            });
        }

        // Request paths carry a leading `/`
        let response = self.session.serve_asset(&format!("/{reference}"));
        tracing::debug!("{} -> {}", uri, response.status.code());
        if !response.is_ok() {
            return Err(LoadError::Loading(
                String::from_utf8_lossy(&response.body).into_owned(),
            ));
        }

        let bytes: Arc<[u8]> = response.body.into();
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.to_string(), Arc::clone(&bytes));
        Ok(BytesPoll::Ready {
            size: None,
            bytes: Bytes::Shared(bytes),
            mime: None,
        })
    }

    fn forget(&self, uri: &str) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri);
    }

    fn forget_all(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn byte_size(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|bytes| bytes.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_loads_through_session() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("pic.png"), b"bytes").unwrap();
        let session = Arc::new(Session::default());
        session.open(tmp.path()).unwrap();

        let loader = AssetLoader::new(session);
        let ctx = egui::Context::default();
        match loader.load(&ctx, "asset://pic.png") {
            Ok(BytesPoll::Ready { bytes, .. }) => assert_eq!(&bytes[..], b"bytes"),
            _ => panic!("expected ready bytes"),
        }
        assert_eq!(loader.byte_size(), 5);

        assert!(matches!(loader.load(&ctx, "https://x/y.png"), Err(LoadError::NotSupported)));
        match loader.load(&ctx, "asset://missing.png") {
            Err(LoadError::Loading(msg)) => assert!(msg.starts_with("Could not load file")),
            _ => panic!("expected loading error"),
        }

        loader.forget_all();
        assert_eq!(loader.byte_size(), 0);
    }

    #[test]
    fn test_cache_stays_available_while_session_is_busy() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("pic.png"), b"bytes").unwrap();
        let session = Arc::new(Session::default());
        session.open(tmp.path()).unwrap();
        let loader = Arc::new(AssetLoader::new(Arc::clone(&session)));

        let guard = session.lock();
        let pending = {
            let loader = Arc::clone(&loader);
            std::thread::spawn(move || {
                let ctx = egui::Context::default();
                loader.load(&ctx, "asset://pic.png").is_ok()
            })
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(loader.cache.try_lock().is_ok());

        drop(guard);
        assert!(pending.join().unwrap());
        assert_eq!(loader.byte_size(), 5);
    }

    #[test]
    fn test_absolute_uri_is_served() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("abs.png");
        fs::write(&image, b"abs").unwrap();
        let session = Arc::new(Session::default());
        session.open(tmp.path()).unwrap();

        let loader = AssetLoader::new(session);
        let uri = format!("{}{}", ASSET_SCHEME, image.display());
        assert!(loader.load(&egui::Context::default(), &uri).is_ok());
    }
}
