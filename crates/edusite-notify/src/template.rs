//! Template cache
//!
//! Templates are HTML sources in `{template_dir}/{name}.hbs`, compiled once
//! per process lifetime and memoized by name. The cache is read-mostly:
//! renders take the read lock, and only a first access for a given name
//! takes the write lock to register the compiled template. The registration
//! is re-checked under the write lock, so concurrent first access compiles
//! at most once. Nothing invalidates the cache at runtime; a process restart
//! is the only invalidation path.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use handlebars::Handlebars;

use edusite_core::AppError;

pub struct TemplateStore {
    dir: PathBuf,
    registry: RwLock<Handlebars<'static>>,
    compiles: AtomicUsize,
}

impl TemplateStore {
    /// Create a store reading template sources from `dir`.
    ///
    /// Strict mode is on: a placeholder missing from the render context is a
    /// `RenderFailure`, not silently-empty output.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        TemplateStore {
            dir: dir.into(),
            registry: RwLock::new(registry),
            compiles: AtomicUsize::new(0),
        }
    }

    /// Render `name` with `ctx`, compiling and caching the template on first
    /// use. A missing template file is `TemplateNotFound`; a compile error or
    /// a missing placeholder is `RenderFailure`.
    pub fn render(&self, name: &str, ctx: &serde_json::Value) -> Result<String, AppError> {
        {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            if registry.has_template(name) {
                return registry
                    .render(name, ctx)
                    .map_err(|e| render_failure(name, e));
            }
        }

        let path = self.dir.join(format!("{}.hbs", name));
        let source = std::fs::read_to_string(&path).map_err(|e| {
            tracing::error!(
                template = %name,
                path = %path.display(),
                error = %e,
                "Template file not found"
            );
            AppError::TemplateNotFound(name.to_string())
        })?;

        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another caller may have won the race between our read and write.
        if !registry.has_template(name) {
            registry
                .register_template_string(name, &source)
                .map_err(|e| {
                    tracing::error!(template = %name, error = %e, "Template failed to compile");
                    render_failure(name, e)
                })?;
            self.compiles.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(template = %name, "Template compiled and cached");
        }
        registry
            .render(name, ctx)
            .map_err(|e| render_failure(name, e))
    }

    /// Number of template compilations performed so far. Observable so tests
    /// can assert the at-most-one-compile-per-name property.
    pub fn compiled_count(&self) -> usize {
        self.compiles.load(Ordering::Relaxed)
    }
}

fn render_failure(name: &str, err: impl std::fmt::Display) -> AppError {
    AppError::RenderFailure {
        template: name.to_string(),
        detail: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn write_template(dir: &std::path::Path, name: &str, source: &str) {
        std::fs::write(dir.join(format!("{}.hbs", name)), source).unwrap();
    }

    #[test]
    fn compiles_once_and_renders_independent_contexts() {
        let dir = tempdir().unwrap();
        write_template(dir.path(), "welcome", "<p>Hello {{name}}</p>");
        let store = TemplateStore::new(dir.path());

        let a = store.render("welcome", &json!({"name": "Asha"})).unwrap();
        let b = store.render("welcome", &json!({"name": "Ravi"})).unwrap();

        assert_eq!(a, "<p>Hello Asha</p>");
        assert_eq!(b, "<p>Hello Ravi</p>");
        assert_eq!(store.compiled_count(), 1);
    }

    #[test]
    fn concurrent_first_access_compiles_at_most_once() {
        let dir = tempdir().unwrap();
        write_template(dir.path(), "enroll", "<b>{{course}}</b>");
        let store = Arc::new(TemplateStore::new(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .render("enroll", &json!({"course": format!("c{}", i)}))
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.compiled_count(), 1);
    }

    #[test]
    fn missing_template_is_not_found() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        let err = store.render("absent", &json!({})).unwrap_err();
        assert!(matches!(err, AppError::TemplateNotFound(_)));
    }

    #[test]
    fn missing_placeholder_is_render_failure() {
        let dir = tempdir().unwrap();
        write_template(dir.path(), "strict", "Hi {{required}}");
        let store = TemplateStore::new(dir.path());

        let err = store.render("strict", &json!({})).unwrap_err();
        assert!(matches!(err, AppError::RenderFailure { .. }));
        // The failed render still compiled and cached the template.
        assert_eq!(store.compiled_count(), 1);
    }
}
