// Render pipeline - interception registry and content-tree transform.
//
// Components render elements through the registry; whatever hook is
// registered for an element's kind gets to rewrite it. The censor plugin
// registers its hook for `ElementKind::Image` at start and removes it at
// stop, so the table is resolved once, not per message.

use super::censor_models::{Element, ElementKind};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// A render-time rewrite callback for one element kind.
#[async_trait]
pub trait RenderHook: Send + Sync {
    async fn render(&self, element: Element) -> Element;
}

/// Token handed out by `register`; passing it back removes the hook.
#[derive(Debug)]
pub struct Registration {
    kind: ElementKind,
}

/// Result of rewriting a content tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    pub elements: Vec<Element>,
    pub changed: bool,
}

impl TransformOutcome {
    /// Outcome for content that was not inspected at all.
    pub fn untouched(elements: Vec<Element>) -> Self {
        Self {
            elements,
            changed: false,
        }
    }
}

/// Table mapping element kinds to their render hooks.
#[derive(Default)]
pub struct RenderRegistry {
    hooks: DashMap<ElementKind, Arc<dyn RenderHook>>,
}

impl RenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a hook for an element kind, replacing any previous one.
    pub fn register(&self, kind: ElementKind, hook: Arc<dyn RenderHook>) -> Registration {
        self.hooks.insert(kind, hook);
        Registration { kind }
    }

    /// Remove the hook a registration installed.
    pub fn unregister(&self, registration: &Registration) {
        self.hooks.remove(&registration.kind);
    }

    /// Route one element through its hook, if any is registered.
    pub async fn render(&self, element: Element) -> Element {
        // Clone the hook out of the map so no guard is held across the await.
        let hook = self
            .hooks
            .get(&element.kind())
            .map(|entry| Arc::clone(entry.value()));

        match hook {
            Some(hook) => hook.render(element).await,
            None => element,
        }
    }

    /// Rewrite every element of a content tree through the registry and
    /// report whether anything changed. Elements are processed in order;
    /// evaluations do not observe each other.
    pub async fn transform(&self, elements: Vec<Element>) -> TransformOutcome {
        let mut rewritten = Vec::with_capacity(elements.len());
        let mut changed = false;

        for element in elements {
            let rendered = self.render(element.clone()).await;
            if rendered != element {
                changed = true;
            }
            rewritten.push(rendered);
        }

        TransformOutcome {
            elements: rewritten,
            changed,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::censor::censor_models::ImageRef;

    /// Hook that replaces every image with a fixed placeholder.
    struct BlockEverything;

    #[async_trait]
    impl RenderHook for BlockEverything {
        async fn render(&self, element: Element) -> Element {
            match element {
                Element::Image(_) => Element::Localized("blocked".to_string()),
                other => other,
            }
        }
    }

    /// Hook that leaves everything alone.
    struct PassEverything;

    #[async_trait]
    impl RenderHook for PassEverything {
        async fn render(&self, element: Element) -> Element {
            element
        }
    }

    fn tree() -> Vec<Element> {
        vec![
            Element::Text("look at this".to_string()),
            Element::Image(ImageRef::new("https://example.com/a.png")),
            Element::Image(ImageRef::new("https://example.com/b.png")),
        ]
    }

    #[tokio::test]
    async fn test_unregistered_kind_passes_through() {
        let registry = RenderRegistry::new();

        let outcome = registry.transform(tree()).await;

        assert!(!outcome.changed);
        assert_eq!(outcome.elements, tree());
    }

    #[tokio::test]
    async fn test_hook_rewrites_matching_elements_in_place() {
        let registry = RenderRegistry::new();
        registry.register(ElementKind::Image, Arc::new(BlockEverything));

        let outcome = registry.transform(tree()).await;

        assert!(outcome.changed);
        assert_eq!(
            outcome.elements,
            vec![
                Element::Text("look at this".to_string()),
                Element::Localized("blocked".to_string()),
                Element::Localized("blocked".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_identity_hook_reports_unchanged() {
        let registry = RenderRegistry::new();
        registry.register(ElementKind::Image, Arc::new(PassEverything));

        let outcome = registry.transform(tree()).await;

        assert!(!outcome.changed);
        assert_eq!(outcome.elements, tree());
    }

    #[tokio::test]
    async fn test_unregister_restores_pass_through() {
        let registry = RenderRegistry::new();
        let registration = registry.register(ElementKind::Image, Arc::new(BlockEverything));
        registry.unregister(&registration);

        let outcome = registry.transform(tree()).await;

        assert!(!outcome.changed);
    }

    #[tokio::test]
    async fn test_render_single_element() {
        let registry = RenderRegistry::new();
        registry.register(ElementKind::Image, Arc::new(BlockEverything));

        let rendered = registry
            .render(Element::Image(ImageRef::new("https://example.com/a.png")))
            .await;

        assert_eq!(rendered, Element::Localized("blocked".to_string()));

        let text = Element::Text("hi".to_string());
        assert_eq!(registry.render(text.clone()).await, text);
    }
}
