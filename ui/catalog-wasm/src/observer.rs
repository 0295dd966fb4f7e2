//! `IntersectionObserver` behind [`VisibilityWatcher`].

use anyhow::{Result, anyhow};
use md_app_core::{VisibilityOptions, VisibilitySignal, VisibilityTrigger, VisibilityWatcher};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

#[derive(Default)]
pub struct IntersectionWatcher {
    // the closure must outlive the observer that calls it
    active: Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)>,
}

impl VisibilityWatcher for IntersectionWatcher {
    type Target = Element;

    fn observe(
        &mut self,
        target: &Element,
        options: &VisibilityOptions,
        signal: VisibilitySignal,
    ) -> Result<()> {
        let callback = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            let visible = entries
                .get(0)
                .dyn_into::<IntersectionObserverEntry>()
                .map(|entry| entry.is_intersecting())
                .unwrap_or(false);
            signal.notify(visible);
        }) as Box<dyn FnMut(js_sys::Array)>);

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin);
        init.set_threshold(&JsValue::from_f64(options.threshold));

        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
            .map_err(|e| anyhow!("IntersectionObserver rejected options: {e:?}"))?;
        observer.observe(target);
        self.active = Some((observer, callback));
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some((observer, _callback)) = self.active.take() {
            observer.disconnect();
        }
    }
}

/// Infinite-scroll helper exported to the page: calls `callback` every time
/// the sentinel element comes into view.
#[wasm_bindgen]
pub struct InfiniteScroll {
    trigger: VisibilityTrigger<IntersectionWatcher>,
}

#[wasm_bindgen]
impl InfiniteScroll {
    #[wasm_bindgen(constructor)]
    pub fn new(
        callback: js_sys::Function,
        root_margin: Option<String>,
        threshold: Option<f64>,
    ) -> InfiniteScroll {
        let defaults = VisibilityOptions::default();
        let options = VisibilityOptions {
            root_margin: root_margin.unwrap_or(defaults.root_margin),
            threshold: threshold.unwrap_or(defaults.threshold),
        };
        let on_visible = move || {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                gloo_console::error!("infinite scroll callback failed", err);
            }
        };
        InfiniteScroll {
            trigger: VisibilityTrigger::new(IntersectionWatcher::default(), on_visible, options),
        }
    }

    /// Watches `target`, replacing any previous element.
    pub fn observe(&mut self, target: Option<Element>) -> Result<(), JsValue> {
        self.trigger
            .setup(target.as_ref())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn disconnect(&mut self) {
        self.trigger.disconnect();
    }

    #[wasm_bindgen(getter)]
    pub fn observing(&self) -> bool {
        self.trigger.is_observing()
    }
}
