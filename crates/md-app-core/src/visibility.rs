//! Run a callback whenever a watched element scrolls into view.
//!
//! The platform part (who reports visibility changes) sits behind
//! [`VisibilityWatcher`]; this module owns the edge detection and the
//! teardown rules so every platform behaves the same way.

use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityOptions {
    /// CSS-style margin grown around the scrolling container, e.g. `"200px"`.
    pub root_margin: String,
    /// Fraction of the target that must be visible, `0.0..=1.0`.
    pub threshold: f64,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            root_margin: "0px".to_owned(),
            threshold: 0.0,
        }
    }
}

type Callback = Rc<RefCell<Box<dyn FnMut()>>>;

struct SignalState {
    visible: bool,
    active: bool,
}

/// Handle given to a watcher for reporting visibility of its target.
///
/// A signal belongs to one observation; once the trigger tears that
/// observation down, late reports through it are ignored.
#[derive(Clone)]
pub struct VisibilitySignal {
    state: Rc<RefCell<SignalState>>,
    callback: Callback,
}

impl VisibilitySignal {
    fn new(callback: Callback) -> Self {
        Self {
            state: Rc::new(RefCell::new(SignalState {
                visible: false,
                active: true,
            })),
            callback,
        }
    }

    /// Returns whether the callback ran.
    pub fn notify(&self, visible: bool) -> bool {
        let fire = {
            let mut state = self.state.borrow_mut();
            let rising = state.active && visible && !state.visible;
            if state.active {
                state.visible = visible;
            }
            rising
        };
        if fire {
            let mut callback = self.callback.borrow_mut();
            (*callback)();
        }
        fire
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    fn deactivate(&self) {
        self.state.borrow_mut().active = false;
    }
}

pub trait VisibilityWatcher {
    type Target: ?Sized;

    fn observe(
        &mut self,
        target: &Self::Target,
        options: &VisibilityOptions,
        signal: VisibilitySignal,
    ) -> Result<()>;

    fn disconnect(&mut self);
}

pub struct VisibilityTrigger<W: VisibilityWatcher> {
    watcher: W,
    options: VisibilityOptions,
    callback: Callback,
    signal: Option<VisibilitySignal>,
}

impl<W: VisibilityWatcher> VisibilityTrigger<W> {
    pub fn new(watcher: W, callback: impl FnMut() + 'static, options: VisibilityOptions) -> Self {
        Self {
            watcher,
            options,
            callback: Rc::new(RefCell::new(Box::new(callback))),
            signal: None,
        }
    }

    /// (Re)starts observation. Any previous observation is torn down first;
    /// with no target the trigger just stays disconnected.
    pub fn setup(&mut self, target: Option<&W::Target>) -> Result<()> {
        self.disconnect();
        let Some(target) = target else {
            return Ok(());
        };

        let signal = VisibilitySignal::new(self.callback.clone());
        self.watcher.observe(target, &self.options, signal.clone())?;
        self.signal = Some(signal);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(signal) = self.signal.take() {
            signal.deactivate();
            self.watcher.disconnect();
        }
    }

    pub fn is_observing(&self) -> bool {
        self.signal.is_some()
    }

    pub fn options(&self) -> &VisibilityOptions {
        &self.options
    }

    pub fn watcher(&self) -> &W {
        &self.watcher
    }
}

impl<W: VisibilityWatcher> Drop for VisibilityTrigger<W> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Watcher driven by hand: useful off-browser, where the host decides what
/// "visible" means (last row printed, end of a list reached).
#[derive(Default)]
pub struct ManualWatcher {
    observed: Option<(String, VisibilitySignal)>,
    disconnects: usize,
}

impl ManualWatcher {
    pub fn set_visible(&self, visible: bool) -> bool {
        match &self.observed {
            Some((_, signal)) => signal.notify(visible),
            None => false,
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.observed.as_ref().map(|(target, _)| target.as_str())
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects
    }
}

impl VisibilityWatcher for ManualWatcher {
    type Target = str;

    fn observe(
        &mut self,
        target: &str,
        _options: &VisibilityOptions,
        signal: VisibilitySignal,
    ) -> Result<()> {
        self.observed = Some((target.to_owned(), signal));
        Ok(())
    }

    fn disconnect(&mut self) {
        self.observed = None;
        self.disconnects += 1;
    }
}
