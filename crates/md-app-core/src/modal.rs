use md_api_types::Movie;
use tracing::debug;

/// Presentation hook that stops the page behind the detail view from scrolling.
pub trait ScrollLock {
    fn suspend(&self);
    fn resume(&self);
}

#[derive(Default)]
pub struct NoopScrollLock;

impl ScrollLock for NoopScrollLock {
    fn suspend(&self) {}

    fn resume(&self) {}
}

/// Which movie, if any, is shown in the detail overlay.
pub struct ModalStore {
    selected: Option<Movie>,
    scroll: Box<dyn ScrollLock>,
}

impl ModalStore {
    pub fn new(scroll: Box<dyn ScrollLock>) -> Self {
        Self {
            selected: None,
            scroll,
        }
    }

    pub fn open(&mut self, movie: Movie) {
        debug!(movie_id = movie.id, "modal opened");
        self.selected = Some(movie);
        self.scroll.suspend();
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.scroll.resume();
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        self.selected.as_ref()
    }
}

impl Default for ModalStore {
    fn default() -> Self {
        Self::new(Box::new(NoopScrollLock))
    }
}
