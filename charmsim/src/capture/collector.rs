use std::cell::RefCell;

use crate::{
    Emission,
    capture::{CaptureConfig, CapturedEvent},
    interception::Interceptor,
};

/// Interceptor that appends accepted emissions to a shared log.
pub(crate) struct Collector {
    config: CaptureConfig,
    records: RefCell<Vec<CapturedEvent>>,
}

impl Collector {
    pub(crate) fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            records: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn take(&self) -> Vec<CapturedEvent> {
        self.records.take()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.borrow().len()
    }
}

impl Interceptor for Collector {
    fn on_emit(&self, emission: &Emission) {
        if self.config.accepts(emission) {
            self.records.borrow_mut().push(CapturedEvent::from(emission));
        }
    }
}
