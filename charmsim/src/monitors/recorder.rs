use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{Emission, capture::CapturedEvent, interception::Interceptor};

/// An interceptor that records emissions to a file in JSON Lines format.
///
/// Each emission is written as one JSON object on its own line, with the
/// same fields a serialized [`CapturedEvent`] carries. Lines are flushed
/// immediately so the file is complete even if the test later panics.
///
/// # Example
///
/// ```rust,ignore
/// let _guard = interception::install(JsonLinesRecorder::new("events.jsonl")?);
/// charmsim::trigger::<MyCharm>(&State::new(), "start", &meta)?;
/// ```
#[derive(Debug)]
pub struct JsonLinesRecorder {
    writer: RefCell<BufWriter<File>>,
}

impl JsonLinesRecorder {
    /// Create a new recorder that writes to the specified path.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the file cannot be created.
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: RefCell::new(BufWriter::new(file)),
        })
    }
}

impl Interceptor for JsonLinesRecorder {
    fn on_emit(&self, emission: &Emission) {
        let Ok(mut writer) = self.writer.try_borrow_mut() else {
            tracing::warn!("JsonLinesRecorder failed to borrow writer");
            return;
        };
        let record = CapturedEvent::from(emission);
        if let Err(e) = serde_json::to_writer(&mut *writer, &record) {
            tracing::warn!("JsonLinesRecorder failed to serialize event: {}", e);
        }
        let _ = writer.write_all(b"\n");
        let _ = writer.flush();
    }
}
