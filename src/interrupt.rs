//! Ctrl-C handling.
//!
//! While prompting, an interrupt ends the process with a cancellation
//! notice. Once generation has started it only raises a flag that the
//! materializer polls between files, so partial output can be cleaned up.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use dialoguer::console::Term;

use crate::error::{Error, Result};

const PROMPTING: u8 = 0;
const GENERATING: u8 = 1;

/// Shared interrupt state installed once per process.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    phase: Arc<AtomicU8>,
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn install() -> Result<Self> {
        let interrupt = Self::default();
        let handler = interrupt.clone();
        ctrlc::set_handler(move || handler.on_signal())
            .map_err(|e| Error::ExternalTool { tool: "signal handler".into(), message: e.to_string() })?;
        Ok(interrupt)
    }

    fn on_signal(&self) {
        if self.phase.load(Ordering::SeqCst) == PROMPTING {
            let _ = Term::stderr().show_cursor();
            eprintln!("\n{}", Error::Cancelled);
            std::process::exit(0);
        }
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Switches from exit-on-interrupt to flag-on-interrupt.
    pub fn start_generation(&self) {
        self.phase.store(GENERATING, Ordering::SeqCst);
    }

    pub fn flag(&self) -> &AtomicBool {
        &self.raised
    }
}
