//! Decoder facade owning exactly one backend.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{DecoderError, FileBackend, FrameSource, MemoryBackend};
use crate::format::{AssetHeader, IndexedFrame, Palette, Transport};

/// Run `$body` against whichever backend is active, without dynamic dispatch.
macro_rules! dispatch {
    ($backend:expr, $b:ident => $body:expr) => {
        match $backend {
            Backend::Memory($b) => $body,
            Backend::File($b) => $body,
        }
    };
}

/// Which backend a [`Decoder`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Stream frames from persisted storage.
    #[default]
    File,
    /// Hold the whole asset in RAM.
    Memory,
}

/// The active backend and its state.
#[derive(Debug)]
pub enum Backend {
    Memory(MemoryBackend),
    File(FileBackend),
}

impl Backend {
    pub fn mode(&self) -> BackendMode {
        match self {
            Backend::Memory(_) => BackendMode::Memory,
            Backend::File(_) => BackendMode::File,
        }
    }
}

/// Decoder facade.
///
/// Switching backends drops the previous one, closing its file handle or
/// releasing its buffer, so only one backend's footprint is ever live.
#[derive(Debug)]
pub struct Decoder {
    backend: Backend,
    memory_limit: usize,
}

impl Decoder {
    pub fn new(mode: BackendMode, memory_limit: usize) -> Self {
        let backend = match mode {
            BackendMode::File => Backend::File(FileBackend::new()),
            BackendMode::Memory => Backend::Memory(MemoryBackend::new(memory_limit)),
        };
        Self {
            backend,
            memory_limit,
        }
    }

    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn memory_limit(&self) -> usize {
        self.memory_limit
    }

    /// Activate the file backend. Returns `false` if it already was.
    pub fn switch_to_file(&mut self) -> bool {
        self.switch_to(BackendMode::File)
    }

    /// Activate the memory backend. Returns `false` if it already was.
    pub fn switch_to_memory(&mut self) -> bool {
        self.switch_to(BackendMode::Memory)
    }

    fn switch_to(&mut self, mode: BackendMode) -> bool {
        if self.mode() == mode {
            return false;
        }

        let brightness = self.brightness();
        self.clear();
        self.backend = match mode {
            BackendMode::File => Backend::File(FileBackend::with_brightness(brightness)),
            BackendMode::Memory => {
                Backend::Memory(MemoryBackend::with_brightness(self.memory_limit, brightness))
            }
        };

        debug!("Decoder switched to {:?} backend", mode);
        true
    }
}

impl FrameSource for Decoder {
    fn load(&mut self, path: &Path) -> Result<AssetHeader, DecoderError> {
        dispatch!(&mut self.backend, b => b.load(path))
    }

    fn set_image(
        &mut self,
        data: &[u8],
        transport: Transport,
    ) -> Result<AssetHeader, DecoderError> {
        dispatch!(&mut self.backend, b => b.set_image(data, transport))
    }

    fn header(&self) -> Option<&AssetHeader> {
        dispatch!(&self.backend, b => b.header())
    }

    fn palette(&mut self) -> Result<&Palette, DecoderError> {
        dispatch!(&mut self.backend, b => b.palette())
    }

    fn frame(&mut self, n: usize) -> Result<IndexedFrame, DecoderError> {
        dispatch!(&mut self.backend, b => b.frame(n))
    }

    fn set_brightness(&mut self, brightness: f32) {
        dispatch!(&mut self.backend, b => b.set_brightness(brightness))
    }

    fn brightness(&self) -> f32 {
        dispatch!(&self.backend, b => b.brightness())
    }

    fn clear(&mut self) {
        dispatch!(&mut self.backend, b => b.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::decoder::StateError;
    use crate::encoder::{RgbFrame, encode};
    use std::fs;
    use tempfile::tempdir;

    fn asset() -> Vec<u8> {
        let frames: Vec<_> = (0..3)
            .map(|f| RgbFrame::from_fn(4, 4, |x, _| Rgb::new((x * 60) as u8, f as u8, 0)))
            .collect();
        encode(&frames, 6).unwrap()
    }

    #[test]
    fn test_switch_is_noop_in_same_mode() {
        let mut decoder = Decoder::new(BackendMode::Memory, 1024);
        decoder.set_image(&asset(), Transport::Raw).unwrap();

        assert!(!decoder.switch_to_memory());
        assert!(decoder.is_loaded());
    }

    #[test]
    fn test_switch_releases_other_backend() {
        let mut decoder = Decoder::new(BackendMode::Memory, 1024);
        decoder.set_image(&asset(), Transport::Raw).unwrap();
        assert!(matches!(decoder.backend(), Backend::Memory(m) if m.resident_bytes() > 0));

        assert!(decoder.switch_to_file());
        assert_eq!(decoder.mode(), BackendMode::File);
        assert!(!decoder.is_loaded());

        assert!(decoder.switch_to_memory());
        assert!(matches!(decoder.backend(), Backend::Memory(m) if m.resident_bytes() == 0));
    }

    #[test]
    fn test_file_mode_rejects_bytes() {
        let mut decoder = Decoder::new(BackendMode::File, 1024);
        assert!(matches!(
            decoder.set_image(&asset(), Transport::Raw),
            Err(DecoderError::State(StateError::DirectBytesUnsupported))
        ));
    }

    #[test]
    fn test_load_in_both_modes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latest.image");
        fs::write(&path, asset()).unwrap();

        let mut decoder = Decoder::new(BackendMode::File, 1024);
        decoder.load(&path).unwrap();
        let from_file = decoder.frame(2).unwrap();

        decoder.switch_to_memory();
        decoder.load(&path).unwrap();
        assert_eq!(decoder.frame(2).unwrap(), from_file);
        assert_eq!(decoder.len_frames().unwrap(), 3);
    }

    #[test]
    fn test_brightness_survives_switch() {
        let mut decoder = Decoder::new(BackendMode::Memory, 1024);
        decoder.set_brightness(0.25);
        decoder.switch_to_file();
        assert_eq!(decoder.brightness(), 0.25);
        decoder.switch_to_memory();
        assert_eq!(decoder.brightness(), 0.25);
    }
}
